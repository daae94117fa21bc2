//! Tone profiles: how strongly each scale degree is expected to sound in a key.

#![allow(clippy::excessive_precision)]

use crate::utils::errors::ProfileError;

pub const SEMITONES: usize = 12;
pub const OCTAVES: usize = 6;
/// Semitone bands covered by a chroma vector.
pub const BANDS: usize = SEMITONES * OCTAVES;

pub const MAJOR_PROFILE: [f64; SEMITONES] = [
    7.23900502618145225142,
    3.50351166725158691406,
    3.58445177536649417505,
    2.84511816478676315967,
    5.81898892118549859731,
    4.55865057415321039969,
    2.44778850545506543313,
    6.99473192146829525484,
    3.39106613673504853068,
    4.55614256655143456953,
    4.07392666663523606019,
    4.45932757378886890365,
];

pub const MINOR_PROFILE: [f64; SEMITONES] = [
    7.00255045060284420089,
    3.14360279015996679775,
    4.35904319714962529275,
    5.40418120718934069657,
    3.67234420879306133756,
    4.08971184917797891956,
    3.90791435991553992579,
    6.19960288562316463867,
    3.63424625625277419871,
    2.87241191079875557435,
    5.35467999794542670600,
    3.83242038595048351013,
];

pub const OCTAVE_WEIGHTS: [f64; OCTAVES] = [
    0.39997267549999998559,
    0.55634425248300645173,
    0.52496636345143543600,
    0.60847548384277727607,
    0.59898115679999996974,
    0.49072435317960994006,
];

/// The three tables a key estimate is computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSet {
    pub major: [f64; SEMITONES],
    pub minor: [f64; SEMITONES],
    pub octave_weights: [f64; OCTAVES],
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            major: MAJOR_PROFILE,
            minor: MINOR_PROFILE,
            octave_weights: OCTAVE_WEIGHTS,
        }
    }
}

/// A 12-degree profile spread over every octave of the chroma vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneProfile {
    bands: [f64; BANDS],
}

impl ToneProfile {
    pub fn new(semitones: &[f64; SEMITONES], octave_weights: &[f64; OCTAVES]) -> Self {
        let mut bands = [0.0; BANDS];
        for (o, weight) in octave_weights.iter().enumerate() {
            for (s, value) in semitones.iter().enumerate() {
                bands[o * SEMITONES + s] = weight * value;
            }
        }
        Self { bands }
    }

    pub fn bands(&self) -> &[f64; BANDS] {
        &self.bands
    }

    /// Cosine similarity against `chroma` with the profile's tonic moved `offset`
    /// semitones up inside every octave. Zero when either side has no energy.
    pub fn cosine_similarity(&self, chroma: &[f64; BANDS], offset: usize) -> f64 {
        let mut intersection = 0.0;
        let mut profile_norm = 0.0;
        let mut input_norm = 0.0;

        for o in 0..OCTAVES {
            for s in 0..SEMITONES {
                let p = self.bands[o * SEMITONES + s];
                let i = chroma[o * SEMITONES + (s + offset) % SEMITONES];
                intersection += p * i;
                profile_norm += p * p;
                input_norm += i * i;
            }
        }

        if profile_norm > 0.0 && input_norm > 0.0 {
            intersection / (profile_norm.sqrt() * input_norm.sqrt())
        } else {
            0.0
        }
    }
}

/// Parses a comma separated list of non-negative numbers, e.g. `"7.2,3.5,…"`.
pub fn parse_values<const N: usize>(text: &str) -> Result<[f64; N], ProfileError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != N {
        return Err(ProfileError::WrongLength {
            expected: N,
            actual: fields.len(),
        });
    }

    let mut values = [0.0; N];
    for (index, (slot, field)) in values.iter_mut().zip(fields).enumerate() {
        *slot = field.parse().map_err(|_| ProfileError::NotANumber {
            index,
            value: field.to_string(),
        })?;
    }

    validate(&values)?;
    Ok(values)
}

/// Checks that a profile could weigh anything: every value finite and non-negative,
/// and not all of them zero.
pub fn validate(values: &[f64]) -> Result<(), ProfileError> {
    if let Some((index, &value)) = values
        .iter()
        .enumerate()
        .find(|&(_, v)| !v.is_finite() || *v < 0.0)
    {
        return Err(ProfileError::OutOfRange { index, value });
    }
    if values.iter().all(|&v| v == 0.0) {
        return Err(ProfileError::AllZero);
    }
    Ok(())
}
