//! Musical key estimation from decoded PCM.
//!
//! The signal is reduced to a single 72-band chroma vector (see [`chromagram`]) which
//! is compared against the major and minor [`ToneProfile`]s rotated to each of the 12
//! possible tonics. The best of the 24 scores names the key.

pub mod chromagram;
pub mod key;
pub mod profile;

use log::debug;

use crate::analysis::chromagram::{Chromagram, mix_down};
use crate::analysis::key::Key;
use crate::analysis::profile::{BANDS, ProfileSet, SEMITONES, ToneProfile};
use crate::structs::audio_data::AudioData;

pub struct KeyFinder {
    major: ToneProfile,
    minor: ToneProfile,
    chromagram: Chromagram,
}

impl Default for KeyFinder {
    fn default() -> Self {
        Self::new(&ProfileSet::default())
    }
}

impl KeyFinder {
    pub fn new(profiles: &ProfileSet) -> Self {
        Self {
            major: ToneProfile::new(&profiles.major, &profiles.octave_weights),
            minor: ToneProfile::new(&profiles.minor, &profiles.octave_weights),
            chromagram: Chromagram::new(),
        }
    }

    pub fn key_of_audio(&self, audio: &AudioData) -> Key {
        let samples = mix_down(audio.samples(), audio.channels());
        let chroma = self.chromagram.collapsed(&samples, audio.frame_rate());
        self.key_of_chroma(&chroma)
    }

    /// Best matching key for a collapsed chroma vector, [`Key::Silence`] when the
    /// vector carries no energy at all.
    pub fn key_of_chroma(&self, chroma: &[f64; BANDS]) -> Key {
        if chroma.iter().all(|&v| v == 0.0) {
            return Key::Silence;
        }

        let mut best_score = f64::NEG_INFINITY;
        let mut best_key = Key::Silence;

        for tonic in 0..SEMITONES {
            let major = self.major.cosine_similarity(chroma, tonic);
            if major > best_score {
                best_score = major;
                best_key = Key::new(tonic, false);
            }

            let minor = self.minor.cosine_similarity(chroma, tonic);
            if minor > best_score {
                best_score = minor;
                best_key = Key::new(tonic, true);
            }
        }

        debug!("Estimated {best_key} (score {best_score:.4})");
        best_key
    }
}
