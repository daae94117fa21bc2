//! Tone profile overrides from the command line and from YAML files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use keyfinder::analysis::profile::{OCTAVES, ProfileSet, SEMITONES, parse_values, validate};
use keyfinder::utils::errors::ProfileError;

use crate::cli::command::KeyArgs;

/// Any subset of the tables in [`ProfileSet`]; missing ones keep their defaults.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProfileFile {
    pub major: Option<Vec<f64>>,
    pub minor: Option<Vec<f64>>,
    pub octave_weights: Option<Vec<f64>>,
}

impl ProfileFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Unable to read tone profiles from {}", path.display()))?;
        serde_yaml_ng::from_str(&text)
            .with_context(|| format!("Invalid tone profile file {}", path.display()))
    }

    pub fn apply(&self, profiles: &mut ProfileSet) -> Result<()> {
        if let Some(major) = &self.major {
            profiles.major = to_array(major).context("Invalid major profile")?;
        }
        if let Some(minor) = &self.minor {
            profiles.minor = to_array(minor).context("Invalid minor profile")?;
        }
        if let Some(weights) = &self.octave_weights {
            profiles.octave_weights = to_array(weights).context("Invalid octave weights")?;
        }
        Ok(())
    }
}

fn to_array<const N: usize>(values: &[f64]) -> Result<[f64; N], ProfileError> {
    let array: [f64; N] = values.try_into().map_err(|_| ProfileError::WrongLength {
        expected: N,
        actual: values.len(),
    })?;
    validate(&array)?;
    Ok(array)
}

/// Defaults, then the `--profiles` file, then `--major` / `--minor`.
pub fn resolve_profiles(args: &KeyArgs) -> Result<ProfileSet> {
    let mut profiles = ProfileSet::default();

    if let Some(path) = &args.profiles {
        ProfileFile::load(path)?.apply(&mut profiles)?;
        log::debug!("Loaded tone profiles from {}", path.display());
    }

    if let Some(text) = &args.major {
        profiles.major = parse_values::<SEMITONES>(text).context("Invalid --major profile")?;
    }
    if let Some(text) = &args.minor {
        profiles.minor = parse_values::<SEMITONES>(text).context("Invalid --minor profile")?;
    }

    Ok(profiles)
}
