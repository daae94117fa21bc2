//! Decoding of arbitrary compressed audio into analysis-ready PCM, and musical key
//! estimation on top of it.
//!
//! ## Technical Overview
//!
//! ### Decode Pipeline
//!
//! The first audio stream of a container is decoded with its native codec. Frames
//! that do not come out as signed 16-bit are converted (format only, never rate or
//! channel layout), and the first channel of every frame is appended to a flat
//! [`AudioData`](structs::audio_data::AudioData) buffer at the stream's own sample
//! rate.
//!
//! Up to [`BAD_PACKET_THRESHOLD`](process::BAD_PACKET_THRESHOLD) malformed packets
//! are skipped; one more aborts the decode. Any failure returns a
//! [`DecodeError`](utils::errors::DecodeError) and no samples.
//!
//! ### Key Estimation
//!
//! [`KeyFinder`](analysis::KeyFinder) reduces the PCM buffer to a 72-band chroma
//! vector and scores it against major and minor tone profiles for all 12 tonics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use keyfinder::analysis::KeyFinder;
//! use keyfinder::process::decode_audio_file;
//!
//! let (audio, summary) = decode_audio_file(Path::new("song.flac"))?;
//! println!("{} samples from {}", audio.sample_count(), summary.decoder.name);
//!
//! let key = KeyFinder::default().key_of_audio(&audio);
//! if !key.is_silence() {
//!     println!("{key}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Key estimation.
///
/// - **Chromagram** ([`analysis::chromagram`]): FFT based semitone band energies
/// - **Tone Profiles** ([`analysis::profile`]): Per-degree key weights
/// - **Keys** ([`analysis::key`]): The 24 keys and silence
pub mod analysis;

/// The decode pipeline.
///
/// 1. **Stream selection** ([`process::probe`])
/// 2. **Codec setup** ([`process::codec`])
/// 3. **Format conversion** ([`process::resample`])
/// 4. **Decode loop** ([`process::decode`])
///
/// The native library is reached through the traits in [`process::toolkit`];
/// [`process::symphonia`] implements them.
pub mod process;

/// Data structures shared by the pipeline stages.
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;
