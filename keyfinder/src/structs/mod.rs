//! Data structures passed between the pipeline stages.
//!
//! Contains stream descriptions, packet handles, decoded frames with their
//! sample/channel descriptions, and the PCM buffer the decoder fills.

pub mod audio_data;
pub mod frame;
pub mod packet;
pub mod stream;
