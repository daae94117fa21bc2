//! Stream and codec descriptions reported by an opened container.

use std::fmt::Display;

use crate::structs::frame::{ChannelLayout, SampleFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Other,
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Other => write!(f, "other"),
        }
    }
}

/// Read-only description of one stream embedded in a container.
///
/// `index` is the position in the container's stream list, `id` is the identifier
/// the container stamps on the packets of this stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    pub index: usize,
    pub id: u32,
    pub kind: MediaKind,
    /// Codec identifier as reported by the container.
    pub codec: String,
    pub sample_rate: Option<u32>,
    pub channels: Option<usize>,
    pub layout: Option<ChannelLayout>,
    pub sample_format: Option<SampleFormat>,
    /// Length of the stream in frames, when the container knows it.
    pub frames: Option<u64>,
}

impl StreamDescriptor {
    pub fn is_audio(&self) -> bool {
        self.kind == MediaKind::Audio
    }

    pub fn duration_secs(&self) -> Option<f64> {
        match (self.frames, self.sample_rate) {
            (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
            _ => None,
        }
    }
}

/// A resolved decoder implementation for a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderInfo {
    pub name: String,
    pub description: String,
}

/// Native output parameters of an opened codec context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodecParameters {
    pub sample_format: SampleFormat,
    pub sample_rate: u32,
    pub channels: usize,
    /// `None` when the codec only reports a channel count.
    pub layout: Option<ChannelLayout>,
}
