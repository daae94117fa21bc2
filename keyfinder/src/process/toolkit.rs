//! Traits at the seam between the pipeline and the native demux/decode library.
//!
//! Every handle a backend hands out is an owned value; releasing it is its `Drop`.

use std::path::Path;

use crate::process::resample::ResampleConfig;
use crate::structs::frame::{ChannelLayout, Frame};
use crate::structs::stream::{CodecParameters, DecoderInfo, StreamDescriptor};
use crate::utils::errors::DecodeError;

/// One unit of compressed data as stored in the container.
pub trait CompressedPacket {
    /// Identifier of the stream this packet belongs to.
    fn stream_id(&self) -> u32;

    fn data(&self) -> &[u8];
}

/// Outcome of handing (part of) a packet to a codec.
#[derive(Debug)]
pub enum DecodeStatus {
    /// The input could not be decoded.
    Malformed,
    /// `bytes` of the submitted data were processed; `frame` is set once a complete
    /// frame became available.
    Consumed { bytes: usize, frame: Option<Frame> },
}

/// Decoder state bound to one stream.
pub trait Codec {
    type Packet: CompressedPacket;

    fn parameters(&self) -> CodecParameters;

    fn set_channel_layout(&mut self, layout: ChannelLayout);

    /// Decodes `packet` starting at byte `offset`.
    fn decode(&mut self, packet: &Self::Packet, offset: usize) -> DecodeStatus;
}

/// An opened demuxing context.
pub trait Container {
    type Packet: CompressedPacket;
    type Codec: Codec<Packet = Self::Packet>;

    fn find_stream_info(&mut self) -> Result<(), DecodeError>;

    /// Streams in the order the container stores them.
    fn streams(&self) -> &[StreamDescriptor];

    /// Next packet of any stream, or `None` once the container has no more data.
    fn read_packet(&mut self) -> Option<Self::Packet>;

    fn find_decoder(&self, stream: &StreamDescriptor) -> Option<DecoderInfo>;

    fn open_codec(
        &mut self,
        stream: &StreamDescriptor,
        decoder: &DecoderInfo,
    ) -> Result<Self::Codec, DecodeError>;
}

/// A configured sample-format conversion stage.
pub trait Resampler {
    fn convert(&mut self, frame: &Frame) -> Result<Frame, DecodeError>;
}

/// Entry point into a demux/decode library.
pub trait Toolkit {
    type Container: Container;
    type Resampler: Resampler;

    /// Process-wide registry bootstrap. Implementations must make repeated calls cheap
    /// and run the actual registration exactly once per process.
    fn initialize(&self);

    fn open_input(&self, path: &Path) -> Result<Self::Container, DecodeError>;

    fn open_resampler(&self, config: &ResampleConfig) -> Result<Self::Resampler, DecodeError>;
}
