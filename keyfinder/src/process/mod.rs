use std::path::Path;

use log::info;

use crate::process::symphonia::SymphoniaToolkit;
use crate::process::toolkit::{Codec, Container, Toolkit};
use crate::structs::audio_data::AudioData;
use crate::structs::stream::{CodecParameters, DecoderInfo, StreamDescriptor};
use crate::utils::errors::DecodeError;

/// Traits at the seam to the native demux/decode library.
pub mod toolkit;

/// Selection of the stream to decode.
pub mod probe;

/// Decoder lookup and codec context setup.
pub mod codec;

/// Sample format conversion to 16-bit PCM.
///
/// Provides [`configure_resampler`](resample::configure_resampler) and the
/// [`SampleConverter`](resample::SampleConverter) stage.
pub mod resample;

/// The decode loop.
///
/// Provides [`decode_stream`](decode::decode_stream), which drives packets through the
/// codec and converter into a [`PcmAccumulator`](crate::structs::audio_data::PcmAccumulator).
pub mod decode;

/// Media source opening for files and standard input.
pub mod input;

/// The Symphonia backend.
pub mod symphonia;

#[cfg(test)]
pub(crate) mod mock;

pub use decode::{BAD_PACKET_THRESHOLD, DecodeStats};

/// What was decoded and how.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeSummary {
    pub stream: StreamDescriptor,
    pub decoder: DecoderInfo,
    /// Output parameters of the codec before conversion.
    pub native: CodecParameters,
    /// Channels in the source stream. Only the first one is analysed.
    pub source_channels: usize,
    pub stats: DecodeStats,
}

/// The streams of a container and the one the decoder would pick.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamReport {
    pub streams: Vec<StreamDescriptor>,
    /// Index into `streams`.
    pub selected: Option<usize>,
    pub decoder: Option<DecoderInfo>,
}

/// Decodes the first audio stream of `path` into mono 16-bit PCM.
///
/// `-` reads from standard input.
pub fn decode_audio_file(path: &Path) -> Result<(AudioData, DecodeSummary), DecodeError> {
    decode_with(&SymphoniaToolkit, path)
}

/// Describes the streams of `path` without decoding anything.
pub fn inspect_file(path: &Path) -> Result<StreamReport, DecodeError> {
    inspect_with(&SymphoniaToolkit, path)
}

/// [`decode_audio_file`] on an arbitrary backend.
///
/// Every handle opened along the way is dropped before returning, on success and on
/// every error. No samples are returned unless the whole stream decoded.
pub fn decode_with<T>(toolkit: &T, path: &Path) -> Result<(AudioData, DecodeSummary), DecodeError>
where
    T: Toolkit + ?Sized,
{
    toolkit.initialize();

    let mut container = toolkit.open_input(path)?;
    container.find_stream_info()?;

    let stream = probe::find_audio_stream(container.streams())?.clone();
    let (mut codec, decoder) = codec::open_codec(&mut container, &stream)?;
    let mut resampler = resample::configure_resampler(toolkit, &mut codec)?;
    let native = codec.parameters();

    let mut audio = AudioData::new(native.sample_rate, 1);
    let stats = decode::decode_stream(
        &mut container,
        &mut codec,
        &mut resampler,
        stream.id,
        &mut audio,
    )?;

    info!(
        "Decoded {:.1}s of audio at {} Hz",
        audio.duration_secs(),
        audio.frame_rate()
    );

    let summary = DecodeSummary {
        source_channels: native.channels,
        stream,
        decoder,
        native,
        stats,
    };

    Ok((audio, summary))
}

/// [`inspect_file`] on an arbitrary backend.
pub fn inspect_with<T>(toolkit: &T, path: &Path) -> Result<StreamReport, DecodeError>
where
    T: Toolkit + ?Sized,
{
    toolkit.initialize();

    let mut container = toolkit.open_input(path)?;
    container.find_stream_info()?;

    let streams = container.streams().to_vec();
    let selected = probe::find_audio_stream(&streams).ok().map(|s| s.index);
    let decoder = selected
        .and_then(|index| streams.get(index))
        .and_then(|stream| container.find_decoder(stream));

    Ok(StreamReport {
        streams,
        selected,
        decoder,
    })
}
