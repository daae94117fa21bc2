//! Production backend on top of Symphonia.

use std::io;
use std::path::Path;
use std::sync::OnceLock;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace, warn};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CodecRegistry, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::{Hint, Probe};
use symphonia::core::sample::{Sample, SampleFormat as NativeFormat};

use crate::process::input::open_source;
use crate::process::resample::{ResampleConfig, SampleConverter};
use crate::process::toolkit::{Codec, CompressedPacket, Container, DecodeStatus, Toolkit};
use crate::structs::frame::{ChannelLayout, Frame, SampleFormat};
use crate::structs::stream::{CodecParameters, DecoderInfo, MediaKind, StreamDescriptor};
use crate::utils::errors::DecodeError;

struct Registry {
    codecs: CodecRegistry,
    probe: Probe,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

#[cfg(test)]
static REGISTRY_BUILDS: AtomicUsize = AtomicUsize::new(0);

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        debug!("Registering Symphonia codecs and formats");
        #[cfg(test)]
        REGISTRY_BUILDS.fetch_add(1, Ordering::SeqCst);

        let mut codecs = CodecRegistry::new();
        symphonia::default::register_enabled_codecs(&mut codecs);

        let mut probe = Probe::default();
        symphonia::default::register_enabled_formats(&mut probe);

        Registry { codecs, probe }
    })
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaToolkit;

impl Toolkit for SymphoniaToolkit {
    type Container = SymphoniaContainer;
    type Resampler = SampleConverter;

    fn initialize(&self) {
        registry();
    }

    fn open_input(&self, path: &Path) -> Result<SymphoniaContainer, DecodeError> {
        let open_error = |reason: String| DecodeError::FileOpen {
            path: path.to_path_buf(),
            reason,
        };

        let source = open_source(path).map_err(|e| open_error(e.to_string()))?;
        let stream = MediaSourceStream::new(source, Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let probed = registry()
            .probe
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| open_error(e.to_string()))?;

        Ok(SymphoniaContainer {
            reader: probed.format,
            streams: Vec::new(),
        })
    }

    fn open_resampler(&self, config: &ResampleConfig) -> Result<SampleConverter, DecodeError> {
        let converter = SampleConverter::open(config)?;
        trace!("Sample converter ready: {:?}", converter.config());
        Ok(converter)
    }
}

pub struct SymphoniaContainer {
    reader: Box<dyn FormatReader>,
    streams: Vec<StreamDescriptor>,
}

impl SymphoniaContainer {
    fn track(&self, id: u32) -> Option<&Track> {
        self.reader.tracks().iter().find(|track| track.id == id)
    }
}

impl Container for SymphoniaContainer {
    type Packet = SymphoniaPacket;
    type Codec = SymphoniaCodec;

    fn find_stream_info(&mut self) -> Result<(), DecodeError> {
        self.streams = self
            .reader
            .tracks()
            .iter()
            .enumerate()
            .map(|(index, track)| describe(index, track))
            .collect();

        debug!("Container reports {} stream(s)", self.streams.len());
        Ok(())
    }

    fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    fn read_packet(&mut self) -> Option<SymphoniaPacket> {
        loop {
            match self.reader.next_packet() {
                // An empty packet would read as end of stream further up.
                Ok(packet) if packet.buf().is_empty() => continue,
                Ok(packet) => return Some(SymphoniaPacket(packet)),
                Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return None;
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!("Stream parameters changed mid-stream, stopping here");
                    return None;
                }
                Err(e) => {
                    warn!("Unable to read further packets: {e}");
                    return None;
                }
            }
        }
    }

    fn find_decoder(&self, stream: &StreamDescriptor) -> Option<DecoderInfo> {
        let track = self.track(stream.id)?;
        let descriptor = registry().codecs.get_codec(track.codec_params.codec)?;

        Some(DecoderInfo {
            name: descriptor.short_name.to_string(),
            description: descriptor.long_name.to_string(),
        })
    }

    fn open_codec(
        &mut self,
        stream: &StreamDescriptor,
        decoder: &DecoderInfo,
    ) -> Result<SymphoniaCodec, DecodeError> {
        let codec_error = |reason: String| DecodeError::CodecOpen {
            codec: decoder.name.clone(),
            reason,
        };

        let track = self
            .track(stream.id)
            .ok_or_else(|| codec_error(format!("stream id {} disappeared", stream.id)))?;
        let track_params = &track.codec_params;

        let native_decoder = registry()
            .codecs
            .make(track_params, &DecoderOptions::default())
            .map_err(|e| codec_error(e.to_string()))?;

        let native = native_decoder.last_decoded();
        let sample_rate = track_params
            .sample_rate
            .unwrap_or_else(|| native.spec().rate);
        let layout = track_params
            .channels
            .map(|channels| ChannelLayout::from_bits(channels.bits()))
            .filter(|layout| !layout.is_empty());
        let params = CodecParameters {
            sample_format: buffer_format(&native),
            sample_rate,
            channels: layout.map_or_else(|| native.spec().channels.count(), ChannelLayout::count),
            layout,
        };
        debug!(
            "Opened {} decoder: {} {} Hz, {} channel(s)",
            decoder.name,
            params.sample_format,
            params.sample_rate,
            params.channels
        );

        Ok(SymphoniaCodec {
            decoder: native_decoder,
            params,
        })
    }
}

pub struct SymphoniaPacket(Packet);

impl CompressedPacket for SymphoniaPacket {
    fn stream_id(&self) -> u32 {
        self.0.track_id()
    }

    fn data(&self) -> &[u8] {
        self.0.buf()
    }
}

pub struct SymphoniaCodec {
    decoder: Box<dyn Decoder>,
    params: CodecParameters,
}

impl Codec for SymphoniaCodec {
    type Packet = SymphoniaPacket;

    fn parameters(&self) -> CodecParameters {
        self.params
    }

    fn set_channel_layout(&mut self, layout: ChannelLayout) {
        self.params.layout = Some(layout);
    }

    fn decode(&mut self, packet: &SymphoniaPacket, offset: usize) -> DecodeStatus {
        let packet = &packet.0;
        let Some(remaining) = packet.buf().get(offset..) else {
            return DecodeStatus::Malformed;
        };

        let tail;
        let input = if offset == 0 {
            packet
        } else {
            tail = Packet::new_from_slice(packet.track_id(), packet.ts(), packet.dur(), remaining);
            &tail
        };

        let layout = self
            .params
            .layout
            .unwrap_or_else(|| ChannelLayout::default_for_count(self.params.channels));

        match self.decoder.decode(input) {
            Ok(buffer) => DecodeStatus::Consumed {
                bytes: remaining.len(),
                frame: (buffer.frames() > 0).then(|| to_frame(&buffer, layout)),
            },
            Err(SymphoniaError::ResetRequired) => {
                debug!("Decoder reset requested");
                self.decoder.reset();
                DecodeStatus::Malformed
            }
            Err(e) => {
                trace!("Packet rejected by decoder: {e}");
                DecodeStatus::Malformed
            }
        }
    }
}

fn describe(index: usize, track: &Track) -> StreamDescriptor {
    let params = &track.codec_params;
    let kind = if params.sample_rate.is_some() || params.channels.is_some() {
        MediaKind::Audio
    } else {
        MediaKind::Other
    };
    let codec = registry()
        .codecs
        .get_codec(params.codec)
        .map_or_else(|| format!("{:?}", params.codec), |d| d.short_name.to_string());

    StreamDescriptor {
        index,
        id: track.id,
        kind,
        codec,
        sample_rate: params.sample_rate,
        channels: params.channels.map(|channels| channels.count()),
        layout: params
            .channels
            .map(|channels| ChannelLayout::from_bits(channels.bits())),
        sample_format: params.sample_format.map(from_native),
        frames: params.n_frames,
    }
}

fn from_native(format: NativeFormat) -> SampleFormat {
    match format {
        NativeFormat::U8 => SampleFormat::U8,
        NativeFormat::U16 => SampleFormat::U16,
        NativeFormat::U24 => SampleFormat::U24,
        NativeFormat::U32 => SampleFormat::U32,
        NativeFormat::S8 => SampleFormat::S8,
        NativeFormat::S16 => SampleFormat::S16,
        NativeFormat::S24 => SampleFormat::S24,
        NativeFormat::S32 => SampleFormat::S32,
        NativeFormat::F32 => SampleFormat::F32,
        NativeFormat::F64 => SampleFormat::F64,
    }
}

fn buffer_format(buffer: &AudioBufferRef<'_>) -> SampleFormat {
    match buffer {
        AudioBufferRef::U8(_) => SampleFormat::U8,
        AudioBufferRef::U16(_) => SampleFormat::U16,
        AudioBufferRef::U24(_) => SampleFormat::U24,
        AudioBufferRef::U32(_) => SampleFormat::U32,
        AudioBufferRef::S8(_) => SampleFormat::S8,
        AudioBufferRef::S16(_) => SampleFormat::S16,
        AudioBufferRef::S24(_) => SampleFormat::S24,
        AudioBufferRef::S32(_) => SampleFormat::S32,
        AudioBufferRef::F32(_) => SampleFormat::F32,
        AudioBufferRef::F64(_) => SampleFormat::F64,
    }
}

fn to_frame(buffer: &AudioBufferRef<'_>, layout: ChannelLayout) -> Frame {
    let planes = match buffer {
        AudioBufferRef::U8(buf) => planes(&**buf, |s| s.to_ne_bytes()),
        AudioBufferRef::U16(buf) => planes(&**buf, |s| s.to_ne_bytes()),
        AudioBufferRef::U24(buf) => planes(&**buf, |s| s.inner().to_ne_bytes()),
        AudioBufferRef::U32(buf) => planes(&**buf, |s| s.to_ne_bytes()),
        AudioBufferRef::S8(buf) => planes(&**buf, |s| s.to_ne_bytes()),
        AudioBufferRef::S16(buf) => planes(&**buf, |s| s.to_ne_bytes()),
        AudioBufferRef::S24(buf) => planes(&**buf, |s| s.inner().to_ne_bytes()),
        AudioBufferRef::S32(buf) => planes(&**buf, |s| s.to_ne_bytes()),
        AudioBufferRef::F32(buf) => planes(&**buf, |s| s.to_ne_bytes()),
        AudioBufferRef::F64(buf) => planes(&**buf, |s| s.to_ne_bytes()),
    };

    Frame {
        format: buffer_format(buffer),
        sample_rate: buffer.spec().rate,
        layout,
        planes,
    }
}

fn planes<S: Sample, const N: usize>(
    buffer: &AudioBuffer<S>,
    bytes: impl Fn(S) -> [u8; N],
) -> Vec<Vec<u8>> {
    (0..buffer.spec().channels.count())
        .map(|ch| buffer.chan(ch).iter().flat_map(|&s| bytes(s)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::process::decode_with;

    /// Minimal RIFF/WAVE file: 16-byte `fmt ` chunk followed by `data`.
    fn wav(format_tag: u16, channels: u16, rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
        let block_align = channels * bits / 8;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data.len() as u32).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&format_tag.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&rate.to_le_bytes());
        out.extend_from_slice(&(rate * block_align as u32).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    fn temp_wav(bytes: &[u8]) -> anyhow::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn registry_is_built_once() -> anyhow::Result<()> {
        SymphoniaToolkit.initialize();
        SymphoniaToolkit.initialize();
        assert_eq!(REGISTRY_BUILDS.load(Ordering::SeqCst), 1);

        let data: Vec<u8> = (0..64i16).flat_map(i16::to_le_bytes).collect();
        let file = temp_wav(&wav(1, 1, 8000, 16, &data))?;
        decode_with(&SymphoniaToolkit, file.path())?;
        decode_with(&SymphoniaToolkit, file.path())?;
        SymphoniaToolkit.initialize();
        assert_eq!(REGISTRY_BUILDS.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn mono_s16_wav_keeps_every_sample() -> anyhow::Result<()> {
        let samples: Vec<i16> = (0..3000).map(|i| ((i * 37) % 2000 - 1000) as i16).collect();
        let data: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let file = temp_wav(&wav(1, 1, 44100, 16, &data))?;

        let (audio, summary) = decode_with(&SymphoniaToolkit, file.path())?;

        assert_eq!(audio.frame_rate(), 44100);
        assert_eq!(audio.channels(), 1);
        assert_eq!(audio.sample_count(), samples.len());
        let expected: Vec<f32> = samples.iter().map(|&s| f32::from(s)).collect();
        assert_eq!(audio.samples(), expected.as_slice());
        assert_eq!(summary.source_channels, 1);
        assert_eq!(summary.stats.bad_packets, 0);
        Ok(())
    }

    #[test]
    fn stereo_float_wav_yields_left_channel_as_s16() -> anyhow::Result<()> {
        let frames = 2048;
        let mut data = Vec::new();
        for i in 0..frames {
            let left = (i % 512) as f32 / 32768.0;
            let right = -0.5f32;
            data.extend_from_slice(&left.to_le_bytes());
            data.extend_from_slice(&right.to_le_bytes());
        }
        let file = temp_wav(&wav(3, 2, 48000, 32, &data))?;

        let (audio, summary) = decode_with(&SymphoniaToolkit, file.path())?;

        assert_eq!(audio.frame_rate(), 48000);
        assert_eq!(audio.sample_count(), frames);
        assert_eq!(summary.native.sample_format, SampleFormat::F32);
        assert_eq!(summary.source_channels, 2);
        assert!(summary.stats.converted > 0);
        for (i, &sample) in audio.samples().iter().enumerate() {
            assert_eq!(sample, (i % 512) as f32);
        }
        Ok(())
    }

    #[test]
    fn unreadable_input_is_a_file_open_error() -> anyhow::Result<()> {
        let file = temp_wav(b"definitely not audio")?;
        let result = decode_with(&SymphoniaToolkit, file.path());
        assert!(matches!(result, Err(DecodeError::FileOpen { .. })));

        let missing = decode_with(&SymphoniaToolkit, Path::new("/nonexistent/song.flac"));
        assert!(matches!(missing, Err(DecodeError::FileOpen { .. })));
        Ok(())
    }
}
