//! Conversion of decoder output into the canonical sample format.
//!
//! Only the sample format changes: rate conversion and channel remixing are rejected
//! when the stage is configured.

use log::debug;
use symphonia::core::conv::FromSample;
use symphonia::core::sample::{i24, u24};

use crate::process::toolkit::{Codec, Resampler, Toolkit};
use crate::structs::frame::{ChannelLayout, Frame, SampleFormat};
use crate::utils::errors::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleConfig {
    pub in_format: SampleFormat,
    pub in_rate: u32,
    pub in_layout: ChannelLayout,
    pub out_format: SampleFormat,
    pub out_rate: u32,
    pub out_layout: ChannelLayout,
}

impl ResampleConfig {
    /// Native format in, canonical format out, rate and layout untouched.
    pub fn canonical(in_format: SampleFormat, rate: u32, layout: ChannelLayout) -> Self {
        Self {
            in_format,
            in_rate: rate,
            in_layout: layout,
            out_format: SampleFormat::CANONICAL,
            out_rate: rate,
            out_layout: layout,
        }
    }
}

/// Prepares the conversion stage for `codec`.
///
/// A codec that reports only a channel count gets the default layout for that count
/// written back before the stage is opened.
pub fn configure_resampler<T, C>(toolkit: &T, codec: &mut C) -> Result<T::Resampler, DecodeError>
where
    T: Toolkit + ?Sized,
    C: Codec + ?Sized,
{
    let params = codec.parameters();

    let layout = match params.layout {
        Some(layout) if !layout.is_empty() => layout,
        _ => {
            let layout = ChannelLayout::default_for_count(params.channels);
            debug!(
                "Codec reports {} channel(s) without a layout, assuming {layout}",
                params.channels
            );
            codec.set_channel_layout(layout);
            layout
        }
    };

    let config = ResampleConfig::canonical(params.sample_format, params.sample_rate, layout);
    debug!(
        "Conversion stage: {} {} Hz {layout} -> {}",
        config.in_format, config.in_rate, config.out_format
    );

    toolkit.open_resampler(&config)
}

/// Per-sample format conversion to signed 16-bit.
#[derive(Debug, Clone)]
pub struct SampleConverter {
    config: ResampleConfig,
}

impl SampleConverter {
    pub fn open(config: &ResampleConfig) -> Result<Self, DecodeError> {
        if config.out_format != SampleFormat::CANONICAL {
            return Err(DecodeError::ResamplerInit(format!(
                "unsupported output sample format {}",
                config.out_format
            )));
        }
        if config.in_rate == 0 {
            return Err(DecodeError::ResamplerInit(
                "input sample rate is unknown".to_string(),
            ));
        }
        if config.in_rate != config.out_rate {
            return Err(DecodeError::ResamplerInit(format!(
                "rate conversion {} Hz -> {} Hz is not supported",
                config.in_rate, config.out_rate
            )));
        }
        if config.in_layout.is_empty() {
            return Err(DecodeError::ResamplerInit(
                "input channel layout is empty".to_string(),
            ));
        }
        if config.in_layout != config.out_layout {
            return Err(DecodeError::ResamplerInit(format!(
                "channel conversion {} -> {} is not supported",
                config.in_layout, config.out_layout
            )));
        }

        Ok(Self { config: *config })
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }
}

impl Resampler for SampleConverter {
    fn convert(&mut self, frame: &Frame) -> Result<Frame, DecodeError> {
        let config = &self.config;

        if frame.format != config.in_format {
            return Err(DecodeError::Resample(format!(
                "frame is {} but the stage expects {}",
                frame.format, config.in_format
            )));
        }
        if frame.sample_rate != config.in_rate {
            return Err(DecodeError::Resample(format!(
                "frame rate {} Hz differs from the configured {} Hz",
                frame.sample_rate, config.in_rate
            )));
        }
        if frame.channel_count() != config.in_layout.count() {
            return Err(DecodeError::Resample(format!(
                "frame has {} channel(s), expected {}",
                frame.channel_count(),
                config.in_layout.count()
            )));
        }

        let width = frame.format.bytes_per_sample();
        if let Some(ch) = frame.planes.iter().position(|p| p.len() % width != 0) {
            return Err(DecodeError::Resample(format!(
                "channel {ch} holds a partial {} sample",
                frame.format
            )));
        }

        let planes = frame
            .planes
            .iter()
            .map(|plane| to_s16(frame.format, plane))
            .collect();

        Ok(Frame {
            format: config.out_format,
            sample_rate: config.out_rate,
            layout: config.out_layout,
            planes,
        })
    }
}

fn to_s16(format: SampleFormat, plane: &[u8]) -> Vec<u8> {
    match format {
        SampleFormat::U8 => map(plane, |b| i16::from_sample(u8::from_ne_bytes(b))),
        SampleFormat::U16 => map(plane, |b| i16::from_sample(u16::from_ne_bytes(b))),
        SampleFormat::U24 => map(plane, |b| i16::from_sample(u24(u32::from_ne_bytes(b)))),
        SampleFormat::U32 => map(plane, |b| i16::from_sample(u32::from_ne_bytes(b))),
        SampleFormat::S8 => map(plane, |b| i16::from_sample(i8::from_ne_bytes(b))),
        SampleFormat::S16 => plane.to_vec(),
        SampleFormat::S24 => map(plane, |b| i16::from_sample(i24(i32::from_ne_bytes(b)))),
        SampleFormat::S32 => map(plane, |b| i16::from_sample(i32::from_ne_bytes(b))),
        SampleFormat::F32 => map(plane, |b| i16::from_sample(f32::from_ne_bytes(b))),
        SampleFormat::F64 => map(plane, |b| i16::from_sample(f64::from_ne_bytes(b))),
    }
}

fn map<const N: usize>(plane: &[u8], sample: impl Fn([u8; N]) -> i16) -> Vec<u8> {
    plane
        .chunks_exact(N)
        .flat_map(|chunk| {
            let mut raw = [0u8; N];
            raw.copy_from_slice(chunk);
            sample(raw).to_ne_bytes()
        })
        .collect()
}
