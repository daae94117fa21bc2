//! Decoded audio frames and the sample/channel descriptions attached to them.

use std::fmt::Display;

/// Sample storage formats a decoder can produce.
///
/// Every format is stored planar (one byte plane per channel) in native byte order.
/// 24-bit formats occupy a 32-bit container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    U8,
    U16,
    U24,
    U32,
    S8,
    S16,
    S24,
    S32,
    F32,
    F64,
}

impl SampleFormat {
    /// The only format the analysis path understands.
    pub const CANONICAL: SampleFormat = SampleFormat::S16;

    /// Width in bytes of one stored sample.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::S8 => 1,
            SampleFormat::U16 | SampleFormat::S16 => 2,
            SampleFormat::U24 | SampleFormat::S24 => 4,
            SampleFormat::U32 | SampleFormat::S32 | SampleFormat::F32 => 4,
            SampleFormat::F64 => 8,
        }
    }

    pub fn is_canonical(self) -> bool {
        self == Self::CANONICAL
    }
}

impl Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SampleFormat::U8 => "u8",
            SampleFormat::U16 => "u16",
            SampleFormat::U24 => "u24",
            SampleFormat::U32 => "u32",
            SampleFormat::S8 => "s8",
            SampleFormat::S16 => "s16",
            SampleFormat::S24 => "s24",
            SampleFormat::S32 => "s32",
            SampleFormat::F32 => "f32",
            SampleFormat::F64 => "f64",
        };
        write!(f, "{name}")
    }
}

/// Speaker positions as a bit mask, in WAVE channel-mask order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelLayout(u32);

impl ChannelLayout {
    pub const FRONT_LEFT: u32 = 1 << 0;
    pub const FRONT_RIGHT: u32 = 1 << 1;
    pub const FRONT_CENTRE: u32 = 1 << 2;
    pub const LFE: u32 = 1 << 3;
    pub const REAR_LEFT: u32 = 1 << 4;
    pub const REAR_RIGHT: u32 = 1 << 5;
    pub const REAR_CENTRE: u32 = 1 << 8;
    pub const SIDE_LEFT: u32 = 1 << 9;
    pub const SIDE_RIGHT: u32 = 1 << 10;

    pub const MONO: ChannelLayout = ChannelLayout(Self::FRONT_CENTRE);
    pub const STEREO: ChannelLayout = ChannelLayout(Self::FRONT_LEFT | Self::FRONT_RIGHT);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Default layout for a stream that only reports how many channels it has.
    ///
    /// Counts above eight have no conventional layout and get the lowest `count`
    /// positions so that the channel count is still preserved.
    pub fn default_for_count(count: usize) -> Self {
        let bits = match count {
            0 => 0,
            1 => Self::FRONT_CENTRE,
            2 => Self::FRONT_LEFT | Self::FRONT_RIGHT,
            3 => Self::FRONT_LEFT | Self::FRONT_RIGHT | Self::FRONT_CENTRE,
            4 => Self::FRONT_LEFT | Self::FRONT_RIGHT | Self::FRONT_CENTRE | Self::REAR_CENTRE,
            5 => {
                Self::FRONT_LEFT
                    | Self::FRONT_RIGHT
                    | Self::FRONT_CENTRE
                    | Self::REAR_LEFT
                    | Self::REAR_RIGHT
            }
            6 => {
                Self::FRONT_LEFT
                    | Self::FRONT_RIGHT
                    | Self::FRONT_CENTRE
                    | Self::LFE
                    | Self::REAR_LEFT
                    | Self::REAR_RIGHT
            }
            7 => {
                Self::FRONT_LEFT
                    | Self::FRONT_RIGHT
                    | Self::FRONT_CENTRE
                    | Self::LFE
                    | Self::REAR_CENTRE
                    | Self::SIDE_LEFT
                    | Self::SIDE_RIGHT
            }
            8 => {
                Self::FRONT_LEFT
                    | Self::FRONT_RIGHT
                    | Self::FRONT_CENTRE
                    | Self::LFE
                    | Self::REAR_LEFT
                    | Self::REAR_RIGHT
                    | Self::SIDE_LEFT
                    | Self::SIDE_RIGHT
            }
            n if n >= 32 => u32::MAX,
            n => (1u32 << n) - 1,
        };
        Self(bits)
    }
}

impl Display for ChannelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => write!(f, "unknown"),
            bits if bits == Self::MONO.0 => write!(f, "mono"),
            bits if bits == Self::STEREO.0 => write!(f, "stereo"),
            bits => write!(f, "{} channels ({bits:#06X})", self.count()),
        }
    }
}

/// One unit of decoder output.
///
/// `planes[ch]` holds the raw samples of channel `ch` in `format`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub format: SampleFormat,
    pub sample_rate: u32,
    pub layout: ChannelLayout,
    pub planes: Vec<Vec<u8>>,
}

impl Frame {
    /// Builds a canonical frame from per-channel 16-bit samples.
    pub fn from_s16(sample_rate: u32, layout: ChannelLayout, channels: &[Vec<i16>]) -> Self {
        let planes = channels
            .iter()
            .map(|channel| channel.iter().flat_map(|s| s.to_ne_bytes()).collect())
            .collect();

        Self {
            format: SampleFormat::S16,
            sample_rate,
            layout,
            planes,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.planes.len()
    }

    /// Samples per channel, taken from the first plane.
    pub fn sample_count(&self) -> usize {
        self.planes
            .first()
            .map_or(0, |plane| plane.len() / self.format.bytes_per_sample())
    }

    /// Raw bytes of the first channel. Empty when the frame carries no channels.
    pub fn first_plane(&self) -> &[u8] {
        self.planes.first().map_or(&[], |plane| plane.as_slice())
    }
}
