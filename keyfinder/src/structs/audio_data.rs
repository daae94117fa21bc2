/// Append-only sample sink driven through an explicit write cursor.
///
/// Appending `n` samples to a sink of length `len` is: `grow_by(n)`,
/// `reset_write_cursor()`, `advance_write_cursor(len)`, then `n` times
/// `write_at_cursor(s)` followed by `step()`.
pub trait PcmAccumulator {
    fn current_length(&self) -> usize;

    /// Extends the buffer by `n` zeroed samples without moving the cursor.
    fn grow_by(&mut self, n: usize);

    fn reset_write_cursor(&mut self);

    fn advance_write_cursor(&mut self, n: usize);

    /// Stores `sample` at the cursor. The cursor must be inside the buffer.
    fn write_at_cursor(&mut self, sample: f32);

    /// Advances the cursor by one sample.
    fn step(&mut self) {
        self.advance_write_cursor(1);
    }
}

/// Decoded PCM ready for analysis.
///
/// Samples are 16-bit codes widened to `f32` (range `-32768.0..=32767.0`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioData {
    frame_rate: u32,
    channels: usize,
    samples: Vec<f32>,
    cursor: usize,
}

impl AudioData {
    pub fn new(frame_rate: u32, channels: usize) -> Self {
        Self {
            frame_rate,
            channels,
            samples: Vec::new(),
            cursor: 0,
        }
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        if self.frame_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.frame_rate as f64 * self.channels as f64)
    }
}

impl PcmAccumulator for AudioData {
    fn current_length(&self) -> usize {
        self.samples.len()
    }

    fn grow_by(&mut self, n: usize) {
        self.samples.resize(self.samples.len() + n, 0.0);
    }

    fn reset_write_cursor(&mut self) {
        self.cursor = 0;
    }

    fn advance_write_cursor(&mut self, n: usize) {
        self.cursor += n;
    }

    fn write_at_cursor(&mut self, sample: f32) {
        self.samples[self.cursor] = sample;
    }
}
