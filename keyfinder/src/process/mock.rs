//! Scriptable in-memory backend used by the pipeline tests.
//!
//! Packet payloads are read by [`MockCodec`] one byte at a time:
//! [`MALFORMED`] fails the decode, [`NEED_MORE`] consumes the byte without producing a
//! frame, [`STALL`] reports no progress at all and any other value `n` yields one frame
//! of `n` samples per channel. Channel 0 carries a running counter starting at 1, the
//! other channels carry its negation.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use crate::process::resample::{ResampleConfig, SampleConverter};
use crate::process::toolkit::{
    Codec, CompressedPacket, Container, DecodeStatus, Resampler, Toolkit,
};
use crate::structs::frame::{ChannelLayout, Frame, SampleFormat};
use crate::structs::stream::{CodecParameters, DecoderInfo, MediaKind, StreamDescriptor};
use crate::utils::errors::DecodeError;

pub const AUDIO_ID: u32 = 1;

pub const MALFORMED: u8 = 0xFF;
pub const NEED_MORE: u8 = 0x00;
pub const STALL: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fail {
    Open,
    StreamInfo,
    NoDecoder,
    CodecOpen,
    ResamplerInit,
    Convert,
}

#[derive(Debug, Clone, Copy)]
enum Handle {
    Container,
    Codec,
    Resampler,
    Packet,
}

#[derive(Debug, Default)]
struct Counters {
    containers: Cell<isize>,
    codecs: Cell<isize>,
    resamplers: Cell<isize>,
    packets: Cell<isize>,
    packets_read: Cell<usize>,
    conversions: Cell<usize>,
    initializations: Cell<usize>,
}

/// Shared bookkeeping of every handle the mock backend hands out.
#[derive(Debug, Clone, Default)]
pub struct Tracker(Rc<Counters>);

impl Tracker {
    fn counter(&self, handle: Handle) -> &Cell<isize> {
        match handle {
            Handle::Container => &self.0.containers,
            Handle::Codec => &self.0.codecs,
            Handle::Resampler => &self.0.resamplers,
            Handle::Packet => &self.0.packets,
        }
    }

    fn acquire(&self, handle: Handle) -> Guard {
        let counter = self.counter(handle);
        counter.set(counter.get() + 1);
        Guard {
            tracker: self.clone(),
            handle,
        }
    }

    pub fn live_packets(&self) -> isize {
        self.0.packets.get()
    }

    /// Containers, codecs, resamplers and packets not yet dropped.
    pub fn live_handles(&self) -> isize {
        self.0.containers.get() + self.0.codecs.get() + self.0.resamplers.get() + self.0.packets.get()
    }

    pub fn packets_read(&self) -> usize {
        self.0.packets_read.get()
    }

    pub fn conversions(&self) -> usize {
        self.0.conversions.get()
    }

    pub fn initializations(&self) -> usize {
        self.0.initializations.get()
    }
}

#[derive(Debug)]
struct Guard {
    tracker: Tracker,
    handle: Handle,
}

impl Drop for Guard {
    fn drop(&mut self) {
        let counter = self.tracker.counter(self.handle);
        counter.set(counter.get() - 1);
    }
}

pub fn audio_stream(index: usize, id: u32, channels: usize) -> StreamDescriptor {
    StreamDescriptor {
        index,
        id,
        kind: MediaKind::Audio,
        codec: "mock".to_string(),
        sample_rate: Some(44100),
        channels: Some(channels),
        layout: None,
        sample_format: Some(SampleFormat::S16),
        frames: None,
    }
}

pub fn other_stream(index: usize, id: u32) -> StreamDescriptor {
    StreamDescriptor {
        index,
        id,
        kind: MediaKind::Other,
        codec: "mock-video".to_string(),
        sample_rate: None,
        channels: None,
        layout: None,
        sample_format: None,
        frames: None,
    }
}

/// What the mock container holds and where the mock backend is told to fail.
#[derive(Debug, Clone)]
pub struct Script {
    streams: Vec<StreamDescriptor>,
    packets: Vec<(u32, Vec<u8>)>,
    params: CodecParameters,
    fail: Option<Fail>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            streams: vec![audio_stream(0, AUDIO_ID, 1)],
            packets: Vec::new(),
            params: CodecParameters {
                sample_format: SampleFormat::S16,
                sample_rate: 44100,
                channels: 1,
                layout: Some(ChannelLayout::MONO),
            },
            fail: None,
        }
    }
}

impl Script {
    pub fn packet(mut self, stream_id: u32, data: &[u8]) -> Self {
        self.packets.push((stream_id, data.to_vec()));
        self
    }

    pub fn audio(self, data: &[u8]) -> Self {
        self.packet(AUDIO_ID, data)
    }

    pub fn malformed(mut self, count: usize) -> Self {
        for _ in 0..count {
            self = self.audio(&[MALFORMED]);
        }
        self
    }

    pub fn streams(mut self, streams: Vec<StreamDescriptor>) -> Self {
        self.streams = streams;
        self
    }

    /// Native output of the codec the container opens.
    pub fn native(
        mut self,
        sample_format: SampleFormat,
        channels: usize,
        layout: Option<ChannelLayout>,
    ) -> Self {
        self.params = CodecParameters {
            sample_format,
            sample_rate: self.params.sample_rate,
            channels,
            layout,
        };
        self
    }

    pub fn fail(mut self, fail: Fail) -> Self {
        self.fail = Some(fail);
        self
    }

    fn fails(&self, fail: Fail) -> bool {
        self.fail == Some(fail)
    }
}

#[derive(Debug)]
pub struct MockPacket {
    stream_id: u32,
    data: Vec<u8>,
    _guard: Guard,
}

impl CompressedPacket for MockPacket {
    fn stream_id(&self) -> u32 {
        self.stream_id
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

#[derive(Debug)]
pub struct MockContainer {
    script: Script,
    tracker: Tracker,
    streams: Vec<StreamDescriptor>,
    next: usize,
    _guard: Guard,
}

impl MockContainer {
    pub fn new(script: Script, tracker: &Tracker) -> Self {
        Self {
            script,
            tracker: tracker.clone(),
            streams: Vec::new(),
            next: 0,
            _guard: tracker.acquire(Handle::Container),
        }
    }
}

impl Container for MockContainer {
    type Packet = MockPacket;
    type Codec = MockCodec;

    fn find_stream_info(&mut self) -> Result<(), DecodeError> {
        if self.script.fails(Fail::StreamInfo) {
            return Err(DecodeError::StreamInfo("scripted failure".to_string()));
        }
        self.streams = self.script.streams.clone();
        Ok(())
    }

    fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    fn read_packet(&mut self) -> Option<MockPacket> {
        let (stream_id, data) = self.script.packets.get(self.next)?.clone();
        self.next += 1;
        self.tracker.0.packets_read.set(self.tracker.packets_read() + 1);

        Some(MockPacket {
            stream_id,
            data,
            _guard: self.tracker.acquire(Handle::Packet),
        })
    }

    fn find_decoder(&self, _stream: &StreamDescriptor) -> Option<DecoderInfo> {
        if self.script.fails(Fail::NoDecoder) {
            return None;
        }
        Some(DecoderInfo {
            name: "mock".to_string(),
            description: "Scripted test decoder".to_string(),
        })
    }

    fn open_codec(
        &mut self,
        stream: &StreamDescriptor,
        decoder: &DecoderInfo,
    ) -> Result<MockCodec, DecodeError> {
        if self.script.fails(Fail::CodecOpen) {
            return Err(DecodeError::CodecOpen {
                codec: format!("{} (stream {})", decoder.name, stream.index),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(MockCodec {
            params: self.script.params,
            counter: 0,
            _guard: self.tracker.acquire(Handle::Codec),
        })
    }
}

#[derive(Debug)]
pub struct MockCodec {
    params: CodecParameters,
    counter: i16,
    _guard: Guard,
}

impl MockCodec {
    fn frame(&mut self, samples: usize) -> Frame {
        let format = self.params.sample_format;
        let layout = self
            .params
            .layout
            .unwrap_or_else(|| ChannelLayout::default_for_count(self.params.channels));

        let mut planes = vec![Vec::new(); self.params.channels];
        for _ in 0..samples {
            self.counter += 1;
            for (ch, plane) in planes.iter_mut().enumerate() {
                let value = if ch == 0 { self.counter } else { -self.counter };
                plane.extend(encode(format, value));
            }
        }

        Frame {
            format,
            sample_rate: self.params.sample_rate,
            layout,
            planes,
        }
    }
}

fn encode(format: SampleFormat, value: i16) -> Vec<u8> {
    match format {
        SampleFormat::S16 => value.to_ne_bytes().to_vec(),
        SampleFormat::S32 => (i32::from(value) << 16).to_ne_bytes().to_vec(),
        SampleFormat::F32 => (f32::from(value) / 32768.0).to_ne_bytes().to_vec(),
        SampleFormat::F64 => (f64::from(value) / 32768.0).to_ne_bytes().to_vec(),
        other => panic!("mock codec cannot produce {other}"),
    }
}

impl Codec for MockCodec {
    type Packet = MockPacket;

    fn parameters(&self) -> CodecParameters {
        self.params
    }

    fn set_channel_layout(&mut self, layout: ChannelLayout) {
        self.params.layout = Some(layout);
    }

    fn decode(&mut self, packet: &MockPacket, offset: usize) -> DecodeStatus {
        match packet.data.get(offset) {
            None | Some(&MALFORMED) => DecodeStatus::Malformed,
            Some(&NEED_MORE) => DecodeStatus::Consumed {
                bytes: 1,
                frame: None,
            },
            Some(&STALL) => DecodeStatus::Consumed {
                bytes: 0,
                frame: None,
            },
            Some(&samples) => DecodeStatus::Consumed {
                bytes: 1,
                frame: Some(self.frame(samples as usize)),
            },
        }
    }
}

/// Real conversion stage that also counts its invocations.
#[derive(Debug)]
pub struct MockResampler {
    inner: SampleConverter,
    tracker: Tracker,
    fail: bool,
    _guard: Guard,
}

impl Resampler for MockResampler {
    fn convert(&mut self, frame: &Frame) -> Result<Frame, DecodeError> {
        let calls = &self.tracker.0.conversions;
        calls.set(calls.get() + 1);
        if self.fail {
            return Err(DecodeError::Resample("scripted failure".to_string()));
        }
        self.inner.convert(frame)
    }
}

#[derive(Debug)]
pub struct MockToolkit {
    script: Script,
    tracker: Tracker,
}

impl MockToolkit {
    pub fn new(script: Script, tracker: &Tracker) -> Self {
        Self {
            script,
            tracker: tracker.clone(),
        }
    }
}

impl Toolkit for MockToolkit {
    type Container = MockContainer;
    type Resampler = MockResampler;

    fn initialize(&self) {
        let calls = &self.tracker.0.initializations;
        calls.set(calls.get() + 1);
    }

    fn open_input(&self, path: &Path) -> Result<MockContainer, DecodeError> {
        if self.script.fails(Fail::Open) {
            return Err(DecodeError::FileOpen {
                path: path.to_path_buf(),
                reason: "scripted failure".to_string(),
            });
        }
        Ok(MockContainer::new(self.script.clone(), &self.tracker))
    }

    fn open_resampler(&self, config: &ResampleConfig) -> Result<MockResampler, DecodeError> {
        if self.script.fails(Fail::ResamplerInit) {
            return Err(DecodeError::ResamplerInit("scripted failure".to_string()));
        }
        Ok(MockResampler {
            inner: SampleConverter::open(config)?,
            tracker: self.tracker.clone(),
            fail: self.script.fails(Fail::Convert),
            _guard: self.tracker.acquire(Handle::Resampler),
        })
    }
}
