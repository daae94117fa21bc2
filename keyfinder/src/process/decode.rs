//! The packet → frame → PCM loop.

use log::debug;

use crate::process::toolkit::{Codec, Container, DecodeStatus, Resampler};
use crate::structs::audio_data::PcmAccumulator;
use crate::structs::frame::Frame;
use crate::structs::packet::ScopedPacket;
use crate::utils::errors::DecodeError;

/// Malformed packets tolerated per decode. One more aborts the decode.
pub const BAD_PACKET_THRESHOLD: usize = 100;

/// Counters gathered while running [`decode_stream`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    pub packets: usize,
    pub frames: usize,
    /// Frames that went through the conversion stage.
    pub converted: usize,
    pub bad_packets: usize,
    pub samples: usize,
}

/// Decodes every packet of stream `stream_id` into `output`.
///
/// A packet is handed to the codec from its consumption cursor until the codec has
/// taken all of it. Malformed input discards the rest of the packet and counts towards
/// [`BAD_PACKET_THRESHOLD`]; so does a decode call that makes no progress. Frames not
/// already in the canonical format are converted before their first channel is
/// appended.
pub fn decode_stream<C, R, A>(
    container: &mut C,
    codec: &mut C::Codec,
    resampler: &mut R,
    stream_id: u32,
    output: &mut A,
) -> Result<DecodeStats, DecodeError>
where
    C: Container + ?Sized,
    R: Resampler + ?Sized,
    A: PcmAccumulator + ?Sized,
{
    let mut stats = DecodeStats::default();
    let mut packet = ScopedPacket::default();

    loop {
        if packet.is_exhausted() {
            packet.read(container, stream_id);
            if packet.size() == 0 {
                break;
            }
            stats.packets += 1;
        }

        let Some(current) = packet.packet() else {
            break;
        };

        match codec.decode(current, packet.consumed()) {
            DecodeStatus::Consumed { bytes: 0, frame: None } | DecodeStatus::Malformed => {
                stats.bad_packets += 1;
                if stats.bad_packets > BAD_PACKET_THRESHOLD {
                    return Err(DecodeError::TooManyBadPackets {
                        count: stats.bad_packets,
                        limit: BAD_PACKET_THRESHOLD,
                    });
                }
                packet.discard();
            }
            DecodeStatus::Consumed { bytes, frame } => {
                packet.advance(bytes);

                if let Some(frame) = frame {
                    stats.frames += 1;
                    let frame = if frame.format.is_canonical() {
                        frame
                    } else {
                        stats.converted += 1;
                        resampler.convert(&frame)?
                    };
                    stats.samples += append_frame(&frame, output);
                }
            }
        }
    }

    debug!(
        "Decoded {} packets into {} frames ({} converted), {} samples, {} bad packets",
        stats.packets, stats.frames, stats.converted, stats.samples, stats.bad_packets
    );

    Ok(stats)
}

/// Appends the first channel of a canonical frame to `output`, returning the number
/// of samples written. Each 16-bit code is widened to `f32` unscaled.
pub fn append_frame<A>(frame: &Frame, output: &mut A) -> usize
where
    A: PcmAccumulator + ?Sized,
{
    let plane = frame.first_plane();
    let count = plane.len() / 2;

    let old_len = output.current_length();
    output.grow_by(count);
    output.reset_write_cursor();
    output.advance_write_cursor(old_len);

    for raw in plane.chunks_exact(2) {
        output.write_at_cursor(f32::from(i16::from_ne_bytes([raw[0], raw[1]])));
        output.step();
    }

    count
}
