use log::{debug, info};

use crate::structs::stream::StreamDescriptor;
use crate::utils::errors::DecodeError;

/// Picks the first audio stream in container order.
///
/// Any further audio streams are ignored.
pub fn find_audio_stream(streams: &[StreamDescriptor]) -> Result<&StreamDescriptor, DecodeError> {
    for stream in streams {
        if stream.is_audio() {
            info!(
                "Selected stream #{} (id {}, codec {})",
                stream.index, stream.id, stream.codec
            );
            return Ok(stream);
        }
        debug!("Skipping {} stream #{}", stream.kind, stream.index);
    }

    Err(DecodeError::NoAudioStream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::mock::{audio_stream, other_stream};

    #[test]
    fn first_audio_stream_wins() {
        let streams = vec![
            other_stream(0, 10),
            audio_stream(1, 11, 2),
            audio_stream(2, 12, 6),
        ];
        let stream = find_audio_stream(&streams).unwrap();
        assert_eq!(stream.index, 1);
        assert_eq!(stream.id, 11);
    }

    #[test]
    fn no_audio_is_an_error() {
        assert!(matches!(
            find_audio_stream(&[other_stream(0, 1)]),
            Err(DecodeError::NoAudioStream)
        ));
        assert!(matches!(
            find_audio_stream(&[]),
            Err(DecodeError::NoAudioStream)
        ));
    }
}
