use log::debug;

use crate::process::toolkit::Container;
use crate::structs::stream::{DecoderInfo, StreamDescriptor};
use crate::utils::errors::DecodeError;

/// Resolves a decoder for `stream` and opens a codec context with it.
pub fn open_codec<C>(
    container: &mut C,
    stream: &StreamDescriptor,
) -> Result<(C::Codec, DecoderInfo), DecodeError>
where
    C: Container + ?Sized,
{
    let decoder = container
        .find_decoder(stream)
        .ok_or_else(|| DecodeError::UnsupportedCodec(stream.codec.clone()))?;
    debug!("Using decoder {} ({})", decoder.name, decoder.description);

    let codec = container.open_codec(stream, &decoder)?;
    Ok((codec, decoder))
}
