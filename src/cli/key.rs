use anyhow::Result;
use indicatif::MultiProgress;

use keyfinder::analysis::KeyFinder;
use keyfinder::process::decode_audio_file;

use super::command::{Cli, KeyArgs};
use super::progress::create_spinner;
use crate::profile::resolve_profiles;
use crate::timestamp::time_str;

pub fn cmd_key(args: &KeyArgs, _cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    let profiles = resolve_profiles(args)?;

    log::info!("Estimating key of {}", args.input.display());

    let pb = multi.map(|m| create_spinner(m, "decoding")).transpose()?;

    let (audio, summary) = decode_audio_file(&args.input)?;
    log::info!(
        "Decoded {} with {}: {} Hz, {} channel(s), {} analysed",
        summary.stream.codec,
        summary.decoder.name,
        audio.frame_rate(),
        summary.source_channels,
        time_str(audio.duration_secs())
    );
    if summary.stats.bad_packets > 0 {
        log::warn!("Skipped {} malformed packet(s)", summary.stats.bad_packets);
    }

    if let Some(ref pb) = pb {
        pb.set_message("analyzing");
    }

    let key = KeyFinder::new(&profiles).key_of_audio(&audio);

    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    match args.notation.label(key) {
        Some(label) => {
            log::debug!("Estimated key: {key}");
            println!("{label}");
        }
        None => log::info!("No tonal content found"),
    }

    Ok(())
}
