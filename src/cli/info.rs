use anyhow::Result;
use indicatif::MultiProgress;
use serde::Serialize;

use keyfinder::process::{StreamReport, inspect_file};
use keyfinder::structs::stream::StreamDescriptor;

use super::command::{Cli, InfoArgs};
use super::progress::create_spinner;
use crate::timestamp::time_str;

pub fn cmd_info(args: &InfoArgs, _cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Inspecting streams of {}", args.input.display());

    let pb = multi.map(|m| create_spinner(m, "probing")).transpose()?;
    let report = inspect_file(&args.input)?;
    if let Some(ref pb) = pb {
        pb.finish_and_clear();
    }

    let summary = InfoSummary::from_report(&args.input.display().to_string(), &report);

    if args.yaml {
        print!("{}", serde_yaml_ng::to_string(&summary)?);
    } else {
        display_summary(&summary);
    }

    if report.selected.is_none() {
        log::warn!("No audio stream found; the key cannot be estimated");
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct InfoSummary {
    input: String,
    selected_stream: Option<usize>,
    decoder: Option<String>,
    streams: Vec<StreamSummary>,
}

#[derive(Debug, Serialize)]
struct StreamSummary {
    index: usize,
    id: u32,
    kind: String,
    codec: String,
    sample_rate: Option<u32>,
    channels: Option<usize>,
    layout: Option<String>,
    sample_format: Option<String>,
    duration: Option<String>,
}

impl InfoSummary {
    fn from_report(input: &str, report: &StreamReport) -> Self {
        Self {
            input: input.to_string(),
            selected_stream: report.selected,
            decoder: report
                .decoder
                .as_ref()
                .map(|d| format!("{} ({})", d.name, d.description)),
            streams: report.streams.iter().map(StreamSummary::from).collect(),
        }
    }
}

impl From<&StreamDescriptor> for StreamSummary {
    fn from(stream: &StreamDescriptor) -> Self {
        Self {
            index: stream.index,
            id: stream.id,
            kind: stream.kind.to_string(),
            codec: stream.codec.clone(),
            sample_rate: stream.sample_rate,
            channels: stream.channels,
            layout: stream.layout.map(|l| l.to_string()),
            sample_format: stream.sample_format.map(|f| f.to_string()),
            duration: stream.duration_secs().map(time_str),
        }
    }
}

fn display_summary(summary: &InfoSummary) {
    println!();
    println!("Container Information");
    println!("=====================");
    println!();
    println!("Input                       {}", summary.input);
    println!("Streams                     {}", summary.streams.len());
    println!();

    for stream in &summary.streams {
        display_stream(stream, summary.selected_stream == Some(stream.index));
    }

    match &summary.decoder {
        Some(decoder) => println!("Decoder                     {decoder}"),
        None if summary.selected_stream.is_some() => {
            println!("Decoder                     none available")
        }
        None => println!("Decoder                     no audio stream"),
    }
    println!();
}

fn display_stream(stream: &StreamSummary, selected: bool) {
    let marker = if selected { ", selected" } else { "" };
    println!("Stream #{} (id {}), {}{marker}", stream.index, stream.id, stream.kind);
    println!("  Codec                     {}", stream.codec);

    if let Some(rate) = stream.sample_rate {
        println!("  Sampling rate             {rate} Hz");
    }
    if let Some(channels) = stream.channels {
        match &stream.layout {
            Some(layout) => println!("  Channels                  {channels} ({layout})"),
            None => println!("  Channels                  {channels}"),
        }
    }
    if let Some(format) = &stream.sample_format {
        println!("  Sample format             {format}");
    }
    if let Some(duration) = &stream.duration {
        println!("  Duration                  {duration}");
    }
    println!();
}
