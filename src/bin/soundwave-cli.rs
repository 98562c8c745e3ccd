// Command-line front end: render every audio file under a path as a series of
// waveform images.

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fs;
use std::path::PathBuf;

use soundwave::opts::{DEFAULT_EXTENSION, DEFAULT_SEGMENT_DURATION_SECS};
use soundwave::{Ffmpeg, Opts, ProgressEvent, Report, generate_waveforms_with_progress};

#[derive(Parser, Debug)]
#[command(name = "soundwave")]
#[command(about = "Split audio into clips and render each clip as a waveform image")]
struct Params {
    /// The path to an audio file or a folder containing audio files.
    input: PathBuf,

    /// The folder where waveform images are written (created if missing).
    output: PathBuf,

    /// Chunk audio every N seconds.
    #[arg(
        long = "wave-duration",
        value_name = "SECONDS",
        default_value_t = DEFAULT_SEGMENT_DURATION_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    wave_duration: u64,

    /// Replace waveform images already present in the output folder.
    #[arg(long = "override", default_value_t = false)]
    overwrite: bool,

    /// Extension of the audio files picked from an input folder.
    #[arg(long = "extension", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Path to the ffmpeg executable (defaults to $SOUNDWAVE_FFMPEG, then PATH).
    #[arg(long = "ffmpeg", value_name = "PATH")]
    ffmpeg: Option<PathBuf>,

    /// Keep going after a file fails; the run still exits non-zero.
    #[arg(long = "keep-going", default_value_t = false)]
    keep_going: bool,

    /// Print the run report as JSON instead of a summary line.
    #[arg(long = "json", default_value_t = false)]
    json: bool,
}

impl Params {
    fn opts(&self) -> Opts {
        Opts {
            segment_duration_secs: self.wave_duration,
            overwrite: self.overwrite,
            extension: self.extension.clone(),
            continue_on_error: self.keep_going,
        }
    }
}

fn main() -> Result<()> {
    soundwave::init_logging();
    let params = Params::parse();
    let report = run(&params)?;

    if params.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", summary_line(&report));
    }

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!("failed: {}: {}", failure.input.display(), failure.error);
        }
        bail!("{} file(s) could not be processed", report.failures.len());
    }

    Ok(())
}

fn run(params: &Params) -> Result<Report> {
    // The input is checked before ffmpeg is located so a missing input is always reported
    // as not found, and before the output folder is created so nothing is written for it.
    let input_exists = params
        .input
        .try_exists()
        .with_context(|| format!("failed to access '{}'", params.input.display()))?;
    if !input_exists {
        return Err(soundwave::Error::NotFound {
            path: params.input.clone(),
        }
        .into());
    }

    let ffmpeg = Ffmpeg::locate(params.ffmpeg.clone())?;

    fs::create_dir_all(&params.output).with_context(|| {
        format!(
            "failed to create output folder: {}",
            params.output.display()
        )
    })?;

    let pb = ProgressBar::new(0);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} {bar:40.cyan/blue} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let result = generate_waveforms_with_progress(
        &ffmpeg,
        &params.input,
        &params.output,
        &params.opts(),
        |event| match event {
            ProgressEvent::FileStarted {
                input,
                index,
                total,
            } => {
                pb.set_length(0);
                pb.set_position(0);
                let name = input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                pb.set_message(format!("[{}/{total}] {name}", index + 1));
            }
            ProgressEvent::SegmentsReady { count, .. } => pb.set_length(count as u64),
            ProgressEvent::SegmentDone { .. } => pb.inc(1),
            ProgressEvent::FileFinished { .. } | ProgressEvent::FileFailed { .. } => {}
        },
    )
    .with_context(|| format!("failed to generate waveforms for '{}'", params.input.display()));

    pb.finish_and_clear();
    result
}

fn summary_line(report: &Report) -> String {
    format!(
        "{} file(s), {} clip(s): {} image(s) rendered, {} skipped",
        report.files, report.segments, report.rendered, report.skipped
    )
}
