//! High-level entry point: turn a file or directory of audio into waveform images.
//!
//! The flow is strictly sequential:
//! enumerate sources → for each source: segment → list clips → render each clip.
//!
//! Each source's clips live in their own [`SegmentDir`], which is released as soon as that
//! source is done (or has failed), so temporary storage never accumulates across files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, info_span, warn};

use crate::enumerate::audio_files;
use crate::opts::Opts;
use crate::renderer::{RenderOutcome, output_image_path, render};
use crate::segmenter::{SegmentDir, segment};
use crate::transcoder::{Ffmpeg, Transcoder};
use crate::{Error, Result};

/// Summary of one [`generate_waveforms`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Source files that were fully processed.
    pub files: usize,
    /// Clips produced across all processed sources.
    pub segments: usize,
    /// Images written.
    pub rendered: usize,
    /// Images left untouched because they already existed.
    pub skipped: usize,
    /// Sources that failed while `continue_on_error` was enabled.
    pub failures: Vec<FileFailure>,
}

impl Report {
    /// `true` when no source failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A source file that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub input: PathBuf,
    pub error: String,
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum ProgressEvent<'a> {
    /// Processing of a source file is starting. `index` is zero-based.
    FileStarted {
        input: &'a Path,
        index: usize,
        total: usize,
    },
    /// The source was split into `count` clips.
    SegmentsReady { input: &'a Path, count: usize },
    /// One clip was handled.
    SegmentDone {
        segment: &'a Path,
        image: &'a Path,
        outcome: RenderOutcome,
    },
    /// The source finished successfully and its clips were released.
    FileFinished { input: &'a Path },
    /// The source failed and the run continues with the next one.
    FileFailed { input: &'a Path, error: &'a Error },
}

/// Generate waveform images for every audio file at `input`, writing them into `output`.
///
/// `output` must be an existing directory. The first error aborts the run unless
/// `opts.continue_on_error` is set, in which case failures are collected in the report.
pub fn generate_waveforms<T>(
    transcoder: &T,
    input: &Path,
    output: &Path,
    opts: &Opts,
) -> Result<Report>
where
    T: Transcoder + ?Sized,
{
    generate_waveforms_with_progress(transcoder, input, output, opts, |_| {})
}

/// Like [`generate_waveforms`], reporting progress through `on_event`.
pub fn generate_waveforms_with_progress<T, F>(
    transcoder: &T,
    input: &Path,
    output: &Path,
    opts: &Opts,
    mut on_event: F,
) -> Result<Report>
where
    T: Transcoder + ?Sized,
    F: FnMut(ProgressEvent<'_>),
{
    let mut opts = opts.clone();
    opts.validate()?;

    // Enumerate before looking at `output` so a bad input never touches the output tree.
    let sources = audio_files(input, &opts.extension)?;
    if !output.is_dir() {
        return Err(Error::OutputNotDirectory {
            path: output.to_path_buf(),
        });
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        sources = sources.len(),
        "generating waveforms"
    );

    let mut report = Report::default();
    let total = sources.len();

    for (index, source) in sources.iter().enumerate() {
        let _span = info_span!("source", input = %source.display()).entered();
        on_event(ProgressEvent::FileStarted {
            input: source,
            index,
            total,
        });

        match process_source(transcoder, source, output, &opts, &mut report, &mut on_event) {
            Ok(()) => {
                report.files += 1;
                on_event(ProgressEvent::FileFinished { input: source });
            }
            Err(err) if opts.continue_on_error => {
                error!(error = %err, "source failed, continuing");
                on_event(ProgressEvent::FileFailed {
                    input: source,
                    error: &err,
                });
                report.failures.push(FileFailure {
                    input: source.clone(),
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        files = report.files,
        rendered = report.rendered,
        skipped = report.skipped,
        failures = report.failures.len(),
        "done"
    );

    Ok(report)
}

/// Resolve ffmpeg (`SOUNDWAVE_FFMPEG`, then `PATH`) and run [`generate_waveforms`] with it.
///
/// A missing `input` is reported as [`Error::NotFound`] even when ffmpeg cannot be found either.
pub fn run(input: &Path, output: &Path, opts: &Opts) -> Result<Report> {
    if !input.try_exists()? {
        return Err(Error::NotFound {
            path: input.to_path_buf(),
        });
    }
    let ffmpeg = Ffmpeg::locate(None)?;
    generate_waveforms(&ffmpeg, input, output, opts)
}

fn process_source<T, F>(
    transcoder: &T,
    source: &Path,
    output: &Path,
    opts: &Opts,
    report: &mut Report,
    on_event: &mut F,
) -> Result<()>
where
    T: Transcoder + ?Sized,
    F: FnMut(ProgressEvent<'_>),
{
    let clips: SegmentDir = segment(
        transcoder,
        source,
        opts.segment_duration_secs,
        &opts.extension,
    )?;
    let segments = clips.segments()?;
    if segments.is_empty() {
        warn!("transcoder produced no clips");
    }
    on_event(ProgressEvent::SegmentsReady {
        input: source,
        count: segments.len(),
    });

    for seg in &segments {
        let image = output_image_path(output, seg)?;
        let outcome = render(transcoder, seg, &image, opts.overwrite)?;
        match outcome {
            RenderOutcome::Rendered => report.rendered += 1,
            RenderOutcome::SkippedExisting => report.skipped += 1,
        }
        on_event(ProgressEvent::SegmentDone {
            segment: seg,
            image: &image,
            outcome,
        });
    }
    report.segments += segments.len();

    clips.close()
}
