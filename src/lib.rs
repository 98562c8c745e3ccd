//! `soundwave` — split audio into fixed-length clips and render each clip as a waveform image.
//!
//! This crate provides:
//! - Input discovery (a single file, or the matching files of a directory)
//! - Segmentation into numbered clips inside scoped temporary directories
//! - Waveform rendering with overwrite control
//! - A sequential pipeline tying it all together, with a run report
//!
//! All audio work is delegated to ffmpeg through the [`Transcoder`] trait, so the crate itself
//! never decodes audio.

mod error;

// High-level API (most consumers should start here).
pub mod opts;
pub mod pipeline;

// External tool seam.
pub mod transcoder;

// Pipeline stages.
pub mod enumerate;
pub mod renderer;
pub mod segmenter;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};
pub use opts::Opts;
pub use pipeline::{
    FileFailure, ProgressEvent, Report, generate_waveforms, generate_waveforms_with_progress, run,
};
pub use renderer::RenderOutcome;
pub use transcoder::{Ffmpeg, Transcoder};

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
