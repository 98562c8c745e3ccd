use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Soundwave's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Soundwave's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs. The CLI layers `anyhow` context on top.
#[derive(Debug, Error)]
pub enum Error {
    /// The input path does not exist.
    #[error("input path not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The transcoder exited unsuccessfully while splitting a source file.
    #[error("failed to segment '{}' ({status}): {}", .input.display(), diagnostic(.stderr))]
    Transcode {
        input: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    /// The transcoder exited unsuccessfully while drawing a waveform.
    #[error("failed to render waveform for '{}' ({status}): {}", .segment.display(), diagnostic(.stderr))]
    Render {
        segment: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("segment duration must be at least one second")]
    InvalidDuration,

    #[error("audio extension must not be empty")]
    InvalidExtension,

    /// A file name could not be derived from the path.
    #[error("cannot derive a file name from '{}'", .path.display())]
    InvalidName { path: PathBuf },

    #[error("output path is not a directory: {}", .path.display())]
    OutputNotDirectory { path: PathBuf },

    /// No usable transcoder executable could be located.
    #[error("ffmpeg executable not found: {reason}")]
    TranscoderNotFound { reason: String },

    /// The transcoder process could not be started at all.
    #[error("failed to launch '{}'", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn diagnostic(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "no diagnostic output"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_path() {
        let err = Error::NotFound {
            path: PathBuf::from("/nope/song.mp3"),
        };
        assert_eq!(err.to_string(), "input path not found: /nope/song.mp3");
    }

    #[test]
    fn diagnostic_falls_back_when_stderr_is_blank() {
        assert_eq!(diagnostic("  \n"), "no diagnostic output");
        assert_eq!(diagnostic("bad input\n"), "bad input");
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io = std::io::Error::other("disk on fire");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "disk on fire");
    }
}
