//! The external transcoder seam.
//!
//! Everything soundwave asks of ffmpeg goes through [`Transcoder`]:
//! - split a source file into fixed-length clips
//! - draw one clip as a still waveform image
//!
//! [`Ffmpeg`] is the production implementation. It runs the `ffmpeg` binary as a blocking
//! subprocess, captures its diagnostics, and turns a non-zero exit into a typed error.
//! Tests substitute their own implementation (or a stub executable) without touching the
//! rest of the pipeline.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use crate::{Error, Result};

/// Environment variable consulted for the ffmpeg executable when no explicit path is given.
pub const FFMPEG_ENV: &str = "SOUNDWAVE_FFMPEG";

/// Filter chain used to draw every waveform: dynamic range compression, then a 640x640 picture.
pub const WAVEFORM_FILTER: &str = "compand=gain=5,showwavespic=s=640x640";

/// Operations soundwave needs from an audio/video processing tool.
///
/// Both calls block until the tool has finished.
pub trait Transcoder {
    /// Split `input` into consecutive clips of `duration_secs` seconds.
    ///
    /// `pattern` is a printf-style output path (for example `/tmp/x/song%03d.mp3`); the
    /// clip index is substituted for `%03d`. The last clip may be shorter.
    fn segment(&self, input: &Path, duration_secs: u64, pattern: &Path) -> Result<()>;

    /// Render `input` as exactly one waveform image at `output`.
    ///
    /// With `overwrite == false` the tool must refuse to replace an existing `output`.
    fn render_waveform(&self, input: &Path, output: &Path, overwrite: bool) -> Result<()>;
}

impl<T: Transcoder + ?Sized> Transcoder for &T {
    fn segment(&self, input: &Path, duration_secs: u64, pattern: &Path) -> Result<()> {
        (**self).segment(input, duration_secs, pattern)
    }

    fn render_waveform(&self, input: &Path, output: &Path, overwrite: bool) -> Result<()> {
        (**self).render_waveform(input, output, overwrite)
    }
}

/// [`Transcoder`] backed by the `ffmpeg` command-line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    /// Use the given executable (a bare name is looked up on `PATH` at spawn time).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the ffmpeg executable.
    ///
    /// Resolution order:
    /// - `explicit`, when provided
    /// - the `SOUNDWAVE_FFMPEG` environment variable, when set and non-empty
    /// - `ffmpeg` on `PATH`
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        Self::resolve(explicit, std::env::var_os(FFMPEG_ENV), || which::which("ffmpeg"))
    }

    fn resolve<F>(
        explicit: Option<PathBuf>,
        from_env: Option<OsString>,
        on_path: F,
    ) -> Result<Self>
    where
        F: FnOnce() -> which::Result<PathBuf>,
    {
        if let Some(program) = explicit {
            return Ok(Self::new(program));
        }

        if let Some(program) = from_env.filter(|v| !v.is_empty()) {
            return Ok(Self::new(program));
        }

        on_path()
            .map(Self::new)
            .map_err(|err| Error::TranscoderNotFound {
                reason: format!("set {FFMPEG_ENV} or add ffmpeg to PATH ({err})"),
            })
    }

    /// The executable this instance runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, args: &[OsString]) -> Result<Output> {
        debug!(program = %self.program.display(), ?args, "running ffmpeg");

        Command::new(&self.program)
            .args(base_args())
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

impl Transcoder for Ffmpeg {
    fn segment(&self, input: &Path, duration_secs: u64, pattern: &Path) -> Result<()> {
        let output = self.run(&segment_args(input, duration_secs, pattern))?;
        if !output.status.success() {
            return Err(Error::Transcode {
                input: input.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    fn render_waveform(&self, input: &Path, output: &Path, overwrite: bool) -> Result<()> {
        let out = self.run(&render_args(input, output, overwrite))?;
        if !out.status.success() {
            return Err(Error::Render {
                segment: input.to_path_buf(),
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

// Quiet, non-interactive invocation; errors still reach stderr.
fn base_args() -> [&'static str; 4] {
    ["-hide_banner", "-nostdin", "-loglevel", "error"]
}

fn segment_args(input: &Path, duration_secs: u64, pattern: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        input.as_os_str().to_owned(),
        "-f".into(),
        "segment".into(),
        "-segment_time".into(),
        duration_secs.to_string().into(),
        pattern.as_os_str().to_owned(),
    ]
}

fn render_args(input: &Path, output: &Path, overwrite: bool) -> Vec<OsString> {
    let overwrite_flag: &OsStr = if overwrite { "-y".as_ref() } else { "-n".as_ref() };
    vec![
        overwrite_flag.to_owned(),
        "-i".into(),
        input.as_os_str().to_owned(),
        "-filter_complex".into(),
        WAVEFORM_FILTER.into(),
        "-frames:v".into(),
        "1".into(),
        output.as_os_str().to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn segment_args_use_segment_muxer_and_pattern_last() {
        let args = segment_args(
            Path::new("in/song.mp3"),
            7,
            Path::new("/tmp/x/song%03d.mp3"),
        );
        assert_eq!(
            strings(&args),
            vec![
                "-y",
                "-i",
                "in/song.mp3",
                "-f",
                "segment",
                "-segment_time",
                "7",
                "/tmp/x/song%03d.mp3",
            ]
        );
    }

    #[test]
    fn render_args_switch_between_overwrite_modes() {
        let replace = strings(&render_args(
            Path::new("a.mp3"),
            Path::new("out/a.png"),
            true,
        ));
        assert_eq!(replace[0], "-y");

        let keep = strings(&render_args(
            Path::new("a.mp3"),
            Path::new("out/a.png"),
            false,
        ));
        assert_eq!(keep[0], "-n");
        assert!(keep.contains(&WAVEFORM_FILTER.to_owned()));
        assert_eq!(keep.last().map(String::as_str), Some("out/a.png"));
    }

    #[test]
    fn explicit_program_wins_over_discovery() -> anyhow::Result<()> {
        let ffmpeg = Ffmpeg::locate(Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")))?;
        assert_eq!(ffmpeg.program(), Path::new("/opt/ffmpeg/bin/ffmpeg"));
        Ok(())
    }

    #[test]
    fn env_value_is_used_when_no_explicit_program() -> anyhow::Result<()> {
        let ffmpeg = Ffmpeg::resolve(None, Some("/env/ffmpeg".into()), || {
            panic!("PATH must not be searched when the env var is set")
        })?;
        assert_eq!(ffmpeg.program(), Path::new("/env/ffmpeg"));
        Ok(())
    }

    #[test]
    fn empty_env_value_falls_through_to_path() -> anyhow::Result<()> {
        let ffmpeg = Ffmpeg::resolve(None, Some(OsString::new()), || {
            Ok(PathBuf::from("/usr/bin/ffmpeg"))
        })?;
        assert_eq!(ffmpeg.program(), Path::new("/usr/bin/ffmpeg"));
        Ok(())
    }

    #[test]
    fn nothing_found_is_transcoder_not_found() {
        let err = Ffmpeg::resolve(None, None, || Err(which::Error::CannotFindBinaryPath))
            .unwrap_err();
        assert!(matches!(err, Error::TranscoderNotFound { .. }));
        assert!(err.to_string().contains(FFMPEG_ENV));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let ffmpeg = Ffmpeg::new("/definitely/not/here/ffmpeg");
        let err = ffmpeg
            .render_waveform(Path::new("a.mp3"), Path::new("a.png"), false)
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
