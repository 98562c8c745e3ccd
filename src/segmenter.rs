//! Split a source file into numbered clips inside a scoped temporary directory.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::enumerate::audio_files;
use crate::transcoder::Transcoder;
use crate::{Error, Result};

/// Temporary directory holding the clips of one source file.
///
/// The directory and everything in it is deleted when this value is dropped, so clips never
/// outlive the processing of their source file, even when rendering fails half-way.
#[derive(Debug)]
pub struct SegmentDir {
    dir: TempDir,
    stem: OsString,
    extension: String,
}

impl SegmentDir {
    /// Location of the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The clips produced by the transcoder, in index order.
    ///
    /// The index is zero-padded to three digits but grows past `999`, so a plain name sort
    /// would put `s1000` before `s101`; we order by the parsed index instead.
    pub fn segments(&self) -> Result<Vec<PathBuf>> {
        let mut clips = audio_files(self.path(), &self.extension)?;
        clips.sort_by_cached_key(|clip| (clip_index(&self.stem, clip), clip.clone()));
        Ok(clips)
    }

    /// Delete the directory now, reporting any failure instead of ignoring it on drop.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

/// Split `input` into `duration_secs`-long clips named `{stem}000.{extension}`,
/// `{stem}001.{extension}`, and so on.
pub fn segment<T>(
    transcoder: &T,
    input: &Path,
    duration_secs: u64,
    extension: &str,
) -> Result<SegmentDir>
where
    T: Transcoder + ?Sized,
{
    if duration_secs == 0 {
        return Err(Error::InvalidDuration);
    }

    let invalid_name = || Error::InvalidName {
        path: input.to_path_buf(),
    };
    let stem = input
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(invalid_name)?;
    let file_pattern = segment_pattern(stem, extension).ok_or_else(invalid_name)?;

    let dir = tempfile::Builder::new().prefix("soundwave-").tempdir()?;
    let pattern = dir.path().join(file_pattern);
    debug!(input = %input.display(), dir = %dir.path().display(), "segmenting");

    // On failure `dir` is dropped here and removed with whatever partial clips it holds.
    transcoder.segment(input, duration_secs, &pattern)?;

    Ok(SegmentDir {
        dir,
        stem: stem.to_os_string(),
        extension: extension.to_owned(),
    })
}

// The stem goes into a printf-style template, so a literal `%` must be doubled.
// A non-UTF-8 stem is passed through as-is unless it holds a `%` we cannot rewrite.
fn segment_pattern(stem: &OsStr, extension: &str) -> Option<OsString> {
    let mut pattern = match stem.to_str() {
        Some(s) => OsString::from(s.replace('%', "%%")),
        None if !stem.as_encoded_bytes().contains(&b'%') => stem.to_os_string(),
        None => return None,
    };
    pattern.push(format!("%03d.{extension}"));
    Some(pattern)
}

// Index written by the transcoder after the source stem, e.g. `1000` in `song1000.mp3`.
fn clip_index(stem: &OsStr, clip: &Path) -> Option<u64> {
    let clip_stem = clip.file_stem()?.as_encoded_bytes();
    let digits = clip_stem.strip_prefix(stem.as_encoded_bytes())?;
    std::str::from_utf8(digits).ok()?.parse().ok()
}
