use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Return the audio files found at `path`.
///
/// - A file is returned as-is, whatever its extension.
/// - For a directory we return its direct children whose name ends with `.{extension}`,
///   sorted by path. Subdirectories are not searched.
pub fn audio_files(path: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let meta = fs::metadata(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => Error::NotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(err),
    })?;

    if !meta.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let suffix = format!(".{extension}");
    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let path = entry?.path();
        // Symlinks to files count; directories never do.
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(&suffix));
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
