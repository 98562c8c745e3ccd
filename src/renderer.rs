use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::transcoder::Transcoder;
use crate::{Error, Result};

/// What happened to one clip's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOutcome {
    /// A fresh image was written.
    Rendered,

    /// An image already existed and overwriting was disabled; it was left untouched.
    SkippedExisting,
}

/// Image path for `segment` inside `output_dir`: the clip's stem with every `.` removed,
/// plus `.png`.
pub fn output_image_path(output_dir: &Path, segment: &Path) -> Result<PathBuf> {
    let stem = segment
        .file_stem()
        .map(|s| s.to_string_lossy().replace('.', ""))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidName {
            path: segment.to_path_buf(),
        })?;

    Ok(output_dir.join(format!("{stem}.png")))
}

/// Draw `segment` as a waveform image at `output_image`.
pub fn render<T>(
    transcoder: &T,
    segment: &Path,
    output_image: &Path,
    overwrite: bool,
) -> Result<RenderOutcome>
where
    T: Transcoder + ?Sized,
{
    if !overwrite && output_image.try_exists()? {
        debug!(image = %output_image.display(), "image exists, skipping");
        return Ok(RenderOutcome::SkippedExisting);
    }

    debug!(segment = %segment.display(), image = %output_image.display(), "rendering");
    transcoder.render_waveform(segment, output_image, overwrite)?;
    Ok(RenderOutcome::Rendered)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::fs;

    use super::*;

    struct PngWriter {
        calls: Cell<usize>,
    }

    impl Transcoder for PngWriter {
        fn segment(&self, _: &Path, _: u64, _: &Path) -> Result<()> {
            unreachable!("renderer never segments")
        }

        fn render_waveform(&self, _input: &Path, output: &Path, _overwrite: bool) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            fs::write(output, b"png")?;
            Ok(())
        }
    }

    #[test]
    fn output_name_drops_dots_and_appends_png() -> anyhow::Result<()> {
        let out = Path::new("/images");
        assert_eq!(
            output_image_path(out, Path::new("/tmp/x/live.at.home003.mp3"))?,
            PathBuf::from("/images/liveathome003.png")
        );
        assert_eq!(
            output_image_path(out, Path::new("song000.mp3"))?,
            PathBuf::from("/images/song000.png")
        );
        Ok(())
    }

    #[test]
    fn output_names_are_unique_within_one_source() -> anyhow::Result<()> {
        let out = Path::new("out");
        let mut seen = HashSet::new();
        for i in 0..1000 {
            let seg = PathBuf::from(format!("my.song{i:03}.mp3"));
            assert!(seen.insert(output_image_path(out, &seg)?));
        }
        Ok(())
    }

    #[test]
    fn existing_image_is_skipped_without_overwrite() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let image = dir.path().join("a000.png");
        fs::write(&image, b"old")?;

        let transcoder = PngWriter { calls: Cell::new(0) };
        let outcome = render(&transcoder, Path::new("a000.mp3"), &image, false)?;

        assert_eq!(outcome, RenderOutcome::SkippedExisting);
        assert_eq!(transcoder.calls.get(), 0);
        assert_eq!(fs::read(&image)?, b"old");
        Ok(())
    }

    #[test]
    fn existing_image_is_replaced_with_overwrite() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let image = dir.path().join("a000.png");
        fs::write(&image, b"old")?;

        let transcoder = PngWriter { calls: Cell::new(0) };
        let outcome = render(&transcoder, Path::new("a000.mp3"), &image, true)?;

        assert_eq!(outcome, RenderOutcome::Rendered);
        assert_eq!(fs::read(&image)?, b"png");
        Ok(())
    }
}
