use crate::{Error, Result};

/// Default length of every clip, in seconds.
pub const DEFAULT_SEGMENT_DURATION_SECS: u64 = 5;

/// Default audio extension used to filter directory inputs and to name clips.
pub const DEFAULT_EXTENSION: &str = "mp3";

/// Options that control how waveforms are generated.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that other
/// frontends (tests, batch jobs) can construct options programmatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Length of each clip in seconds. The final clip of a file may be shorter.
    pub segment_duration_secs: u64,

    /// Whether to replace images that already exist in the output directory.
    ///
    /// When `false`, existing images are left untouched and reported as skipped.
    pub overwrite: bool,

    /// Audio extension (without the dot) used to pick files out of an input directory.
    ///
    /// Clips are written with the same extension, so it also selects the clip encoding.
    pub extension: String,

    /// Keep processing the remaining source files after one of them fails.
    ///
    /// Failures are still collected in the run report; nothing is dropped silently.
    pub continue_on_error: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            segment_duration_secs: DEFAULT_SEGMENT_DURATION_SECS,
            overwrite: false,
            extension: DEFAULT_EXTENSION.to_owned(),
            continue_on_error: false,
        }
    }
}

impl Opts {
    /// Check the options and normalize the extension (a leading dot is dropped).
    pub fn validate(&mut self) -> Result<()> {
        if self.segment_duration_secs == 0 {
            return Err(Error::InvalidDuration);
        }

        let ext = self.extension.trim().trim_start_matches('.');
        if ext.is_empty() {
            return Err(Error::InvalidExtension);
        }
        self.extension = ext.to_owned();

        Ok(())
    }
}
