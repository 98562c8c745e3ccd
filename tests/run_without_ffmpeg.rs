//! Lives in its own test binary because it rewrites `PATH` for the whole process.

use std::fs;

use soundwave::{Error, Ffmpeg, Opts};

#[test]
fn missing_input_is_not_found_even_when_ffmpeg_is_missing() -> anyhow::Result<()> {
    let empty_path = tempfile::tempdir()?;
    let work = tempfile::tempdir()?;
    let missing = work.path().join("missing.mp3");

    // SAFETY: this is the only test in this binary, so no other thread touches the environment.
    unsafe {
        std::env::set_var("PATH", empty_path.path());
        std::env::remove_var("SOUNDWAVE_FFMPEG");
    }
    assert!(matches!(
        Ffmpeg::locate(None),
        Err(Error::TranscoderNotFound { .. })
    ));

    let err = soundwave::run(&missing, work.path(), &Opts::default()).unwrap_err();

    assert!(matches!(err, Error::NotFound { ref path } if path == &missing));
    assert_eq!(fs::read_dir(work.path())?.count(), 0);
    Ok(())
}
