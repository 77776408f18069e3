//! Live reconfiguration from a watched setup file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use anyhow::{Context, Result};
use tft_setup::{advisories, resolve, SharedConfig};
use tracing::{info, warn};

use crate::load_description;

/// Watches `file` until SIGINT/SIGTERM, swapping in each valid revision.
///
/// The initial revision must resolve; later invalid revisions are reported
/// and the last good configuration stays active.
pub async fn run(file: PathBuf, interval_ms: u64, use_env: bool) -> Result<()> {
    // Taken before the first load so an edit racing it is still picked up.
    let baseline = modified(&file).ok();
    let raw = load_description(&file, use_env)?;
    let config = resolve(raw).with_context(|| format!("Invalid setup in {}", file.display()))?;
    for advisory in advisories(&config) {
        warn!("{}", advisory);
    }
    info!("Watching {} ({})", file.display(), config.driver());
    println!("Active: {} ({})", config.driver(), file.display());

    let shared = Arc::new(SharedConfig::new(config));

    let poll_state = shared.clone();
    let poll_file = file.clone();
    let poll = tokio::spawn(async move {
        poll_loop(poll_state, poll_file, baseline, interval_ms, use_env).await;
    });

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }
    poll.abort();

    println!(
        "Stopped after {} reconfiguration(s)",
        shared.generation()
    );
    Ok(())
}

async fn poll_loop(
    shared: Arc<SharedConfig>,
    file: PathBuf,
    baseline: Option<SystemTime>,
    interval_ms: u64,
    use_env: bool,
) {
    let interval = Duration::from_millis(interval_ms);
    let mut last_modified = baseline;
    let mut consecutive_errors: u32 = 0;
    let mut last_error_log: Option<Instant> = None;

    loop {
        tokio::time::sleep(interval).await;

        let stamp = match modified(&file) {
            Ok(stamp) => {
                consecutive_errors = 0;
                last_error_log = None;
                Some(stamp)
            }
            Err(e) => {
                log_throttled(&mut consecutive_errors, &mut last_error_log, &e);
                continue;
            }
        };
        if stamp == last_modified {
            continue;
        }
        last_modified = stamp;

        // Each rejected revision is reported; only stat failures are throttled.
        if let Err(e) = reload(&shared, &file, use_env) {
            warn!("Reload error: {:#}", e);
        }
    }
}

fn reload(shared: &SharedConfig, file: &Path, use_env: bool) -> Result<()> {
    let before = shared.generation();
    let raw = load_description(file, use_env)?;
    let config = shared
        .reload(raw)
        .with_context(|| format!("Rejected new revision of {}", file.display()))?;

    if shared.generation() != before {
        for advisory in advisories(&config) {
            warn!("{}", advisory);
        }
        println!(
            "Reconfigured (generation {}): {} {}x{}",
            shared.generation(),
            config.driver(),
            config.width(),
            config.height()
        );
    }
    Ok(())
}

fn modified(file: &Path) -> Result<SystemTime> {
    let metadata = std::fs::metadata(file)
        .with_context(|| format!("Failed to stat {}", file.display()))?;
    Ok(metadata.modified()?)
}

/// Logs the first error of a run, then at most once per minute while it keeps repeating.
///
/// `last_error_log` is `None` until an error of the current run has been logged.
/// Returns true if the error was logged.
fn log_throttled(
    consecutive_errors: &mut u32,
    last_error_log: &mut Option<Instant>,
    e: &anyhow::Error,
) -> bool {
    *consecutive_errors += 1;
    match *last_error_log {
        None => warn!("Watch error: {:#}", e),
        Some(at) if at.elapsed() >= Duration::from_secs(60) => {
            warn!(
                "Watch error (repeated {} times in {:?}): {:#}",
                consecutive_errors,
                at.elapsed(),
                e
            );
        }
        Some(_) => return false,
    }
    *consecutive_errors = 0;
    *last_error_log = Some(Instant::now());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tft_setup::{preset, Preset};

    fn temp_setup(tag: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "tftsetup-watch-{}-{}.toml",
            tag,
            std::process::id()
        ));
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_reload_rejects_invalid_revision() {
        let initial = resolve(preset(Preset::HspiTouch)).unwrap();
        let shared = SharedConfig::new(initial.clone());

        let mut raw = preset(Preset::HspiTouch);
        raw.bus.read_frequency = 80_000_000;
        let path = temp_setup("invalid", &raw.to_toml_string().unwrap());

        let err = reload(&shared, &path, false).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(format!("{:#}", err).contains("read frequency"));
        assert_eq!(*shared.current(), initial);
        assert_eq!(shared.generation(), 0);
    }

    #[test]
    fn test_reload_installs_valid_revision() {
        let shared = SharedConfig::new(resolve(preset(Preset::HspiTouch)).unwrap());
        let text = preset(Preset::HspiTouchBoardReset)
            .to_toml_string()
            .unwrap();
        let path = temp_setup("valid", &text);

        reload(&shared, &path, false).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(shared.generation(), 1);
        assert!(!shared.current().pins().rst.is_used());
    }

    #[test]
    fn test_throttled_logging() {
        let err = anyhow::anyhow!("stat failed");
        let mut errors = 0;
        let mut last_log = None;

        assert!(log_throttled(&mut errors, &mut last_log, &err));
        assert!(!log_throttled(&mut errors, &mut last_log, &err));
        assert!(!log_throttled(&mut errors, &mut last_log, &err));
        assert_eq!(errors, 2);

        // A minute later the repeat is reported and the count starts over.
        last_log = Instant::now().checked_sub(Duration::from_secs(61));
        assert!(log_throttled(&mut errors, &mut last_log, &err));
        assert_eq!(errors, 0);
        assert!(!log_throttled(&mut errors, &mut last_log, &err));
        assert_eq!(errors, 1);

        // A successful stat ends the run, so the next failure is reported at once.
        errors = 0;
        last_log = None;
        assert!(log_throttled(&mut errors, &mut last_log, &err));
    }

    #[tokio::test]
    async fn test_poll_picks_up_edit_after_baseline() {
        let path = temp_setup(
            "baseline",
            &preset(Preset::HspiTouch).to_toml_string().unwrap(),
        );
        let shared = Arc::new(SharedConfig::new(resolve(preset(Preset::HspiTouch)).unwrap()));

        // The baseline predates the edit, as when the file changes during the first load.
        let baseline = Some(SystemTime::UNIX_EPOCH);
        std::fs::write(
            &path,
            preset(Preset::HspiTouchBoardReset).to_toml_string().unwrap(),
        )
        .unwrap();

        let poll = tokio::spawn(poll_loop(shared.clone(), path.clone(), baseline, 100, false));
        tokio::time::sleep(Duration::from_millis(500)).await;
        poll.abort();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(shared.generation(), 1);
        assert!(!shared.current().pins().rst.is_used());
    }

    #[test]
    fn test_missing_file_is_error() {
        let shared = SharedConfig::new(resolve(preset(Preset::HspiTouch)).unwrap());
        let path = std::env::temp_dir().join("tftsetup-watch-does-not-exist.toml");
        assert!(reload(&shared, &path, false).is_err());
        assert!(modified(&path).is_err());
    }
}
