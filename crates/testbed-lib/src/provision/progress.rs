//! Download progress reporting
//!
//! The fetch step reports `(downloaded, total)` byte counts to a
//! [`ProgressSink`] synchronously after every received chunk.

use indicatif::{ProgressBar, ProgressStyle};

/// Resolution of the scaled progress counter
pub const PROGRESS_SCALE: u64 = 1000;

/// Receives download progress updates
pub trait ProgressSink {
    /// Called after each chunk with the bytes received so far and the
    /// expected total (0 when the server did not announce a length)
    fn update(&self, downloaded: u64, total: u64);

    /// Called once the body has been fully written
    fn finish(&self) {}
}

/// Scale `downloaded / total` to `0..=PROGRESS_SCALE`, rounding down.
///
/// Returns `None` while the total is unknown.
pub fn scaled_progress(downloaded: u64, total: u64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    let scaled = u128::from(downloaded) * u128::from(PROGRESS_SCALE) / u128::from(total);
    Some(scaled.min(u128::from(PROGRESS_SCALE)) as u64)
}

/// Sink that discards updates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _downloaded: u64, _total: u64) {}
}

/// Terminal progress bar over the scaled counter
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new(PROGRESS_SCALE);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {msg} [{wide_bar:.cyan/blue}] {percent}%")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_message(message.to_string());
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn update(&self, downloaded: u64, total: u64) {
        if let Some(position) = scaled_progress(downloaded, total) {
            self.bar.set_position(position);
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_progress_unknown_total() {
        assert_eq!(scaled_progress(0, 0), None);
        assert_eq!(scaled_progress(512, 0), None);
    }

    #[test]
    fn test_scaled_progress_rounds_down() {
        assert_eq!(scaled_progress(0, 3), Some(0));
        assert_eq!(scaled_progress(1, 3), Some(333));
        assert_eq!(scaled_progress(2, 3), Some(666));
        assert_eq!(scaled_progress(3, 3), Some(1000));
    }

    #[test]
    fn test_scaled_progress_clamps_and_does_not_overflow() {
        assert_eq!(scaled_progress(20, 10), Some(1000));
        assert_eq!(scaled_progress(u64::MAX, u64::MAX), Some(1000));
        assert_eq!(scaled_progress(u64::MAX / 2, u64::MAX), Some(499));
    }

    #[test]
    fn test_bar_progress_tracks_position() {
        let progress = BarProgress::new("downloading");
        progress.update(250, 1000);
        assert_eq!(progress.bar.position(), 250);
        progress.update(5, 0);
        assert_eq!(progress.bar.position(), 250);
        progress.finish();
        assert!(progress.bar.is_finished());
    }
}
