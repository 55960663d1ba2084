//! Upload progress tracking
//!
//! Progress is reported as cumulative absolute bytes. Observers that drive
//! delta-based displays compute the delta themselves.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::warn;

use super::job::TransferJob;

/// Receives progress for a single upload
pub trait ProgressObserver {
    /// Called with the cumulative bytes transferred so far and the fixed total
    fn on_progress(&mut self, transferred: u64, total: u64);

    /// Called once after the last byte was written successfully
    fn finish(&mut self) {}
}

/// Byte counters for one upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    total_bytes: u64,
    transferred_bytes: u64,
}

impl ProgressState {
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            transferred_bytes: 0,
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    pub fn is_complete(&self) -> bool {
        self.transferred_bytes == self.total_bytes
    }

    /// Record `bytes` more transferred. Never exceeds the total.
    pub fn advance(&mut self, bytes: u64) -> u64 {
        self.transferred_bytes = self
            .transferred_bytes
            .saturating_add(bytes)
            .min(self.total_bytes);
        self.transferred_bytes
    }
}

/// Creates the observer for each upload
pub trait ProgressFactory {
    fn observer(&self, job: &TransferJob) -> Box<dyn ProgressObserver + Send>;
}

/// Terminal progress bars on stderr
#[derive(Debug, Clone, Default)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    pub fn new() -> Self {
        Self
    }

    fn style() -> ProgressStyle {
        match ProgressStyle::with_template(
            "{msg}: {percent:>3}%|{wide_bar}| {bytes}/{total_bytes} [{elapsed_precise}<{eta_precise}, {binary_bytes_per_sec}]",
        ) {
            Ok(style) => style.progress_chars("█▉▊▋▌▍▎▏ "),
            Err(e) => {
                warn!("Invalid progress template: {}", e);
                ProgressStyle::default_bar()
            }
        }
    }
}

impl ProgressFactory for ConsoleProgress {
    fn observer(&self, job: &TransferJob) -> Box<dyn ProgressObserver + Send> {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        bar.set_style(Self::style());
        let label = job
            .local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| job.file_name.clone());
        bar.set_message(format!("Transferring {}", label));
        Box::new(BarObserver { bar })
    }
}

struct BarObserver {
    bar: ProgressBar,
}

impl ProgressObserver for BarObserver {
    fn on_progress(&mut self, transferred: u64, total: u64) {
        if self.bar.length() != Some(total) {
            self.bar.set_length(total);
        }
        self.bar.set_position(transferred);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}
