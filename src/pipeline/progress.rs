/// Progress reporting for batch work
///
/// Workers report each finished item; the observer decides how to show it.
/// The CLI draws an indicatif bar, tests use `NoProgress` or a counter.

use indicatif::{ProgressBar, ProgressStyle};

/// Receives a notification every time one item of a batch finishes
pub trait ProgressObserver: Send + Sync {
    /// `completed` items out of `total` are done
    fn advance(&self, completed: usize, total: usize);

    /// The batch is over
    fn finish(&self) {}
}

/// Observer that ignores all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn advance(&self, _completed: usize, _total: usize) {}
}

impl ProgressObserver for ProgressBar {
    fn advance(&self, completed: usize, total: usize) {
        self.set_length(total as u64);
        self.set_position(completed as u64);
    }

    fn finish(&self) {
        ProgressBar::finish(self);
    }
}

/// Build the per-class bar: "<label> <class> [####....] 12/40"
pub fn class_progress_bar(label: &str, class_name: &str, total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{msg:30} [{bar:40.cyan/blue}] {pos}/{len} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar.set_message(format!("{} {}", label, class_name));
    bar
}
