use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinners shown while a blocking step (query, mail submission) runs.
pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    /// Run `step` behind a spinner that is cleared once it returns.
    pub fn with_spinner<F, R>(&self, message: &str, step: F) -> R
    where
        F: FnOnce() -> R,
    {
        let spinner = self.create_spinner(message);
        let result = step();
        spinner.finish_and_clear();
        result
    }
}
