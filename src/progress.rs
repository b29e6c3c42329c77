//! # Progress Reporting Module
//!
//! Questo modulo gestisce il progress reporting. L'organizer notifica
//! l'avanzamento tramite il trait `ProgressReporter` e non disegna nulla da sé.
//! Un'unità di lavoro è un file in un passaggio: con il resize attivo gli
//! incrementi sono `2 × file`.
//!
//! ## Implementazioni:
//! - `ProgressManager`: progress bar da terminale con `indicatif`
//! - `NoProgress`: ignora tutto (modalità JSON, test)
//!
//! ## Feedback visivo:
//! ```text
//! ⠋ [00:00:42] [████████████████████░░░░░░░░░░░░░░░░░░░░] 150/300 (50%) IMG_0042.HEIC
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Receiver of batch progress
pub trait ProgressReporter {
    /// Called once before the first unit of work
    fn start(&mut self, total: u64);
    /// Called once per finished unit of work, successful or not
    fn increment(&mut self);
    /// Called once after the last unit of work
    fn stop(&mut self);
    /// Optional status line for the unit currently being processed
    fn set_message(&mut self, _message: &str) {}
}

/// Progress reporter that ignores every event
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn start(&mut self, _total: u64) {}
    fn increment(&mut self) {}
    fn stop(&mut self) {}
}

/// Terminal progress bar
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a hidden bar; it becomes visible on `start`
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ProgressManager {
    fn start(&mut self, total: u64) {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█░");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        self.bar = bar;
    }

    fn increment(&mut self) {
        self.bar.inc(1);
    }

    fn stop(&mut self) {
        self.bar.finish_and_clear();
    }

    fn set_message(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_manager_counts_position() {
        let mut progress = ProgressManager::new();
        progress.start(4);
        progress.increment();
        progress.increment();
        progress.set_message("IMG_1.jpg");
        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bar.length(), Some(4));
        progress.stop();
    }
}
