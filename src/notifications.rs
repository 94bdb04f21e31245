//! Desktop notifications at the end of a timer interval.

use crate::models::TimerMode;
use notify_rust::Notification;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Failed to show notification: {0}")]
    Show(#[from] notify_rust::error::Error),
}

/// Title and body announcing the end of `mode`.
pub fn end_message(mode: TimerMode) -> (&'static str, &'static str) {
    match mode {
        TimerMode::Work | TimerMode::Idle => {
            ("Pomodoro Complete! 🍅", "Great work! Time for a break.")
        }
        TimerMode::ShortBreak => ("Short Break Over! ☕", "Ready to start another pomodoro?"),
        TimerMode::LongBreak => ("Long Break Over! 🎉", "Rested and ready to focus again?"),
    }
}

/// Shows the end-of-interval notice right away.
pub fn notify_interval_end(mode: TimerMode) -> Result<(), NotificationError> {
    let (summary, body) = end_message(mode);
    Notification::new()
        .summary(summary)
        .body(body)
        .sound_name("default")
        .show()?;
    Ok(())
}

/// Delivers at most one pending notice. Scheduling or cancelling bumps the
/// generation, so a sleeping thread from an older schedule stays silent.
#[derive(Debug, Default)]
pub struct NoticeScheduler {
    generation: Arc<AtomicU64>,
}

impl NoticeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows the notice for `mode` after `after_secs`, unless cancelled
    /// or rescheduled first.
    pub fn schedule(&self, mode: TimerMode, after_secs: u32) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let current = Arc::clone(&self.generation);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(u64::from(after_secs)));
            if current.load(Ordering::SeqCst) != generation {
                debug!(?mode, "end notice superseded");
                return;
            }
            if let Err(error) = notify_interval_end(mode) {
                warn!(%error, "failed to show end notice");
            }
        });
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
