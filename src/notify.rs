//! Transient user-facing notifications.

use derive_more::Display;
use log::{error, info};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Level {
    #[display("ok")]
    Success,
    #[display("error")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("[{level}] {message}")]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Sink for notifications. Shown once, never blocking.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification::success(message))
    }

    fn error(&self, message: &str) {
        self.notify(Notification::error(message))
    }
}

/// Prints notifications on stderr, next to the interactive prompts.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => info!("{}", notification.message),
            Level::Error => error!("{}", notification.message),
        }
        eprintln!("{notification}");
    }
}

/// Keeps every notification in memory.
#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notification> {
        self.0
            .lock()
            .map(|mut seen| std::mem::take(&mut *seen))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.0.lock() {
            seen.push(notification);
        }
    }
}
