//! Events sent from the editor's background tasks to the host.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

/// Default lifetime of a notification.
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(5);

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// How long the host should keep it on screen.
    pub duration: Duration,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            duration: DEFAULT_NOTIFICATION_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Events produced by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Show a notification.
    Notify(Notification),

    /// A config update was accepted by the server on `port`.
    ConfigPushed { port: u16 },

    /// A conversion finished and wrote `output`.
    ConversionFinished { output: PathBuf },

    /// Files found in the local model directory after a refresh.
    LocalModelsScanned(Vec<String>),
}

/// Sender for editor events.
pub type EditorEventSender = mpsc::UnboundedSender<EditorEvent>;

/// Receiver for editor events.
pub type EditorEventReceiver = mpsc::UnboundedReceiver<EditorEvent>;

/// Create an event channel for editor events.
pub fn editor_channel() -> (EditorEventSender, EditorEventReceiver) {
    mpsc::unbounded_channel()
}
