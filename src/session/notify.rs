/// How long an info notification stays up by default.
pub const INFO_TIMEOUT_MS: u64 = 5_000;
/// How long an error notification stays up by default.
pub const ERROR_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    /// `None` keeps the notification up until it is replaced or cleared.
    pub timeout_ms: Option<u64>,
}

/// Single notification slot. Showing a notification cancels the one before it.
#[derive(Clone, Debug, Default)]
pub struct Notifier {
    current: Option<Notification>,
    shown: Vec<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, message: impl Into<String>) -> &Notification {
        self.notify_for(message, Some(INFO_TIMEOUT_MS))
    }

    pub fn notify_for(
        &mut self,
        message: impl Into<String>,
        timeout_ms: Option<u64>,
    ) -> &Notification {
        let message = message.into();
        tracing::info!(timeout_ms, "[notify] {message:?}");
        self.show(Notification {
            message,
            level: NotificationLevel::Info,
            timeout_ms,
        })
    }

    pub fn notify_error(&mut self, message: impl Into<String>) -> &Notification {
        self.notify_error_for(message, Some(ERROR_TIMEOUT_MS))
    }

    pub fn notify_error_for(
        &mut self,
        message: impl Into<String>,
        timeout_ms: Option<u64>,
    ) -> &Notification {
        let message = message.into();
        tracing::warn!(timeout_ms, "[notifyError] {message:?}");
        self.show(Notification {
            message,
            level: NotificationLevel::Error,
            timeout_ms,
        })
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Every notification shown so far, oldest first.
    pub fn history(&self) -> &[Notification] {
        &self.shown
    }

    fn show(&mut self, notification: Notification) -> &Notification {
        self.shown.push(notification.clone());
        self.current.insert(notification)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/notify.rs"]
mod tests;
