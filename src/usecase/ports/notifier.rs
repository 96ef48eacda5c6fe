#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// Sink for short user-facing messages. Presentation is up to the
/// implementor.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn info(&self, message: &str) {
        self.notify(Notice::new(message, Severity::Info));
    }

    fn success(&self, message: &str) {
        self.notify(Notice::new(message, Severity::Success));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::new(message, Severity::Error));
    }
}
