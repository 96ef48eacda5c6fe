use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::usecase::ports::notifier::{Notice, Notifier, Severity};

/// Forwards notices from any task to the UI loop that renders them.
pub struct ChannelNotifier {
    sender: UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn channel() -> (Self, UnboundedReceiver<Notice>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Error => tracing::warn!(message = %notice.message, "user notice"),
            Severity::Info | Severity::Success => {
                tracing::info!(message = %notice.message, "user notice")
            }
        }
        if self.sender.send(notice).is_err() {
            tracing::debug!("notice dropped, ui loop is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_arrive_in_order() {
        let (notifier, mut receiver) = ChannelNotifier::channel();

        notifier.error("Failed to fetch data");
        notifier.success("Integration removed successfully");

        let first = receiver.try_recv().expect("first notice should be queued");
        let second = receiver.try_recv().expect("second notice should be queued");
        assert_eq!(first, Notice::new("Failed to fetch data", Severity::Error));
        assert_eq!(second.severity, Severity::Success);
    }
}
