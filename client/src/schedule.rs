//! Cancellable scheduled wake-ups.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// A message delivered to a channel at a deadline.
///
/// Dropping the handle cancels the delivery, so replacing a stored handle
/// with a new one supersedes the old wake-up.
#[derive(Debug)]
pub struct ScheduledTask {
    deadline: Instant,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Deliver `message` on `tx` once `deadline` is reached.
    pub fn at<M>(deadline: Instant, tx: mpsc::UnboundedSender<M>, message: M) -> Self
    where
        M: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Receiver gone means the session stopped; nothing to wake.
            let _ = tx.send(message);
        });

        Self { deadline, handle }
    }

    /// When the message is due.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Cancel the delivery.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_delivers_at_deadline() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let deadline = Instant::now() + Duration::from_secs(30);
        let task = ScheduledTask::at(deadline, tx, "expired");

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.try_recv().unwrap(), "expired");
        assert!(task.handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_delivery() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = ScheduledTask::at(Instant::now() + Duration::from_secs(1), tx, 1u8);

        task.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_handle_supersedes_old_wakeup() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();

        let mut slot = ScheduledTask::at(start + Duration::from_secs(1), tx.clone(), "first");
        assert_eq!(slot.deadline(), start + Duration::from_secs(1));
        slot = ScheduledTask::at(start + Duration::from_secs(2), tx, "second");

        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(rx.try_recv().unwrap(), "second");
        assert!(rx.try_recv().is_err());
        assert!(slot.handle.is_finished());
    }
}
