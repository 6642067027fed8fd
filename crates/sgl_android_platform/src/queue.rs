//! # Input Queue
//!
//! Carries input events from the UI thread to the loop thread.
//!
//! ```text
//! ┌─────────────┐   try_send   ┌──────────────┐   drain   ┌─────────────┐
//! │  UI thread  │ ───────────> │ bounded chan │ ────────> │ loop thread │
//! └─────────────┘  full: drop  └──────────────┘           └─────────────┘
//! ```
//!
//! The UI thread must never block on the game, so a full queue drops the
//! event and counts it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::input::InputEvent;

/// Creates a connected sender/receiver pair holding up to `capacity` events.
#[must_use]
pub fn input_queue(capacity: usize) -> (InputSender, InputReceiver) {
    let (sender, receiver) = bounded(capacity);
    (
        InputSender {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        InputReceiver { receiver },
    )
}

/// UI-thread end of the input queue.
#[derive(Debug, Clone)]
pub struct InputSender {
    sender: Sender<InputEvent>,
    dropped: Arc<AtomicU64>,
}

impl InputSender {
    /// Queues an event without blocking. Returns `false` if it was dropped.
    #[inline]
    pub fn send(&self, event: InputEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(?event, dropped, "input queue full, event dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                // Nobody is draining: the engine is gone
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Events dropped so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Queue capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.sender.capacity().unwrap_or(usize::MAX)
    }
}

/// Loop-thread end of the input queue.
#[derive(Debug)]
pub struct InputReceiver {
    receiver: Receiver<InputEvent>,
}

impl InputReceiver {
    /// Takes every queued event, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<InputEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes the oldest queued event.
    #[inline]
    #[must_use]
    pub fn try_recv(&self) -> Option<InputEvent> {
        self.receiver.try_recv().ok()
    }

    /// Events waiting.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SystemAction;

    #[test]
    fn test_fifo_order() {
        let (sender, receiver) = input_queue(4);
        assert!(sender.send(InputEvent::System(SystemAction::Back)));
        assert!(sender.send(InputEvent::System(SystemAction::Menu)));

        assert_eq!(receiver.pending_count(), 2);
        assert_eq!(receiver.try_recv(), Some(InputEvent::System(SystemAction::Back)));
        assert_eq!(receiver.drain(), vec![InputEvent::System(SystemAction::Menu)]);
        assert_eq!(receiver.try_recv(), None);
    }

    #[test]
    fn test_full_queue_drops() {
        let (sender, receiver) = input_queue(2);
        for _ in 0..5 {
            sender.send(InputEvent::System(SystemAction::Back));
        }

        assert_eq!(sender.dropped(), 3);
        assert_eq!(receiver.drain().len(), 2);
        assert!(sender.send(InputEvent::System(SystemAction::Back)));
    }

    #[test]
    fn test_disconnected_counts_as_dropped() {
        let (sender, receiver) = input_queue(2);
        drop(receiver);
        assert!(!sender.send(InputEvent::System(SystemAction::Menu)));
        assert_eq!(sender.dropped(), 1);
    }

    #[test]
    fn test_clones_share_counter() {
        let (sender, _receiver) = input_queue(1);
        let other = sender.clone();
        sender.send(InputEvent::System(SystemAction::Back));
        other.send(InputEvent::System(SystemAction::Back));
        assert_eq!(sender.dropped(), 1);
        assert_eq!(sender.capacity(), 1);
    }
}
