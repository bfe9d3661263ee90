//! Max-stress notification.
//!
//! Listeners are told once per lashout episode, on the frame an organism
//! first saturates its capacity.

use amoeba_core::EntityId;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// An organism reached its stress capacity and started lashing out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxStressReached {
    pub engine: EntityId,
    /// Capacity at the moment of saturation
    pub capacity: f32,
    /// Simulation time of the onset
    pub at: f32,
}

/// Receiver of max-stress notifications.
///
/// Notification is a direct, synchronous call from inside the engine's tick.
/// Implementations must not call back into the notifying engine (`absorb`
/// or `tick`); forward the event instead, e.g. through a channel.
pub trait MaxStressListener: Send + Sync {
    fn on_max_stress_reached(&self, event: &MaxStressReached);
}

/// Route notifications onto an event bus.
impl MaxStressListener for mpsc::UnboundedSender<MaxStressReached> {
    fn on_max_stress_reached(&self, event: &MaxStressReached) {
        if self.send(*event).is_err() {
            tracing::trace!("Max-stress receiver dropped, event for {} discarded", event.engine);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_listener_forwards_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let event = MaxStressReached {
            engine: EntityId::new(),
            capacity: 50.0,
            at: 1.5,
        };

        tx.on_max_stress_reached(&event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, event);
    }

    #[test]
    fn test_channel_listener_survives_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<MaxStressReached>();
        drop(rx);
        tx.on_max_stress_reached(&MaxStressReached {
            engine: EntityId::new(),
            capacity: 50.0,
            at: 0.0,
        });
    }
}
