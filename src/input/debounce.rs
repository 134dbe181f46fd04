use std::sync::Mutex;
use std::time::{Duration, Instant};

use flume::Sender;
use tracing::trace;

use super::{BUTTON_COUNT, Button, InputEvent};
use crate::event::events::Event;

/// Accept state shared by every button. Edges arrive on whatever thread
/// the hardware callback fires on, so the whole decision sits behind one
/// lock.
struct DispatchGate {
    /// Timestamp of the last edge that made it through both windows.
    last_accepted: Option<Instant>,
    /// Per-button timestamp of the last edge that passed hardware debounce.
    last_edge: [Option<Instant>; BUTTON_COUNT],
}

/// Turns raw press edges into logical events on the shared channel.
///
/// Two windows apply: a per-button debounce against contact bounce, and a
/// global cooldown across *all* buttons so rapid presses of different
/// buttons are rate-limited too. Edges inside either window are dropped.
pub struct InputDispatcher {
    gate: Mutex<DispatchGate>,
    debounce: Duration,
    cooldown: Duration,
    events: Sender<Event>,
}

impl InputDispatcher {
    pub fn new(debounce: Duration, cooldown: Duration, events: Sender<Event>) -> Self {
        Self {
            gate: Mutex::new(DispatchGate {
                last_accepted: None,
                last_edge: [None; BUTTON_COUNT],
            }),
            debounce,
            cooldown,
            events,
        }
    }

    /// Feed one raw press edge. Callers pass the edge timestamp so tests
    /// can drive a synthetic clock. Returns the logical event if it was
    /// dispatched.
    pub fn button_edge(&self, button: Button, now: Instant) -> Option<InputEvent> {
        let mut gate = self.gate.lock().unwrap();

        let slot = button.index();
        if let Some(previous) = gate.last_edge[slot] {
            if now.duration_since(previous) < self.debounce {
                trace!(?button, "edge inside debounce window, dropped");
                return None;
            }
        }
        gate.last_edge[slot] = Some(now);

        if let Some(previous) = gate.last_accepted {
            if now.duration_since(previous) < self.cooldown {
                trace!(?button, "edge inside global cooldown, dropped");
                return None;
            }
        }
        gate.last_accepted = Some(now);
        drop(gate);

        let event = button.event();
        let _ = self.events.send(Event::Input(event));
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(
        debounce_ms: u64,
        cooldown_ms: u64,
    ) -> (InputDispatcher, flume::Receiver<Event>) {
        let (tx, rx) = flume::unbounded();
        (
            InputDispatcher::new(
                Duration::from_millis(debounce_ms),
                Duration::from_millis(cooldown_ms),
                tx,
            ),
            rx,
        )
    }

    #[test]
    fn rapid_same_button_presses_collapse_to_one_event() {
        let (dispatcher, rx) = dispatcher(50, 200);
        let t0 = Instant::now();

        assert_eq!(
            dispatcher.button_edge(Button::Select, t0),
            Some(InputEvent::Select)
        );
        assert_eq!(
            dispatcher.button_edge(Button::Select, t0 + Duration::from_millis(10)),
            None
        );
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn cooldown_gates_across_different_buttons() {
        let (dispatcher, rx) = dispatcher(50, 200);
        let t0 = Instant::now();

        assert!(dispatcher.button_edge(Button::Up, t0).is_some());
        // Different button, past its own debounce, still inside the
        // shared cooldown.
        assert!(
            dispatcher
                .button_edge(Button::Down, t0 + Duration::from_millis(120))
                .is_none()
        );
        assert!(
            dispatcher
                .button_edge(Button::Down, t0 + Duration::from_millis(320))
                .is_some()
        );
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn debounce_applies_per_button() {
        let (dispatcher, _rx) = dispatcher(50, 0);
        let t0 = Instant::now();

        assert!(dispatcher.button_edge(Button::Left, t0).is_some());
        assert!(
            dispatcher
                .button_edge(Button::Left, t0 + Duration::from_millis(30))
                .is_none()
        );
        // Another button has its own window.
        assert!(
            dispatcher
                .button_edge(Button::Right, t0 + Duration::from_millis(30))
                .is_some()
        );
        assert!(
            dispatcher
                .button_edge(Button::Left, t0 + Duration::from_millis(90))
                .is_some()
        );
    }

    #[test]
    fn dropped_edge_does_not_extend_the_cooldown() {
        let (dispatcher, _rx) = dispatcher(0, 200);
        let t0 = Instant::now();

        assert!(dispatcher.button_edge(Button::Select, t0).is_some());
        assert!(
            dispatcher
                .button_edge(Button::Select, t0 + Duration::from_millis(150))
                .is_none()
        );
        // Measured from the accepted edge, not the dropped one.
        assert!(
            dispatcher
                .button_edge(Button::Select, t0 + Duration::from_millis(210))
                .is_some()
        );
    }
}
