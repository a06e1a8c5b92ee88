use cgmath::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovementUpdate {
    pub is_moving: bool,
    /// World units per second
    pub current_speed: f32,
    pub is_boosted: bool,
    pub current_boost_level: f32,
}

/// Outbound notifications for audio, UI and other collaborators
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LocomotionEvent {
    MovementStart,
    MovementStop,
    MovementUpdate(MovementUpdate),
    TeleportStart,
    TeleportEnd,
    Teleport { destination: Vector3<f32> },
}

/// Receives events synchronously, in emission order
pub trait LocomotionListener {
    fn on_event(&mut self, event: &LocomotionEvent);
}

impl<F> LocomotionListener for F
where
    F: FnMut(&LocomotionEvent),
{
    fn on_event(&mut self, event: &LocomotionEvent) {
        self(event)
    }
}

#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Box<dyn LocomotionListener>>,
}

impl EventDispatcher {
    pub fn subscribe(&mut self, listener: Box<dyn LocomotionListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn dispatch(&mut self, events: &[LocomotionEvent]) {
        for event in events {
            for listener in self.listeners.iter_mut() {
                listener.on_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_in_order_to_every_listener() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::default();

        for id in 0..2 {
            let seen = seen.clone();
            dispatcher.subscribe(Box::new(move |event: &LocomotionEvent| {
                seen.borrow_mut().push((id, *event));
            }));
        }

        dispatcher.dispatch(&[LocomotionEvent::TeleportStart, LocomotionEvent::TeleportEnd]);

        assert_eq!(
            *seen.borrow(),
            vec![
                (0, LocomotionEvent::TeleportStart),
                (1, LocomotionEvent::TeleportStart),
                (0, LocomotionEvent::TeleportEnd),
                (1, LocomotionEvent::TeleportEnd),
            ]
        );
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(LocomotionEvent::Teleport {
            destination: Vector3::new(1.0, 0.0, -4.0),
        })
        .unwrap();
        assert_eq!(json["type"], "teleport");
        assert_eq!(json["destination"]["z"], -4.0);
    }
}
