// Movement events emitted by `MapEntity::do_step`.
//
// One `do_step` call advances every queued entity by at most one cell and
// reports what happened to each as a `MapEvent`. The driver decides what to
// do with them (narration, triggers, redraws); the map itself never looks at
// them again.
//
// See also: `map.rs` for `do_step`, the only producer of these events.
//
// **Critical constraint: determinism.** Events are appended in ascending uid
// order, the order `do_step` visits its move queues.

use crate::types::{Coordinate, Uid};
use serde::{Deserialize, Serialize};

/// What happened to one queued entity during a step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapEvent {
    /// Took one step; more remain queued.
    Moved { uid: Uid, to: Coordinate },
    /// Took its final queued step.
    Arrived { uid: Uid, at: Coordinate },
    /// Its next cell became blocked; a fresh path of `steps` cells toward the
    /// same goal replaced the queue. The entity did not move this step.
    Rerouted { uid: Uid, steps: usize },
    /// Its next cell became blocked and no way forward remains. The queue was
    /// dropped and the entity stays at `at`.
    Stalled { uid: Uid, at: Coordinate },
}

impl MapEvent {
    pub fn uid(&self) -> Uid {
        match self {
            MapEvent::Moved { uid, .. }
            | MapEvent::Arrived { uid, .. }
            | MapEvent::Rerouted { uid, .. }
            | MapEvent::Stalled { uid, .. } => *uid,
        }
    }
}

/// Output of one `do_step` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub events: Vec<MapEvent>,
}

impl StepResult {
    /// True when no entity had anything queued.
    pub fn is_idle(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_for(&self, uid: Uid) -> impl Iterator<Item = &MapEvent> {
        self.events.iter().filter(move |e| e.uid() == uid)
    }

    /// Uids that reached their goal this step.
    pub fn arrivals(&self) -> Vec<Uid> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MapEvent::Arrived { uid, .. } => Some(*uid),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_uid_and_filters() {
        let result = StepResult {
            events: vec![
                MapEvent::Moved {
                    uid: Uid(1),
                    to: Coordinate::new(1, 0),
                },
                MapEvent::Arrived {
                    uid: Uid(2),
                    at: Coordinate::new(5, 5),
                },
                MapEvent::Stalled {
                    uid: Uid(3),
                    at: Coordinate::new(0, 0),
                },
            ],
        };
        assert!(!result.is_idle());
        assert_eq!(result.arrivals(), vec![Uid(2)]);
        assert_eq!(result.events_for(Uid(3)).count(), 1);
        assert_eq!(result.events_for(Uid(9)).count(), 0);
    }

    #[test]
    fn event_serialization() {
        let event = MapEvent::Rerouted {
            uid: Uid(4),
            steps: 7,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: MapEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
