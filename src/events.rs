//! Topic-based event bus
//!
//! Single-threaded publish/subscribe. Subscribers get a `SubscriptionId` back
//! and must hand it to `unsubscribe` on teardown.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::camera::CameraView;
use crate::choice::ChoiceData;
use crate::host::ObjectRef;
use crate::sim::{SessionState, SpawnZone};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Session state transitions
    State,
    /// Score and coin changes
    Score,
    /// Goal zone swaps
    Zone,
    /// Choice minigame answers
    Choice,
    /// Level load, spawns, directors, results
    Level,
    Camera,
}

/// Event payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StateChanged(SessionState),
    Scored(f64),
    CoinsCollected(f64),
    GoalZoneChanged(SpawnZone),
    ChoiceResponse(ChoiceData),
    LevelLoaded { code: String, placed: usize },
    ActorSpawned { object: ObjectRef, kind: String },
    DirectorsRunning(bool),
    Results { score: f64 },
    CameraChanged(CameraView),
}

impl GameEvent {
    pub fn topic(&self) -> Topic {
        match self {
            GameEvent::StateChanged(_) => Topic::State,
            GameEvent::Scored(_) | GameEvent::CoinsCollected(_) => Topic::Score,
            GameEvent::GoalZoneChanged(_) => Topic::Zone,
            GameEvent::ChoiceResponse(_) => Topic::Choice,
            GameEvent::LevelLoaded { .. }
            | GameEvent::ActorSpawned { .. }
            | GameEvent::DirectorsRunning(_)
            | GameEvent::Results { .. } => Topic::Level,
            GameEvent::CameraChanged(_) => Topic::Camera,
        }
    }
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&GameEvent)>;

/// Topic-based event bus
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<Topic, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an event to every subscriber of its topic, in subscription order
    pub fn publish(&mut self, event: GameEvent) {
        let topic = event.topic();
        match self.handlers.get_mut(&topic) {
            Some(handlers) if !handlers.is_empty() => {
                for (_, handler) in handlers.iter_mut() {
                    handler(&event);
                }
            }
            // No subscribers for this topic - this is normal, not an error
            _ => log::trace!("No subscribers for topic {:?}", topic),
        }
    }

    pub fn subscribe(
        &mut self,
        topic: Topic,
        handler: impl FnMut(&GameEvent) + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.handlers
            .entry(topic)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Returns false when the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.handlers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(sid, _)| *sid == id) {
                handlers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Total live subscriptions
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
