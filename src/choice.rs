//! Choice minigame objects
//!
//! A choice object carries one answer. When the controlled player runs into
//! it, it plays its correct/incorrect effects and, two seconds later, tells
//! the rest of the game which answer was picked. It only ever answers once.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{CHOICE_BROADCAST_DELAY, LEVEL_ASSET_PREFABS};
use crate::events::{EventBus, GameEvent};
use crate::host::ObjectRef;
use crate::resource_path;
use crate::sim::{Clock, Scheduler};

/// The answer a choice object represents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceData {
    pub choice_code: String,
    pub choice_type: String,
    pub item_code: String,
    pub item_display: String,
    pub item_asset_code: String,
    pub is_correct: bool,
}

impl Default for ChoiceData {
    fn default() -> Self {
        Self {
            choice_code: "question-1".to_string(),
            choice_type: "correct".to_string(),
            item_code: String::new(),
            item_display: "false".to_string(),
            item_asset_code: "barrel-1".to_string(),
            is_correct: true,
        }
    }
}

/// The player side of a collision, when the collider belongs to one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerContact {
    pub player: ObjectRef,
    pub player_controlled: bool,
}

/// What hit the choice object
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub collider: String,
    pub contact: Option<PlayerContact>,
}

/// Side effects for the host to render
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChoiceEffect {
    Correct,
    Incorrect,
    /// Knock the player back
    Impact {
        player: ObjectRef,
        direction: Vec3,
        force: f32,
    },
    /// Blow the choice object away from its own position
    Explosion { force: f32, radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ChoiceTask {
    Broadcast,
}

#[derive(Debug, Default)]
pub struct ChoiceObject {
    data: Option<ChoiceData>,
    broadcasted: bool,
    scheduler: Scheduler<ChoiceTask>,
}

impl ChoiceObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_choice(&mut self, data: ChoiceData) {
        log::debug!(
            "load choice {} item {} correct={}",
            data.choice_code,
            data.item_code,
            data.is_correct
        );
        self.data = Some(data);
    }

    pub fn data(&self) -> Option<&ChoiceData> {
        self.data.as_ref()
    }

    /// Prefab path of the asset shown inside the choice
    pub fn asset_path(&self) -> Option<String> {
        self.data
            .as_ref()
            .map(|d| resource_path(LEVEL_ASSET_PREFABS, &d.item_asset_code))
    }

    pub fn has_broadcasted(&self) -> bool {
        self.broadcasted
    }

    /// React to a collision. Only the player-controlled player counts, hit
    /// directly or through its helmet/facemask colliders.
    pub fn handle_collision(&mut self, clock: &Clock, collision: &Collision) -> Vec<ChoiceEffect> {
        let name = collision.collider.as_str();
        let player_part = name.contains("GamePlayerObject")
            || name.contains("Helmet")
            || name.contains("Facemask");
        match collision.contact {
            Some(contact) if player_part && contact.player_controlled => {
                self.handle_choice(clock, contact.player)
            }
            _ => Vec::new(),
        }
    }

    fn handle_choice(&mut self, clock: &Clock, player: ObjectRef) -> Vec<ChoiceEffect> {
        let Some(data) = &self.data else {
            return Vec::new();
        };

        let effects = if data.is_correct {
            vec![ChoiceEffect::Correct]
        } else {
            vec![
                ChoiceEffect::Incorrect,
                ChoiceEffect::Impact {
                    player,
                    direction: Vec3::NEG_Z,
                    force: 1.0,
                },
                ChoiceEffect::Explosion {
                    force: 100.0,
                    radius: 50.0,
                },
            ]
        };

        if !self.broadcasted && self.scheduler.is_empty() {
            self.scheduler
                .after(clock, CHOICE_BROADCAST_DELAY, ChoiceTask::Broadcast);
        }
        effects
    }

    pub fn tick(&mut self, clock: &Clock, bus: &mut EventBus) {
        for task in self.scheduler.due(clock) {
            match task {
                ChoiceTask::Broadcast => self.broadcast(bus),
            }
        }
    }

    fn broadcast(&mut self, bus: &mut EventBus) {
        if self.broadcasted {
            return;
        }
        if let Some(data) = &self.data {
            self.broadcasted = true;
            log::info!("choice response {}", data.item_code);
            bus.publish(GameEvent::ChoiceResponse(data.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn hit(collider: &str, controlled: bool) -> Collision {
        Collision {
            collider: collider.to_string(),
            contact: Some(PlayerContact {
                player: ObjectRef(1),
                player_controlled: controlled,
            }),
        }
    }

    fn answer(is_correct: bool) -> ChoiceData {
        ChoiceData {
            item_code: "item-a".to_string(),
            is_correct,
            ..ChoiceData::default()
        }
    }

    #[test]
    fn test_broadcast_once_after_delay() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(0));
        let s = seen.clone();
        bus.subscribe(Topic::Choice, move |_| *s.borrow_mut() += 1);

        let mut choice = ChoiceObject::new();
        choice.load_choice(answer(true));
        let mut clock = Clock::default();

        assert_eq!(
            choice.handle_collision(&clock, &hit("GamePlayerObject", true)),
            vec![ChoiceEffect::Correct]
        );
        choice.handle_collision(&clock, &hit("Helmet", true));

        clock.advance(1.0, 1.0);
        choice.tick(&clock, &mut bus);
        assert_eq!(*seen.borrow(), 0);

        clock.advance(1.0, 1.0);
        choice.tick(&clock, &mut bus);
        assert_eq!(*seen.borrow(), 1);

        // Later collisions never answer again
        choice.handle_collision(&clock, &hit("GamePlayerObject", true));
        clock.advance(3.0, 1.0);
        choice.tick(&clock, &mut bus);
        assert_eq!(*seen.borrow(), 1);
        assert!(choice.has_broadcasted());
    }

    #[test]
    fn test_incorrect_pushes_player_back() {
        let mut choice = ChoiceObject::new();
        choice.load_choice(answer(false));
        let effects = choice.handle_collision(&Clock::default(), &hit("Facemask", true));
        assert_eq!(effects[0], ChoiceEffect::Incorrect);
        assert!(effects
            .iter()
            .any(|e| matches!(e, ChoiceEffect::Impact { player, .. } if *player == ObjectRef(1))));
        assert!(effects
            .iter()
            .any(|e| matches!(e, ChoiceEffect::Explosion { .. })));
    }

    #[test]
    fn test_ignores_other_colliders() {
        let mut choice = ChoiceObject::new();
        choice.load_choice(answer(true));
        let clock = Clock::default();
        assert!(choice.handle_collision(&clock, &hit("GamePlayerObject", false)).is_empty());
        assert!(choice.handle_collision(&clock, &hit("Ball", true)).is_empty());
        let no_player = Collision {
            collider: "GamePlayerObject".to_string(),
            contact: None,
        };
        assert!(choice.handle_collision(&clock, &no_player).is_empty());
        assert_eq!(choice.asset_path().unwrap(), "Prefabs/LevelAssets/barrel-1");
    }
}
