//! Hit points for destructible props

use rand::Rng;
use serde::{Deserialize, Serialize};

/// What happened when damage landed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Already dead; nothing happens
    Ignored,
    Hit { sound: Option<String> },
    /// Hit points ran out: spawn the death effect, then destroy the object
    Dead {
        sound: Option<String>,
        effect: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReceiver {
    pub hp: i32,
    pub hit_sounds: Vec<String>,
    pub death_effect: Option<String>,
}

impl Default for DamageReceiver {
    fn default() -> Self {
        Self {
            hp: 100,
            hit_sounds: Vec::new(),
            death_effect: None,
        }
    }
}

impl DamageReceiver {
    pub fn new(hp: i32) -> Self {
        Self {
            hp,
            ..Self::default()
        }
    }

    pub fn apply_damage<R: Rng + ?Sized>(&mut self, damage: i32, rng: &mut R) -> DamageOutcome {
        if self.hp < 0 {
            return DamageOutcome::Ignored;
        }

        let sound = if self.hit_sounds.is_empty() {
            None
        } else {
            Some(self.hit_sounds[rng.random_range(0..self.hit_sounds.len())].clone())
        };

        self.hp -= damage;
        if self.hp <= 0 {
            log::debug!("destroyed at hp {}", self.hp);
            DamageOutcome::Dead {
                sound,
                effect: self.death_effect.clone(),
            }
        } else {
            DamageOutcome::Hit { sound }
        }
    }
}
