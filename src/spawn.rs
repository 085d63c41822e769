//! Actor and item spawning
//!
//! A spawn resolves a position from the current zone, instantiates the
//! prefab under the actors container and hides it. One frame later the
//! object is shown again and gets a HUD indicator. Clearing the container
//! bumps a generation counter so reveals still in flight are dropped.

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{
    ACTOR_ZONE_X, CHARACTER_PREFABS, ITEM_DROP_HEIGHT, ITEM_ZONE_X_MAX, ITEM_ZONE_X_MIN,
    LEVEL_ITEM_PREFABS, PLAYER_SPAWN_WINDOW, ZONE_DEPTH_HALF,
};
use crate::error::{Error, Result};
use crate::host::{BoundsProvider, Container, ObjectRef, World};
use crate::hud::HudState;
use crate::sim::{Clock, Scheduler, SpawnZone};
use crate::{resource_path, uniform};

/// Enemy actor to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    /// Prefab code under the characters prefix
    pub prefab_code: String,
    /// Character type, also the HUD indicator kind
    pub character_type: String,
    pub health: f32,
    /// Multiplies `scale` when the actor is placed
    pub difficulty: f32,
    pub scale: f32,
    pub speed: f32,
    pub attack: f32,
    pub defense: f32,
}

impl Default for ActorSpec {
    fn default() -> Self {
        Self {
            prefab_code: "GameEnemyBot1".to_string(),
            character_type: "bot1".to_string(),
            health: 1.0,
            difficulty: 1.0,
            scale: 1.0,
            speed: 1.0,
            attack: 1.0,
            defense: 1.0,
        }
    }
}

impl ActorSpec {
    pub fn prefab_path(&self) -> String {
        resource_path(CHARACTER_PREFABS, &self.prefab_code)
    }

    pub fn world_scale(&self) -> f32 {
        self.scale * self.difficulty
    }
}

/// Pickup item to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub prefab_code: String,
    pub item_code: String,
}

impl Default for ItemSpec {
    fn default() -> Self {
        Self {
            prefab_code: "GameItemCoin".to_string(),
            item_code: "coin".to_string(),
        }
    }
}

impl ItemSpec {
    pub fn prefab_path(&self) -> String {
        resource_path(LEVEL_ITEM_PREFABS, &self.prefab_code)
    }
}

/// Where the player is and what the play space looks like
#[derive(Clone, Copy)]
pub struct SpawnContext<'a> {
    /// `None` spawns around the player instead of in a zone
    pub zone: Option<SpawnZone>,
    pub player: Vec3,
    pub bounds: Option<&'a dyn BoundsProvider>,
}

#[derive(Debug, Clone, PartialEq)]
enum SpawnTask {
    Reveal {
        object: ObjectRef,
        indicator: String,
        generation: u64,
    },
}

#[derive(Debug)]
pub struct ActorSpawnSequencer {
    rng: Pcg32,
    generation: u64,
    scheduler: Scheduler<SpawnTask>,
    spawned: Vec<ObjectRef>,
}

impl ActorSpawnSequencer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            generation: 0,
            scheduler: Scheduler::new(),
            spawned: Vec::new(),
        }
    }

    /// Objects spawned since the last clear
    pub fn spawned(&self) -> &[ObjectRef] {
        &self.spawned
    }

    pub fn pending_reveals(&self) -> usize {
        self.scheduler.len()
    }

    /// Fixed lateral offset on the zone side, random depth
    pub fn actor_position(&mut self, ctx: &SpawnContext<'_>) -> Vec3 {
        match ctx.zone {
            Some(zone) => Vec3::new(
                zone.sign() * ACTOR_ZONE_X,
                0.0,
                uniform(&mut self.rng, -ZONE_DEPTH_HALF, ZONE_DEPTH_HALF),
            ),
            None => self.around_player(ctx),
        }
    }

    /// Random lateral band on the zone side, dropped from above
    pub fn item_position(&mut self, ctx: &SpawnContext<'_>) -> Vec3 {
        match ctx.zone {
            Some(zone) => Vec3::new(
                zone.sign() * uniform(&mut self.rng, ITEM_ZONE_X_MIN, ITEM_ZONE_X_MAX),
                ITEM_DROP_HEIGHT,
                uniform(&mut self.rng, -ZONE_DEPTH_HALF, ZONE_DEPTH_HALF),
            ),
            None => self.around_player(ctx),
        }
    }

    /// A window around the player with both corners clamped into the bounds
    fn around_player(&mut self, ctx: &SpawnContext<'_>) -> Vec3 {
        let Some(bounds) = ctx.bounds else {
            return Vec3::ZERO;
        };
        let half = Vec3::new(PLAYER_SPAWN_WINDOW, 0.0, PLAYER_SPAWN_WINDOW);
        let low = bounds.filter_bounds(ctx.player - half);
        let high = bounds.filter_bounds(ctx.player + half);
        Vec3::new(
            uniform(&mut self.rng, low.x, high.x),
            0.0,
            uniform(&mut self.rng, low.z, high.z),
        )
    }

    pub fn spawn_actor(
        &mut self,
        clock: &Clock,
        world: &mut dyn World,
        ctx: &SpawnContext<'_>,
        spec: &ActorSpec,
    ) -> Result<ObjectRef> {
        let position = self.actor_position(ctx);
        self.spawn(
            clock,
            world,
            &spec.prefab_path(),
            position,
            spec.world_scale(),
            &spec.character_type,
        )
    }

    pub fn spawn_item(
        &mut self,
        clock: &Clock,
        world: &mut dyn World,
        ctx: &SpawnContext<'_>,
        spec: &ItemSpec,
    ) -> Result<ObjectRef> {
        let position = self.item_position(ctx);
        self.spawn(clock, world, &spec.prefab_path(), position, 1.0, "pickup")
    }

    fn spawn(
        &mut self,
        clock: &Clock,
        world: &mut dyn World,
        path: &str,
        position: Vec3,
        scale: f32,
        indicator: &str,
    ) -> Result<ObjectRef> {
        let handle = world.load(path).ok_or_else(|| Error::MissingResource {
            path: path.to_string(),
        })?;

        let object = world.instantiate(handle, position, Quat::IDENTITY);
        world.attach(object, Container::Actors);
        world.set_scale(object, Vec3::splat(scale));
        world.set_visible(object, false);
        self.spawned.push(object);

        self.scheduler.next_frame(
            clock,
            SpawnTask::Reveal {
                object,
                indicator: indicator.to_string(),
                generation: self.generation,
            },
        );
        log::debug!("spawned {} at {:?}", path, position);
        Ok(object)
    }

    /// Reveal whatever waited a frame. Returns the revealed objects.
    pub fn tick(
        &mut self,
        clock: &Clock,
        world: &mut dyn World,
        hud: &mut HudState,
    ) -> Vec<ObjectRef> {
        let mut revealed = Vec::new();
        for task in self.scheduler.due(clock) {
            match task {
                SpawnTask::Reveal {
                    object,
                    indicator,
                    generation,
                } => {
                    if generation != self.generation || world.is_visible(object).is_none() {
                        log::trace!("dropping stale reveal for {:?}", object);
                        continue;
                    }
                    world.set_visible(object, true);
                    hud.add_indicator(object, &indicator);
                    revealed.push(object);
                }
            }
        }
        revealed
    }

    /// Destroy every spawned actor and item
    pub fn clear(&mut self, world: &mut dyn World, hud: &mut HudState) {
        self.generation += 1;
        self.scheduler.clear();
        self.spawned.clear();
        world.clear(Container::Actors);
        hud.clear_indicators();
    }
}
