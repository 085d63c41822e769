//! Engine collaborator interfaces
//!
//! The session never renders, simulates physics or loads files on its own.
//! It talks to the host engine through these traits. `headless` provides
//! in-memory implementations for the demo binary and tests.

pub mod headless;

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

pub use headless::{HeadlessAudio, HeadlessWorld, StaticProfile};

/// Loaded prefab handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(pub u64);

/// Live scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef(pub u64);

/// Live sound-emitting object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmitterId(pub u64);

/// Scene containers the session parents objects under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Container {
    /// Spawned enemies and pickups
    Actors,
    /// Placed level decoration
    LevelItems,
}

/// Music slot tags; level-embedded emitters carry one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MusicType {
    UiIntro,
    UiLoop,
    Game,
}

impl MusicType {
    /// Catalog sound type for this slot
    pub fn sound_type(&self) -> &'static str {
        match self {
            MusicType::UiIntro => "music-ui-intro",
            MusicType::UiLoop => "music-ui-loop",
            MusicType::Game => "music-game",
        }
    }
}

/// Prefab store
pub trait ResourceProvider {
    /// Resolve a prefab path; `None` when the asset does not exist
    fn load(&mut self, path: &str) -> Option<Handle>;

    /// Create a live object from a loaded prefab
    fn instantiate(&mut self, handle: Handle, position: Vec3, rotation: Quat) -> ObjectRef;
}

/// The engine's scene graph, as far as the session needs it
pub trait SceneGraph {
    fn attach(&mut self, object: ObjectRef, container: Container);

    /// Multiply the object's local scale
    fn set_scale(&mut self, object: ObjectRef, scale: Vec3);

    fn set_visible(&mut self, object: ObjectRef, visible: bool);

    /// `None` for objects that no longer exist
    fn is_visible(&self, object: ObjectRef) -> Option<bool>;

    fn children(&self, container: Container) -> Vec<ObjectRef>;

    /// Destroy every child of a container
    fn clear(&mut self, container: Container);
}

/// Everything the spawner and session need from the world
pub trait World: ResourceProvider + SceneGraph {}

impl<T: ResourceProvider + SceneGraph> World for T {}

/// Sound output
pub trait AudioBackend {
    /// Find an already spawned emitter tagged with this music type
    fn find_tagged(&self, music: MusicType) -> Option<EmitterId>;

    /// Create a fresh emitter for a sound code, silent until faded in
    fn prepare(&mut self, code: &str, looped: bool) -> Option<EmitterId>;

    fn is_playing(&self, emitter: EmitterId) -> bool;

    /// Clip length in seconds; `None` when the emitter has no clip
    fn clip_length(&self, emitter: EmitterId) -> Option<f32>;

    fn fade_in(&mut self, emitter: EmitterId, volume: f32, seconds: f32);

    fn fade_out(&mut self, emitter: EmitterId, seconds: f32);

    fn set_volume(&mut self, emitter: EmitterId, volume: f32);

    /// Fire-and-forget one-shot effect
    fn play_effect(&mut self, code: &str, volume: f32, looped: bool);
}

/// Player profile preferences
pub trait ProfileStore {
    fn effects_volume(&self) -> f32;
    fn music_volume(&self) -> f32;
}

/// Progress/stat bookkeeping
pub trait StatsTracker {
    /// Add `value` to a running total
    fn set_stat_total(&mut self, code: &str, value: f64);

    /// Keep `value` if it beats the stored high
    fn set_stat_high(&mut self, code: &str, value: f64);

    /// Level progress markers
    fn start_level(&mut self, _level_code: &str) {}
    fn end_level(&mut self, _level_code: &str) {}

    fn total(&self, code: &str) -> Option<f64>;
    fn high(&self, code: &str) -> Option<f64>;
}

/// Play-space bounds checks
pub trait BoundsProvider {
    fn check_bounds(&self, point: Vec3) -> bool;

    /// Clamp a point into the play space
    fn filter_bounds(&self, point: Vec3) -> Vec3;
}

// Shared handles, so a caller can keep inspecting a collaborator it handed over

impl<T: ResourceProvider> ResourceProvider for Rc<RefCell<T>> {
    fn load(&mut self, path: &str) -> Option<Handle> {
        self.borrow_mut().load(path)
    }

    fn instantiate(&mut self, handle: Handle, position: Vec3, rotation: Quat) -> ObjectRef {
        self.borrow_mut().instantiate(handle, position, rotation)
    }
}

impl<T: SceneGraph> SceneGraph for Rc<RefCell<T>> {
    fn attach(&mut self, object: ObjectRef, container: Container) {
        self.borrow_mut().attach(object, container)
    }

    fn set_scale(&mut self, object: ObjectRef, scale: Vec3) {
        self.borrow_mut().set_scale(object, scale)
    }

    fn set_visible(&mut self, object: ObjectRef, visible: bool) {
        self.borrow_mut().set_visible(object, visible)
    }

    fn is_visible(&self, object: ObjectRef) -> Option<bool> {
        self.borrow().is_visible(object)
    }

    fn children(&self, container: Container) -> Vec<ObjectRef> {
        self.borrow().children(container)
    }

    fn clear(&mut self, container: Container) {
        self.borrow_mut().clear(container)
    }
}

impl<T: AudioBackend> AudioBackend for Rc<RefCell<T>> {
    fn find_tagged(&self, music: MusicType) -> Option<EmitterId> {
        self.borrow().find_tagged(music)
    }

    fn prepare(&mut self, code: &str, looped: bool) -> Option<EmitterId> {
        self.borrow_mut().prepare(code, looped)
    }

    fn is_playing(&self, emitter: EmitterId) -> bool {
        self.borrow().is_playing(emitter)
    }

    fn clip_length(&self, emitter: EmitterId) -> Option<f32> {
        self.borrow().clip_length(emitter)
    }

    fn fade_in(&mut self, emitter: EmitterId, volume: f32, seconds: f32) {
        self.borrow_mut().fade_in(emitter, volume, seconds)
    }

    fn fade_out(&mut self, emitter: EmitterId, seconds: f32) {
        self.borrow_mut().fade_out(emitter, seconds)
    }

    fn set_volume(&mut self, emitter: EmitterId, volume: f32) {
        self.borrow_mut().set_volume(emitter, volume)
    }

    fn play_effect(&mut self, code: &str, volume: f32, looped: bool) {
        self.borrow_mut().play_effect(code, volume, looped)
    }
}

impl<T: StatsTracker> StatsTracker for Rc<RefCell<T>> {
    fn set_stat_total(&mut self, code: &str, value: f64) {
        self.borrow_mut().set_stat_total(code, value)
    }

    fn set_stat_high(&mut self, code: &str, value: f64) {
        self.borrow_mut().set_stat_high(code, value)
    }

    fn start_level(&mut self, level_code: &str) {
        self.borrow_mut().start_level(level_code)
    }

    fn end_level(&mut self, level_code: &str) {
        self.borrow_mut().end_level(level_code)
    }

    fn total(&self, code: &str) -> Option<f64> {
        self.borrow().total(code)
    }

    fn high(&self, code: &str) -> Option<f64> {
        self.borrow().high(code)
    }
}
