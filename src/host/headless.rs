//! In-memory host implementations
//!
//! Used by the native demo binary (no engine attached) and by tests. They keep
//! enough state to answer the queries in the host traits and record what was
//! asked of them.

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::{Quat, Vec3};

use super::{
    AudioBackend, Container, EmitterId, Handle, MusicType, ObjectRef, ProfileStore,
    ResourceProvider, SceneGraph,
};

/// A live object in the headless scene
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub path: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub visible: bool,
    pub parent: Option<Container>,
}

/// Headless prefab store + scene graph
#[derive(Debug, Default)]
pub struct HeadlessWorld {
    /// Known prefab paths; empty with `allow_all` means everything resolves
    prefabs: HashSet<String>,
    allow_all: bool,
    handles: HashMap<Handle, String>,
    objects: BTreeMap<ObjectRef, SceneObject>,
    next_id: u64,
}

impl HeadlessWorld {
    /// A world where every prefab path resolves
    pub fn permissive() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    /// A world that only knows the given prefab paths
    pub fn with_prefabs<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefabs: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn object(&self, object: ObjectRef) -> Option<&SceneObject> {
        self.objects.get(&object)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl ResourceProvider for HeadlessWorld {
    fn load(&mut self, path: &str) -> Option<Handle> {
        if !self.allow_all && !self.prefabs.contains(path) {
            return None;
        }
        let handle = Handle(self.next_id());
        self.handles.insert(handle, path.to_string());
        Some(handle)
    }

    fn instantiate(&mut self, handle: Handle, position: Vec3, rotation: Quat) -> ObjectRef {
        let path = self.handles.get(&handle).cloned().unwrap_or_default();
        let object = ObjectRef(self.next_id());
        self.objects.insert(
            object,
            SceneObject {
                path,
                position,
                rotation,
                scale: Vec3::ONE,
                visible: true,
                parent: None,
            },
        );
        object
    }
}

impl SceneGraph for HeadlessWorld {
    fn attach(&mut self, object: ObjectRef, container: Container) {
        if let Some(obj) = self.objects.get_mut(&object) {
            obj.parent = Some(container);
        }
    }

    fn set_scale(&mut self, object: ObjectRef, scale: Vec3) {
        if let Some(obj) = self.objects.get_mut(&object) {
            obj.scale *= scale;
        }
    }

    fn set_visible(&mut self, object: ObjectRef, visible: bool) {
        if let Some(obj) = self.objects.get_mut(&object) {
            obj.visible = visible;
        }
    }

    fn is_visible(&self, object: ObjectRef) -> Option<bool> {
        self.objects.get(&object).map(|o| o.visible)
    }

    fn children(&self, container: Container) -> Vec<ObjectRef> {
        self.objects
            .iter()
            .filter(|(_, o)| o.parent == Some(container))
            .map(|(id, _)| *id)
            .collect()
    }

    fn clear(&mut self, container: Container) {
        self.objects.retain(|_, o| o.parent != Some(container));
    }
}

/// A headless emitter
#[derive(Debug, Clone)]
pub struct Emitter {
    pub code: String,
    pub looped: bool,
    pub playing: bool,
    pub volume: f32,
    pub clip_length: Option<f32>,
    pub tag: Option<MusicType>,
}

/// A one-shot effect that was fired
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedEffect {
    pub code: String,
    pub volume: f32,
    pub looped: bool,
}

/// Fade request bookkeeping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fade {
    In { emitter: EmitterId, volume: f32, seconds: f32 },
    Out { emitter: EmitterId, seconds: f32 },
}

/// Headless sound output. Fades complete instantly.
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    emitters: HashMap<EmitterId, Emitter>,
    clip_lengths: HashMap<String, f32>,
    next_id: u64,
    pub effects: Vec<PlayedEffect>,
    pub fades: Vec<Fade>,
}

impl HeadlessAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip length for a sound code
    pub fn with_clip(mut self, code: &str, seconds: f32) -> Self {
        self.clip_lengths.insert(code.to_string(), seconds);
        self
    }

    /// Place a level-embedded emitter tagged with a music type
    pub fn spawn_tagged(&mut self, music: MusicType, code: &str) -> EmitterId {
        let id = self.alloc(code, true);
        if let Some(e) = self.emitters.get_mut(&id) {
            e.tag = Some(music);
        }
        id
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.get(&id)
    }

    pub fn fade_in_count(&self) -> usize {
        self.fades
            .iter()
            .filter(|f| matches!(f, Fade::In { .. }))
            .count()
    }

    pub fn fade_out_count(&self) -> usize {
        self.fades
            .iter()
            .filter(|f| matches!(f, Fade::Out { .. }))
            .count()
    }

    fn alloc(&mut self, code: &str, looped: bool) -> EmitterId {
        self.next_id += 1;
        let id = EmitterId(self.next_id);
        self.emitters.insert(
            id,
            Emitter {
                code: code.to_string(),
                looped,
                playing: false,
                volume: 0.0,
                clip_length: self.clip_lengths.get(code).copied(),
                tag: None,
            },
        );
        id
    }
}

impl AudioBackend for HeadlessAudio {
    fn find_tagged(&self, music: MusicType) -> Option<EmitterId> {
        self.emitters
            .iter()
            .filter(|(_, e)| e.tag == Some(music))
            .map(|(id, _)| *id)
            .min_by_key(|id| id.0)
    }

    fn prepare(&mut self, code: &str, looped: bool) -> Option<EmitterId> {
        Some(self.alloc(code, looped))
    }

    fn is_playing(&self, emitter: EmitterId) -> bool {
        self.emitters.get(&emitter).is_some_and(|e| e.playing)
    }

    fn clip_length(&self, emitter: EmitterId) -> Option<f32> {
        self.emitters.get(&emitter).and_then(|e| e.clip_length)
    }

    fn fade_in(&mut self, emitter: EmitterId, volume: f32, seconds: f32) {
        if let Some(e) = self.emitters.get_mut(&emitter) {
            e.playing = true;
            e.volume = volume;
        }
        self.fades.push(Fade::In {
            emitter,
            volume,
            seconds,
        });
    }

    fn fade_out(&mut self, emitter: EmitterId, seconds: f32) {
        if let Some(e) = self.emitters.get_mut(&emitter) {
            e.playing = false;
            e.volume = 0.0;
        }
        self.fades.push(Fade::Out { emitter, seconds });
    }

    fn set_volume(&mut self, emitter: EmitterId, volume: f32) {
        if let Some(e) = self.emitters.get_mut(&emitter) {
            e.volume = volume;
        }
    }

    fn play_effect(&mut self, code: &str, volume: f32, looped: bool) {
        log::debug!("effect {} at volume {:.2}", code, volume);
        self.effects.push(PlayedEffect {
            code: code.to_string(),
            volume,
            looped,
        });
    }
}

/// Fixed profile volumes
#[derive(Debug, Clone, Copy)]
pub struct StaticProfile {
    pub effects: f32,
    pub music: f32,
}

impl Default for StaticProfile {
    fn default() -> Self {
        Self {
            effects: 1.0,
            music: 0.7,
        }
    }
}

impl ProfileStore for StaticProfile {
    fn effects_volume(&self) -> f32 {
        self.effects
    }

    fn music_volume(&self) -> f32 {
        self.music
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_unknown_prefab() {
        let mut world = HeadlessWorld::with_prefabs(["Prefabs/Characters/GameEnemyBot1"]);
        assert!(world.load("Prefabs/Characters/Nope").is_none());
        assert!(world.load("Prefabs/Characters/GameEnemyBot1").is_some());
    }

    #[test]
    fn test_world_clear_container() {
        let mut world = HeadlessWorld::permissive();
        let h = world.load("a").unwrap();
        let a = world.instantiate(h, Vec3::ZERO, Quat::IDENTITY);
        let b = world.instantiate(h, Vec3::ONE, Quat::IDENTITY);
        world.attach(a, Container::Actors);
        world.attach(b, Container::LevelItems);

        world.clear(Container::Actors);
        assert!(world.is_visible(a).is_none());
        assert_eq!(world.children(Container::LevelItems), vec![b]);
    }

    #[test]
    fn test_audio_fade_toggles_playing() {
        let mut audio = HeadlessAudio::new().with_clip("intro", 3.0);
        let id = audio.prepare("intro", false).unwrap();
        assert!(!audio.is_playing(id));
        assert_eq!(audio.clip_length(id), Some(3.0));

        audio.fade_in(id, 0.5, 2.0);
        assert!(audio.is_playing(id));
        audio.fade_out(id, 1.5);
        assert!(!audio.is_playing(id));
        assert_eq!(audio.fade_in_count(), 1);
        assert_eq!(audio.fade_out_count(), 1);
    }
}
