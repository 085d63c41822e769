//! Music channels and throttled sound effects
//!
//! Three music channels (UI intro, UI loop, game loop) with the UI pair and
//! the game channel kept mutually exclusive, plus catalog-driven one-shot
//! effects rate limited per sound code. All waits go through the scheduler,
//! so the sequencer has to be ticked with the session clock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::consts::{
    GAME_FADE_OUT, GAME_LOOP_FADE_IN, UI_FADE_OUT, UI_INTRO_FADE_IN, UI_LOOP_FADE_IN,
};
use crate::host::{AudioBackend, EmitterId, MusicType, ProfileStore};
use crate::sim::{Clock, Scheduler};

/// Effect sound types
pub mod sound_types {
    pub const SCORES: &str = "scores";
    pub const GOAL_RANGE_1: &str = "goal-range-1";
    pub const GOAL_RANGE_2: &str = "goal-range-2";
    pub const GOAL_RANGE_3: &str = "goal-range-3";
    pub const GOAL_RANGE_4: &str = "goal-range-4";
    pub const LEVEL_START: &str = "level-start";
    pub const LEVEL_END: &str = "level-end";
    pub const PLAYER_START: &str = "player-start";
    pub const PLAYER_END: &str = "player-end";
    pub const PLAYER_OUT_OF_BOUNDS: &str = "player-out-of-bounds";
    pub const PLAYER_ACTION_GOOD: &str = "player-action-good";
    pub const PLAYER_ACTION_BAD: &str = "player-action-bad";
}

/// One catalog sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundDef {
    pub code: String,
    pub sound_type: String,
    /// Minimum seconds between two plays of this code
    pub play_delay: f64,
    /// Multiplied into the profile effects volume
    pub modifier: f32,
    pub looped: bool,
}

impl SoundDef {
    pub fn new(sound_type: &str, code: &str) -> Self {
        Self {
            code: code.to_string(),
            sound_type: sound_type.to_string(),
            play_delay: 0.0,
            modifier: 1.0,
            looped: false,
        }
    }

    pub fn with_delay(mut self, play_delay: f64) -> Self {
        self.play_delay = play_delay;
        self
    }

    pub fn with_modifier(mut self, modifier: f32) -> Self {
        self.modifier = modifier;
        self
    }
}

/// Sounds known to the current world, grouped by type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoundCatalog {
    pub sounds: Vec<SoundDef>,
}

impl SoundCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Music for every slot plus one effect per effect type
    pub fn with_defaults() -> Self {
        use sound_types::*;

        let mut catalog = Self::new();
        for music in [MusicType::UiIntro, MusicType::UiLoop, MusicType::Game] {
            let ty = music.sound_type();
            let mut def = SoundDef::new(ty, ty);
            def.looped = music != MusicType::UiIntro;
            catalog.add(def);
        }
        catalog.add(SoundDef::new(SCORES, "effect-score").with_delay(0.5));
        for ty in [GOAL_RANGE_1, GOAL_RANGE_2, GOAL_RANGE_3, GOAL_RANGE_4] {
            catalog.add(SoundDef::new(ty, &format!("effect-{}", ty)).with_delay(1.0));
        }
        for ty in [
            LEVEL_START,
            LEVEL_END,
            PLAYER_START,
            PLAYER_END,
            PLAYER_OUT_OF_BOUNDS,
            PLAYER_ACTION_GOOD,
            PLAYER_ACTION_BAD,
        ] {
            catalog.add(SoundDef::new(ty, &format!("effect-{}", ty)).with_delay(2.0));
        }
        catalog
    }

    pub fn add(&mut self, sound: SoundDef) {
        if !self.sounds.contains(&sound) {
            self.sounds.push(sound);
        }
    }

    pub fn by_type<'a>(&'a self, sound_type: &'a str) -> impl Iterator<Item = &'a SoundDef> {
        self.sounds.iter().filter(move |s| s.sound_type == sound_type)
    }

    pub fn first(&self, sound_type: &str) -> Option<&SoundDef> {
        self.sounds.iter().find(|s| s.sound_type == sound_type)
    }
}

/// Current and previous emitter of a music slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Channel {
    pub current: Option<EmitterId>,
    pub last: Option<EmitterId>,
}

impl Channel {
    fn adopt(&mut self, emitter: EmitterId) {
        self.last = self.current;
        self.current = Some(emitter);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AudioTask {
    /// Intro finished; start the UI loop unless stopped since
    UiLoop { epoch: u64 },
    StopUi,
    StopGame,
}

pub struct AudioSequencer {
    backend: Box<dyn AudioBackend>,
    catalog: SoundCatalog,
    ui_intro: Channel,
    ui_loop: Channel,
    game_loop: Channel,
    /// Menus are up; music requests route to the UI channels
    ui_active: bool,
    /// Bumped by every UI stop; stale intro hand-offs compare against it
    ui_epoch: u64,
    ui_handoff_pending: bool,
    last_played: HashMap<String, f64>,
    clock: Clock,
    scheduler: Scheduler<AudioTask>,
}

impl std::fmt::Debug for AudioSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSequencer")
            .field("ui_intro", &self.ui_intro)
            .field("ui_loop", &self.ui_loop)
            .field("game_loop", &self.game_loop)
            .field("ui_active", &self.ui_active)
            .field("pending", &self.scheduler.len())
            .finish()
    }
}

impl AudioSequencer {
    pub fn new(backend: Box<dyn AudioBackend>, catalog: SoundCatalog) -> Self {
        Self {
            backend,
            catalog,
            ui_intro: Channel::default(),
            ui_loop: Channel::default(),
            game_loop: Channel::default(),
            ui_active: true,
            ui_epoch: 0,
            ui_handoff_pending: false,
            last_played: HashMap::new(),
            clock: Clock::default(),
            scheduler: Scheduler::new(),
        }
    }

    pub fn catalog(&self) -> &SoundCatalog {
        &self.catalog
    }

    pub fn ui_active(&self) -> bool {
        self.ui_active
    }

    pub fn set_ui_active(&mut self, active: bool) {
        self.ui_active = active;
    }

    pub fn channels(&self) -> [Channel; 3] {
        [self.ui_intro, self.ui_loop, self.game_loop]
    }

    /// Run due continuations. Call once per tick with the session clock.
    pub fn tick(&mut self, clock: &Clock, profile: &dyn ProfileStore) {
        self.clock = *clock;
        for task in self.scheduler.due(clock) {
            match task {
                AudioTask::UiLoop { epoch } => {
                    if epoch != self.ui_epoch {
                        log::trace!("stale ui loop hand-off");
                        continue;
                    }
                    self.ui_handoff_pending = false;
                    self.play_ui_music_loop(profile);
                }
                AudioTask::StopUi => {
                    self.stop_ui_music_intro();
                    self.stop_ui_music_loop();
                }
                AudioTask::StopGame => self.stop_game_music_loop(),
            }
        }
    }

    pub fn is_ui_music_playing(&self) -> bool {
        self.ui_handoff_pending
            || self.is_current_playing(self.ui_intro)
            || self.is_current_playing(self.ui_loop)
    }

    pub fn is_game_music_playing(&self) -> bool {
        self.is_current_playing(self.game_loop)
    }

    fn is_current_playing(&self, channel: Channel) -> bool {
        channel
            .current
            .is_some_and(|id| self.backend.is_playing(id))
    }

    pub fn play_music(&mut self, profile: &dyn ProfileStore) {
        if self.ui_active {
            self.play_ui_music(profile);
        } else {
            self.play_game_music_loop(profile);
        }
    }

    /// Intro, then the loop once the intro clip has run its length
    pub fn play_ui_music(&mut self, profile: &dyn ProfileStore) {
        if self.is_ui_music_playing() {
            log::trace!("ui music already playing");
            return;
        }
        if self.is_game_music_playing() {
            self.stop_game_music();
        }
        if !self.ui_active {
            return;
        }

        let wait = self
            .play_ui_music_intro(profile)
            .and_then(|id| self.backend.clip_length(id))
            .unwrap_or(0.0);
        self.ui_handoff_pending = true;
        self.scheduler.after(
            &self.clock,
            wait as f64,
            AudioTask::UiLoop {
                epoch: self.ui_epoch,
            },
        );
    }

    pub fn stop_ui_music(&mut self) {
        if !self.is_ui_music_playing() {
            log::trace!("ui music not playing");
            return;
        }
        self.ui_epoch += 1;
        self.ui_handoff_pending = false;
        self.scheduler.next_frame(&self.clock, AudioTask::StopUi);
    }

    pub fn play_game_music(&mut self, profile: &dyn ProfileStore) {
        if self.is_game_music_playing() {
            return;
        }
        if self.is_ui_music_playing() {
            self.stop_ui_music();
        }
        if self.ui_active {
            return;
        }
        self.play_game_music_loop(profile);
    }

    pub fn stop_game_music(&mut self) {
        if !self.is_game_music_playing() {
            log::trace!("game music not playing");
            return;
        }
        self.scheduler.next_frame(&self.clock, AudioTask::StopGame);
    }

    fn play_ui_music_intro(&mut self, profile: &dyn ProfileStore) -> Option<EmitterId> {
        let id = self.resolve(MusicType::UiIntro)?;
        self.backend
            .fade_in(id, profile.music_volume(), UI_INTRO_FADE_IN);
        Some(id)
    }

    fn play_ui_music_loop(&mut self, profile: &dyn ProfileStore) {
        if !self.ui_active {
            return;
        }
        if let Some(id) = self.resolve(MusicType::UiLoop) {
            self.backend
                .fade_in(id, profile.music_volume(), UI_LOOP_FADE_IN);
        }
    }

    /// Start the game loop, silencing the UI channels first
    pub fn play_game_music_loop(&mut self, profile: &dyn ProfileStore) {
        if self.ui_active || self.is_game_music_playing() {
            return;
        }
        if self.is_ui_music_playing() {
            self.stop_ui_music();
        }
        if let Some(id) = self.resolve(MusicType::Game) {
            self.backend
                .fade_in(id, profile.music_volume(), GAME_LOOP_FADE_IN);
        }
    }

    fn stop_ui_music_intro(&mut self) {
        if let Some(id) = self.ui_intro.current.filter(|id| self.backend.is_playing(*id)) {
            self.backend.fade_out(id, UI_FADE_OUT);
        }
    }

    fn stop_ui_music_loop(&mut self) {
        if let Some(id) = self.ui_loop.current.filter(|id| self.backend.is_playing(*id)) {
            self.backend.fade_out(id, UI_FADE_OUT);
        }
    }

    fn stop_game_music_loop(&mut self) {
        if let Some(id) = self.game_loop.current.filter(|id| self.backend.is_playing(*id)) {
            self.backend.fade_out(id, GAME_FADE_OUT);
        }
    }

    /// Level-embedded emitter tagged for this slot, else a fresh one from the
    /// catalog. Keeps the current emitter when neither exists.
    fn resolve(&mut self, music: MusicType) -> Option<EmitterId> {
        let found = match self.backend.find_tagged(music) {
            Some(id) => Some(id),
            None => self
                .catalog
                .first(music.sound_type())
                .cloned()
                .and_then(|sound| self.backend.prepare(&sound.code, sound.looped)),
        };

        let channel = match music {
            MusicType::UiIntro => &mut self.ui_intro,
            MusicType::UiLoop => &mut self.ui_loop,
            MusicType::Game => &mut self.game_loop,
        };
        if let Some(id) = found {
            if channel.current != Some(id) {
                channel.adopt(id);
            }
        }
        channel.current
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.set_volume_game(volume);
        self.set_volume_ui(volume);
    }

    pub fn set_volume_game(&mut self, volume: f32) {
        if let Some(id) = self.game_loop.current {
            self.backend.set_volume(id, volume);
        }
    }

    pub fn set_volume_ui(&mut self, volume: f32) {
        for id in [self.ui_loop.current, self.ui_intro.current].into_iter().flatten() {
            self.backend.set_volume(id, volume);
        }
    }

    /// Play every catalog sound of a type that is off cooldown.
    /// Returns how many fired.
    pub fn play_sound_type(&mut self, sound_type: &str, profile: &dyn ProfileStore) -> usize {
        let now = self.clock.time;
        let mut fired = 0;
        for sound in self.catalog.by_type(sound_type) {
            let ready = match self.last_played.get(&sound.code) {
                None => true,
                Some(last) => now >= last + sound.play_delay,
            };
            if !ready {
                continue;
            }
            self.backend.play_effect(
                &sound.code,
                profile.effects_volume() * sound.modifier,
                sound.looped,
            );
            self.last_played.insert(sound.code.clone(), now);
            fired += 1;
        }
        fired
    }

    pub fn play_sound_scores(&mut self, profile: &dyn ProfileStore) {
        self.play_sound_type(sound_types::SCORES, profile);
    }

    /// Goal range 1 to 4; anything else is ignored
    pub fn play_sound_goal_range(&mut self, range: u8, profile: &dyn ProfileStore) {
        let ty = match range {
            1 => sound_types::GOAL_RANGE_1,
            2 => sound_types::GOAL_RANGE_2,
            3 => sound_types::GOAL_RANGE_3,
            4 => sound_types::GOAL_RANGE_4,
            _ => return,
        };
        self.play_sound_type(ty, profile);
    }

    pub fn play_sound_level_start(&mut self, profile: &dyn ProfileStore) {
        self.play_sound_type(sound_types::LEVEL_START, profile);
    }

    pub fn play_sound_level_end(&mut self, profile: &dyn ProfileStore) {
        self.play_sound_type(sound_types::LEVEL_END, profile);
    }

    pub fn play_sound_player_start(&mut self, profile: &dyn ProfileStore) {
        self.play_sound_type(sound_types::PLAYER_START, profile);
    }

    pub fn play_sound_player_end(&mut self, profile: &dyn ProfileStore) {
        self.play_sound_type(sound_types::PLAYER_END, profile);
    }

    pub fn play_sound_player_out_of_bounds(&mut self, profile: &dyn ProfileStore) {
        self.play_sound_type(sound_types::PLAYER_OUT_OF_BOUNDS, profile);
    }

    pub fn play_sound_player_action_good(&mut self, profile: &dyn ProfileStore) {
        self.play_sound_type(sound_types::PLAYER_ACTION_GOOD, profile);
    }

    pub fn play_sound_player_action_bad(&mut self, profile: &dyn ProfileStore) {
        self.play_sound_type(sound_types::PLAYER_ACTION_BAD, profile);
    }
}
