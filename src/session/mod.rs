//! Session state machine
//!
//! `Session` owns every gameplay component and the collaborators handed to it
//! at construction. The host calls `tick` once per frame and forwards input
//! (pause, scores, out-of-bounds, ...) through the lifecycle methods.
//!
//! Module layout:
//! - `lifecycle`: the `SessionLifecycle` trait and its implementation
//! - `handlers`: state entry handlers and delayed continuations

mod handlers;
mod lifecycle;

pub use lifecycle::SessionLifecycle;

use std::collections::VecDeque;

use glam::Vec3;

use crate::audio::{AudioSequencer, SoundCatalog};
use crate::camera::{CameraDirector, CameraMove, CameraView};
use crate::choice::{ChoiceData, ChoiceEffect, ChoiceObject, Collision};
use crate::consts::LEVEL_ASSET_PREFABS;
use crate::error::Error;
use crate::events::{EventBus, GameEvent};
use crate::host::{
    BoundsProvider, Container, HeadlessAudio, HeadlessWorld, ObjectRef, ProfileStore,
    StaticProfile, StatsTracker, World,
};
use crate::hud::HudState;
use crate::level::{GameBounds, GridData, LevelAssetPlacer, PlacementRule};
use crate::roster::CharacterRoster;
use crate::settings::SessionTuning;
use crate::sim::{
    Clock, ContentDisplay, PlayerRuntimeData, RunningState, RuntimeSessionData, Scheduler,
    SessionState, SpawnZone,
};
use crate::spawn::{ActorSpawnSequencer, ActorSpec, ItemSpec, SpawnContext};
use crate::stats::LevelStats;
use crate::resource_path;

/// Collaborators injected into a session
pub struct Services {
    pub world: Box<dyn World>,
    pub profile: Box<dyn ProfileStore>,
    pub stats: Box<dyn StatsTracker>,
    /// Play space; `None` in editor/degenerate levels
    pub bounds: Option<GameBounds>,
}

impl Services {
    /// In-memory collaborators for the demo binary
    pub fn headless(bounds: Option<GameBounds>) -> Self {
        Self {
            world: Box::new(HeadlessWorld::permissive()),
            profile: Box::new(StaticProfile::default()),
            stats: Box::new(LevelStats::new()),
            bounds,
        }
    }
}

/// Delayed session continuations. `run` is the run generation at scheduling
/// time; a reset in between makes the task stale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SessionTask {
    RunDirectors { run: u64 },
    Results { run: u64 },
    OutOfBoundsExpired { run: u64 },
    GoalZoneChange { run: u64 },
    StatsTotal { run: u64 },
    StatsHigh { run: u64 },
    StatsEnd { run: u64 },
    StatsAdvance { run: u64 },
    ShowResults { run: u64 },
}

impl SessionTask {
    fn run(&self) -> u64 {
        match *self {
            SessionTask::RunDirectors { run }
            | SessionTask::Results { run }
            | SessionTask::OutOfBoundsExpired { run }
            | SessionTask::GoalZoneChange { run }
            | SessionTask::StatsTotal { run }
            | SessionTask::StatsHigh { run }
            | SessionTask::StatsEnd { run }
            | SessionTask::StatsAdvance { run }
            | SessionTask::ShowResults { run } => run,
        }
    }
}

pub struct Session {
    services: Services,
    bus: EventBus,
    audio: AudioSequencer,
    spawner: ActorSpawnSequencer,
    placer: LevelAssetPlacer,
    camera: CameraDirector,
    roster: CharacterRoster,
    choices: Vec<ChoiceObject>,
    hud: HudState,
    tuning: SessionTuning,
    grid: GridData,
    rules: Vec<PlacementRule>,

    state: SessionState,
    running: RunningState,
    time_scale: f64,
    content: ContentDisplay,
    runtime: RuntimeSessionData,
    player: PlayerRuntimeData,
    player_position: Vec3,
    zone: SpawnZone,
    directors_running: bool,
    /// One-shot game over latch
    game_over: bool,
    /// Results panel is on its way
    advancing: bool,
    /// Run generation, bumped by every reset
    run: u64,

    clock: Clock,
    frame_delta: f64,
    scheduler: Scheduler<SessionTask>,
    in_transition: bool,
    queued_states: VecDeque<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("running", &self.running)
            .field("time_scale", &self.time_scale)
            .field("zone", &self.zone)
            .field("run", &self.run)
            .field("clock", &self.clock)
            .finish()
    }
}

impl Session {
    pub fn new(services: Services, audio: AudioSequencer, tuning: SessionTuning) -> Self {
        let placer = LevelAssetPlacer::new(tuning.seed).with_fill(tuning.grid_fill());
        let runtime = RuntimeSessionData::new(tuning.default_level_time);
        Self {
            services,
            bus: EventBus::new(),
            audio,
            // Offset so spawns and layout draw from different streams
            spawner: ActorSpawnSequencer::new(tuning.seed.wrapping_add(1)),
            placer,
            camera: CameraDirector::new(),
            roster: CharacterRoster::new(),
            choices: Vec::new(),
            hud: HudState::new(),
            grid: GridData::default(),
            rules: PlacementRule::level_defaults(),
            tuning,

            state: SessionState::NotStarted,
            running: RunningState::Stopped,
            time_scale: 1.0,
            content: ContentDisplay::Default,
            runtime,
            player: PlayerRuntimeData::default(),
            player_position: Vec3::ZERO,
            zone: SpawnZone::Right,
            directors_running: false,
            game_over: false,
            advancing: false,
            run: 0,

            clock: Clock::default(),
            frame_delta: 0.0,
            scheduler: Scheduler::new(),
            in_transition: false,
            queued_states: VecDeque::new(),
        }
    }

    /// A session wired to in-memory collaborators
    pub fn headless(tuning: SessionTuning, bounds: Option<GameBounds>) -> Self {
        let audio = AudioSequencer::new(
            Box::new(HeadlessAudio::new()),
            SoundCatalog::with_defaults(),
        );
        Self::new(Services::headless(bounds), audio, tuning)
    }

    // === Accessors ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn running_state(&self) -> RunningState {
        self.running
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn is_game_running(&self) -> bool {
        self.state == SessionState::Started
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn content(&self) -> ContentDisplay {
        self.content
    }

    pub fn runtime(&self) -> &RuntimeSessionData {
        &self.runtime
    }

    pub fn player(&self) -> &PlayerRuntimeData {
        &self.player
    }

    pub fn zone(&self) -> SpawnZone {
        self.zone
    }

    pub fn directors_running(&self) -> bool {
        self.directors_running
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    pub fn camera_view(&self) -> CameraView {
        self.camera.current()
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn tuning(&self) -> &SessionTuning {
        &self.tuning
    }

    pub fn audio(&self) -> &AudioSequencer {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioSequencer {
        &mut self.audio
    }

    pub fn placer(&self) -> &LevelAssetPlacer {
        &self.placer
    }

    pub fn stats(&self) -> &dyn StatsTracker {
        &*self.services.stats
    }

    pub fn world(&self) -> &dyn World {
        &*self.services.world
    }

    /// Subscribe/unsubscribe through here
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn choices(&self) -> &[ChoiceObject] {
        &self.choices
    }

    /// Pending delayed Results transitions
    pub fn pending_results(&self) -> usize {
        self.scheduler
            .count(|t| matches!(t, SessionTask::Results { .. }))
    }

    // === Configuration ===

    pub fn set_grid(&mut self, grid: GridData) {
        self.grid = grid;
    }

    pub fn set_rules(&mut self, rules: Vec<PlacementRule>) {
        self.rules = rules;
    }

    pub fn set_bounds(&mut self, bounds: Option<GameBounds>) {
        self.services.bounds = bounds;
    }

    pub fn set_player_health(&mut self, health: f32) {
        self.player.health = health;
    }

    pub fn set_player_position(&mut self, position: Vec3) {
        self.player_position = position;
    }

    /// Whether a point lies inside the play space; always true without bounds
    pub fn check_bounds(&self, point: Vec3) -> bool {
        self.services
            .bounds
            .as_ref()
            .is_none_or(|b| b.check_bounds(point))
    }

    // === Level ===

    /// Lay out a level and enter Prepare. Returns how many assets were placed.
    pub fn load_level(&mut self, code: &str) -> usize {
        self.reset();
        self.runtime.level_code = code.to_string();
        self.services.world.clear(Container::LevelItems);

        self.placer.set_bounds(self.services.bounds);
        self.placer.randomize_grid(&self.grid);
        self.placer.randomize_rules(&self.rules);

        let world = &mut self.services.world;
        let mut placed = 0;
        for asset in self.placer.placed() {
            let path = resource_path(LEVEL_ASSET_PREFABS, &asset.asset_code);
            let Some(handle) = world.load(&path) else {
                log::debug!("{}", Error::MissingResource { path });
                continue;
            };
            for step in &asset.steps {
                let object = world.instantiate(handle, step.position, step.rotation_quat());
                world.attach(object, Container::LevelItems);
                world.set_scale(object, step.scale);
            }
            placed += 1;
        }

        log::info!(
            "level {} loaded: {} of {} assets placed",
            code,
            placed,
            self.placer.placed().len()
        );
        self.bus.publish(GameEvent::LevelLoaded {
            code: code.to_string(),
            placed,
        });
        self.prepare_game();
        placed
    }

    // === Player ===

    /// Ignored unless a run is active
    pub fn player_scores(&mut self, value: f64) {
        if !self.is_game_running() {
            return;
        }
        self.runtime.score += value;
        self.player.score += value;
        self.bus.publish(GameEvent::Scored(value));
        self.audio.play_sound_scores(&*self.services.profile);
    }

    pub fn player_collects_coins(&mut self, value: f64) {
        if !self.is_game_running() {
            return;
        }
        self.runtime.coins += value;
        self.bus.publish(GameEvent::CoinsCollected(value));
        self.audio
            .play_sound_player_action_good(&*self.services.profile);
    }

    /// Show the out-of-bounds dialog; the run ends unless it is dismissed in time
    pub fn player_out_of_bounds(&mut self) {
        if !self.is_game_running() {
            return;
        }
        self.audio
            .play_sound_player_out_of_bounds(&*self.services.profile);
        self.content_display(ContentDisplay::PlayerOutOfBounds);
    }

    // === Goal zone ===

    pub fn goal_zone_change(&mut self) {
        let zone = self.zone.opposite();
        self.set_zone(zone);
    }

    pub fn goal_zone_change_to(&mut self, zone: SpawnZone) {
        if zone != self.zone {
            self.set_zone(zone);
        }
    }

    pub fn goal_zone_change_delayed(&mut self, delay: f64) {
        let clock = self.clock;
        self.scheduler
            .after(&clock, delay, SessionTask::GoalZoneChange { run: self.run });
    }

    fn set_zone(&mut self, zone: SpawnZone) {
        log::debug!("goal zone {:?} -> {:?}", self.zone, zone);
        self.zone = zone;
        self.bus.publish(GameEvent::GoalZoneChanged(zone));
    }

    // === Camera ===

    pub fn cycle_camera_view(&mut self) -> CameraMove {
        let camera_move = self.camera.cycle();
        self.bus.publish(GameEvent::CameraChanged(camera_move.view));
        camera_move
    }

    pub fn change_camera_view(&mut self, view: CameraView) -> Option<CameraMove> {
        let camera_move = self.camera.change(view)?;
        self.bus.publish(GameEvent::CameraChanged(view));
        Some(camera_move)
    }

    // === Characters ===

    pub fn load_character_types<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roster.load(codes);
    }

    pub fn current_character(&self) -> Option<&str> {
        self.roster.current()
    }

    pub fn cycle_character_next(&mut self) -> Option<String> {
        self.roster.next().map(str::to_string)
    }

    pub fn cycle_character_previous(&mut self) -> Option<String> {
        self.roster.previous().map(str::to_string)
    }

    // === Spawning ===

    /// `None` when the prefab is missing; nothing is left behind in that case
    pub fn spawn_actor(&mut self, spec: &ActorSpec) -> Option<ObjectRef> {
        let ctx = spawn_context(
            &self.tuning,
            self.zone,
            self.player_position,
            &self.services.bounds,
        );
        match self
            .spawner
            .spawn_actor(&self.clock, &mut *self.services.world, &ctx, spec)
        {
            Ok(object) => {
                self.bus.publish(GameEvent::ActorSpawned {
                    object,
                    kind: spec.character_type.clone(),
                });
                Some(object)
            }
            Err(e) => {
                log::debug!("actor spawn aborted: {}", e);
                None
            }
        }
    }

    pub fn spawn_item(&mut self, spec: &ItemSpec) -> Option<ObjectRef> {
        let ctx = spawn_context(
            &self.tuning,
            self.zone,
            self.player_position,
            &self.services.bounds,
        );
        match self
            .spawner
            .spawn_item(&self.clock, &mut *self.services.world, &ctx, spec)
        {
            Ok(object) => {
                self.bus.publish(GameEvent::ActorSpawned {
                    object,
                    kind: spec.item_code.clone(),
                });
                Some(object)
            }
            Err(e) => {
                log::debug!("item spawn aborted: {}", e);
                None
            }
        }
    }

    pub fn spawned(&self) -> &[ObjectRef] {
        self.spawner.spawned()
    }

    // === Choices ===

    /// Register a choice object; returns its index
    pub fn add_choice(&mut self, data: ChoiceData) -> usize {
        let mut choice = ChoiceObject::new();
        choice.load_choice(data);
        self.choices.push(choice);
        self.choices.len() - 1
    }

    /// Route a collision to a choice object and play its answer sound
    pub fn choice_collision(
        &mut self,
        index: usize,
        collision: &Collision,
    ) -> Vec<ChoiceEffect> {
        let clock = self.clock;
        let Some(choice) = self.choices.get_mut(index) else {
            return Vec::new();
        };
        let effects = choice.handle_collision(&clock, collision);
        for effect in &effects {
            match effect {
                ChoiceEffect::Correct => self
                    .audio
                    .play_sound_player_action_good(&*self.services.profile),
                ChoiceEffect::Incorrect => self
                    .audio
                    .play_sound_player_action_bad(&*self.services.profile),
                _ => {}
            }
        }
        effects
    }

    // === Frame ===

    /// Advance one frame by `dt` real seconds
    pub fn tick(&mut self, dt: f64) {
        self.clock.advance(dt, self.time_scale);
        self.frame_delta = dt * self.time_scale;
        let clock = self.clock;

        self.audio.tick(&clock, &*self.services.profile);
        self.spawner
            .tick(&clock, &mut *self.services.world, &mut self.hud);
        for choice in &mut self.choices {
            choice.tick(&clock, &mut self.bus);
        }

        for task in self.scheduler.due(&clock) {
            if task.run() != self.run {
                log::trace!("dropping stale {:?}", task);
                continue;
            }
            self.run_task(task);
        }

        if self.state == SessionState::Started {
            self.check_for_game_over();
            if !self.game_over {
                self.runtime.subtract_time(self.frame_delta);
            }
        }
    }
}

/// Spawn context built from disjoint session fields, so the world can be
/// borrowed mutably alongside it
fn spawn_context<'a>(
    tuning: &SessionTuning,
    zone: SpawnZone,
    player: Vec3,
    bounds: &'a Option<GameBounds>,
) -> SpawnContext<'a> {
    SpawnContext {
        zone: tuning.zoned_spawns.then_some(zone),
        player,
        bounds: bounds.as_ref().map(|b| b as &dyn BoundsProvider),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::choice::PlayerContact;
    use crate::events::Topic;
    use crate::host::SceneGraph;
    use crate::sim::GameMode;
    use crate::stats::codes;

    const DT: f64 = 1.0 / 60.0;

    struct Rig {
        session: Session,
        world: Rc<RefCell<HeadlessWorld>>,
        stats: Rc<RefCell<LevelStats>>,
        audio: Rc<RefCell<HeadlessAudio>>,
    }

    fn field() -> GameBounds {
        GameBounds::new(Vec3::new(-100.0, 0.0, -50.0), Vec3::new(100.0, 40.0, 50.0))
    }

    fn rig_with(tuning: SessionTuning, world: HeadlessWorld) -> Rig {
        let world = Rc::new(RefCell::new(world));
        let stats = Rc::new(RefCell::new(LevelStats::new()));
        let audio = Rc::new(RefCell::new(HeadlessAudio::new()));
        let services = Services {
            world: Box::new(world.clone()),
            profile: Box::new(StaticProfile::default()),
            stats: Box::new(stats.clone()),
            bounds: Some(field()),
        };
        let sequencer = AudioSequencer::new(Box::new(audio.clone()), SoundCatalog::with_defaults());
        Rig {
            session: Session::new(services, sequencer, tuning),
            world,
            stats,
            audio,
        }
    }

    fn rig(tuning: SessionTuning) -> Rig {
        rig_with(tuning, HeadlessWorld::permissive())
    }

    /// Tick for at least `seconds` of unscaled time
    fn run_for(session: &mut Session, seconds: f64) {
        let ticks = (seconds / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            session.tick(DT);
        }
    }

    fn record(session: &mut Session, topic: Topic) -> Rc<RefCell<Vec<GameEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session
            .bus_mut()
            .subscribe(topic, move |e| sink.borrow_mut().push(e.clone()));
        seen
    }

    #[test]
    fn test_pause_resume_restores_running() {
        let mut r = rig(SessionTuning::default());
        r.session.load_level("level-1");
        assert_eq!(r.session.state(), SessionState::Started);
        assert_eq!(r.session.running_state(), RunningState::Running);

        r.session.pause_game();
        assert_eq!(r.session.state(), SessionState::Pause);
        assert_eq!(r.session.running_state(), RunningState::Paused);
        assert_eq!(r.session.time_scale(), 0.0);
        assert!(r.session.hud().pause_menu_visible);

        // Second pause is redundant, clock is frozen
        r.session.pause_game();
        let frozen = r.session.clock().time;
        r.session.tick(DT);
        assert_eq!(r.session.clock().time, frozen);
        assert_eq!(r.session.state(), SessionState::Pause);

        r.session.resume_game();
        assert_eq!(r.session.state(), SessionState::Started);
        assert_eq!(r.session.running_state(), RunningState::Running);
        assert_eq!(r.session.time_scale(), 1.0);
        assert!(r.session.hud().hud_visible);
        assert!(!r.session.hud().pause_menu_visible);

        r.session.toggle_pause();
        assert_eq!(r.session.state(), SessionState::Pause);
        r.session.toggle_pause();
        assert_eq!(r.session.state(), SessionState::Started);
    }

    #[test]
    fn test_game_over_latch_schedules_one_results() {
        let mut r = rig(SessionTuning::default());
        r.session.load_level("level-1");
        r.session.set_player_health(0.0);

        for _ in 0..10 {
            r.session.check_for_game_over();
        }
        r.session.tick(DT);
        assert!(r.session.is_game_over());
        assert_eq!(r.session.pending_results(), 1);

        run_for(&mut r.session, 0.5);
        assert_eq!(r.session.state(), SessionState::Results);
        assert_eq!(r.session.pending_results(), 0);
        assert!(r.session.hud().static_overlay_visible);
    }

    #[test]
    fn test_prepare_queues_start() {
        let mut r = rig(SessionTuning::default());
        let states = record(&mut r.session, Topic::State);
        r.session.load_level("level-1");

        assert_eq!(
            *states.borrow(),
            vec![
                GameEvent::StateChanged(SessionState::Prepare),
                GameEvent::StateChanged(SessionState::Started),
            ]
        );
        // Started ran after Prepare finished hiding the HUD
        assert!(r.session.hud().hud_visible);
        assert!(!r.session.hud().main_ui_visible);
        assert!(r.session.hud().game_canvas_visible);
        assert!(r.session.audio().is_game_music_playing());
    }

    #[test]
    fn test_prepare_without_auto_start() {
        let tuning = SessionTuning {
            auto_start_on_prepare: false,
            allow_editing: true,
            ..SessionTuning::default()
        };
        let mut r = rig(tuning);
        r.session.load_level("level-1");
        assert_eq!(r.session.state(), SessionState::Prepare);
        assert!(r.session.hud().edit_button_visible);
        assert!(!r.session.hud().hud_visible);

        r.session.start_game();
        assert_eq!(r.session.state(), SessionState::Started);
    }

    #[test]
    fn test_directors_start_after_delay() {
        let mut r = rig(SessionTuning::default());
        r.session.load_level("level-1");
        run_for(&mut r.session, 5.0);
        assert!(!r.session.directors_running());
        run_for(&mut r.session, 1.5);
        assert!(r.session.directors_running());

        r.session.results_game();
        assert!(!r.session.directors_running());
    }

    #[test]
    fn test_directors_skipped_for_dead_run() {
        let mut r = rig(SessionTuning::default());
        r.session.load_level("level-1");
        run_for(&mut r.session, 1.0);
        r.session.quit_game();
        run_for(&mut r.session, 7.0);
        assert!(!r.session.directors_running());
        assert_eq!(r.session.state(), SessionState::NotStarted);

        // A restart supersedes the first run's activation
        r.session.load_level("level-1");
        run_for(&mut r.session, 3.0);
        r.session.restart_game();
        run_for(&mut r.session, 4.0);
        assert!(!r.session.directors_running());
        run_for(&mut r.session, 2.5);
        assert!(r.session.directors_running());
    }

    #[test]
    fn test_results_flow_writes_stats() {
        let mut r = rig(SessionTuning::default());
        let level = record(&mut r.session, Topic::Level);
        r.session.load_level("level-1");
        r.session.player_scores(25.0);
        r.session.player_collects_coins(3.0);

        r.session.results_game();
        assert!(!r.session.hud().results_visible);
        run_for(&mut r.session, 2.0);

        let stats = r.stats.borrow();
        assert_eq!(stats.total(codes::SCORE), Some(25.0));
        assert_eq!(stats.high(codes::SCORE), Some(25.0));
        assert_eq!(stats.total(codes::COINS), Some(3.0));
        assert_eq!(stats.progress("level-1").completed, 1);

        assert!(r.session.hud().results_visible);
        assert_eq!(r.session.state(), SessionState::NotStarted);
        assert_eq!(r.session.running_state(), RunningState::Stopped);
        assert!(
            level
                .borrow()
                .contains(&GameEvent::Results { score: 25.0 })
        );

        // No longer running, so scores are ignored
        drop(stats);
        r.session.player_scores(5.0);
        assert_eq!(r.session.runtime().score, 25.0);
    }

    #[test]
    fn test_out_of_bounds_leads_to_results() {
        let mut r = rig(SessionTuning::default());
        r.session.player_out_of_bounds();
        assert_eq!(r.session.state(), SessionState::NotStarted);

        r.session.load_level("level-1");
        r.session.player_out_of_bounds();
        assert_eq!(r.session.state(), SessionState::ContentDisplay);
        assert_eq!(r.session.content(), ContentDisplay::PlayerOutOfBounds);
        assert_eq!(r.session.running_state(), RunningState::Paused);
        assert_eq!(r.session.time_scale(), 1.0);
        assert_eq!(
            r.session.hud().dialog.as_ref().map(|(title, _)| title.as_str()),
            Some("OUT OF BOUNDS")
        );

        run_for(&mut r.session, 2.0);
        assert!(!r.session.is_game_over());

        run_for(&mut r.session, 1.2);
        assert!(r.session.runtime().out_of_bounds);
        assert!(r.session.is_game_over());
        assert_eq!(r.session.hud().dialog, None);

        run_for(&mut r.session, 1.0);
        assert_eq!(r.session.state(), SessionState::Results);
    }

    #[test]
    fn test_out_of_bounds_survives_pause_resume() {
        let mut r = rig(SessionTuning::default());
        r.session.load_level("level-1");
        r.session.player_out_of_bounds();
        run_for(&mut r.session, 1.0);

        r.session.pause_game();
        assert_eq!(r.session.state(), SessionState::Pause);
        run_for(&mut r.session, 5.0);
        assert!(!r.session.runtime().out_of_bounds);

        r.session.resume_game();
        assert_eq!(r.session.state(), SessionState::Started);
        run_for(&mut r.session, 1.0);
        assert!(!r.session.is_game_over());

        // Expiry lands 3s of game time after the dialog opened
        run_for(&mut r.session, 1.1);
        assert!(r.session.runtime().out_of_bounds);
        assert!(r.session.is_game_over());

        run_for(&mut r.session, 0.6);
        assert_eq!(r.session.state(), SessionState::Results);
    }

    #[test]
    fn test_countdown_moves_once_per_tick() {
        let mut r = rig(SessionTuning::default());
        r.session.load_level("level-1");
        let start = r.session.runtime().time_remaining;

        for _ in 0..10 {
            r.session.check_for_game_over();
        }
        assert_eq!(r.session.runtime().time_remaining, start);

        r.session.tick(DT);
        assert!((r.session.runtime().time_remaining - (start - DT)).abs() < 1e-9);

        // Latched: the countdown stops on the detecting tick
        r.session.set_player_health(0.0);
        let before = r.session.runtime().time_remaining;
        r.session.tick(DT);
        assert!(r.session.is_game_over());
        assert_eq!(r.session.runtime().time_remaining, before);
        r.session.tick(DT);
        assert_eq!(r.session.runtime().time_remaining, before);
    }

    #[test]
    fn test_training_ignores_health() {
        let tuning = SessionTuning {
            mode: GameMode::Training,
            default_level_time: 2.0,
            ..SessionTuning::default()
        };
        let mut r = rig(tuning);
        r.session.load_level("level-1");
        r.session.set_player_health(0.0);
        run_for(&mut r.session, 1.0);
        assert!(!r.session.is_game_over());

        run_for(&mut r.session, 1.5);
        assert!(r.session.is_game_over());
        assert!(r.session.runtime().time_expired());

        let mut arcade = rig(SessionTuning::default());
        arcade.session.load_level("level-1");
        arcade.session.set_player_health(0.0);
        arcade.session.tick(DT);
        assert!(arcade.session.is_game_over());
    }

    #[test]
    fn test_load_level_places_assets() {
        let tuning = SessionTuning {
            grid_fill_per_mille: 1000,
            grid_max_stack: 1,
            ..SessionTuning::default()
        };
        let mut r = rig(tuning);
        let mut grid = GridData::empty();
        grid.reset_grid(1, 4, 4);
        grid.set_assets("barrel-1", 1);
        r.session.set_grid(grid);
        r.session
            .set_rules(vec![PlacementRule::new("cone").with_count(3, 3)]);

        assert_eq!(r.session.load_level("level-1"), 19);
        assert_eq!(r.world.borrow().children(Container::LevelItems).len(), 19);
        assert_eq!(r.session.placer().registry().len(), 16);

        // Reloading replaces the previous layout
        assert_eq!(r.session.load_level("level-2"), 19);
        assert_eq!(r.world.borrow().children(Container::LevelItems).len(), 19);
        assert_eq!(r.session.runtime().level_code, "level-2");
    }

    #[test]
    fn test_load_level_skips_missing_prefabs() {
        let tuning = SessionTuning {
            grid_fill_per_mille: 1000,
            grid_max_stack: 1,
            ..SessionTuning::default()
        };
        let world = HeadlessWorld::with_prefabs([resource_path(LEVEL_ASSET_PREFABS, "cone")]);
        let mut r = rig_with(tuning, world);
        let mut grid = GridData::empty();
        grid.reset_grid(1, 2, 2);
        grid.set_assets("barrel-1", 1);
        r.session.set_grid(grid);
        r.session
            .set_rules(vec![PlacementRule::new("cone").with_count(2, 2)]);

        assert_eq!(r.session.load_level("level-1"), 2);
        assert_eq!(r.session.placer().placed().len(), 6);
    }

    #[test]
    fn test_goal_zone_changes() {
        let mut r = rig(SessionTuning::default());
        let zones = record(&mut r.session, Topic::Zone);
        r.session.load_level("level-1");
        assert_eq!(r.session.zone(), SpawnZone::Right);

        r.session.goal_zone_change();
        assert_eq!(r.session.zone(), SpawnZone::Left);
        r.session.goal_zone_change_to(SpawnZone::Left);
        assert_eq!(zones.borrow().len(), 1);

        r.session.goal_zone_change_delayed(1.0);
        run_for(&mut r.session, 0.5);
        assert_eq!(r.session.zone(), SpawnZone::Left);
        run_for(&mut r.session, 0.6);
        assert_eq!(r.session.zone(), SpawnZone::Right);
        assert_eq!(zones.borrow().len(), 2);
    }

    #[test]
    fn test_spawned_actors_cleared_on_quit() {
        let mut r = rig(SessionTuning::default());
        r.session.load_level("level-1");
        let actor = r.session.spawn_actor(&ActorSpec::default()).unwrap();
        let item = r.session.spawn_item(&ItemSpec::default()).unwrap();
        assert_eq!(r.world.borrow().is_visible(actor), Some(false));

        r.session.tick(DT);
        assert_eq!(r.world.borrow().is_visible(actor), Some(true));
        assert_eq!(r.session.hud().indicators.len(), 2);
        assert_eq!(r.session.spawned(), &[actor, item]);
        // Right zone spawns stay on the right half
        let x = r.world.borrow().object(actor).map(|o| o.position.x);
        assert!(x.is_some_and(|x| x >= 0.0));

        r.session.quit_game();
        assert!(r.session.hud().indicators.is_empty());
        assert!(r.world.borrow().children(Container::Actors).is_empty());
        assert!(r.session.hud().main_ui_visible);
        assert!(!r.session.hud().hud_visible);
        assert!(r.audio.borrow().fade_in_count() >= 2);
    }

    #[test]
    fn test_missing_actor_prefab() {
        let world = HeadlessWorld::with_prefabs(Vec::<String>::new());
        let mut r = rig_with(SessionTuning::default(), world);
        r.session.load_level("level-1");
        assert_eq!(r.session.spawn_actor(&ActorSpec::default()), None);
        assert!(r.world.borrow().children(Container::Actors).is_empty());
        r.session.tick(DT);
        assert!(r.session.hud().indicators.is_empty());
    }

    #[test]
    fn test_camera_and_roster() {
        let mut r = rig(SessionTuning::default());
        let cameras = record(&mut r.session, Topic::Camera);
        assert_eq!(r.session.cycle_camera_view().view, CameraView::SideTop);
        assert!(r.session.change_camera_view(CameraView::SideTop).is_none());
        assert!(r.session.change_camera_view(CameraView::Side).is_some());
        assert_eq!(cameras.borrow().len(), 2);

        r.session.load_character_types(["striker", "keeper", "striker"]);
        assert_eq!(r.session.current_character(), Some("striker"));
        assert_eq!(r.session.cycle_character_next().as_deref(), Some("keeper"));
        assert_eq!(r.session.cycle_character_next().as_deref(), Some("striker"));
        assert_eq!(r.session.cycle_character_previous().as_deref(), Some("keeper"));
    }

    #[test]
    fn test_choice_collision_broadcasts_once() {
        let mut r = rig(SessionTuning::default());
        let answers = record(&mut r.session, Topic::Choice);
        let index = r.session.add_choice(ChoiceData {
            is_correct: false,
            ..ChoiceData::default()
        });
        let collision = Collision {
            collider: "GamePlayerObject".to_string(),
            contact: Some(PlayerContact {
                player: ObjectRef(7),
                player_controlled: true,
            }),
        };

        let effects = r.session.choice_collision(index, &collision);
        assert!(matches!(effects.first(), Some(ChoiceEffect::Incorrect)));
        r.session.choice_collision(index, &collision);
        run_for(&mut r.session, 2.5);

        assert_eq!(answers.borrow().len(), 1);
        assert!(r.session.choices()[index].has_broadcasted());
        assert!(r.session.choice_collision(99, &collision).is_empty());
    }
}
