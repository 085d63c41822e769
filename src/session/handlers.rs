//! State entry handlers and delayed continuations

use crate::consts::{ADVANCE_TO_RESULTS_DELAY, STATS_DELAY};
use crate::events::GameEvent;
use crate::sim::{ContentDisplay, PlayerRuntimeData, RunningState, SessionState};
use crate::stats::codes;

use super::{Session, SessionLifecycle, SessionTask};

impl Session {
    /// Set the state, announce it and run its entry handler.
    ///
    /// Transitions requested from inside a handler are queued and applied in
    /// order once the current handler returns.
    pub(crate) fn change_state(&mut self, state: SessionState) {
        if self.in_transition {
            log::trace!("queueing {:?} behind {:?}", state, self.state);
            self.queued_states.push_back(state);
            return;
        }

        self.in_transition = true;
        let mut next = Some(state);
        while let Some(state) = next {
            log::info!("state {:?} -> {:?}", self.state, state);
            self.state = state;
            self.bus.publish(GameEvent::StateChanged(state));
            self.enter_state(state);
            next = self.queued_states.pop_front();
        }
        self.in_transition = false;
    }

    fn enter_state(&mut self, state: SessionState) {
        match state {
            SessionState::Prepare => self.on_prepare(),
            SessionState::Started => self.on_started(),
            SessionState::Pause => self.on_pause(),
            SessionState::Resume => self.on_resume(),
            SessionState::Quit => self.on_quit(),
            SessionState::Results => self.on_results(),
            SessionState::ContentDisplay => self.on_content_display(),
            SessionState::NotStarted | SessionState::Init => {}
        }
    }

    fn on_prepare(&mut self) {
        self.services.stats.start_level(&self.runtime.level_code);
        self.reset_runtime_data();
        self.hud.hide_ui();
        self.hud.hide_hud();
        if self.tuning.allow_editing {
            self.hud.edit_button_visible = true;
        }
        if self.tuning.auto_start_on_prepare {
            self.start_game();
        }
    }

    fn on_started(&mut self) {
        self.begin_run();
        self.services.stats.start_level(&self.runtime.level_code);
        self.reset_runtime_data();
        self.hud.hide_ui();
        self.hud.show_hud();
        if self.tuning.allow_editing {
            self.hud.edit_button_visible = true;
        }
        self.hud.game_canvas_visible = true;
        self.running_run();

        self.audio.set_ui_active(false);
        self.audio.play_music(&*self.services.profile);
        self.audio.play_sound_level_start(&*self.services.profile);

        let clock = self.clock;
        self.scheduler.after(
            &clock,
            self.tuning.directors_delay,
            SessionTask::RunDirectors { run: self.run },
        );
    }

    fn on_pause(&mut self) {
        self.hud.show_pause();
        self.running_pause();
    }

    fn on_resume(&mut self) {
        self.hud.hide_dialogs();
        self.hud.show_hud();
        self.running_run();
    }

    fn on_quit(&mut self) {
        self.hud.hide_hud();
        self.hud.hide_dialogs();
        self.hud.show_ui();
        self.reset();
        self.running_stopped();
        self.stop_directors();

        self.audio.set_ui_active(true);
        self.audio.play_music(&*self.services.profile);
    }

    fn on_results(&mut self) {
        self.hud.static_overlay_visible = true;
        self.hud.hide_dialogs();
        let clock = self.clock;
        self.scheduler.after(
            &clock,
            STATS_DELAY,
            SessionTask::StatsTotal { run: self.run },
        );
        self.stop_directors();
        self.audio.play_sound_level_end(&*self.services.profile);
    }

    fn on_content_display(&mut self) {
        match self.content {
            ContentDisplay::PlayerOutOfBounds => {
                let clock = self.clock;
                self.scheduler.after(
                    &clock,
                    self.tuning.out_of_bounds_delay,
                    SessionTask::OutOfBoundsExpired { run: self.run },
                );
                self.hud
                    .show_dialog("OUT OF BOUNDS", "Get back on the field");
            }
            _ => self.hud.hide_dialogs(),
        }
    }

    // === Delayed continuations ===

    pub(crate) fn run_task(&mut self, task: SessionTask) {
        let clock = self.clock;
        let run = self.run;
        match task {
            SessionTask::RunDirectors { .. } => {
                if self.game_over || !self.in_run() {
                    log::debug!("directors skipped, run no longer live");
                    return;
                }
                self.directors_running = true;
                self.bus.publish(GameEvent::DirectorsRunning(true));
                log::info!("directors running");
            }
            SessionTask::Results { .. } => self.results_game(),
            SessionTask::OutOfBoundsExpired { .. } => {
                if self.game_over {
                    return;
                }
                self.runtime.out_of_bounds = true;
                self.hud.hide_dialogs();
                self.running_run();
                self.check_for_game_over();
            }
            SessionTask::GoalZoneChange { .. } => self.goal_zone_change(),
            SessionTask::StatsTotal { .. } => {
                let stats = &mut self.services.stats;
                stats.set_stat_total(codes::SCORE, self.runtime.score);
                stats.set_stat_total(codes::COINS, self.runtime.coins);
                stats.set_stat_total(codes::TIME_PLAYED, self.runtime.current_level_time);
                self.scheduler
                    .next_frame(&clock, SessionTask::StatsHigh { run });
            }
            SessionTask::StatsHigh { .. } => {
                let stats = &mut self.services.stats;
                stats.set_stat_high(codes::SCORE, self.runtime.score);
                stats.set_stat_high(codes::COINS, self.runtime.coins);
                self.bus.publish(GameEvent::Results {
                    score: self.runtime.score,
                });
                self.scheduler
                    .next_frame(&clock, SessionTask::StatsEnd { run });
            }
            SessionTask::StatsEnd { .. } => {
                self.services.stats.end_level(&self.runtime.level_code);
                self.scheduler
                    .next_frame(&clock, SessionTask::StatsAdvance { run });
            }
            SessionTask::StatsAdvance { .. } => {
                if self.advancing {
                    return;
                }
                self.advancing = true;
                self.scheduler.after(
                    &clock,
                    ADVANCE_TO_RESULTS_DELAY,
                    SessionTask::ShowResults { run },
                );
            }
            SessionTask::ShowResults { .. } => {
                self.hud.hide_hud();
                self.hud.results_visible = true;
                self.running_stopped();
                log::info!(
                    "results: score {} coins {} time {:.1}s",
                    self.runtime.score,
                    self.runtime.coins,
                    self.runtime.current_level_time
                );
            }
        }
    }

    /// Started, paused or showing content: a run is in progress
    fn in_run(&self) -> bool {
        matches!(
            self.state,
            SessionState::Started
                | SessionState::Pause
                | SessionState::Resume
                | SessionState::ContentDisplay
        )
    }

    fn stop_directors(&mut self) {
        if self.directors_running {
            self.directors_running = false;
            self.bus.publish(GameEvent::DirectorsRunning(false));
            log::info!("directors stopped");
        }
    }

    // === Running state ===
    //
    // These set the state directly and do not run entry handlers.

    pub(crate) fn running_run(&mut self) {
        self.state = SessionState::Started;
        self.running = RunningState::Running;
        self.time_scale = 1.0;
    }

    pub(crate) fn running_pause(&mut self) {
        self.state = SessionState::Pause;
        self.running = RunningState::Paused;
        self.time_scale = 0.0;
    }

    pub(crate) fn running_stopped(&mut self) {
        self.state = SessionState::NotStarted;
        self.running = RunningState::Stopped;
        self.time_scale = 1.0;
    }

    pub(crate) fn running_content(&mut self) {
        self.state = SessionState::ContentDisplay;
        self.running = RunningState::Paused;
        self.time_scale = 1.0;
    }

    // === Resets ===

    /// Fresh runtime data for the same level
    fn reset_runtime_data(&mut self) {
        let level_code = std::mem::take(&mut self.runtime.level_code);
        self.runtime.reset();
        self.runtime.level_code = level_code;
    }

    /// A new run generation; delayed work from earlier runs goes stale
    fn begin_run(&mut self) {
        self.run += 1;
        self.game_over = false;
        self.advancing = false;
    }

    /// Drop the current run: runtime data, player, spawned actors
    pub fn reset(&mut self) {
        self.begin_run();
        self.reset_runtime_data();
        self.player = PlayerRuntimeData::default();
        self.content = ContentDisplay::Default;
        self.spawner.clear(&mut *self.services.world, &mut self.hud);
        self.hud.game_canvas_visible = false;
        self.hud.static_overlay_visible = false;
        self.hud.results_visible = false;
        log::debug!("session reset (run {})", self.run);
    }
}
