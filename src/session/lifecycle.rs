//! Session lifecycle contract
//!
//! Hosts drive a run only through these calls; everything with a visible side
//! effect happens in the state entry handlers.

use crate::error::Error;
use crate::sim::{ContentDisplay, SessionState};

use super::{Session, SessionTask};

pub trait SessionLifecycle {
    /// Enter Prepare (level loaded, waiting to start)
    fn prepare_game(&mut self);

    fn start_game(&mut self);

    /// Reset the run and start again on the same level
    fn restart_game(&mut self);

    fn pause_game(&mut self);

    fn resume_game(&mut self);

    fn toggle_pause(&mut self);

    fn quit_game(&mut self);

    fn results_game(&mut self);

    /// Enter Results after `delay` seconds of game time
    fn results_game_delayed(&mut self, delay: f64);

    fn content_display(&mut self, content: ContentDisplay);

    /// Latches once and schedules Results. Reads state only, so extra calls
    /// within a tick do not move the countdown.
    fn check_for_game_over(&mut self);
}

impl SessionLifecycle for Session {
    fn prepare_game(&mut self) {
        self.change_state(SessionState::Prepare);
    }

    fn start_game(&mut self) {
        self.change_state(SessionState::Started);
    }

    fn restart_game(&mut self) {
        self.reset();
        self.change_state(SessionState::Started);
    }

    fn pause_game(&mut self) {
        if self.state == SessionState::Pause {
            log::debug!(
                "{}",
                Error::RedundantTransition {
                    state: SessionState::Pause
                }
            );
            return;
        }
        self.change_state(SessionState::Pause);
    }

    fn resume_game(&mut self) {
        if self.state != SessionState::Pause {
            log::debug!(
                "{}",
                Error::RedundantTransition {
                    state: SessionState::Resume
                }
            );
            return;
        }
        self.change_state(SessionState::Resume);
    }

    fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Pause => self.resume_game(),
            SessionState::Started => self.pause_game(),
            other => log::debug!("toggle_pause ignored in {:?}", other),
        }
    }

    fn quit_game(&mut self) {
        self.change_state(SessionState::Quit);
    }

    fn results_game(&mut self) {
        self.change_state(SessionState::Results);
    }

    fn results_game_delayed(&mut self, delay: f64) {
        let clock = self.clock;
        self.scheduler
            .after(&clock, delay, SessionTask::Results { run: self.run });
    }

    fn content_display(&mut self, content: ContentDisplay) {
        self.content = content;
        self.running_content();
        self.change_state(SessionState::ContentDisplay);
    }

    fn check_for_game_over(&mut self) {
        if self.state != SessionState::Started || self.game_over {
            return;
        }

        let dead = self.tuning.mode.health_ends_run() && self.player.health <= 0.0;
        let expired = self.runtime.time_expired();
        let out_of_bounds = self.runtime.out_of_bounds;

        if dead || expired || out_of_bounds {
            log::info!(
                "game over (dead: {}, expired: {}, out of bounds: {})",
                dead,
                expired,
                out_of_bounds
            );
            self.game_over = true;
            let delay = self.tuning.results_delay;
            self.results_game_delayed(delay);
        }
    }
}
