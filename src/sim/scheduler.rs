//! Cooperative continuation scheduler
//!
//! Every "wait" in the game (intro clip length, end of frame, delayed results)
//! becomes a task carrying its wake condition. Owners poll `due` once per tick
//! and run whatever came back. Nothing here is threaded.

use serde::{Deserialize, Serialize};

/// Game clock, advanced once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// Scaled game time in seconds (frozen while time scale is 0)
    pub time: f64,
    /// Frames ticked so far
    pub frame: u64,
}

impl Clock {
    /// Advance one frame by `dt` seconds scaled by `time_scale`
    pub fn advance(&mut self, dt: f64, time_scale: f64) {
        self.frame += 1;
        self.time += dt * time_scale;
    }
}

/// Wake condition for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wake {
    /// Fires once the clock reaches this time
    At(f64),
    /// Fires once the clock reaches this frame
    Frame(u64),
}

impl Wake {
    fn is_due(&self, clock: &Clock) -> bool {
        match *self {
            Wake::At(t) => clock.time >= t,
            Wake::Frame(f) => clock.frame >= f,
        }
    }
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    wake: Wake,
    /// Scheduling clock, used to order mixed frame/time wakes
    queued_at: Clock,
    seq: u64,
    task: T,
}

/// Time/frame keyed task queue
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    queue: Vec<Scheduled<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            next_seq: 0,
        }
    }

    fn push(&mut self, clock: &Clock, wake: Wake, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled {
            wake,
            queued_at: *clock,
            seq,
            task,
        });
    }

    /// Run `task` once `seconds` of game time have elapsed
    pub fn after(&mut self, clock: &Clock, seconds: f64, task: T) {
        self.push(clock, Wake::At(clock.time + seconds.max(0.0)), task);
    }

    /// Run `task` on the next frame (end-of-frame wait)
    pub fn next_frame(&mut self, clock: &Clock, task: T) {
        self.push(clock, Wake::Frame(clock.frame + 1), task);
    }

    /// Remove and return every task whose wake condition is met, oldest wake first
    pub fn due(&mut self, clock: &Clock) -> Vec<T> {
        let (mut ready, pending): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|s| s.wake.is_due(clock));
        self.queue = pending;

        ready.sort_by(|a, b| {
            wake_key(a)
                .total_cmp(&wake_key(b))
                .then(a.seq.cmp(&b.seq))
        });
        ready.into_iter().map(|s| s.task).collect()
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Count pending tasks matching a predicate
    pub fn count(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.queue.iter().filter(|s| pred(&s.task)).count()
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Frame waits sort by the time they were queued at, so a next-frame task
/// queued before a zero-delay timer still runs first.
fn wake_key<T>(s: &Scheduled<T>) -> f64 {
    match s.wake {
        Wake::At(t) => t,
        Wake::Frame(_) => s.queued_at.time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_wake_fires_once() {
        let mut clock = Clock::default();
        let mut sched = Scheduler::new();
        sched.after(&clock, 0.5, "results");

        clock.advance(0.25, 1.0);
        assert!(sched.due(&clock).is_empty());

        clock.advance(0.25, 1.0);
        assert_eq!(sched.due(&clock), vec!["results"]);
        assert!(sched.is_empty());

        clock.advance(1.0, 1.0);
        assert!(sched.due(&clock).is_empty());
    }

    #[test]
    fn test_frame_wake_ignores_time_scale() {
        let mut clock = Clock::default();
        let mut sched = Scheduler::new();
        sched.next_frame(&clock, 7u32);

        // Paused: time does not move, frames still do
        clock.advance(1.0 / 60.0, 0.0);
        assert_eq!(clock.time, 0.0);
        assert_eq!(sched.due(&clock), vec![7]);
    }

    #[test]
    fn test_paused_clock_holds_timers() {
        let mut clock = Clock::default();
        let mut sched = Scheduler::new();
        sched.after(&clock, 1.0, ());

        for _ in 0..100 {
            clock.advance(0.1, 0.0);
        }
        assert!(sched.due(&clock).is_empty());
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn test_due_order_by_wake_then_insertion() {
        let clock = Clock::default();
        let mut sched = Scheduler::new();
        sched.after(&clock, 2.0, "c");
        sched.after(&clock, 1.0, "a");
        sched.after(&clock, 1.0, "b");

        let mut later = clock;
        later.advance(5.0, 1.0);
        assert_eq!(sched.due(&later), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_count_and_clear() {
        let clock = Clock::default();
        let mut sched = Scheduler::new();
        sched.after(&clock, 1.0, 1);
        sched.after(&clock, 1.0, 2);
        sched.next_frame(&clock, 2);
        assert_eq!(sched.count(|t| *t == 2), 2);
        sched.clear();
        assert!(sched.is_empty());
    }
}
