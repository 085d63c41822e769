//! Goalzone entry point
//!
//! Native demo: plays one headless level from prepare to the results panel
//! and logs what happened. Usage: `goalzone [seed] [settings.json]`

use std::path::Path;

use glam::Vec3;

use goalzone::host::StatsTracker;
use goalzone::level::GameBounds;
use goalzone::spawn::{ActorSpec, ItemSpec};
use goalzone::stats::codes;
use goalzone::{Session, SessionLifecycle, Settings};

const FRAME_DT: f64 = 1.0 / 60.0;
/// Give up after five minutes of simulated frames
const MAX_FRAMES: u64 = 60 * 300;

fn main() {
    env_logger::init();
    log::info!("Goalzone (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| match s.parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(e) => {
            log::warn!("Ignoring seed {:?}: {}", s, e);
            None
        }
    });
    let mut settings = match args.next() {
        Some(path) => Settings::load(Path::new(&path)),
        None => Settings::default(),
    };
    if let Some(seed) = seed {
        settings.tuning.seed = seed;
    }
    log::info!(
        "Mode {} with seed {}",
        settings.tuning.mode.as_str(),
        settings.tuning.seed
    );

    let bounds = GameBounds::new(Vec3::new(-100.0, 0.0, -60.0), Vec3::new(100.0, 40.0, 60.0));
    let mut session = Session::headless(settings.tuning.clone(), Some(bounds));
    session.load_character_types(["striker", "keeper", "winger"]);
    let placed = session.load_level("level-1");
    log::info!("Placed {} level assets", placed);

    let mut frame = 0;
    while !session.hud().results_visible && frame < MAX_FRAMES {
        session.tick(FRAME_DT);
        frame += 1;

        if session.directors_running() && frame % 300 == 0 {
            session.spawn_actor(&ActorSpec::default());
            session.spawn_item(&ItemSpec::default());
        }
        if frame % 240 == 0 {
            session.player_scores(10.0);
            session.player_collects_coins(1.0);
        }
        if frame % 1800 == 0 {
            session.goal_zone_change();
            session.cycle_camera_view();
        }
    }

    if !session.hud().results_visible {
        log::warn!("Stopped after {} frames without reaching results", frame);
        session.quit_game();
        return;
    }

    let runtime = session.runtime();
    log::info!(
        "Finished after {} frames: score {} coins {} time played {:.1}s",
        frame,
        runtime.score,
        runtime.coins,
        runtime.current_level_time
    );
    log::info!(
        "Spawned {} actors/items, best score {:?}",
        session.spawned().len(),
        session.stats().high(codes::SCORE)
    );
}
