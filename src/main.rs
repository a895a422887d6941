//! Cube Dash entry point
//!
//! Headless demo session: runs a scripted player against the procedurally
//! authored catalog and prints the outcome. A rendering front end drives
//! the same `Game` API with real input.

use std::time::{SystemTime, UNIX_EPOCH};

use cube_dash::content::authoring;
use cube_dash::services::{JsonFileStore, NullNotifier, PooledSpawner};
use cube_dash::sim::{FrameInput, GamePhase, Touch, TouchPhase};
use cube_dash::{Game, Tuning};

/// Frames at 60 fps; two minutes of simulated play at most.
const MAX_FRAMES: u64 = 60 * 120;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    log::info!("Cube Dash starting with seed {seed}");

    let catalog = authoring::generate_catalog();
    let mut game = match Game::new(
        seed,
        Tuning::default(),
        catalog,
        PooledSpawner::new(),
        NullNotifier::completing(),
        JsonFileStore::new("cube_dash_profile.json"),
    ) {
        Ok(game) => game,
        Err(err) => {
            log::error!("failed to start run: {err}");
            return;
        }
    };

    let frame_dt = 1.0 / 60.0;
    let mut frame = 0u64;
    while game.state.phase != GamePhase::Lose && frame < MAX_FRAMES {
        // Scripted input: a short hold twice a second
        let beat = frame % 30;
        let touch = match beat {
            0 => Some(Touch {
                phase: TouchPhase::Began,
                over_ui: false,
            }),
            1..=7 => Some(Touch {
                phase: TouchPhase::Held,
                over_ui: false,
            }),
            8 => Some(Touch {
                phase: TouchPhase::Ended,
                over_ui: false,
            }),
            _ => None,
        };
        game.frame(&FrameInput { touch, pause: false }, frame_dt);

        if game.state.phase == GamePhase::Revive {
            game.watch_ad_revive();
        }
        frame += 1;
    }

    println!("score: {}", game.state.score());
    println!("coins: {}", game.state.coins);
    println!("time:  {:.1}s", game.state.run_time);
    println!("games played: {}", game.profile().games_played);

    game.shutdown();
}
