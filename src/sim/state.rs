//! Run-level game state
//!
//! Everything one run carries: the phase machine, the player body, the
//! streaming window, the revive budget, and the per-run tallies.

use super::checkpoint::ReviveCheckpoint;
use super::player::{Player, TouchInput};
use super::stream::{RunError, Streamer};
use crate::camera_for_player;
use crate::content::ContentSource;
use crate::services::Spawner;
use crate::tuning::Tuning;

/// Current phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulated time frozen, menu shown
    Paused,
    /// Death with revive chances left: the countdown window is open
    Revive,
    /// Run ended
    Lose,
}

/// Touch lifecycle as reported by the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Held,
    Ended,
}

/// One pointer sample for a frame.
#[derive(Debug, Clone, Copy)]
pub struct Touch {
    pub phase: TouchPhase,
    /// True when the point is over a UI control; such taps never reach
    /// gameplay
    pub over_ui: bool,
}

/// Input commands for a single frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub touch: Option<Touch>,
    /// Pause toggle (back button / escape)
    pub pause: bool,
}

impl FrameInput {
    /// Gameplay view of the touch, with UI taps filtered out.
    pub fn gameplay_touch(&self) -> TouchInput {
        match self.touch {
            Some(touch) if !touch.over_ui => TouchInput {
                held: matches!(touch.phase, TouchPhase::Began | TouchPhase::Held),
                began: touch.phase == TouchPhase::Began,
                ended: touch.phase == TouchPhase::Ended,
            },
            _ => TouchInput::default(),
        }
    }

    /// A tap that should shorten the revive countdown.
    pub fn gameplay_tap(&self) -> bool {
        matches!(
            self.touch,
            Some(Touch {
                phase: TouchPhase::Began,
                over_ui: false
            })
        )
    }
}

/// The revive countdown, run on the unscaled clock while simulated time
/// is frozen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviveCountdown {
    pub remaining: f32,
    /// An ad request is in flight; the countdown holds until it settles
    pub ad_pending: bool,
}

/// Complete state of one run.
#[derive(Debug)]
pub struct GameState {
    pub seed: u64,
    pub phase: GamePhase,
    pub camera_x: f32,
    /// Coins collected this run
    pub coins: u32,
    /// Simulated run time in seconds
    pub run_time: f32,
    /// Set when a content fault aborted the run
    pub aborted: bool,
    pub player: Player,
    pub streamer: Streamer,
    pub revive: ReviveCheckpoint,
    pub countdown: Option<ReviveCountdown>,
}

impl GameState {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        let player = Player::new();
        let camera_x = camera_for_player(player.pos.x);
        Self {
            seed,
            phase: GamePhase::Playing,
            camera_x,
            coins: 0,
            run_time: 0.0,
            aborted: false,
            player,
            streamer: Streamer::new(seed),
            revive: ReviveCheckpoint::new(tuning.revive_chances),
            countdown: None,
        }
    }

    /// Place the start chunk and pre-seed the streaming window.
    pub fn initialize(
        &mut self,
        content: &dyn ContentSource,
        spawner: &mut dyn Spawner,
    ) -> Result<(), RunError> {
        self.streamer.initialize(content, spawner)?;
        log::info!(
            "run initialized: seed {}, {} chunks resident",
            self.seed,
            self.streamer.resident_len()
        );
        Ok(())
    }

    /// Score is forward progress, floored at zero.
    pub fn score(&self) -> i64 {
        (self.player.pos.x.round() as i64).max(0)
    }
}
