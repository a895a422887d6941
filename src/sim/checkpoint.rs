//! Safe-position checkpoints and the revive budget
//!
//! A snapshot is taken once per chunk-width of forward progress, never on
//! demand, so a revive always resumes from a chunk boundary the player
//! actually cleared.

use serde::{Deserialize, Serialize};

use super::player::Mode;
use crate::consts::{CHUNK_WIDTH, START_X};

/// Last safe gameplay snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub x: f32,
    pub y: f32,
    pub mode: Mode,
    pub flipped: bool,
}

impl Checkpoint {
    /// Snapshot for the run start.
    pub fn start() -> Self {
        Self {
            x: START_X,
            y: 0.0,
            mode: Mode::Cube,
            flipped: false,
        }
    }
}

/// Tracks the safe snapshot and the remaining revive chances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviveCheckpoint {
    checkpoint: Checkpoint,
    chances: u8,
}

impl ReviveCheckpoint {
    pub fn new(chances: u8) -> Self {
        Self {
            checkpoint: Checkpoint::start(),
            chances,
        }
    }

    /// Advance the snapshot one chunk-width when the player has moved a
    /// full chunk past it. The snapshot lands on the boundary, not on the
    /// player's exact position, and always at track center height.
    pub fn maybe_checkpoint(&mut self, player_x: f32, mode: Mode, flipped: bool) {
        if player_x > self.checkpoint.x + CHUNK_WIDTH {
            self.checkpoint = Checkpoint {
                x: self.checkpoint.x + CHUNK_WIDTH,
                y: 0.0,
                mode,
                flipped,
            };
        }
    }

    /// The snapshot a revive restores to.
    pub fn restore(&self) -> Checkpoint {
        self.checkpoint
    }

    pub fn chances(&self) -> u8 {
        self.chances
    }

    /// Spend one revive chance. Returns false when the budget is gone.
    pub fn consume_chance(&mut self) -> bool {
        if self.chances > 0 {
            self.chances -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_advances_by_whole_chunks() {
        let mut revive = ReviveCheckpoint::new(2);
        let start_x = revive.restore().x;

        // Not a full chunk yet
        revive.maybe_checkpoint(start_x + CHUNK_WIDTH, Mode::Ship, true);
        assert_eq!(revive.restore().x, start_x);
        assert_eq!(revive.restore().mode, Mode::Cube);

        // One chunk cleared: snapshot lands on the boundary
        revive.maybe_checkpoint(start_x + CHUNK_WIDTH + 0.5, Mode::Ship, true);
        let checkpoint = revive.restore();
        assert_eq!(checkpoint.x, start_x + CHUNK_WIDTH);
        assert_eq!(checkpoint.y, 0.0);
        assert_eq!(checkpoint.mode, Mode::Ship);
        assert!(checkpoint.flipped);
    }

    #[test]
    fn test_chances_run_out() {
        let mut revive = ReviveCheckpoint::new(2);
        assert!(revive.consume_chance());
        assert!(revive.consume_chance());
        assert!(!revive.consume_chance());
        assert_eq!(revive.chances(), 0);
    }
}
