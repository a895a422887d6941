//! Procedural chunk selection
//!
//! Decides, one chunk ahead and never further, what content comes next:
//! same mode, a gravity flip, or a hand-off to one of the other four
//! modes. Draws are history-free; the RNG is seeded at construction so a
//! run's chunk sequence is reproducible from its seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::player::Mode;
use crate::content::{ChunkKey, Difficulty, Transition};

/// Weighted change-magnitude table: ~30% stay, ~30% flip, ~40% mode change.
const CHANGES: [u8; 10] = [0, 0, 0, 1, 1, 1, 2, 3, 4, 5];

/// Staying in a mode has more authored variety than transition chunks.
const STAY_VARIANTS: u8 = 6;
const TRANSITION_VARIANTS: u8 = 2;

/// One selection step: the content key to load, and the gameplay state
/// the chunk hands over at its far edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub key: ChunkKey,
    pub mode: Mode,
    pub flipped: bool,
}

/// The chunk-selection policy with its owned, seeded RNG.
#[derive(Debug, Clone)]
pub struct ChunkSelector {
    rng: Pcg32,
}

impl ChunkSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Pick the next chunk for the given gameplay state and the sequence
    /// index being generated.
    pub fn select_next(&mut self, mode: Mode, flipped: bool, sequence: i64) -> Selection {
        let magnitude = CHANGES[self.rng.random_range(0..CHANGES.len())];
        let pool = if magnitude < 2 {
            STAY_VARIANTS
        } else {
            TRANSITION_VARIANTS
        };
        let variant = self.rng.random_range(0..pool) + 1;
        build_selection(mode, flipped, sequence, magnitude, variant)
    }
}

/// Deterministic tail of a selection step, once the draws are made.
fn build_selection(
    mode: Mode,
    flipped: bool,
    sequence: i64,
    magnitude: u8,
    variant: u8,
) -> Selection {
    let difficulty = Difficulty::for_sequence(sequence);
    let (transition, next_mode, next_flipped) = match magnitude {
        0 => (Transition::Stay { flipped }, mode, flipped),
        1 => (
            Transition::FlipChange {
                to_flipped: !flipped,
            },
            mode,
            !flipped,
        ),
        m => {
            let to = mode.others()[(m - 2) as usize];
            (Transition::ModeChange { flipped, to }, to, flipped)
        }
    };
    Selection {
        key: ChunkKey {
            mode,
            difficulty,
            transition,
            variant,
        },
        mode: next_mode,
        flipped: next_flipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_zero_changes_nothing() {
        // A stream fixed to magnitude 0 keeps mode and flip, forever
        for sequence in 0..20 {
            let selection = build_selection(Mode::Ship, true, sequence, 0, 1);
            assert_eq!(selection.mode, Mode::Ship);
            assert!(selection.flipped);
            assert_eq!(
                selection.key.transition,
                Transition::Stay { flipped: true }
            );
        }
    }

    #[test]
    fn test_magnitude_one_toggles_flip() {
        let selection = build_selection(Mode::Cube, false, 0, 1, 1);
        assert!(selection.flipped);
        assert_eq!(selection.mode, Mode::Cube);
        assert_eq!(
            selection.key.transition,
            Transition::FlipChange { to_flipped: true }
        );

        let selection = build_selection(Mode::Cube, true, 0, 1, 1);
        assert!(!selection.flipped);
    }

    #[test]
    fn test_mode_change_magnitudes_cover_other_modes() {
        let mut seen = Vec::new();
        for magnitude in 2..=5u8 {
            let selection = build_selection(Mode::Ball, false, 0, magnitude, 1);
            assert_ne!(selection.mode, Mode::Ball);
            assert_eq!(
                selection.key.transition,
                Transition::ModeChange {
                    flipped: false,
                    to: selection.mode
                }
            );
            seen.push(selection.mode);
        }
        assert_eq!(seen, Mode::Ball.others().to_vec());
    }

    #[test]
    fn test_key_uses_pre_transition_mode() {
        let selection = build_selection(Mode::Ufo, false, 0, 4, 2);
        assert_eq!(selection.key.mode, Mode::Ufo);
        assert_ne!(selection.mode, Mode::Ufo);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = ChunkSelector::new(7);
        let mut b = ChunkSelector::new(7);
        let mut mode = Mode::Cube;
        let mut flipped = false;
        for sequence in 0..100 {
            let sa = a.select_next(mode, flipped, sequence);
            let sb = b.select_next(mode, flipped, sequence);
            assert_eq!(sa, sb);
            mode = sa.mode;
            flipped = sa.flipped;
        }
    }

    #[test]
    fn test_variant_pools() {
        let mut selector = ChunkSelector::new(99);
        for sequence in 0..500 {
            let selection = selector.select_next(Mode::Cube, false, sequence);
            let limit = match selection.key.transition {
                Transition::Stay { .. } => STAY_VARIANTS,
                _ => TRANSITION_VARIANTS,
            };
            assert!(selection.key.variant >= 1 && selection.key.variant <= limit);
        }
    }
}
