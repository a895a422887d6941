//! Procedural chunk authoring
//!
//! Emits a layout for every content address the selection policy can
//! reach, so the demo binary and tests run against a catalog with no
//! holes. Cell choices are hash-driven from the content address: the
//! same address always yields the same grid.

use super::{ChunkKey, ChunkLayout, Difficulty, StaticCatalog, Transition, START_CHUNK_PATH};
use crate::consts::{CHUNK_COLS, GRID_ROWS};
use crate::sim::layout::{mode_portal_symbol, symbols};
use crate::sim::Mode;

/// Column reserved for transition portals, just inside the chunk entry.
const PORTAL_COL: usize = 2;
/// First column eligible for obstacles, leaving an entry runway.
const OBSTACLE_COL_MIN: usize = 5;

fn hash(seed: u32, salt: u32) -> u32 {
    seed.wrapping_mul(2654435761)
        .wrapping_add(salt.wrapping_mul(7919))
}

fn address_seed(path: &str) -> u32 {
    path.bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
}

struct Grid {
    cells: Vec<Vec<char>>,
}

impl Grid {
    fn empty() -> Self {
        Self {
            cells: vec![vec![symbols::EMPTY; CHUNK_COLS]; GRID_ROWS],
        }
    }

    fn set(&mut self, row: usize, col: usize, symbol: char) {
        if self.cells[row][col] == symbols::EMPTY {
            self.cells[row][col] = symbol;
        }
    }

    fn column(&mut self, col: usize, symbol: char) {
        for row in 0..GRID_ROWS {
            self.set(row, col, symbol);
        }
    }

    fn into_layout(self) -> ChunkLayout {
        ChunkLayout::new(self.cells.into_iter().map(String::from_iter).collect())
    }
}

fn spike_count(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 1,
        Difficulty::Normal => 2,
        Difficulty::Hard => 3,
    }
}

/// Author one chunk for the given key.
fn author_chunk(key: &ChunkKey) -> ChunkLayout {
    let seed = address_seed(&key.path());
    let mut grid = Grid::empty();

    // Transition chunks carry their portal as a full-height gate near the
    // entry, so the hand-off happens regardless of player altitude.
    match key.transition {
        Transition::Stay { .. } => {}
        Transition::FlipChange { to_flipped } => {
            let symbol = if to_flipped {
                symbols::FLIP_GRAVITY_PORTAL
            } else {
                symbols::NORMAL_GRAVITY_PORTAL
            };
            grid.column(PORTAL_COL, symbol);
        }
        Transition::ModeChange { to, .. } => {
            grid.column(PORTAL_COL, mode_portal_symbol(to));
        }
    }

    let floor_row = GRID_ROWS - 1;
    let span = (CHUNK_COLS - OBSTACLE_COL_MIN) as u32;

    // Wave content never uses solid blocks; everything else mixes low
    // blocks with ground spikes
    let solid_allowed = key.mode != Mode::Wave
        && !matches!(key.transition, Transition::ModeChange { to: Mode::Wave, .. });

    for i in 0..spike_count(key.difficulty) {
        let col = OBSTACLE_COL_MIN + (hash(seed, i) % span) as usize;
        grid.set(floor_row, col, symbols::SPIKE);
    }

    if solid_allowed {
        let blocks = 1 + hash(seed, 100) % 3;
        for i in 0..blocks {
            let col = OBSTACLE_COL_MIN + (hash(seed, 200 + i) % span) as usize;
            grid.set(floor_row, col, symbols::BLOCK);
            if hash(seed, 300 + i) % 2 == 0 {
                grid.set(floor_row - 1, col, symbols::BLOCK);
            }
        }
    }

    // A coin or two along the upper lane
    for i in 0..1 + hash(seed, 400) % 2 {
        let col = OBSTACLE_COL_MIN + (hash(seed, 500 + i) % span) as usize;
        grid.set(4, col, symbols::COIN);
    }

    // Higher stay variants bank rings for Cube and Ball play
    if matches!(key.mode, Mode::Cube | Mode::Ball) && key.variant >= 4 {
        let col = OBSTACLE_COL_MIN + (hash(seed, 600) % span) as usize;
        let ring = if key.variant % 2 == 0 {
            symbols::YELLOW_RING
        } else {
            symbols::CYAN_RING
        };
        grid.set(6, col, ring);
    }

    grid.into_layout()
}

/// The fixed start chunk: an empty runway with a welcome coin.
fn author_start_chunk() -> ChunkLayout {
    let mut grid = Grid::empty();
    grid.set(4, 16, symbols::COIN);
    grid.into_layout()
}

/// Every transition reachable from `mode`, with its variant pool size.
fn reachable_transitions(mode: Mode) -> Vec<(Transition, u8)> {
    let mut transitions = Vec::new();
    for flipped in [false, true] {
        transitions.push((Transition::Stay { flipped }, 6));
    }
    for to_flipped in [false, true] {
        transitions.push((Transition::FlipChange { to_flipped }, 2));
    }
    for flipped in [false, true] {
        for to in mode.others() {
            transitions.push((Transition::ModeChange { flipped, to }, 2));
        }
    }
    transitions
}

/// Build a catalog covering every key the selection policy can reach.
pub fn generate_catalog() -> StaticCatalog {
    let mut catalog = StaticCatalog::new();
    catalog.insert(START_CHUNK_PATH, author_start_chunk());

    for mode in Mode::ALL {
        for difficulty in Difficulty::ALL {
            for (transition, variants) in reachable_transitions(mode) {
                for variant in 1..=variants {
                    let key = ChunkKey {
                        mode,
                        difficulty,
                        transition,
                        variant,
                    };
                    catalog.insert(key.path(), author_chunk(&key));
                }
            }
        }
    }

    log::info!("authored {} chunk layouts", catalog.len());
    catalog
}
