//! Obstacle layout decoding
//!
//! Turns a textual chunk grid into world-space placement instructions.
//! Decoding is pure: instantiation of the placements is the streamer's
//! job, through the spawn collaborator.

use glam::Vec2;
use thiserror::Error;

use super::player::Mode;
use crate::cell_to_world;
use crate::content::ChunkLayout;

/// Object type index plus the scene parent group it spawns under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub object_index: usize,
    pub parent_group: usize,
}

const fn map(object_index: usize, parent_group: usize) -> Option<Mapping> {
    Some(Mapping {
        object_index,
        parent_group,
    })
}

/// The fixed symbol table. Total over the alphabet used by shipped
/// layouts: `'0'` is empty, everything else maps to an object type and a
/// parent group (0 = solid blocks, 1 = spikes, 2 = triggers).
fn symbol_mapping(symbol: char) -> Result<Option<Mapping>, UnknownSymbol> {
    let mapping = match symbol {
        '0' => None,
        '1' => map(0, 0),
        '2' => map(1, 0),
        '3' => map(2, 0),
        '4' => map(3, 0),
        '5' => map(4, 0),
        '6' => map(5, 0),
        '7' => map(6, 0),
        '8' => map(7, 0),
        '9' => map(8, 0),
        'A' => map(9, 0),
        'B' => map(10, 0),
        'C' => map(11, 0),
        'D' => map(12, 0),
        'E' => map(13, 1),
        'F' => map(14, 1),
        'G' => map(15, 1),
        'H' => map(16, 1),
        'I' => map(17, 2),
        'J' => map(18, 2),
        'K' => map(19, 1),
        'L' => map(20, 1),
        'M' => map(21, 2),
        'N' => map(22, 2),
        'O' => map(23, 2),
        'P' => map(24, 2),
        'Q' => map(25, 2),
        'R' => map(26, 2),
        'S' => map(27, 2),
        'T' => map(28, 2),
        'U' => map(29, 0),
        'V' => map(30, 0),
        'W' => map(31, 0),
        'X' => map(32, 0),
        'Y' => map(33, 0),
        'Z' => map(34, 0),
        'a' => map(35, 0),
        'b' => map(36, 0),
        other => return Err(UnknownSymbol(other)),
    };
    Ok(mapping)
}

/// Layout symbols the authoring tools use by name.
pub mod symbols {
    pub const EMPTY: char = '0';
    pub const BLOCK: char = '1';
    pub const SPIKE: char = 'E';
    pub const YELLOW_RING: char = 'I';
    pub const CYAN_RING: char = 'J';
    pub const CUBE_PORTAL: char = 'M';
    pub const SHIP_PORTAL: char = 'N';
    pub const BALL_PORTAL: char = 'O';
    pub const UFO_PORTAL: char = 'P';
    pub const WAVE_PORTAL: char = 'Q';
    pub const NORMAL_GRAVITY_PORTAL: char = 'R';
    pub const FLIP_GRAVITY_PORTAL: char = 'S';
    pub const COIN: char = 'T';
}

#[derive(Debug)]
struct UnknownSymbol(char);

/// What an object type index means to collision and triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Block,
    Spike,
    YellowRing,
    CyanRing,
    ModePortal(Mode),
    GravityPortal { flipped: bool },
    Coin,
}

impl ObjectKind {
    /// Classification of an object type index produced by the symbol table.
    pub fn of(object_index: usize) -> Self {
        match object_index {
            13..=16 | 19..=20 => ObjectKind::Spike,
            17 => ObjectKind::YellowRing,
            18 => ObjectKind::CyanRing,
            21 => ObjectKind::ModePortal(Mode::Cube),
            22 => ObjectKind::ModePortal(Mode::Ship),
            23 => ObjectKind::ModePortal(Mode::Ball),
            24 => ObjectKind::ModePortal(Mode::Ufo),
            25 => ObjectKind::ModePortal(Mode::Wave),
            26 => ObjectKind::GravityPortal { flipped: false },
            27 => ObjectKind::GravityPortal { flipped: true },
            28 => ObjectKind::Coin,
            _ => ObjectKind::Block,
        }
    }

    /// Solid geometry collides; everything else is a trigger volume.
    pub fn is_solid(&self) -> bool {
        matches!(self, ObjectKind::Block)
    }
}

/// Symbol for the mode portal leading into `mode`.
pub fn mode_portal_symbol(mode: Mode) -> char {
    match mode {
        Mode::Cube => symbols::CUBE_PORTAL,
        Mode::Ship => symbols::SHIP_PORTAL,
        Mode::Ball => symbols::BALL_PORTAL,
        Mode::Ufo => symbols::UFO_PORTAL,
        Mode::Wave => symbols::WAVE_PORTAL,
    }
}

/// Decode failures are fatal content errors, reported with the offending
/// cell so the authoring gap can be found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("unmapped layout symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        col: usize,
    },
}

/// One decoded placement instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub object_index: usize,
    pub parent_group: usize,
    pub pos: Vec2,
}

/// Decode a layout into placements for a chunk anchored at `base_x`.
/// Empty cells emit nothing; the result order is row-major.
pub fn decode(layout: &ChunkLayout, base_x: f32) -> Result<Vec<Placement>, LayoutError> {
    let mut placements = Vec::new();
    for (row, line) in layout.rows().enumerate() {
        for (col, symbol) in line.chars().enumerate() {
            let mapping = symbol_mapping(symbol).map_err(|UnknownSymbol(symbol)| {
                LayoutError::UnknownSymbol { symbol, row, col }
            })?;
            if let Some(mapping) = mapping {
                placements.push(Placement {
                    object_index: mapping.object_index,
                    parent_group: mapping.parent_group,
                    pos: cell_to_world(base_x, row, col),
                });
            }
        }
    }
    Ok(placements)
}
