//! Cube Dash - an endless side-scrolling obstacle runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (streaming, player modes, collisions)
//! - `content`: Chunk catalog addressing and layout storage
//! - `tuning`: Data-driven game balance
//! - `profile`: Persistent player profile bookkeeping
//! - `services`: Spawn/notification/storage collaborator traits
//! - `game`: Frame loop binding the sim to the collaborators

pub mod content;
pub mod game;
pub mod profile;
pub mod services;
pub mod sim;
pub mod tuning;

pub use content::{ChunkKey, ContentSource, StaticCatalog};
pub use game::Game;
pub use profile::PlayerProfile;
pub use sim::{GamePhase, GameState, Mode};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// One chunk of obstacle geometry spans 21 world units
    pub const CHUNK_WIDTH: f32 = 21.0;
    /// Columns per chunk grid
    pub const CHUNK_COLS: usize = 21;
    /// Rows per chunk grid
    pub const GRID_ROWS: usize = 10;
    /// Horizontal offset from a chunk's base to its first column center
    pub const COLUMN_OFFSET: f32 = 10.5;
    /// Vertical offset placing row 0 at the top of the track
    pub const ROW_OFFSET: f32 = 4.5;

    /// Sequence index of the hand-authored start chunk
    pub const START_SEQUENCE: i64 = -1;
    /// Lookahead chunks generated at init beyond the start chunk
    pub const PRESEED_CHUNKS: u32 = 3;

    /// Base gravitational acceleration, scaled per mode
    pub const GRAVITY: f32 = 9.81;
    /// Top surface of the floor strip
    pub const FLOOR_Y: f32 = -5.0;
    /// Bottom surface of the ceiling strip
    pub const CEILING_Y: f32 = 5.0;

    /// Half the camera's horizontal view
    pub const CAMERA_HALF_WIDTH: f32 = 8.9;
    /// How far behind the right view edge the player rides
    pub const CAMERA_LEAD: f32 = 6.0;

    /// Player collider half extent (all modes except Wave)
    pub const PLAYER_HALF: f32 = 0.475;
    /// Wave form is half-size
    pub const WAVE_PLAYER_HALF: f32 = 0.25;
    /// Grid cell half extent for solid blocks and triggers
    pub const CELL_HALF: f32 = 0.5;
    /// Spikes use a forgiving hitbox
    pub const SPIKE_HALF: f32 = 0.35;

    /// Player spawn / initial safe position
    pub const START_X: f32 = -13.5;
}

/// World position of a grid cell in a chunk anchored at `base_x`.
///
/// Row 0 is the topmost row; the vertical coordinate decreases with the row
/// index so a 10-row grid straddles the track centerline.
#[inline]
pub fn cell_to_world(base_x: f32, row: usize, col: usize) -> Vec2 {
    Vec2::new(
        base_x + col as f32 + consts::COLUMN_OFFSET,
        -(row as f32) + consts::ROW_OFFSET,
    )
}

/// Camera x for a given player x (never retreats past the origin).
#[inline]
pub fn camera_for_player(player_x: f32) -> f32 {
    (player_x + consts::CAMERA_HALF_WIDTH - consts::CAMERA_LEAD).max(0.0)
}
