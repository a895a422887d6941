//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable-rate update for input/streaming decisions, fixed timestep for
//!   force and velocity integration
//! - Seeded RNG only (injected at the chunk-selector boundary)
//! - Single logical thread; no platform dependencies

pub mod checkpoint;
pub mod collide;
pub mod layout;
pub mod player;
pub mod select;
pub mod state;
pub mod stream;
pub mod tick;

pub use checkpoint::{Checkpoint, ReviveCheckpoint};
pub use collide::StepContacts;
pub use layout::{decode, LayoutError, ObjectKind, Placement};
pub use player::{ContactResponse, Mode, Player, SurfaceTag, TouchInput};
pub use select::{ChunkSelector, Selection};
pub use state::{FrameInput, GamePhase, GameState, Touch, TouchPhase};
pub use stream::{Chunk, PlacedObstacle, RunError, Streamer};
pub use tick::{fixed_tick, update, RunEvent};
