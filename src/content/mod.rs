//! Chunk content addressing and storage
//!
//! Authored obstacle layouts are addressed by
//! `{mode}/{difficulty}/{transition}/{variant}` paths. The catalog is
//! read-only, loaded once at startup, and a miss is a content-authoring
//! gap, not a recoverable runtime condition: streaming cannot continue
//! past a hole in the catalog without desyncing the chunk sequence.

pub mod authoring;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Mode;

/// Catalog entry for the hand-authored start chunk, addressed outside the
/// `{mode}/{difficulty}/{transition}/{variant}` scheme.
pub const START_CHUNK_PATH: &str = "start_obstacle";

/// Chunk difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// Tier for the chunk about to be generated. The ramp is a pure
    /// function of the global sequence index; the pre-seeded start chunk
    /// (negative index) stays easy.
    pub fn for_sequence(sequence: i64) -> Self {
        match sequence {
            0..=3 => Difficulty::Easy,
            4..=6 => Difficulty::Normal,
            s if s >= 7 => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];
}

/// How a chunk hands gameplay over at its boundary: same mode, a gravity
/// flip, or a transition into one of the other four modes. Authored
/// content matches the gameplay state that precedes it, so the flip state
/// going *into* the chunk is part of the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// No change; gameplay continues in the current flip state
    Stay { flipped: bool },
    /// Gravity flips inside this chunk
    FlipChange { to_flipped: bool },
    /// The player mode changes inside this chunk
    ModeChange { flipped: bool, to: Mode },
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Stay { flipped: false } => write!(f, "Normal"),
            Transition::Stay { flipped: true } => write!(f, "Flip"),
            Transition::FlipChange { to_flipped: true } => write!(f, "Normal to Flip"),
            Transition::FlipChange { to_flipped: false } => write!(f, "Flip to Normal"),
            Transition::ModeChange { flipped, to } => {
                let from = if *flipped { "Flip" } else { "Normal" };
                write!(f, "{} to {}", from, to.as_str())
            }
        }
    }
}

/// Immutable lookup key for one piece of authored chunk content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    /// Mode the content is authored for (the mode *entering* the chunk)
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub transition: Transition,
    pub variant: u8,
}

impl ChunkKey {
    /// Content address, e.g. `Cube/Easy/Normal to Flip/3`.
    pub fn path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.mode.as_str(),
            self.difficulty.as_str(),
            self.transition,
            self.variant
        )
    }
}

/// One authored obstacle grid: rows of layout symbols, row 0 topmost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkLayout {
    rows: Vec<String>,
}

impl ChunkLayout {
    pub fn new(rows: Vec<String>) -> Self {
        Self { rows }
    }

    /// Parse raw layout text; blank lines carry no cells and are dropped.
    pub fn from_text(text: &str) -> Self {
        Self {
            rows: text
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Content lookup failures. These indicate missing or unreadable authored
/// assets, and are reported distinctly from simulation bugs.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("no chunk content at {path}")]
    NotFound { path: String },
    #[error("unreadable chunk content at {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
}

/// Read-only source of chunk layouts. Swappable for a test double
/// supplying synthetic layouts.
pub trait ContentSource {
    fn chunk(&self, key: &ChunkKey) -> Result<&ChunkLayout, ContentError>;

    fn start_chunk(&self) -> Result<&ChunkLayout, ContentError>;
}

/// In-memory catalog keyed by content path. Loaded once at startup.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, ChunkLayout>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, layout: ChunkLayout) {
        self.entries.insert(path.into(), layout);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Load every layout file under `root`. Relative paths (minus a `.txt`
    /// extension, if any) become content addresses.
    pub fn load_dir(root: &Path) -> Result<Self, ContentError> {
        let mut catalog = Self::new();
        catalog.load_dir_inner(root, root)?;
        log::info!("loaded {} chunk layouts from {}", catalog.len(), root.display());
        Ok(catalog)
    }

    fn load_dir_inner(&mut self, root: &Path, dir: &Path) -> Result<(), ContentError> {
        let read_err = |source| ContentError::Unreadable {
            path: dir.display().to_string(),
            source,
        };
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let path = entry.path();
            if path.is_dir() {
                self.load_dir_inner(root, &path)?;
            } else {
                let text = fs::read_to_string(&path).map_err(|source| {
                    ContentError::Unreadable {
                        path: path.display().to_string(),
                        source,
                    }
                })?;
                let rel = path.strip_prefix(root).unwrap_or(&path).with_extension("");
                let address = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                self.insert(address, ChunkLayout::from_text(&text));
            }
        }
        Ok(())
    }
}

impl ContentSource for StaticCatalog {
    fn chunk(&self, key: &ChunkKey) -> Result<&ChunkLayout, ContentError> {
        let path = key.path();
        self.entries
            .get(&path)
            .ok_or(ContentError::NotFound { path })
    }

    fn start_chunk(&self) -> Result<&ChunkLayout, ContentError> {
        self.entries
            .get(START_CHUNK_PATH)
            .ok_or(ContentError::NotFound {
                path: START_CHUNK_PATH.to_owned(),
            })
    }
}
