//! Obstacle chunk streaming
//!
//! Keeps a fixed window of instantiated chunks alive around the camera:
//! the hand-authored start chunk plus a pre-seeded lookahead at init, then
//! exactly one eviction per advance as the camera crosses each chunk
//! boundary, so the resident window never grows or gaps.

use std::collections::VecDeque;

use thiserror::Error;

use super::layout::{self, ObjectKind};
use super::player::Mode;
use super::select::ChunkSelector;
use crate::consts::{CHUNK_WIDTH, PRESEED_CHUNKS, START_SEQUENCE};
use crate::content::{ContentError, ContentSource};
use crate::services::{SpawnHandle, Spawner};

/// Errors that abort the current run. Both classes are content faults:
/// skipping past them would desync the sequence counter from the
/// instantiated geometry.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Layout(#[from] layout::LayoutError),
}

/// One instantiated obstacle, owned by its chunk.
#[derive(Debug, Clone, Copy)]
pub struct PlacedObstacle {
    pub object_index: usize,
    pub parent_group: usize,
    pub pos: glam::Vec2,
    pub kind: ObjectKind,
    pub handle: SpawnHandle,
    /// Coins are released mid-life on collection; eviction skips them
    pub collected: bool,
}

/// One resident unit of obstacle geometry.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub sequence: i64,
    pub obstacles: Vec<PlacedObstacle>,
}

/// The streaming window over the endless track.
#[derive(Debug)]
pub struct Streamer {
    resident: VecDeque<Chunk>,
    selector: ChunkSelector,
    /// Mode the generator predicts at the far edge of the last chunk
    gen_mode: Mode,
    gen_flipped: bool,
    /// Sequence index of the most recently generated chunk
    last_sequence: i64,
}

impl Streamer {
    pub fn new(seed: u64) -> Self {
        Self {
            resident: VecDeque::new(),
            selector: ChunkSelector::new(seed),
            gen_mode: Mode::Cube,
            gen_flipped: false,
            last_sequence: START_SEQUENCE - 1,
        }
    }

    /// Place the authored start chunk, then pre-seed the lookahead.
    pub fn initialize(
        &mut self,
        content: &dyn ContentSource,
        spawner: &mut dyn Spawner,
    ) -> Result<(), RunError> {
        let layout = content.start_chunk()?;
        self.instantiate(layout, START_SEQUENCE, spawner)?;
        for _ in 0..PRESEED_CHUNKS {
            self.advance(content, spawner)?;
        }
        Ok(())
    }

    /// Generate and instantiate the next chunk in sequence.
    pub fn advance(
        &mut self,
        content: &dyn ContentSource,
        spawner: &mut dyn Spawner,
    ) -> Result<(), RunError> {
        let sequence = self.last_sequence + 1;
        let selection = self
            .selector
            .select_next(self.gen_mode, self.gen_flipped, sequence);
        let layout = content.chunk(&selection.key)?;
        log::debug!("chunk {} <- {}", sequence, selection.key.path());
        self.instantiate(layout, sequence, spawner)?;
        self.gen_mode = selection.mode;
        self.gen_flipped = selection.flipped;
        Ok(())
    }

    fn instantiate(
        &mut self,
        layout: &crate::content::ChunkLayout,
        sequence: i64,
        spawner: &mut dyn Spawner,
    ) -> Result<(), RunError> {
        let base_x = sequence as f32 * CHUNK_WIDTH;
        let placements = layout::decode(layout, base_x)?;
        let obstacles = placements
            .into_iter()
            .map(|p| {
                let handle = spawner.spawn(p.object_index, p.pos, p.parent_group);
                PlacedObstacle {
                    object_index: p.object_index,
                    parent_group: p.parent_group,
                    pos: p.pos,
                    kind: ObjectKind::of(p.object_index),
                    handle,
                    collected: false,
                }
            })
            .collect();
        self.resident.push_back(Chunk {
            sequence,
            obstacles,
        });
        self.last_sequence = sequence;
        Ok(())
    }

    /// Drop the oldest resident chunk and release its obstacles.
    pub fn evict(&mut self, spawner: &mut dyn Spawner) {
        if let Some(chunk) = self.resident.pop_front() {
            for obstacle in &chunk.obstacles {
                if !obstacle.collected {
                    spawner.release(obstacle.handle);
                }
            }
        }
    }

    /// Recycle once the camera is a full chunk past the window's anchor:
    /// eviction always precedes its paired advance, keeping the window
    /// size constant.
    pub fn tick(
        &mut self,
        camera_x: f32,
        content: &dyn ContentSource,
        spawner: &mut dyn Spawner,
    ) -> Result<(), RunError> {
        if camera_x > (self.last_sequence - 1) as f32 * CHUNK_WIDTH {
            self.evict(spawner);
            self.advance(content, spawner)?;
        }
        Ok(())
    }

    /// Release everything resident (run teardown).
    pub fn clear(&mut self, spawner: &mut dyn Spawner) {
        while !self.resident.is_empty() {
            self.evict(spawner);
        }
    }

    pub fn resident(&self) -> impl Iterator<Item = &Chunk> {
        self.resident.iter()
    }

    pub fn resident_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.resident.iter_mut()
    }

    pub fn resident_len(&self) -> usize {
        self.resident.len()
    }

    /// Sequence index of the most recently generated chunk.
    pub fn last_sequence(&self) -> i64 {
        self.last_sequence
    }

    pub fn resident_sequences(&self) -> Vec<i64> {
        self.resident.iter().map(|c| c.sequence).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::authoring;
    use crate::services::CountingSpawner;
    use proptest::prelude::*;

    fn setup() -> (crate::content::StaticCatalog, CountingSpawner, Streamer) {
        (
            authoring::generate_catalog(),
            CountingSpawner::new(),
            Streamer::new(42),
        )
    }

    #[test]
    fn test_initialize_preseeds_window() {
        let (catalog, mut spawner, mut streamer) = setup();
        streamer.initialize(&catalog, &mut spawner).unwrap();
        assert_eq!(streamer.resident_sequences(), vec![-1, 0, 1, 2]);
        assert_eq!(streamer.last_sequence(), 2);
    }

    #[test]
    fn test_first_recycle_at_one_chunk_width() {
        let (catalog, mut spawner, mut streamer) = setup();
        streamer.initialize(&catalog, &mut spawner).unwrap();

        // Camera inside the start chunk: no recycle yet
        streamer.tick(0.0, &catalog, &mut spawner).unwrap();
        streamer.tick(21.0, &catalog, &mut spawner).unwrap();
        assert_eq!(streamer.resident_sequences(), vec![-1, 0, 1, 2]);

        // Past one chunk width: the start chunk goes, sequence 3 arrives
        streamer.tick(21.1, &catalog, &mut spawner).unwrap();
        assert_eq!(streamer.resident_sequences(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_sequence_strictly_increments() {
        let (catalog, mut spawner, mut streamer) = setup();
        streamer.initialize(&catalog, &mut spawner).unwrap();
        let mut last = streamer.last_sequence();
        for _ in 0..50 {
            streamer.advance(&catalog, &mut spawner).unwrap();
            assert_eq!(streamer.last_sequence(), last + 1);
            last = streamer.last_sequence();
        }
    }

    #[test]
    fn test_evict_releases_every_obstacle() {
        let (catalog, mut spawner, mut streamer) = setup();
        streamer.initialize(&catalog, &mut spawner).unwrap();

        let resident: usize = streamer.resident().map(|c| c.obstacles.len()).sum();
        assert_eq!(spawner.live.len(), resident);

        let front: usize = streamer.resident().next().unwrap().obstacles.len();
        streamer.evict(&mut spawner);
        assert_eq!(spawner.live.len(), resident - front);
    }

    #[test]
    fn test_content_miss_is_fatal_and_does_not_advance() {
        let catalog = crate::content::StaticCatalog::new();
        let mut spawner = CountingSpawner::new();
        let mut streamer = Streamer::new(1);
        let err = streamer.initialize(&catalog, &mut spawner).unwrap_err();
        assert!(matches!(err, RunError::Content(_)));
        assert_eq!(streamer.last_sequence(), START_SEQUENCE - 1);
        assert_eq!(streamer.resident_len(), 0);
    }

    #[test]
    fn test_clear_releases_everything() {
        let (catalog, mut spawner, mut streamer) = setup();
        streamer.initialize(&catalog, &mut spawner).unwrap();
        streamer.clear(&mut spawner);
        assert!(spawner.live.is_empty());
        assert_eq!(streamer.resident_len(), 0);
    }

    proptest! {
        /// Window invariant under arbitrary monotone camera advances:
        /// bounded size, contiguous sequences, no duplicates, and the
        /// window keeps two chunk-widths of lookahead ahead of the camera.
        #[test]
        fn window_invariant_under_monotone_camera(steps in prop::collection::vec(0.1f32..9.0, 1..200)) {
            let (catalog, mut spawner, mut streamer) = setup();
            streamer.initialize(&catalog, &mut spawner).unwrap();

            let mut camera_x = 0.0f32;
            for step in steps {
                camera_x += step;
                streamer.tick(camera_x, &catalog, &mut spawner).unwrap();

                let sequences = streamer.resident_sequences();
                prop_assert!(sequences.len() <= 4);
                for pair in sequences.windows(2) {
                    prop_assert_eq!(pair[1], pair[0] + 1);
                }
                // Lookahead: the newest chunk's base never falls behind the camera
                let newest = *sequences.last().unwrap();
                prop_assert!(newest as f32 * CHUNK_WIDTH >= camera_x);
            }
        }
    }
}
