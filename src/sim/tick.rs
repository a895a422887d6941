//! Variable-step update and fixed-step physics
//!
//! The variable-rate update interprets input, samples checkpoints,
//! follows the camera, and drives the streaming window. The fixed-rate
//! tick integrates velocity and runs the collision pass. The revive
//! countdown is not here: it runs on the unscaled clock in the frame
//! loop, because simulated time is frozen while it counts.

use super::collide;
use super::layout::ObjectKind;
use super::state::{FrameInput, GamePhase, GameState};
use super::stream::RunError;
use crate::camera_for_player;
use crate::content::ContentSource;
use crate::services::Spawner;
use crate::tuning::Tuning;

/// Gameplay outcomes of one fixed step, for the frame loop to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    CoinCollected,
    /// A hazard was hit; the frame loop decides between revive and loss
    Fatal,
}

/// Variable-rate update. Runs once per frame while playing.
pub fn update(
    state: &mut GameState,
    input: &FrameInput,
    content: &dyn ContentSource,
    spawner: &mut dyn Spawner,
    tuning: &Tuning,
    dt: f32,
) -> Result<(), RunError> {
    if state.phase != GamePhase::Playing {
        return Ok(());
    }

    state.run_time += dt;
    state.player.update(input.gameplay_touch(), tuning);
    state
        .revive
        .maybe_checkpoint(state.player.pos.x, state.player.mode, state.player.flipped);
    state.camera_x = camera_for_player(state.player.pos.x);
    state.streamer.tick(state.camera_x, content, spawner)
}

/// Fixed-rate physics step: integration, collision, trigger responses.
pub fn fixed_tick(
    state: &mut GameState,
    spawner: &mut dyn Spawner,
    tuning: &Tuning,
    dt: f32,
) -> Vec<RunEvent> {
    let mut events = Vec::new();
    if state.phase != GamePhase::Playing {
        return events;
    }

    state.player.fixed_update(dt, tuning);
    let contacts = collide::step(&mut state.player, &state.streamer);

    for kind in &contacts.portals {
        match *kind {
            ObjectKind::ModePortal(mode) => state.player.enter_mode_portal(mode),
            ObjectKind::GravityPortal { flipped } => state.player.enter_gravity_portal(flipped),
            _ => {}
        }
    }

    for (sequence, index) in contacts.coins {
        let collected = state
            .streamer
            .resident_mut()
            .find(|chunk| chunk.sequence == sequence)
            .and_then(|chunk| chunk.obstacles.get_mut(index))
            .filter(|obstacle| !obstacle.collected)
            .map(|obstacle| {
                obstacle.collected = true;
                obstacle.handle
            });
        if let Some(handle) = collected {
            spawner.release(handle);
            state.coins += 1;
            events.push(RunEvent::CoinCollected);
        }
    }

    if contacts.lethal {
        events.push(RunEvent::Fatal);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::content::testing::UniformContent;
    use crate::services::CountingSpawner;
    use crate::sim::player::Mode;
    use crate::sim::state::{Touch, TouchPhase};
    use crate::sim::stream::PlacedObstacle;
    use glam::Vec2;

    fn new_run() -> (GameState, UniformContent, CountingSpawner, Tuning) {
        let tuning = Tuning::default();
        let content = UniformContent::blank();
        let mut spawner = CountingSpawner::new();
        let mut state = GameState::new(11, &tuning);
        state.initialize(&content, &mut spawner).unwrap();
        (state, content, spawner, tuning)
    }

    fn push_obstacle(state: &mut GameState, spawner: &mut CountingSpawner, pos: Vec2, index: usize) {
        let handle = spawner.spawn(index, pos, 0);
        state
            .streamer
            .resident_mut()
            .next()
            .unwrap()
            .obstacles
            .push(PlacedObstacle {
                object_index: index,
                parent_group: 0,
                pos,
                kind: ObjectKind::of(index),
                handle,
                collected: false,
            });
    }

    #[test]
    fn test_update_advances_camera_and_window() {
        let (mut state, catalog, mut spawner, tuning) = new_run();
        let input = FrameInput::default();

        // Run forward until well past the first chunk boundary
        for _ in 0..1200 {
            update(&mut state, &input, &catalog, &mut spawner, &tuning, SIM_DT).unwrap();
            fixed_tick(&mut state, &mut spawner, &tuning, SIM_DT);
        }
        assert!(state.camera_x > 21.0);
        assert!(state.streamer.resident_sequences()[0] >= 0);
        assert_eq!(state.streamer.resident_len(), 4);
    }

    #[test]
    fn test_checkpoint_tracks_progress() {
        let (mut state, catalog, mut spawner, tuning) = new_run();
        let input = FrameInput::default();
        let start = state.revive.restore().x;

        for _ in 0..1200 {
            update(&mut state, &input, &catalog, &mut spawner, &tuning, SIM_DT).unwrap();
            fixed_tick(&mut state, &mut spawner, &tuning, SIM_DT);
        }
        assert!(state.revive.restore().x > start);
        assert_eq!((state.revive.restore().x - start) % 21.0, 0.0);
    }

    #[test]
    fn test_coin_collection_releases_and_counts() {
        let (mut state, _catalog, mut spawner, tuning) = new_run();
        let player_pos = state.player.pos;
        push_obstacle(&mut state, &mut spawner, player_pos, 28);
        let live_before = spawner.live.len();

        let events = fixed_tick(&mut state, &mut spawner, &tuning, SIM_DT);
        assert!(events.contains(&RunEvent::CoinCollected));
        assert_eq!(state.coins, 1);
        assert_eq!(spawner.live.len(), live_before - 1);

        // A second step over the same spot collects nothing
        state.player.pos = player_pos;
        let events = fixed_tick(&mut state, &mut spawner, &tuning, SIM_DT);
        assert!(!events.contains(&RunEvent::CoinCollected));
        assert_eq!(state.coins, 1);
    }

    #[test]
    fn test_portal_overlap_switches_mode() {
        let (mut state, _catalog, mut spawner, tuning) = new_run();
        let player_pos = state.player.pos;
        // Ship portal is object index 22
        push_obstacle(&mut state, &mut spawner, player_pos, 22);

        fixed_tick(&mut state, &mut spawner, &tuning, SIM_DT);
        assert_eq!(state.player.mode, Mode::Ship);

        // Lingering in the portal is a no-op
        let snapshot = state.player.clone();
        state.player.pos = player_pos;
        state.player.vy = snapshot.vy;
        fixed_tick(&mut state, &mut spawner, &tuning, SIM_DT);
        assert_eq!(state.player.mode, Mode::Ship);
    }

    #[test]
    fn test_spike_reports_fatal() {
        let (mut state, _catalog, mut spawner, tuning) = new_run();
        let player_pos = state.player.pos;
        push_obstacle(&mut state, &mut spawner, player_pos, 13);

        let events = fixed_tick(&mut state, &mut spawner, &tuning, SIM_DT);
        assert!(events.contains(&RunEvent::Fatal));
    }

    #[test]
    fn test_paused_run_does_not_tick() {
        let (mut state, catalog, mut spawner, tuning) = new_run();
        state.phase = GamePhase::Paused;
        let pos = state.player.pos;

        let input = FrameInput {
            touch: Some(Touch {
                phase: TouchPhase::Began,
                over_ui: false,
            }),
            pause: false,
        };
        update(&mut state, &input, &catalog, &mut spawner, &tuning, SIM_DT).unwrap();
        let events = fixed_tick(&mut state, &mut spawner, &tuning, SIM_DT);
        assert!(events.is_empty());
        assert_eq!(state.player.pos, pos);
        assert_eq!(state.run_time, 0.0);
    }
}
