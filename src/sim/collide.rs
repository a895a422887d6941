//! Contact generation between the player and resident obstacles
//!
//! Grid-aligned AABB sweep, run once per fixed step after integration.
//! Solid contacts are resolved positionally and classified through the
//! player's contact policy; trigger volumes (spikes, rings, portals,
//! coins) are reported for the tick to act on.

use glam::Vec2;

use super::layout::ObjectKind;
use super::player::{Player, SurfaceTag};
use super::stream::Streamer;
use crate::consts::{CEILING_Y, CELL_HALF, FLOOR_Y, SPIKE_HALF};

const CONTACT_EPS: f32 = 1e-4;

/// Everything the collision pass observed in one fixed step.
#[derive(Debug, Default)]
pub struct StepContacts {
    /// A hazard or wrong-side solid contact happened
    pub lethal: bool,
    /// Coins overlapped this step, as (chunk sequence, obstacle index)
    pub coins: Vec<(i64, usize)>,
    /// Portal volumes overlapped this step
    pub portals: Vec<ObjectKind>,
    pub yellow_ring: bool,
    pub cyan_ring: bool,
}

fn overlap(player_pos: Vec2, player_half: f32, center: Vec2, half: f32) -> bool {
    (player_pos.x - center.x).abs() < player_half + half
        && (player_pos.y - center.y).abs() < player_half + half
}

/// Resolve solids, clamp to the track bounds, and gather triggers.
pub fn step(player: &mut Player, streamer: &Streamer) -> StepContacts {
    let mut contacts = StepContacts::default();
    let half = player.half_extent();

    player.clear_ground_contact();

    // Track bounds. The floor and ceiling strips carry the literal Ground
    // tag; which one supports depends on the flip state, but both clamp.
    if player.pos.y - half <= FLOOR_Y + CONTACT_EPS {
        player.pos.y = FLOOR_Y + half;
        if player.vy < 0.0 {
            player.vy = 0.0;
        }
        if !player.flipped || player.mode == super::player::Mode::Wave {
            player.classify_contact(SurfaceTag::Ground, Vec2::new(0.0, 1.0));
        }
    }
    if player.pos.y + half >= CEILING_Y - CONTACT_EPS {
        player.pos.y = CEILING_Y - half;
        if player.vy > 0.0 {
            player.vy = 0.0;
        }
        if player.flipped || player.mode == super::player::Mode::Wave {
            player.classify_contact(SurfaceTag::Ground, Vec2::new(0.0, -1.0));
        }
    }

    // Solid geometry: resolve each overlap along its shallow axis and
    // average the push-out normals for the contact policy, matching how a
    // physics engine reports multi-point contacts.
    let mut normal_sum = Vec2::ZERO;
    let mut solid_hits = 0u32;
    for chunk in streamer.resident() {
        for obstacle in &chunk.obstacles {
            if !obstacle.kind.is_solid() {
                continue;
            }
            if (obstacle.pos.x - player.pos.x).abs() > 2.0 {
                continue;
            }
            let dx = player.pos.x - obstacle.pos.x;
            let dy = player.pos.y - obstacle.pos.y;
            let pen_x = (half + CELL_HALF) - dx.abs();
            let pen_y = (half + CELL_HALF) - dy.abs();
            if pen_x <= 0.0 || pen_y <= 0.0 {
                continue;
            }
            if pen_x < pen_y {
                let sign = if dx >= 0.0 { 1.0 } else { -1.0 };
                player.pos.x += sign * pen_x;
                normal_sum += Vec2::new(sign, 0.0);
            } else {
                let sign = if dy >= 0.0 { 1.0 } else { -1.0 };
                player.pos.y += sign * pen_y;
                if sign * player.vy < 0.0 {
                    player.vy = 0.0;
                }
                normal_sum += Vec2::new(0.0, sign);
            }
            solid_hits += 1;
        }
    }
    if solid_hits > 0 {
        let avg_normal = normal_sum.normalize_or_zero();
        if player.classify_contact(SurfaceTag::Block, avg_normal)
            == super::player::ContactResponse::Lethal
        {
            contacts.lethal = true;
        }
    }

    // Trigger volumes
    let mut yellow = false;
    let mut cyan = false;
    for chunk in streamer.resident() {
        for (index, obstacle) in chunk.obstacles.iter().enumerate() {
            if obstacle.kind.is_solid() || obstacle.collected {
                continue;
            }
            if (obstacle.pos.x - player.pos.x).abs() > 2.0 {
                continue;
            }
            let trigger_half = match obstacle.kind {
                ObjectKind::Spike => SPIKE_HALF,
                _ => CELL_HALF,
            };
            if !overlap(player.pos, half, obstacle.pos, trigger_half) {
                continue;
            }
            match obstacle.kind {
                ObjectKind::Spike => contacts.lethal = true,
                ObjectKind::YellowRing => yellow = true,
                ObjectKind::CyanRing => cyan = true,
                ObjectKind::ModePortal(_) | ObjectKind::GravityPortal { .. } => {
                    contacts.portals.push(obstacle.kind);
                }
                ObjectKind::Coin => contacts.coins.push((chunk.sequence, index)),
                ObjectKind::Block => {}
            }
        }
    }
    contacts.yellow_ring = yellow;
    contacts.cyan_ring = cyan;
    player.set_ring_overlap(yellow, cyan);

    contacts
}
