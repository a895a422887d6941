//! Player movement modes
//!
//! Five movement archetypes share one body; the gravity-flip sub-state is
//! orthogonal to all of them. Mode and gravity portals absolute-set their
//! target state, rings are one-shot boosts gated by a latched orb buffer,
//! and every transition's visual side effects run from a single table so
//! a revive can replay them exactly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::checkpoint::Checkpoint;
use crate::consts::{GRAVITY, PLAYER_HALF, START_X, WAVE_PLAYER_HALF};
use crate::tuning::Tuning;

/// Player movement archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Cube,
    Ship,
    Ball,
    Ufo,
    Wave,
}

impl Mode {
    pub const ALL: [Mode; 5] = [Mode::Cube, Mode::Ship, Mode::Ball, Mode::Ufo, Mode::Wave];

    /// The other four modes, in enum order. Chunk selection indexes into
    /// this list, so the order is part of the generation contract.
    pub fn others(self) -> [Mode; 4] {
        match self {
            Mode::Cube => [Mode::Ship, Mode::Ball, Mode::Ufo, Mode::Wave],
            Mode::Ship => [Mode::Cube, Mode::Ball, Mode::Ufo, Mode::Wave],
            Mode::Ball => [Mode::Cube, Mode::Ship, Mode::Ufo, Mode::Wave],
            Mode::Ufo => [Mode::Cube, Mode::Ship, Mode::Ball, Mode::Wave],
            Mode::Wave => [Mode::Cube, Mode::Ship, Mode::Ball, Mode::Ufo],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Cube => "Cube",
            Mode::Ship => "Ship",
            Mode::Ball => "Ball",
            Mode::Ufo => "UFO",
            Mode::Wave => "Wave",
        }
    }
}

/// Touch input for one variable-rate update, already filtered so taps on
/// UI controls never reach gameplay.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchInput {
    pub held: bool,
    pub began: bool,
    pub ended: bool,
}

/// Visual side-effect state toggled by mode/gravity transitions. The sim
/// owns it so a revive replays transitions bit-exactly; the renderer only
/// reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    /// Sprite set currently shown
    pub sprite: Mode,
    /// Wave trail renderer enabled
    pub trail: bool,
    /// Booster attachment shown (Ship and UFO carry one)
    pub booster: bool,
    /// Sprite mirrored vertically (Ship/UFO under flipped gravity)
    pub mirrored: bool,
    /// Body scale (Wave shrinks the collider and sprite)
    pub scale: f32,
    /// Ambient particle emitter running
    pub particles: bool,
}

impl VisualState {
    fn cube() -> Self {
        Self {
            sprite: Mode::Cube,
            trail: false,
            booster: false,
            mirrored: false,
            scale: 0.95,
            particles: true,
        }
    }
}

/// Solid surfaces the player can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceTag {
    /// The literal floor/ceiling strips
    Ground,
    /// Authored solid obstacle geometry
    Block,
}

/// Outcome of classifying a solid contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactResponse {
    Grounded,
    Lethal,
    None,
}

/// The player body and its movement state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// Vertical velocity; forward velocity is policy-fixed per step
    pub vy: f32,
    pub mode: Mode,
    pub flipped: bool,
    pub grounded: bool,
    /// Hold state for Ship ascent and Wave climb
    pub flying: bool,
    /// One-shot latched tap, armed on touch-begin while airborne and spent
    /// on the first qualifying ring (Cube/Ball only)
    orb_buffer: bool,
    on_yellow_ring: bool,
    on_cyan_ring: bool,
    pub visual: VisualState,
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(START_X, 0.0),
            vy: 0.0,
            mode: Mode::Cube,
            flipped: false,
            grounded: false,
            flying: false,
            orb_buffer: false,
            on_yellow_ring: false,
            on_cyan_ring: false,
            visual: VisualState::cube(),
        }
    }

    /// Collider half extent for the current mode.
    pub fn half_extent(&self) -> f32 {
        if self.mode == Mode::Wave {
            WAVE_PLAYER_HALF
        } else {
            PLAYER_HALF
        }
    }

    /// Signed gravity direction: -1 pulls down under normal gravity.
    fn gravity_sign(&self) -> f32 {
        if self.flipped { 1.0 } else { -1.0 }
    }

    /// Variable-rate update: interpret touch input for the current mode
    /// and consume any banked ring boosts.
    pub fn update(&mut self, touch: TouchInput, tuning: &Tuning) {
        let profile = *tuning.profile(self.mode);
        match self.mode {
            Mode::Cube => {
                if self.grounded {
                    self.orb_buffer = false;
                    if touch.held {
                        self.jump(profile.jump_impulse);
                        self.grounded = false;
                    }
                } else {
                    self.latch_orb_buffer(touch);
                }
                self.consume_rings(profile.jump_impulse, profile.gravity_scale);
            }
            Mode::Ship => {
                self.flying = touch.held;
            }
            Mode::Ball => {
                self.latch_orb_buffer(touch);
                if self.grounded && self.orb_buffer {
                    self.flip_gravity(profile.gravity_scale);
                    self.grounded = false;
                    self.orb_buffer = false;
                }
                self.consume_rings(profile.jump_impulse, profile.gravity_scale);
            }
            Mode::Ufo => {
                if touch.began {
                    self.jump(profile.jump_impulse);
                }
            }
            Mode::Wave => {
                let speed = tuning.forward_speed;
                if touch.held && !self.flying {
                    self.vy = if self.flipped { -speed } else { speed };
                }
                if !touch.held && self.flying {
                    self.vy = if self.flipped { speed } else { -speed };
                }
                self.flying = touch.held;
            }
        }
    }

    /// Fixed-rate update: gravity, hold forces, the per-mode vertical
    /// speed clamp, and position integration.
    pub fn fixed_update(&mut self, dt: f32, tuning: &Tuning) {
        let profile = tuning.profile(self.mode);

        self.vy += self.gravity_sign() * GRAVITY * profile.gravity_scale * dt;

        match self.mode {
            Mode::Ship => {
                if self.flying {
                    // Hold-to-ascend thrust, inverted under flipped gravity
                    self.vy -= self.gravity_sign() * profile.hold_force * dt;
                }
            }
            Mode::Wave => {
                // Wave never coasts: vertical speed is locked to the hold state
                let speed = tuning.forward_speed;
                self.vy = match (self.flying, self.flipped) {
                    (true, false) | (false, true) => speed,
                    (true, true) | (false, false) => -speed,
                };
            }
            _ => {}
        }

        if profile.max_y_speed > 0.0 {
            self.vy = self.vy.clamp(-profile.max_y_speed, profile.max_y_speed);
        }

        self.pos.x += tuning.forward_speed * dt;
        self.pos.y += self.vy * dt;
    }

    fn latch_orb_buffer(&mut self, touch: TouchInput) {
        if touch.began {
            self.orb_buffer = true;
        }
        if touch.ended {
            self.orb_buffer = false;
        }
    }

    fn consume_rings(&mut self, jump_impulse: f32, gravity_scale: f32) {
        if self.on_yellow_ring && self.orb_buffer {
            self.jump(jump_impulse);
            self.on_yellow_ring = false;
            self.orb_buffer = false;
        }
        if self.on_cyan_ring && self.orb_buffer {
            self.flip_gravity(gravity_scale);
            self.on_cyan_ring = false;
            self.orb_buffer = false;
        }
    }

    fn jump(&mut self, impulse: f32) {
        self.vy = -self.gravity_sign() * impulse;
    }

    /// Ring-style gravity toggle: inverts the flip state and gives the body
    /// a small kick toward the new gravity direction.
    fn flip_gravity(&mut self, gravity_scale: f32) {
        self.flipped = !self.flipped;
        self.vy = if self.flipped {
            gravity_scale
        } else {
            -gravity_scale
        };
    }

    /// Mode portals absolute-set the mode; re-entering the portal for the
    /// current mode is a no-op with no duplicate side effects.
    pub fn enter_mode_portal(&mut self, target: Mode) {
        if self.mode == target {
            return;
        }
        self.apply_mode_entry(target);
    }

    /// Gravity portals absolute-set the flip state (unlike rings, which
    /// toggle). Entering the portal for the current state is a no-op.
    pub fn enter_gravity_portal(&mut self, flipped: bool) {
        if self.flipped == flipped {
            return;
        }
        self.flipped = flipped;
        if matches!(self.mode, Mode::Ship | Mode::Ufo) {
            self.visual.mirrored = flipped;
        }
    }

    /// Runs the full transition-entry effects for `target`, regardless of
    /// the current mode.
    fn apply_mode_entry(&mut self, target: Mode) {
        let prev = self.mode;
        self.mode = target;
        self.orb_buffer = false;
        self.visual.sprite = target;

        // Leaving side effects
        match prev {
            Mode::Ship | Mode::Ufo => {
                self.visual.booster = false;
                self.visual.mirrored = false;
            }
            Mode::Wave => {
                self.visual.trail = false;
                self.visual.particles = true;
                self.visual.scale = 0.95;
            }
            _ => {}
        }

        // Entering side effects
        match target {
            Mode::Ship | Mode::Ufo => {
                self.visual.booster = true;
                self.visual.mirrored = self.flipped;
            }
            Mode::Wave => {
                self.visual.trail = true;
                self.visual.particles = false;
                self.visual.scale = 0.5;
                self.flying = false;
            }
            _ => {}
        }
    }

    /// Ring overlap latches; consumption happens in `update`.
    pub fn set_ring_overlap(&mut self, yellow: bool, cyan: bool) {
        self.on_yellow_ring = yellow;
        self.on_cyan_ring = cyan;
    }

    /// Classify a solid contact. Grounding is applied directly; lethal
    /// contacts are reported to the caller.
    pub fn classify_contact(&mut self, tag: SurfaceTag, avg_normal: Vec2) -> ContactResponse {
        match tag {
            SurfaceTag::Ground => {
                self.grounded = true;
                ContactResponse::Grounded
            }
            SurfaceTag::Block => {
                // Wave has no ground concept: any solid obstacle is lethal
                if self.mode == Mode::Wave {
                    return ContactResponse::Lethal;
                }
                if avg_normal.x.abs() > avg_normal.y.abs() {
                    if avg_normal.x > 0.0 {
                        self.grounded = true;
                        ContactResponse::Grounded
                    } else {
                        ContactResponse::Lethal
                    }
                } else if (avg_normal.y > 0.0) != self.flipped {
                    // Vertical contact on the gravity side counts as ground
                    self.grounded = true;
                    ContactResponse::Grounded
                } else {
                    ContactResponse::None
                }
            }
        }
    }

    /// Clear grounding when no supporting contact remains this step.
    pub fn clear_ground_contact(&mut self) {
        self.grounded = false;
    }

    /// Teleport to a checkpoint and replay the mode and gravity transition
    /// entry effects, as if freshly entering that state, so visuals and
    /// physics parameters match.
    pub fn apply_checkpoint(&mut self, checkpoint: &Checkpoint) {
        self.pos = Vec2::new(checkpoint.x, checkpoint.y);
        self.vy = 0.0;
        self.grounded = false;
        self.flying = false;
        self.orb_buffer = false;
        self.on_yellow_ring = false;
        self.on_cyan_ring = false;

        self.flipped = checkpoint.flipped;
        self.apply_mode_entry(checkpoint.mode);
        if matches!(self.mode, Mode::Ship | Mode::Ufo) {
            self.visual.mirrored = self.flipped;
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
