//! Data-driven game balance
//!
//! Every per-mode physics constant and run policy lives here so balance
//! passes never touch simulation code. Defaults are compiled in; a JSON
//! override can be loaded at startup.

use serde::{Deserialize, Serialize};

use crate::sim::Mode;

/// Physics constants for one movement mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModeProfile {
    /// Instantaneous vertical impulse on a jump (0 for hold-driven modes)
    pub jump_impulse: f32,
    /// Continuous vertical acceleration while the input is held
    pub hold_force: f32,
    /// Vertical speed clamp applied every fixed step (0 = unclamped)
    pub max_y_speed: f32,
    /// Multiplier on base gravity (0 = never free-falls)
    pub gravity_scale: f32,
}

/// Complete balance table for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    /// Constant forward speed, re-asserted every fixed step
    pub forward_speed: f32,

    pub cube: ModeProfile,
    pub ship: ModeProfile,
    pub ball: ModeProfile,
    pub ufo: ModeProfile,
    pub wave: ModeProfile,

    /// Revives granted per run
    pub revive_chances: u8,
    /// Revive window length in unscaled seconds
    pub revive_countdown: f32,
    /// Seconds shaved off the window per gameplay tap
    pub revive_tap_skip: f32,
    /// Profile-coin price of a purchased revive
    pub revive_coin_cost: i64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            forward_speed: 6.0,
            cube: ModeProfile {
                jump_impulse: 25.0,
                hold_force: 0.0,
                max_y_speed: 12.25,
                gravity_scale: 3.25,
            },
            ship: ModeProfile {
                jump_impulse: 0.0,
                hold_force: 40.0,
                max_y_speed: 6.0,
                gravity_scale: 1.5,
            },
            ball: ModeProfile {
                jump_impulse: 9.5,
                hold_force: 0.0,
                max_y_speed: 12.25,
                gravity_scale: 2.25,
            },
            ufo: ModeProfile {
                jump_impulse: 10.0,
                hold_force: 0.0,
                max_y_speed: 6.0,
                gravity_scale: 1.5,
            },
            wave: ModeProfile {
                jump_impulse: 0.0,
                hold_force: 0.0,
                max_y_speed: 0.0,
                gravity_scale: 0.0,
            },
            revive_chances: 2,
            revive_countdown: 5.0,
            revive_tap_skip: 2.0,
            revive_coin_cost: 200,
        }
    }
}

impl Tuning {
    /// Balance table for the given mode.
    pub fn profile(&self, mode: Mode) -> &ModeProfile {
        match mode {
            Mode::Cube => &self.cube,
            Mode::Ship => &self.ship,
            Mode::Ball => &self.ball,
            Mode::Ufo => &self.ufo,
            Mode::Wave => &self.wave,
        }
    }

    /// Parse a JSON balance override.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_never_free_falls() {
        let tuning = Tuning::default();
        assert_eq!(tuning.profile(Mode::Wave).gravity_scale, 0.0);
        assert_eq!(tuning.profile(Mode::Wave).max_y_speed, 0.0);
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = serde_json::to_string(&tuning).unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back.forward_speed, tuning.forward_speed);
        assert_eq!(back.cube.jump_impulse, tuning.cube.jump_impulse);
        assert_eq!(back.revive_chances, tuning.revive_chances);
    }
}
