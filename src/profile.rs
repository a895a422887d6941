//! Persistent player profile
//!
//! Score, currency, quest, and cosmetic bookkeeping folded in at the
//! game-over boundary. The profile is plain serde data; where it lives is
//! the `ProfileStore` collaborator's business.

use serde::{Deserialize, Serialize};

use crate::sim::Mode;

/// Quest tier targets and their completion titles.
pub const PLAY_QUEST_TIERS: [i64; 3] = [3, 6, 9];
pub const COINS_QUEST_TIERS: [i64; 3] = [150, 300, 450];
pub const SCORE_QUEST_TIERS: [i64; 3] = [1500, 3000, 4500];

const PLAY_QUEST_TITLES: [&str; 3] = ["Warming Up", "Getting the Hang of It", "Game Veteran"];
const COINS_QUEST_TITLES: [&str; 3] = ["Coin Collector", "Treasure Hunter", "Gold Hoarder"];
const SCORE_QUEST_TITLES: [&str; 3] = ["Point Chaser", "Score Master", "Legendary Scorer"];

/// One quest track. A zero target means no quest is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub total: i64,
    pub progress: i64,
}

impl Quest {
    /// Advance an active quest; returns the completion title the first
    /// time the target is reached.
    fn advance(&mut self, amount: i64, tiers: &[i64; 3], titles: &[&'static str; 3]) -> Option<&'static str> {
        if self.total > 0 && self.progress < self.total {
            self.progress += amount;
            if self.progress >= self.total {
                let index = tiers.iter().position(|t| *t == self.total)?;
                return Some(titles[index]);
            }
        }
        None
    }
}

/// Ownership/equipped flags for one cosmetic item. This is the whole
/// interface the core has to cosmetics; how a storefront encodes them is
/// not its concern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemState {
    pub owned: bool,
    pub equipped: bool,
}

/// Index of the equipped item in a slot list, defaulting to the first.
pub fn equipped_index(items: &[ItemState]) -> usize {
    items.iter().position(|item| item.equipped).unwrap_or(0)
}

/// Everything that survives between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub highscore: i64,
    /// Spendable balance
    pub coins: i64,
    /// Lifetime coins earned
    pub total_coins: i64,
    pub highest_game_coins: u32,
    pub total_score: i64,
    pub total_time: f32,
    pub games_played: u32,
    pub revives_done: u32,

    pub music_volume: f32,
    pub sfx_volume: f32,

    pub play_quest: Quest,
    pub coins_quest: Quest,
    pub score_quest: Quest,

    /// Icon cosmetics, one slot list per mode (enum order)
    pub icons: Vec<Vec<ItemState>>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        let default_slot = || {
            vec![ItemState {
                owned: true,
                equipped: true,
            }]
        };
        Self {
            highscore: 0,
            coins: 0,
            total_coins: 0,
            highest_game_coins: 0,
            total_score: 0,
            total_time: 0.0,
            games_played: 0,
            revives_done: 0,
            music_volume: 1.0,
            sfx_volume: 1.0,
            play_quest: Quest::default(),
            coins_quest: Quest::default(),
            score_quest: Quest::default(),
            icons: (0..Mode::ALL.len()).map(|_| default_slot()).collect(),
        }
    }
}

impl PlayerProfile {
    /// Fold a finished run into the profile. Returns the titles of quests
    /// this run completed, for the caller to toast.
    pub fn apply_run(&mut self, score: i64, coins: u32, time: f32) -> Vec<&'static str> {
        self.highscore = self.highscore.max(score);
        self.coins += coins as i64;
        self.total_coins += coins as i64;
        self.highest_game_coins = self.highest_game_coins.max(coins);
        self.total_score += score;
        self.total_time += time;
        self.games_played += 1;

        let mut completed = Vec::new();
        completed.extend(self.play_quest.advance(1, &PLAY_QUEST_TIERS, &PLAY_QUEST_TITLES));
        completed.extend(self.coins_quest.advance(
            coins as i64,
            &COINS_QUEST_TIERS,
            &COINS_QUEST_TITLES,
        ));
        completed.extend(self.score_quest.advance(score, &SCORE_QUEST_TIERS, &SCORE_QUEST_TITLES));
        completed
    }

    /// Equipped icon index for a mode's slot list.
    pub fn equipped_icon(&self, mode: Mode) -> usize {
        let slot = Mode::ALL.iter().position(|m| *m == mode).unwrap_or(0);
        self.icons.get(slot).map(|items| equipped_index(items)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_run_accumulates() {
        let mut profile = PlayerProfile::default();
        profile.apply_run(120, 7, 30.0);
        profile.apply_run(80, 3, 15.0);

        assert_eq!(profile.highscore, 120);
        assert_eq!(profile.coins, 10);
        assert_eq!(profile.total_coins, 10);
        assert_eq!(profile.highest_game_coins, 7);
        assert_eq!(profile.total_score, 200);
        assert_eq!(profile.games_played, 2);
    }

    #[test]
    fn test_quest_completes_exactly_once() {
        let mut profile = PlayerProfile {
            play_quest: Quest {
                total: 3,
                progress: 0,
            },
            ..PlayerProfile::default()
        };

        assert!(profile.apply_run(0, 0, 1.0).is_empty());
        assert!(profile.apply_run(0, 0, 1.0).is_empty());
        assert_eq!(profile.apply_run(0, 0, 1.0), vec!["Warming Up"]);
        // Already complete: no duplicate toast
        assert!(profile.apply_run(0, 0, 1.0).is_empty());
    }

    #[test]
    fn test_coin_and_score_quests_track_amounts() {
        let mut profile = PlayerProfile {
            coins_quest: Quest {
                total: 150,
                progress: 0,
            },
            score_quest: Quest {
                total: 1500,
                progress: 0,
            },
            ..PlayerProfile::default()
        };

        let completed = profile.apply_run(1400, 100, 10.0);
        assert!(completed.is_empty());

        let completed = profile.apply_run(200, 60, 10.0);
        assert_eq!(completed, vec!["Coin Collector", "Point Chaser"]);
    }

    #[test]
    fn test_equipped_index_defaults_to_first() {
        let items = vec![
            ItemState {
                owned: true,
                equipped: false,
            },
            ItemState {
                owned: true,
                equipped: true,
            },
        ];
        assert_eq!(equipped_index(&items), 1);
        assert_eq!(equipped_index(&[]), 0);

        let profile = PlayerProfile::default();
        assert_eq!(profile.equipped_icon(Mode::Wave), 0);
    }

    #[test]
    fn test_profile_serde_round_trip() {
        let mut profile = PlayerProfile::default();
        profile.apply_run(55, 4, 12.0);
        let json = serde_json::to_string(&profile).unwrap();
        let back: PlayerProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
