//! External collaborator interfaces
//!
//! The core talks to its platform through these narrow traits: an object
//! spawner (pooled or not, the core does not care), a notification gateway
//! for ads/toasts/leaderboard, and a profile store. All of them are
//! injected at construction so tests substitute doubles.

use std::collections::HashMap;

use glam::Vec2;

use crate::profile::PlayerProfile;

/// Opaque handle to a spawned scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnHandle(pub u64);

/// Instantiates and releases obstacle objects. Calls are synchronous and
/// must stay within a frame budget; whether the backing store pools or
/// destroy/recreates is invisible to the core.
pub trait Spawner {
    fn spawn(&mut self, object_index: usize, pos: Vec2, parent_group: usize) -> SpawnHandle;

    fn release(&mut self, handle: SpawnHandle);
}

/// Handle-recycling spawner: released slots are reused per object type,
/// so steady-state streaming stops minting new handles.
#[derive(Debug, Default)]
pub struct PooledSpawner {
    next: u64,
    live: HashMap<u64, usize>,
    free: HashMap<usize, Vec<u64>>,
}

impl PooledSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl Spawner for PooledSpawner {
    fn spawn(&mut self, object_index: usize, _pos: Vec2, _parent_group: usize) -> SpawnHandle {
        let id = match self.free.get_mut(&object_index).and_then(Vec::pop) {
            Some(id) => id,
            None => {
                self.next += 1;
                self.next
            }
        };
        self.live.insert(id, object_index);
        SpawnHandle(id)
    }

    fn release(&mut self, handle: SpawnHandle) {
        if let Some(object_index) = self.live.remove(&handle.0) {
            self.free.entry(object_index).or_default().push(handle.0);
        } else {
            log::warn!("release of unknown spawn handle {}", handle.0);
        }
    }
}

/// Minimal spawner double that only tracks the live set.
#[derive(Debug, Default)]
pub struct CountingSpawner {
    next: u64,
    pub live: Vec<SpawnHandle>,
}

impl CountingSpawner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Spawner for CountingSpawner {
    fn spawn(&mut self, _object_index: usize, _pos: Vec2, _parent_group: usize) -> SpawnHandle {
        self.next += 1;
        let handle = SpawnHandle(self.next);
        self.live.push(handle);
        handle
    }

    fn release(&mut self, handle: SpawnHandle) {
        self.live.retain(|h| *h != handle);
    }
}

/// Where a rewarded ad was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdPlacement {
    Revive,
    DoubleCoins,
}

/// Terminal result of a rewarded ad request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdOutcome {
    Completed,
    Failed,
}

/// Ads, toasts, and leaderboard submission. Requests are asynchronous on
/// the collaborator's side; the core polls for outcomes each frame and
/// must stay valid if an outcome never arrives.
pub trait Notifier {
    fn init(&mut self) {}

    fn shutdown(&mut self) {}

    fn toast(&mut self, message: &str);

    fn show_interstitial(&mut self);

    fn request_rewarded(&mut self, placement: AdPlacement);

    /// Drain one settled rewarded-ad outcome, if any.
    fn poll_rewarded(&mut self) -> Option<(AdPlacement, AdOutcome)>;

    fn submit_score(&mut self, score: i64);
}

/// Notifier double. Configured with the outcome every rewarded request
/// settles to on the next poll; `None` simulates a request that never
/// completes.
#[derive(Debug, Default)]
pub struct NullNotifier {
    pub outcome: Option<AdOutcome>,
    pending: Vec<AdPlacement>,
    pub toasts: Vec<String>,
    pub submitted: Vec<i64>,
    pub interstitials: u32,
}

impl NullNotifier {
    pub fn completing() -> Self {
        Self {
            outcome: Some(AdOutcome::Completed),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: Some(AdOutcome::Failed),
            ..Self::default()
        }
    }

    /// Never settles any request.
    pub fn silent() -> Self {
        Self::default()
    }
}

impl Notifier for NullNotifier {
    fn toast(&mut self, message: &str) {
        self.toasts.push(message.to_owned());
    }

    fn show_interstitial(&mut self) {
        self.interstitials += 1;
    }

    fn request_rewarded(&mut self, placement: AdPlacement) {
        self.pending.push(placement);
    }

    fn poll_rewarded(&mut self) -> Option<(AdPlacement, AdOutcome)> {
        let outcome = self.outcome?;
        if self.pending.is_empty() {
            None
        } else {
            Some((self.pending.remove(0), outcome))
        }
    }

    fn submit_score(&mut self, score: i64) {
        self.submitted.push(score);
    }
}

/// Loads and saves the player profile.
pub trait ProfileStore {
    fn load(&mut self) -> PlayerProfile;

    fn save(&mut self, profile: &PlayerProfile);
}

/// JSON file profile store for native builds.
#[derive(Debug)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&mut self) -> PlayerProfile {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(profile) => {
                    log::info!("loaded profile from {}", self.path.display());
                    profile
                }
                Err(err) => {
                    log::warn!("corrupt profile at {}: {err}", self.path.display());
                    PlayerProfile::default()
                }
            },
            Err(_) => {
                log::info!("no profile at {}, starting fresh", self.path.display());
                PlayerProfile::default()
            }
        }
    }

    fn save(&mut self, profile: &PlayerProfile) {
        match serde_json::to_string_pretty(profile) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&self.path, json) {
                    log::error!("failed to save profile to {}: {err}", self.path.display());
                }
            }
            Err(err) => log::error!("failed to serialize profile: {err}"),
        }
    }
}

/// In-memory profile store for tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub profile: PlayerProfile,
    pub saves: u32,
}

impl ProfileStore for MemoryStore {
    fn load(&mut self) -> PlayerProfile {
        self.profile.clone()
    }

    fn save(&mut self, profile: &PlayerProfile) {
        self.profile = profile.clone();
        self.saves += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pooled_spawner_recycles_handles() {
        let mut spawner = PooledSpawner::new();
        let a = spawner.spawn(3, Vec2::ZERO, 0);
        let b = spawner.spawn(3, Vec2::new(1.0, 0.0), 0);
        assert_ne!(a, b);
        assert_eq!(spawner.live_count(), 2);

        spawner.release(a);
        assert_eq!(spawner.live_count(), 1);

        // Same object type gets the freed slot back
        let c = spawner.spawn(3, Vec2::ZERO, 0);
        assert_eq!(c, a);

        // Different object type mints a fresh handle
        let d = spawner.spawn(7, Vec2::ZERO, 1);
        assert_ne!(d, a);
        assert_ne!(d, b);
    }

    #[test]
    fn test_null_notifier_silent_never_settles() {
        let mut notifier = NullNotifier::silent();
        notifier.request_rewarded(AdPlacement::Revive);
        assert!(notifier.poll_rewarded().is_none());

        let mut notifier = NullNotifier::completing();
        notifier.request_rewarded(AdPlacement::Revive);
        assert_eq!(
            notifier.poll_rewarded(),
            Some((AdPlacement::Revive, AdOutcome::Completed))
        );
        assert!(notifier.poll_rewarded().is_none());
    }
}
