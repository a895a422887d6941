//! Frame loop and service orchestration
//!
//! Binds the deterministic sim to the injected collaborators: fixed-step
//! accumulation over the variable frame rate, the revive flow on the
//! unscaled clock, rewarded-ad outcomes, and profile bookkeeping at the
//! game-over boundary. Collaborators are owned here and passed down by
//! reference, never reached through globals.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::content::ContentSource;
use crate::profile::PlayerProfile;
use crate::services::{AdOutcome, AdPlacement, Notifier, ProfileStore, Spawner};
use crate::sim::state::ReviveCountdown;
use crate::sim::{tick, FrameInput, GamePhase, GameState, RunError, RunEvent};
use crate::tuning::Tuning;

/// One playable session: run state plus the services it talks to.
pub struct Game<C, S, N, P>
where
    C: ContentSource,
    S: Spawner,
    N: Notifier,
    P: ProfileStore,
{
    pub state: GameState,
    tuning: Tuning,
    content: C,
    spawner: S,
    notifier: N,
    store: P,
    profile: PlayerProfile,
    accumulator: f32,
    /// The post-game coin-doubling ad pays out at most once
    coins_doubled: bool,
}

impl<C, S, N, P> Game<C, S, N, P>
where
    C: ContentSource,
    S: Spawner,
    N: Notifier,
    P: ProfileStore,
{
    pub fn new(
        seed: u64,
        tuning: Tuning,
        content: C,
        mut spawner: S,
        mut notifier: N,
        mut store: P,
    ) -> Result<Self, RunError> {
        notifier.init();
        let profile = store.load();
        let mut state = GameState::new(seed, &tuning);
        state.initialize(&content, &mut spawner)?;
        Ok(Self {
            state,
            tuning,
            content,
            spawner,
            notifier,
            store,
            profile,
            accumulator: 0.0,
            coins_doubled: false,
        })
    }

    /// Start a fresh run with the same services.
    pub fn restart(&mut self, seed: u64) -> Result<(), RunError> {
        self.state.streamer.clear(&mut self.spawner);
        self.state = GameState::new(seed, &self.tuning);
        self.state.initialize(&self.content, &mut self.spawner)?;
        self.accumulator = 0.0;
        self.coins_doubled = false;
        Ok(())
    }

    /// Advance one frame of real time.
    pub fn frame(&mut self, input: &FrameInput, dt: f32) {
        let dt = dt.min(0.1);

        self.poll_services();

        if self.state.phase == GamePhase::Revive {
            self.tick_revive(input, dt);
            return;
        }

        if input.pause {
            match self.state.phase {
                GamePhase::Playing => {
                    self.pause();
                    return;
                }
                GamePhase::Paused => self.resume(),
                _ => {}
            }
        }

        if self.state.phase != GamePhase::Playing {
            return;
        }

        if let Err(err) = tick::update(
            &mut self.state,
            input,
            &self.content,
            &mut self.spawner,
            &self.tuning,
            dt,
        ) {
            self.abort_run(err);
            return;
        }

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let events = tick::fixed_tick(&mut self.state, &mut self.spawner, &self.tuning, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            for event in events {
                if event == RunEvent::Fatal {
                    self.on_fatal();
                }
            }
            if self.state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    fn on_fatal(&mut self) {
        if self.state.revive.chances() > 0 {
            log::info!(
                "player down at x={:.1}, {} revive(s) left",
                self.state.player.pos.x,
                self.state.revive.chances()
            );
            self.state.phase = GamePhase::Revive;
            self.state.countdown = Some(ReviveCountdown {
                remaining: self.tuning.revive_countdown,
                ad_pending: false,
            });
        } else {
            self.game_over();
        }
    }

    /// Revive window, counted on the unscaled clock. Gameplay taps skip
    /// ahead; an in-flight ad request holds the timer.
    fn tick_revive(&mut self, input: &FrameInput, dt: f32) {
        let Some(countdown) = &mut self.state.countdown else {
            return;
        };
        if countdown.ad_pending {
            return;
        }

        countdown.remaining -= dt;
        if input.gameplay_tap() {
            countdown.remaining -= self.tuning.revive_tap_skip;
        }

        if countdown.remaining <= 0.0 {
            self.state.countdown = None;
            self.game_over();
        }
    }

    /// Spend profile coins on a revive.
    pub fn buy_revive(&mut self) {
        if self.state.phase != GamePhase::Revive || self.state.countdown.is_none() {
            return;
        }
        if self.profile.coins < self.tuning.revive_coin_cost {
            return;
        }
        self.profile.coins -= self.tuning.revive_coin_cost;
        self.profile.revives_done += 1;
        self.store.save(&self.profile);
        self.do_revive();
    }

    /// Request a rewarded ad in exchange for a revive. The countdown holds
    /// until the request settles; it may never settle, which leaves the
    /// window open until the player acts.
    pub fn watch_ad_revive(&mut self) {
        let Some(countdown) = &mut self.state.countdown else {
            return;
        };
        if countdown.ad_pending {
            return;
        }
        countdown.ad_pending = true;
        self.notifier.request_rewarded(AdPlacement::Revive);
    }

    /// Request the post-game coin-doubling ad.
    pub fn watch_ad_double_coins(&mut self) {
        if self.state.phase != GamePhase::Lose
            || self.state.aborted
            || self.coins_doubled
            || self.state.coins == 0
        {
            return;
        }
        self.notifier.request_rewarded(AdPlacement::DoubleCoins);
    }

    /// Drain settled ad outcomes. Outcomes are only honored while the
    /// state they were requested from is still current, so a late or
    /// duplicate callback cannot corrupt the run.
    fn poll_services(&mut self) {
        while let Some((placement, outcome)) = self.notifier.poll_rewarded() {
            match placement {
                AdPlacement::Revive => {
                    let armed = self
                        .state
                        .countdown
                        .map(|c| c.ad_pending)
                        .unwrap_or(false);
                    if self.state.phase != GamePhase::Revive || !armed {
                        log::warn!("stale revive ad outcome ignored");
                        continue;
                    }
                    if let Some(countdown) = &mut self.state.countdown {
                        countdown.ad_pending = false;
                    }
                    if outcome == AdOutcome::Completed {
                        self.profile.revives_done += 1;
                        self.store.save(&self.profile);
                        self.do_revive();
                    }
                    // On failure the countdown simply resumes
                }
                AdPlacement::DoubleCoins => {
                    if self.state.phase == GamePhase::Lose
                        && outcome == AdOutcome::Completed
                        && !self.coins_doubled
                    {
                        self.coins_doubled = true;
                        self.profile.coins += self.state.coins as i64;
                        self.profile.total_coins += self.state.coins as i64;
                        self.store.save(&self.profile);
                    }
                }
            }
        }
    }

    /// Consume a chance and resume play from the last safe snapshot.
    fn do_revive(&mut self) {
        if !self.state.revive.consume_chance() {
            self.game_over();
            return;
        }
        let checkpoint = self.state.revive.restore();
        self.state.player.apply_checkpoint(&checkpoint);
        self.state.countdown = None;
        self.state.phase = GamePhase::Playing;
        self.accumulator = 0.0;
        log::info!(
            "revived at x={:.1} as {}, {} chance(s) left",
            checkpoint.x,
            checkpoint.mode.as_str(),
            self.state.revive.chances()
        );
    }

    fn game_over(&mut self) {
        self.state.phase = GamePhase::Lose;
        self.state.countdown = None;

        let score = self.state.score();
        log::info!(
            "game over: score {}, {} coins, {:.1}s",
            score,
            self.state.coins,
            self.state.run_time
        );

        self.bank_run();
        self.notifier.submit_score(score);
        self.notifier.show_interstitial();
    }

    /// Fold the run into the profile and persist it.
    fn bank_run(&mut self) {
        let completed = self.profile.apply_run(
            self.state.score(),
            self.state.coins,
            self.state.run_time,
        );
        for title in completed {
            self.notifier.toast(&format!("Quest Completed: {title}"));
        }
        self.store.save(&self.profile);
    }

    /// A content fault mid-stream: resuming would desync geometry from the
    /// sequence counter, so the run ends without bookkeeping.
    fn abort_run(&mut self, err: RunError) {
        log::error!("run aborted by content fault: {err}");
        self.state.aborted = true;
        self.state.streamer.clear(&mut self.spawner);
        self.state.countdown = None;
        self.state.phase = GamePhase::Lose;
    }

    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.state.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Playing;
        }
    }

    /// Leave a paused run for the menu; the tally still counts.
    pub fn quit_to_menu(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.bank_run();
            self.state.phase = GamePhase::Lose;
        }
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    /// Release run resources and close out the services.
    pub fn shutdown(&mut self) {
        self.state.streamer.clear(&mut self.spawner);
        self.store.save(&self.profile);
        self.notifier.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::UniformContent;
    use crate::content::{ChunkKey, ChunkLayout, ContentError};
    use crate::services::{CountingSpawner, MemoryStore, NullNotifier};
    use std::cell::Cell;

    type TestGame = Game<UniformContent, CountingSpawner, NullNotifier, MemoryStore>;

    fn new_game(notifier: NullNotifier, profile_coins: i64) -> TestGame {
        let store = MemoryStore {
            profile: PlayerProfile {
                coins: profile_coins,
                ..PlayerProfile::default()
            },
            saves: 0,
        };
        Game::new(
            3,
            Tuning::default(),
            UniformContent::blank(),
            CountingSpawner::new(),
            notifier,
            store,
        )
        .unwrap()
    }

    #[test]
    fn test_two_revives_then_terminal_game_over() {
        let mut game = new_game(NullNotifier::silent(), 1000);

        // First death opens the revive window; buying restores the snapshot
        game.on_fatal();
        assert_eq!(game.state.phase, GamePhase::Revive);
        let checkpoint = game.state.revive.restore();
        game.buy_revive();
        assert_eq!(game.state.phase, GamePhase::Playing);
        assert_eq!(game.state.player.pos.x, checkpoint.x);
        assert_eq!(game.state.revive.chances(), 1);

        // Second death, second revive
        game.on_fatal();
        game.buy_revive();
        assert_eq!(game.state.phase, GamePhase::Playing);
        assert_eq!(game.state.revive.chances(), 0);

        // Third death: straight to game over, no countdown window
        game.on_fatal();
        assert_eq!(game.state.phase, GamePhase::Lose);
        assert!(game.state.countdown.is_none());
        assert_eq!(game.notifier.interstitials, 1);
    }

    #[test]
    fn test_countdown_expiry_ends_the_run() {
        let mut game = new_game(NullNotifier::silent(), 0);
        game.on_fatal();

        let input = FrameInput::default();
        for _ in 0..60 {
            game.frame(&input, 0.1);
        }
        assert_eq!(game.state.phase, GamePhase::Lose);
        assert!(game.state.countdown.is_none());
        assert_eq!(game.store.saves, 1);
        assert_eq!(game.notifier.submitted.len(), 1);
    }

    #[test]
    fn test_taps_shorten_the_countdown() {
        use crate::sim::{Touch, TouchPhase};

        let mut game = new_game(NullNotifier::silent(), 0);
        game.on_fatal();

        let tap = FrameInput {
            touch: Some(Touch {
                phase: TouchPhase::Began,
                over_ui: false,
            }),
            pause: false,
        };
        // 3 taps at 2s each clear the 5s window almost immediately
        for _ in 0..3 {
            game.frame(&tap, 0.01);
        }
        assert_eq!(game.state.phase, GamePhase::Lose);
    }

    #[test]
    fn test_silent_ad_holds_the_window_without_hanging() {
        let mut game = new_game(NullNotifier::silent(), 0);
        game.on_fatal();
        game.watch_ad_revive();

        let input = FrameInput::default();
        for _ in 0..300 {
            game.frame(&input, 0.1);
        }
        // The request never settles: the window stays open and valid
        assert_eq!(game.state.phase, GamePhase::Revive);
        assert!(game.state.countdown.unwrap().ad_pending);

        // The player can still buy out of it
        game.profile.coins = 500;
        game.buy_revive();
        assert_eq!(game.state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_failed_ad_resumes_the_countdown() {
        let mut game = new_game(NullNotifier::failing(), 0);
        game.on_fatal();
        game.watch_ad_revive();

        let input = FrameInput::default();
        game.frame(&input, 0.01);
        // Failure cleared the hold; the run is still revivable
        assert_eq!(game.state.phase, GamePhase::Revive);
        assert!(!game.state.countdown.unwrap().ad_pending);
        assert_eq!(game.state.revive.chances(), 2);
    }

    #[test]
    fn test_completed_ad_revives() {
        let mut game = new_game(NullNotifier::completing(), 0);
        game.on_fatal();
        game.watch_ad_revive();

        let input = FrameInput::default();
        game.frame(&input, 0.01);
        assert_eq!(game.state.phase, GamePhase::Playing);
        assert_eq!(game.state.revive.chances(), 1);
        assert_eq!(game.profile.revives_done, 1);
    }

    #[test]
    fn test_stale_ad_outcome_is_ignored() {
        let mut game = new_game(NullNotifier::silent(), 0);
        game.on_fatal();
        game.watch_ad_revive();

        // The run ends while the request is still in flight
        game.state.countdown = None;
        game.state.phase = GamePhase::Lose;
        game.notifier.outcome = Some(AdOutcome::Completed);

        let input = FrameInput::default();
        game.frame(&input, 0.01);
        assert_eq!(game.state.phase, GamePhase::Lose);
        assert_eq!(game.state.revive.chances(), 2);
    }

    #[test]
    fn test_double_coins_pays_once() {
        let mut game = new_game(NullNotifier::completing(), 0);
        game.state.coins = 30;
        game.on_fatal();
        game.state.revive = crate::sim::ReviveCheckpoint::new(0);
        game.on_fatal();
        assert_eq!(game.state.phase, GamePhase::Lose);
        let banked = game.profile.coins;

        game.watch_ad_double_coins();
        let input = FrameInput::default();
        game.frame(&input, 0.01);
        assert_eq!(game.profile.coins, banked + 30);

        // A second request is refused
        game.watch_ad_double_coins();
        game.frame(&input, 0.01);
        assert_eq!(game.profile.coins, banked + 30);
    }

    #[test]
    fn test_pause_freezes_simulated_time() {
        let mut game = new_game(NullNotifier::silent(), 0);
        let input = FrameInput::default();
        game.frame(&input, 0.05);
        let time = game.state.run_time;
        let x = game.state.player.pos.x;

        game.pause();
        for _ in 0..10 {
            game.frame(&input, 0.05);
        }
        assert_eq!(game.state.run_time, time);
        assert_eq!(game.state.player.pos.x, x);

        game.resume();
        game.frame(&input, 0.05);
        assert!(game.state.run_time > time);
    }

    #[test]
    fn test_quit_from_pause_banks_the_run() {
        let mut game = new_game(NullNotifier::silent(), 0);
        game.state.coins = 12;
        game.pause();
        game.quit_to_menu();
        assert_eq!(game.state.phase, GamePhase::Lose);
        assert_eq!(game.profile.total_coins, 12);
        assert_eq!(game.store.saves, 1);
    }

    /// Content source that fails every chunk lookup after a budget.
    struct ExpiringContent {
        inner: UniformContent,
        lookups_left: Cell<u32>,
    }

    impl ContentSource for ExpiringContent {
        fn chunk(&self, key: &ChunkKey) -> Result<&ChunkLayout, ContentError> {
            if self.lookups_left.get() == 0 {
                return Err(ContentError::NotFound { path: key.path() });
            }
            self.lookups_left.set(self.lookups_left.get() - 1);
            self.inner.chunk(key)
        }

        fn start_chunk(&self) -> Result<&ChunkLayout, ContentError> {
            self.inner.start_chunk()
        }
    }

    #[test]
    fn test_content_miss_aborts_the_run() {
        let content = ExpiringContent {
            inner: UniformContent::blank(),
            lookups_left: Cell::new(3),
        };
        let mut game = Game::new(
            3,
            Tuning::default(),
            content,
            CountingSpawner::new(),
            NullNotifier::silent(),
            MemoryStore::default(),
        )
        .unwrap();

        // Run until the window needs a chunk the catalog no longer has
        let input = FrameInput::default();
        for _ in 0..2000 {
            game.frame(&input, 0.05);
            if game.state.phase == GamePhase::Lose {
                break;
            }
        }
        assert_eq!(game.state.phase, GamePhase::Lose);
        assert!(game.state.aborted);
        assert_eq!(game.state.streamer.resident_len(), 0);
        // An aborted run banks nothing
        assert_eq!(game.store.saves, 0);
    }

    #[test]
    fn test_init_fails_on_empty_catalog() {
        let result = Game::new(
            1,
            Tuning::default(),
            crate::content::StaticCatalog::new(),
            CountingSpawner::new(),
            NullNotifier::silent(),
            MemoryStore::default(),
        );
        assert!(result.is_err());
    }
}
