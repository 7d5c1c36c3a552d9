// XP and leveling engine. No Discord types in here - the service works with
// plain ids and returns events for the adapter layer to announce.
//
// The curve is intentionally computed by summation in BOTH directions
// (total-for-level and level-for-total) from the same per-level cost, so the
// "progress toward next level" display can never drift from the level shown.

use crate::core::economy::CreditLedger;
use crate::core::profiles::{ProfileStore, ProfileStoreError, UserProfile};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

// ============================================================================
// LEVELING CURVE
// ============================================================================

/// XP cost to advance from `level` to `level + 1`.
pub fn xp_for_next_level(level: u32) -> u64 {
    (150.0 * ((level + 1) as f64).powf(1.5)).floor() as u64
}

/// Total XP required to reach `level`. Level 0 costs nothing.
pub fn total_xp_for_level(level: u32) -> u64 {
    (1..=level).map(|l| xp_for_next_level(l - 1)).sum()
}

/// Largest level whose total cost fits inside `xp`.
///
/// Accumulates the same per-level costs as `total_xp_for_level` and stops as
/// soon as the next level would not be affordable.
pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 0u32;
    let mut used = 0u64;
    loop {
        let next_cost = xp_for_next_level(level);
        if used + next_cost > xp {
            return level;
        }
        used += next_cost;
        level += 1;
    }
}

/// XP earned inside the current level, for progress bars.
pub fn xp_progress_within_level(xp: u64, level: u32) -> u64 {
    xp.saturating_sub(total_xp_for_level(level))
}

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// Emitted when a recompute crosses one or more level boundaries.
#[derive(Debug, Clone)]
pub struct LevelUpEvent {
    pub user_id: u64,
    pub guild_id: u64,
    pub old_level: u32,
    pub new_level: u32,
    pub total_xp: u64,
    /// Role mapped to the newly reached tier, if the config has one.
    pub reward_role: Option<u64>,
}

/// Outcome of a daily-credit claim.
#[derive(Debug, Clone)]
pub enum DailyClaim {
    Granted { amount: i64, new_balance: i64 },
    OnCooldown { remaining: ChronoDuration },
}

/// Outcome of a reputation grant attempt.
#[derive(Debug, Clone)]
pub enum RepGrant {
    Granted { new_reputation: u64 },
    OnCooldown { remaining: ChronoDuration },
}

#[derive(Debug, Error)]
pub enum LevelingError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("description is limited to {0} characters")]
    DescriptionTooLong(usize),
    #[error("you can't give reputation to yourself")]
    SelfReputation,
}

impl From<ProfileStoreError> for LevelingError {
    fn from(e: ProfileStoreError) -> Self {
        LevelingError::Storage(e.to_string())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct LevelingConfig {
    pub text_xp_min: u64,
    pub text_xp_max: u64,
    pub message_cooldown: Duration,
    pub voice_xp_per_minute: u64,
    pub daily_credits_min: i64,
    pub daily_credits_max: i64,
    pub daily_cooldown: ChronoDuration,
    pub rep_cooldown: ChronoDuration,
    pub description_max_len: usize,
    /// level -> role id granted when that level is reached.
    pub level_rewards: HashMap<u32, u64>,
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            text_xp_min: 5,
            text_xp_max: 15,
            message_cooldown: Duration::from_secs(60),
            voice_xp_per_minute: 3,
            daily_credits_min: 50,
            daily_credits_max: 100,
            daily_cooldown: ChronoDuration::hours(24),
            rep_cooldown: ChronoDuration::hours(24),
            description_max_len: 100,
            level_rewards: HashMap::new(),
        }
    }
}

// ============================================================================
// VOICE SESSIONS
// ============================================================================

/// A user currently connected to a voice channel somewhere.
#[derive(Debug, Clone)]
struct VoiceSession {
    guild_id: u64,
    /// Last moment XP was credited (or the join time). Whole minutes since
    /// this point are owed to the user.
    last_credited: Instant,
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct LevelingService<S: ProfileStore + Clone> {
    store: S,
    ledger: CreditLedger<S>,
    config: LevelingConfig,
    /// user_id -> last message XP grant, for the spam cooldown. In-process
    /// only; a restart just forgives one cooldown window.
    message_cooldowns: DashMap<u64, Instant>,
    /// Bounded set of users currently tracked as in-voice.
    voice_sessions: DashMap<u64, VoiceSession>,
}

impl<S: ProfileStore + Clone> LevelingService<S> {
    pub fn new(store: S, ledger: CreditLedger<S>) -> Self {
        Self::with_config(store, ledger, LevelingConfig::default())
    }

    pub fn with_config(store: S, ledger: CreditLedger<S>, config: LevelingConfig) -> Self {
        Self {
            store,
            ledger,
            config,
            message_cooldowns: DashMap::new(),
            voice_sessions: DashMap::new(),
        }
    }

    pub fn config(&self) -> &LevelingConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        // thread_rng is not Send; a freshly seeded StdRng is.
        StdRng::from_entropy()
    }

    fn reward_role_for(&self, level: u32) -> Option<u64> {
        self.config.level_rewards.get(&level).copied()
    }

    /// Recompute the stored level against the curve and return an event if
    /// one or more levels were gained. The profile is mutated in place; the
    /// caller persists it.
    fn recompute_level(&self, profile: &mut UserProfile) -> Option<LevelUpEvent> {
        let actual = level_for_xp(profile.xp);
        if actual > profile.level {
            let old_level = profile.level;
            profile.level = actual;
            Some(LevelUpEvent {
                user_id: profile.user_id,
                guild_id: profile.guild_id,
                old_level,
                new_level: actual,
                total_xp: profile.xp,
                reward_role: self.reward_role_for(actual),
            })
        } else {
            // Stored level may also be stale-high after an admin reset; repair silently.
            profile.level = actual;
            None
        }
    }

    // ------------------------------------------------------------------
    // Message XP
    // ------------------------------------------------------------------

    /// Award message XP, honoring the per-user cooldown.
    ///
    /// A message inside the cooldown window is a silent no-op, not an error.
    pub async fn process_message(
        &self,
        user_id: u64,
        guild_id: u64,
    ) -> Result<Option<LevelUpEvent>, LevelingError> {
        let now = Instant::now();
        if let Some(last) = self.message_cooldowns.get(&user_id) {
            if now.duration_since(*last) < self.config.message_cooldown {
                return Ok(None);
            }
        }
        self.message_cooldowns.insert(user_id, now);

        let gain = self
            .rng()
            .gen_range(self.config.text_xp_min..=self.config.text_xp_max);

        let mut profile = self.store.get(user_id, guild_id).await?;
        profile.xp = profile.xp.saturating_add(gain);
        profile.messages_sent += 1;
        let event = self.recompute_level(&mut profile);
        self.store.put(profile).await?;
        Ok(event)
    }

    // ------------------------------------------------------------------
    // Voice XP
    // ------------------------------------------------------------------

    pub fn voice_joined(&self, user_id: u64, guild_id: u64) {
        self.voice_sessions.insert(
            user_id,
            VoiceSession {
                guild_id,
                last_credited: Instant::now(),
            },
        );
    }

    /// Flush the remaining whole minutes of a session and stop tracking.
    pub async fn voice_left(&self, user_id: u64) -> Result<Option<LevelUpEvent>, LevelingError> {
        let Some((_, session)) = self.voice_sessions.remove(&user_id) else {
            return Ok(None);
        };
        let minutes = session.last_credited.elapsed().as_secs() / 60;
        if minutes == 0 {
            return Ok(None);
        }
        self.credit_voice_minutes(user_id, session.guild_id, minutes)
            .await
    }

    /// Periodic tick: credit every tracked user the whole minutes elapsed
    /// since they were last credited. Run once a minute so users who never
    /// disconnect still accrue XP.
    pub async fn tick_voice_xp(&self) -> Result<Vec<LevelUpEvent>, LevelingError> {
        let now = Instant::now();
        let mut due: Vec<(u64, u64, u64)> = Vec::new();
        for mut entry in self.voice_sessions.iter_mut() {
            let elapsed = now.duration_since(entry.last_credited);
            let minutes = elapsed.as_secs() / 60;
            if minutes > 0 {
                entry.last_credited += Duration::from_secs(minutes * 60);
                due.push((*entry.key(), entry.guild_id, minutes));
            }
        }

        let mut events = Vec::new();
        for (user_id, guild_id, minutes) in due {
            if let Some(event) = self.credit_voice_minutes(user_id, guild_id, minutes).await? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Drop tracking for a user without crediting anything. Used when the
    /// tick discovers the user is no longer actually connected.
    pub fn forget_voice_session(&self, user_id: u64) {
        self.voice_sessions.remove(&user_id);
    }

    pub fn tracked_voice_users(&self) -> Vec<u64> {
        self.voice_sessions.iter().map(|e| *e.key()).collect()
    }

    async fn credit_voice_minutes(
        &self,
        user_id: u64,
        guild_id: u64,
        minutes: u64,
    ) -> Result<Option<LevelUpEvent>, LevelingError> {
        let mut profile = self.store.get(user_id, guild_id).await?;
        profile.xp = profile
            .xp
            .saturating_add(minutes * self.config.voice_xp_per_minute);
        profile.voice_minutes += minutes;
        let event = self.recompute_level(&mut profile);
        self.store.put(profile).await?;
        Ok(event)
    }

    // ------------------------------------------------------------------
    // Daily credits
    // ------------------------------------------------------------------

    pub async fn claim_daily(
        &self,
        user_id: u64,
        guild_id: u64,
    ) -> Result<DailyClaim, LevelingError> {
        self.claim_daily_at(user_id, guild_id, Utc::now()).await
    }

    /// Time-injected variant so the rolling window is testable.
    pub async fn claim_daily_at(
        &self,
        user_id: u64,
        guild_id: u64,
        now: DateTime<Utc>,
    ) -> Result<DailyClaim, LevelingError> {
        let mut profile = self.store.get(user_id, guild_id).await?;
        if let Some(last) = profile.last_daily {
            let elapsed = now.signed_duration_since(last);
            if elapsed < self.config.daily_cooldown {
                return Ok(DailyClaim::OnCooldown {
                    remaining: self.config.daily_cooldown - elapsed,
                });
            }
        }

        let amount = self
            .rng()
            .gen_range(self.config.daily_credits_min..=self.config.daily_credits_max);
        profile.last_daily = Some(now);
        self.store.put(profile).await?;

        let new_balance = self
            .ledger
            .deposit(user_id, guild_id, amount)
            .await
            .map_err(|e| LevelingError::Storage(e.to_string()))?;
        Ok(DailyClaim::Granted {
            amount,
            new_balance,
        })
    }

    // ------------------------------------------------------------------
    // Reputation
    // ------------------------------------------------------------------

    /// Give one reputation point from `giver` to `target`. The 24 h cooldown
    /// is tracked on the giver, so switching targets doesn't reset it.
    pub async fn give_reputation(
        &self,
        giver_id: u64,
        target_id: u64,
        guild_id: u64,
    ) -> Result<RepGrant, LevelingError> {
        self.give_reputation_at(giver_id, target_id, guild_id, Utc::now())
            .await
    }

    pub async fn give_reputation_at(
        &self,
        giver_id: u64,
        target_id: u64,
        guild_id: u64,
        now: DateTime<Utc>,
    ) -> Result<RepGrant, LevelingError> {
        if giver_id == target_id {
            return Err(LevelingError::SelfReputation);
        }

        let mut giver = self.store.get(giver_id, guild_id).await?;
        if let Some(last) = giver.last_rep {
            let elapsed = now.signed_duration_since(last);
            if elapsed < self.config.rep_cooldown {
                return Ok(RepGrant::OnCooldown {
                    remaining: self.config.rep_cooldown - elapsed,
                });
            }
        }
        giver.last_rep = Some(now);
        self.store.put(giver).await?;

        let mut target = self.store.get(target_id, guild_id).await?;
        target.reputation += 1;
        let new_reputation = target.reputation;
        self.store.put(target).await?;
        Ok(RepGrant::Granted { new_reputation })
    }

    // ------------------------------------------------------------------
    // Profiles, leaderboard, admin
    // ------------------------------------------------------------------

    /// Fetch a profile with its level repaired against the curve.
    pub async fn profile(
        &self,
        user_id: u64,
        guild_id: u64,
    ) -> Result<UserProfile, LevelingError> {
        let mut profile = self.store.get(user_id, guild_id).await?;
        let actual = level_for_xp(profile.xp);
        if actual != profile.level {
            profile.level = actual;
            self.store.put(profile.clone()).await?;
        }
        Ok(profile)
    }

    pub async fn set_description(
        &self,
        user_id: u64,
        guild_id: u64,
        description: String,
    ) -> Result<(), LevelingError> {
        if description.chars().count() > self.config.description_max_len {
            return Err(LevelingError::DescriptionTooLong(
                self.config.description_max_len,
            ));
        }
        let mut profile = self.store.get(user_id, guild_id).await?;
        profile.description = description;
        self.store.put(profile).await?;
        Ok(())
    }

    /// All profiles in a guild, sorted by XP descending.
    pub async fn leaderboard(&self, guild_id: u64) -> Result<Vec<UserProfile>, LevelingError> {
        let mut profiles = self.store.all(guild_id).await?;
        profiles.sort_by(|a, b| b.xp.cmp(&a.xp));
        Ok(profiles)
    }

    /// 1-based rank of a user on the guild leaderboard, if they appear.
    pub async fn rank_of(
        &self,
        user_id: u64,
        guild_id: u64,
    ) -> Result<Option<usize>, LevelingError> {
        let board = self.leaderboard(guild_id).await?;
        Ok(board
            .iter()
            .position(|p| p.user_id == user_id)
            .map(|i| i + 1))
    }

    /// Admin grant. Recomputes the level and may produce a level-up event.
    pub async fn give_xp(
        &self,
        user_id: u64,
        guild_id: u64,
        amount: u64,
    ) -> Result<(UserProfile, Option<LevelUpEvent>), LevelingError> {
        let mut profile = self.store.get(user_id, guild_id).await?;
        profile.xp = profile.xp.saturating_add(amount);
        let event = self.recompute_level(&mut profile);
        self.store.put(profile.clone()).await?;
        Ok((profile, event))
    }

    /// Zero out XP and level for one user.
    pub async fn reset_user(&self, user_id: u64, guild_id: u64) -> Result<(), LevelingError> {
        let mut profile = self.store.get(user_id, guild_id).await?;
        profile.xp = 0;
        profile.level = 0;
        self.store.put(profile).await?;
        Ok(())
    }

    /// Zero out XP and level for every profile in a guild.
    pub async fn reset_guild(&self, guild_id: u64) -> Result<usize, LevelingError> {
        let profiles = self.store.all(guild_id).await?;
        let count = profiles.len();
        for mut profile in profiles {
            profile.xp = 0;
            profile.level = 0;
            self.store.put(profile).await?;
        }
        Ok(count)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::economy::{BetLimits, CreditLedger};
    use crate::infra::profiles::InMemoryProfileStore;
    use std::sync::Arc;

    fn make_service() -> LevelingService<Arc<InMemoryProfileStore>> {
        let store = Arc::new(InMemoryProfileStore::new());
        let ledger = CreditLedger::new(Arc::clone(&store), BetLimits::default());
        LevelingService::new(store, ledger)
    }

    #[test]
    fn per_level_cost_matches_formula() {
        // floor(150 * n^1.5) for n = 1..
        assert_eq!(xp_for_next_level(0), 150);
        assert_eq!(xp_for_next_level(1), 424); // 150 * 2^1.5 = 424.26..
        assert_eq!(xp_for_next_level(2), 779); // 150 * 3^1.5 = 779.42..
        assert_eq!(xp_for_next_level(3), 1200);
    }

    #[test]
    fn total_xp_is_cumulative_sum() {
        assert_eq!(total_xp_for_level(0), 0);
        for level in 1..=50 {
            assert_eq!(
                total_xp_for_level(level),
                total_xp_for_level(level - 1) + xp_for_next_level(level - 1)
            );
        }
    }

    #[test]
    fn level_for_xp_inverts_total() {
        assert_eq!(level_for_xp(0), 0);
        assert_eq!(level_for_xp(149), 0);
        assert_eq!(level_for_xp(150), 1);
        assert_eq!(level_for_xp(573), 1);
        assert_eq!(level_for_xp(574), 2); // 150 + 424

        for xp in (0..200_000).step_by(1_337) {
            let xp = xp as u64;
            let level = level_for_xp(xp);
            assert!(total_xp_for_level(level) <= xp);
            assert!(xp < total_xp_for_level(level + 1));
        }
    }

    #[test]
    fn level_for_xp_is_monotonic() {
        let mut last = 0;
        for xp in (0..100_000).step_by(500) {
            let level = level_for_xp(xp as u64);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn progress_within_level_zero_case() {
        assert_eq!(xp_progress_within_level(42, 0), 42);
        assert_eq!(xp_progress_within_level(200, 1), 50);
    }

    #[tokio::test]
    async fn message_xp_respects_cooldown() {
        let service = make_service();
        service.process_message(1, 10).await.unwrap();
        let after_first = service.store.get(1, 10).await.unwrap();
        assert!((5..=15).contains(&after_first.xp));
        assert_eq!(after_first.messages_sent, 1);

        // Immediately again: silently skipped.
        service.process_message(1, 10).await.unwrap();
        let after_second = service.store.get(1, 10).await.unwrap();
        assert_eq!(after_second.xp, after_first.xp);
        assert_eq!(after_second.messages_sent, 1);
    }

    #[tokio::test]
    async fn give_xp_levels_up_and_reports_reward() {
        let store = Arc::new(InMemoryProfileStore::new());
        let ledger = CreditLedger::new(Arc::clone(&store), BetLimits::default());
        let mut config = LevelingConfig::default();
        config.level_rewards.insert(2, 555);
        let service = LevelingService::with_config(store, ledger, config);

        let (profile, event) = service.give_xp(1, 10, 600).await.unwrap();
        assert_eq!(profile.level, 2);
        let event = event.unwrap();
        assert_eq!(event.old_level, 0);
        assert_eq!(event.new_level, 2);
        assert_eq!(event.reward_role, Some(555));
    }

    #[tokio::test]
    async fn daily_claim_rolling_window() {
        let service = make_service();
        let t0 = Utc::now();

        let first = service.claim_daily_at(1, 10, t0).await.unwrap();
        let granted = match first {
            DailyClaim::Granted { amount, .. } => amount,
            _ => panic!("first claim must succeed"),
        };
        assert!((50..=100).contains(&granted));

        // 23 hours later: rejected with about an hour remaining.
        let early = service
            .claim_daily_at(1, 10, t0 + ChronoDuration::hours(23))
            .await
            .unwrap();
        match early {
            DailyClaim::OnCooldown { remaining } => {
                assert_eq!(remaining.num_hours(), 1);
            }
            _ => panic!("claim inside the window must be rejected"),
        }

        // 24 hours and a second later: accepted.
        let late = service
            .claim_daily_at(
                1,
                10,
                t0 + ChronoDuration::hours(24) + ChronoDuration::seconds(1),
            )
            .await
            .unwrap();
        assert!(matches!(late, DailyClaim::Granted { .. }));
    }

    #[tokio::test]
    async fn reputation_cooldown_is_per_giver() {
        let service = make_service();
        let t0 = Utc::now();

        let first = service.give_reputation_at(1, 2, 10, t0).await.unwrap();
        assert!(matches!(first, RepGrant::Granted { new_reputation: 1 }));

        // Different target, same giver, still on cooldown.
        let second = service
            .give_reputation_at(1, 3, 10, t0 + ChronoDuration::hours(1))
            .await
            .unwrap();
        assert!(matches!(second, RepGrant::OnCooldown { .. }));

        let err = service.give_reputation_at(1, 1, 10, t0).await;
        assert!(matches!(err, Err(LevelingError::SelfReputation)));
    }

    #[tokio::test]
    async fn voice_tick_credits_tracked_users() {
        let service = make_service();
        service.voice_joined(1, 10);

        // Backdate the session so a tick owes two minutes.
        service.voice_sessions.get_mut(&1).unwrap().last_credited =
            Instant::now() - Duration::from_secs(125);

        service.tick_voice_xp().await.unwrap();
        let profile = service.store.get(1, 10).await.unwrap();
        assert_eq!(profile.voice_minutes, 2);
        assert_eq!(profile.xp, 6); // 3 XP per minute

        // The residual 5 seconds stay owed; an immediate second tick is a no-op.
        service.tick_voice_xp().await.unwrap();
        let profile = service.store.get(1, 10).await.unwrap();
        assert_eq!(profile.voice_minutes, 2);
    }

    #[tokio::test]
    async fn voice_leave_flushes_whole_minutes() {
        let service = make_service();
        service.voice_joined(1, 10);
        service.voice_sessions.get_mut(&1).unwrap().last_credited =
            Instant::now() - Duration::from_secs(90);

        service.voice_left(1).await.unwrap();
        let profile = service.store.get(1, 10).await.unwrap();
        assert_eq!(profile.voice_minutes, 1);
        assert!(service.tracked_voice_users().is_empty());
    }

    #[tokio::test]
    async fn reset_guild_zeroes_everyone() {
        let service = make_service();
        service.give_xp(1, 10, 1000).await.unwrap();
        service.give_xp(2, 10, 2000).await.unwrap();

        let count = service.reset_guild(10).await.unwrap();
        assert_eq!(count, 2);
        for user in [1, 2] {
            let profile = service.store.get(user, 10).await.unwrap();
            assert_eq!(profile.xp, 0);
            assert_eq!(profile.level, 0);
        }
    }

    #[tokio::test]
    async fn description_length_is_bounded() {
        let service = make_service();
        let long = "x".repeat(101);
        assert!(matches!(
            service.set_description(1, 10, long).await,
            Err(LevelingError::DescriptionTooLong(100))
        ));
        service
            .set_description(1, 10, "hello".to_string())
            .await
            .unwrap();
        assert_eq!(service.store.get(1, 10).await.unwrap().description, "hello");
    }
}
