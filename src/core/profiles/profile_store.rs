// Shared profile model and its storage port.
//
// Both the leveling engine and the gambling engine read and write the same
// per-user record (the original bot kept everything in one JSON file), so the
// profile lives in its own core module rather than inside either service.
// The store is a plain key-value port: get-or-create, put, list. Anything
// smarter (transactions, partial updates) is deliberately out of scope.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A user's persisted record for one guild.
///
/// Every field carries a serde default so that records written by older
/// versions of the bot gain new fields on first read instead of failing to
/// deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub guild_id: u64,
    #[serde(default)]
    pub xp: u64,
    /// Derived from `xp` via the leveling curve. May lag behind until the
    /// next recompute; readers that display it must repair it first.
    #[serde(default)]
    pub level: u32,
    #[serde(default = "default_credits")]
    pub credits: i64,
    #[serde(default)]
    pub reputation: u64,
    #[serde(default)]
    pub voice_minutes: u64,
    #[serde(default)]
    pub messages_sent: u64,
    #[serde(default)]
    pub last_daily: Option<DateTime<Utc>>,
    /// When this user last GAVE reputation (the cooldown is per giver).
    #[serde(default)]
    pub last_rep: Option<DateTime<Utc>>,
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_credits() -> i64 {
    100
}

fn default_description() -> String {
    "No description set.".to_string()
}

impl UserProfile {
    /// Fresh profile with starting credits.
    pub fn new(user_id: u64, guild_id: u64) -> Self {
        Self {
            user_id,
            guild_id,
            xp: 0,
            level: 0,
            credits: default_credits(),
            reputation: 0,
            voice_minutes: 0,
            messages_sent: 0,
            last_daily: None,
            last_rep: None,
            description: default_description(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Key-value port over user profiles.
///
/// `get` creates a default profile for unknown keys so callers never deal
/// with "no row yet"; `put` overwrites the whole record. Implementations are
/// responsible for serializing their own writes.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: u64, guild_id: u64) -> Result<UserProfile, ProfileStoreError>;

    async fn put(&self, profile: UserProfile) -> Result<(), ProfileStoreError>;

    /// All profiles known for a guild, in no particular order.
    async fn all(&self, guild_id: u64) -> Result<Vec<UserProfile>, ProfileStoreError>;
}

// The leveling service and the gambling service share one store instance, so
// services are constructed over Arc<S>.
#[async_trait]
impl<S: ProfileStore + ?Sized> ProfileStore for Arc<S> {
    async fn get(&self, user_id: u64, guild_id: u64) -> Result<UserProfile, ProfileStoreError> {
        (**self).get(user_id, guild_id).await
    }

    async fn put(&self, profile: UserProfile) -> Result<(), ProfileStoreError> {
        (**self).put(profile).await
    }

    async fn all(&self, guild_id: u64) -> Result<Vec<UserProfile>, ProfileStoreError> {
        (**self).all(guild_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_has_starting_credits() {
        let profile = UserProfile::new(1, 2);
        assert_eq!(profile.credits, 100);
        assert_eq!(profile.xp, 0);
        assert_eq!(profile.level, 0);
        assert_eq!(profile.description, "No description set.");
    }

    #[test]
    fn missing_fields_are_backfilled_on_read() {
        // A record written before reputation/description existed.
        let old = r#"{"user_id": 5, "guild_id": 9, "xp": 1200, "level": 3, "credits": 40}"#;
        let profile: UserProfile = serde_json::from_str(old).unwrap();
        assert_eq!(profile.xp, 1200);
        assert_eq!(profile.credits, 40);
        assert_eq!(profile.reputation, 0);
        assert_eq!(profile.last_daily, None);
        assert_eq!(profile.description, "No description set.");
    }

    #[test]
    fn absent_credits_default_to_starting_amount() {
        let old = r#"{"user_id": 5, "guild_id": 9, "xp": 10}"#;
        let profile: UserProfile = serde_json::from_str(old).unwrap();
        assert_eq!(profile.credits, 100);
    }
}
