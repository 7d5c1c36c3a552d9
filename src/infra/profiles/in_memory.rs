// In-memory implementation of ProfileStore, used by the test suites and
// handy for running the bot without persistence.

use crate::core::profiles::{ProfileStore, ProfileStoreError, UserProfile};
use async_trait::async_trait;
use dashmap::DashMap;

/// Profiles are per user per guild, so the key carries both ids.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct UserGuildKey {
    user_id: u64,
    guild_id: u64,
}

pub struct InMemoryProfileStore {
    data: DashMap<UserGuildKey, UserProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: u64, guild_id: u64) -> Result<UserProfile, ProfileStoreError> {
        let key = UserGuildKey { user_id, guild_id };
        Ok(self
            .data
            .get(&key)
            .map(|entry| entry.clone())
            .unwrap_or_else(|| UserProfile::new(user_id, guild_id)))
    }

    async fn put(&self, profile: UserProfile) -> Result<(), ProfileStoreError> {
        let key = UserGuildKey {
            user_id: profile.user_id,
            guild_id: profile.guild_id,
        };
        self.data.insert(key, profile);
        Ok(())
    }

    async fn all(&self, guild_id: u64) -> Result<Vec<UserProfile>, ProfileStoreError> {
        Ok(self
            .data
            .iter()
            .filter(|entry| entry.key().guild_id == guild_id)
            .map(|entry| entry.value().clone())
            .collect())
    }
}
