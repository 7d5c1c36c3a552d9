// JSON-file implementation of ProfileStore. All profiles live in a single
// file as a map: { guild_id: { user_id: UserProfile } }, loaded into memory
// at startup and rewritten in full after every put. The RwLock serializes
// writers, so concurrent puts cannot interleave a half-written file.

use crate::core::profiles::{ProfileStore, ProfileStoreError, UserProfile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::warn;

type Profiles = HashMap<u64, HashMap<u64, UserProfile>>;

pub struct JsonProfileStore {
    path: PathBuf,
    cache: RwLock<Profiles>,
}

impl JsonProfileStore {
    /// A missing file starts empty; an unreadable or corrupt one is treated
    /// the same way rather than refusing to boot.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = Self::load(&path);
        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    fn load(path: &PathBuf) -> Profiles {
        if !path.exists() {
            return Profiles::default();
        }
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not open profile file, starting empty");
                return Profiles::default();
            }
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt profile file, starting empty");
                Profiles::default()
            }
        }
    }

    async fn persist(&self) -> Result<(), ProfileStoreError> {
        let cache = self.cache.read().await;
        let file =
            File::create(&self.path).map_err(|e| ProfileStoreError::Storage(e.to_string()))?;
        serde_json::to_writer_pretty(file, &*cache)
            .map_err(|e| ProfileStoreError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonProfileStore {
    async fn get(&self, user_id: u64, guild_id: u64) -> Result<UserProfile, ProfileStoreError> {
        let cache = self.cache.read().await;
        Ok(cache
            .get(&guild_id)
            .and_then(|m| m.get(&user_id))
            .cloned()
            .unwrap_or_else(|| UserProfile::new(user_id, guild_id)))
    }

    async fn put(&self, profile: UserProfile) -> Result<(), ProfileStoreError> {
        let mut cache = self.cache.write().await;
        cache
            .entry(profile.guild_id)
            .or_default()
            .insert(profile.user_id, profile);
        drop(cache);
        self.persist().await
    }

    async fn all(&self, guild_id: u64) -> Result<Vec<UserProfile>, ProfileStoreError> {
        let cache = self.cache.read().await;
        Ok(cache
            .get(&guild_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }
}
