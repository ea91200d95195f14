use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use time::OffsetDateTime;

use crate::errors::SummarizeError;
use crate::summarize::registry::{StrategyId, StrategyRegistry};

pub const DEFAULT_SENTENCE_COUNT: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => panic!("zero default"),
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSettings {
    pub strategy: StrategyId,
    pub sentence_count: NonZeroUsize,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct SettingsDefaults {
    pub strategy: StrategyId,
    pub sentence_count: NonZeroUsize,
}

/// Per-user settings, kept for the life of the process.
#[derive(Clone)]
pub struct SettingsStore {
    registry: Arc<StrategyRegistry>,
    defaults: SettingsDefaults,
    users: Arc<DashMap<UserId, UserSettings>>,
}

impl SettingsStore {
    pub fn new(registry: Arc<StrategyRegistry>, defaults: SettingsDefaults) -> Self {
        Self {
            registry,
            defaults,
            users: Arc::new(DashMap::new()),
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    fn fresh(&self) -> UserSettings {
        let now = OffsetDateTime::now_utc();
        UserSettings {
            strategy: self.defaults.strategy,
            sentence_count: self.defaults.sentence_count,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get(&self, user: &UserId) -> UserSettings {
        if let Some(existing) = self.users.get(user) {
            return existing.clone();
        }
        self.users
            .entry(user.clone())
            .or_insert_with(|| {
                tracing::debug!(user = %user, "initializing default settings");
                self.fresh()
            })
            .clone()
    }

    pub fn set_strategy(&self, user: &UserId, strategy: StrategyId) -> UserSettings {
        let mut entry = self
            .users
            .entry(user.clone())
            .or_insert_with(|| self.fresh());
        entry.strategy = strategy;
        entry.updated_at = OffsetDateTime::now_utc();
        entry.clone()
    }

    // Nothing is written when `name` does not resolve.
    pub fn select_strategy(&self, user: &UserId, name: &str) -> Result<UserSettings, SummarizeError> {
        let strategy = self.registry.resolve(name)?;
        tracing::info!(user = %user, %strategy, "strategy changed");
        Ok(self.set_strategy(user, strategy))
    }

    pub fn set_sentence_count(&self, user: &UserId, count: NonZeroUsize) -> UserSettings {
        let mut entry = self
            .users
            .entry(user.clone())
            .or_insert_with(|| self.fresh());
        entry.sentence_count = count;
        entry.updated_at = OffsetDateTime::now_utc();
        entry.clone()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}
