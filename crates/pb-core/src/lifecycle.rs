//! # Paste Lifecycle Engine
//!
//! Creation, lazy expiry eviction and view-budget consumption. Every call
//! receives an already resolved `now`; the engine never reads a clock.

use crate::error::{AppError, NotFoundReason, Result};
use crate::models::{to_iso8601, PasteRecord, PasteView};
use crate::traits::{IdGenerator, PasteStore};
use crate::validation::parse_new_paste;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub max_content_bytes: usize,
    /// How many lost conditional updates a consume tolerates before giving up.
    pub max_update_attempts: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_content_bytes: 512 * 1024,
            max_update_attempts: 16,
        }
    }
}

#[derive(Clone)]
pub struct PasteEngine {
    store: Arc<dyn PasteStore>,
    ids: Arc<dyn IdGenerator>,
    settings: EngineSettings,
}

impl PasteEngine {
    pub fn new(
        store: Arc<dyn PasteStore>,
        ids: Arc<dyn IdGenerator>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            ids,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn PasteStore> {
        &self.store
    }

    /// Validates `body` and persists a fresh record with zero views.
    pub async fn create(&self, body: &Value, now: i64) -> Result<PasteRecord> {
        let input = parse_new_paste(body, self.settings.max_content_bytes)?;

        let expires_at = match input.ttl_seconds {
            Some(ttl) => Some(deadline(now, ttl)?),
            None => None,
        };

        let record = PasteRecord::new(
            self.ids.generate(),
            input.content,
            now,
            expires_at,
            input.max_views,
        );
        self.store.put(&record).await?;

        tracing::info!(
            id = %record.id,
            expires_at = ?record.expires_at,
            max_views = ?record.max_views,
            "paste created"
        );
        Ok(record)
    }

    /// Reads a paste without spending a view.
    pub async fn inspect(&self, id: &str, now: i64) -> Result<PasteView> {
        let record = self.load_live(id, now).await?;
        tracing::debug!(id, "paste inspected");
        Ok(record.view())
    }

    /// Spends one view and returns the record as it stands after this access.
    pub async fn consume(&self, id: &str, now: i64) -> Result<PasteRecord> {
        for attempt in 1..=self.settings.max_update_attempts {
            let current = self.load_live(id, now).await?;

            if current.is_view_exhausted() {
                tracing::debug!(id, views = current.views, "view limit exceeded");
                return Err(AppError::NotFound(NotFoundReason::ViewLimitExceeded));
            }

            let mut next = current.clone();
            next.views += 1;

            if self.store.replace_if_views(&next, current.views).await? {
                tracing::debug!(id, views = next.views, "paste consumed");
                return Ok(next);
            }

            tracing::warn!(id, attempt, "lost view update race, retrying");
        }

        Err(AppError::Contention(id.to_string()))
    }

    /// Loads a record and evicts it if its deadline has passed.
    async fn load_live(&self, id: &str, now: i64) -> Result<PasteRecord> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or(AppError::NotFound(NotFoundReason::Missing))?;

        if record.is_expired(now) {
            self.store.delete(id).await?;
            tracing::warn!(id, now, expires_at = ?record.expires_at, "evicted expired paste");
            return Err(AppError::NotFound(NotFoundReason::Expired));
        }

        Ok(record)
    }
}

/// `now + ttl`, rejected unless it is also a representable calendar instant.
fn deadline(now: i64, ttl_seconds: u64) -> Result<i64> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(|ttl| ttl.checked_mul(1_000))
        .and_then(|ttl_ms| now.checked_add(ttl_ms))
        .filter(|&expires_at| to_iso8601(expires_at).is_some())
        .ok_or_else(|| AppError::validation("ttl_seconds", "ttl_seconds is too large"))
}
