//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use crate::error::Result;
use crate::models::PasteRecord;
use async_trait::async_trait;

/// Key-value persistence contract for paste records.
///
/// Each call is atomic for its own key. There are no multi-key transactions,
/// and the store never looks at expiry itself; eviction belongs to the engine.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasteStore: Send + Sync {
    /// Persists or overwrites the record under `record.id`.
    async fn put(&self, record: &PasteRecord) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<PasteRecord>>;

    /// Removes the key. Deleting a missing key is not an error.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Writes `record` only if the stored record under the same id still has
    /// `views == expected_views`. Returns `false` when the record changed or
    /// vanished in the meantime.
    async fn replace_if_views(&self, record: &PasteRecord, expected_views: u64) -> Result<bool>;

    /// Round trip used by the health check.
    async fn ping(&self) -> Result<()>;
}

/// Produces unique opaque paste identifiers.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Source of "current time" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}
