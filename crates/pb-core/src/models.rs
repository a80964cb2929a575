//! # Domain Models
//!
//! The paste record is the only stored entity. All timestamps are
//! milliseconds since the Unix epoch.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A stored text blob with its lifecycle constraints.
///
/// This is also the serialized form kept in the store, so field names are
/// part of the storage format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteRecord {
    pub id: String,
    pub content: String,
    pub created_at: i64,
    /// `None` means the paste never expires.
    pub expires_at: Option<i64>,
    /// `None` means unlimited views.
    pub max_views: Option<u64>,
    /// Successful consuming accesses so far.
    pub views: u64,
}

impl PasteRecord {
    pub fn new(
        id: String,
        content: String,
        created_at: i64,
        expires_at: Option<i64>,
        max_views: Option<u64>,
    ) -> Self {
        Self {
            id,
            content,
            created_at,
            expires_at,
            max_views,
            views: 0,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }

    pub fn is_view_exhausted(&self) -> bool {
        matches!(self.max_views, Some(max) if self.views >= max)
    }

    /// Views left before the budget runs out, clamped at zero.
    pub fn remaining_views(&self) -> Option<u64> {
        self.max_views.map(|max| max.saturating_sub(self.views))
    }

    /// Read-only projection handed out by the inspect path.
    pub fn view(&self) -> PasteView {
        PasteView {
            content: self.content.clone(),
            remaining_views: self.remaining_views(),
            expires_at: self.expires_at,
        }
    }
}

/// What a non-consuming inspection reveals about a live paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteView {
    pub content: String,
    pub remaining_views: Option<u64>,
    pub expires_at: Option<i64>,
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub content: String,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
}

/// Formats epoch milliseconds the way the API exposes them,
/// e.g. `2024-01-01T00:00:00.000Z`.
pub fn to_iso8601(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
