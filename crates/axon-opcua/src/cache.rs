// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Local attribute cache.
//!
//! The cache holds the last known value, status code, and timestamps for each
//! node attribute. Entries are replaced atomically: a reader never observes a
//! value from one update paired with the status or timestamps of another.
//! Absent entries yield well-defined defaults instead of errors: an empty
//! value, a `BadNotFound` status, and null timestamps.
//!
//! No operation blocks and none can fail; the cache is plain shared state
//! behind a non-poisoning lock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::attribute::AttributeId;
use crate::status::StatusCode;
use crate::types::Variant;

// =============================================================================
// AttributeEntry
// =============================================================================

/// Cached state of a single node attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeEntry {
    /// Last known value, absent until first read or update.
    pub value: Option<Variant>,

    /// Result of the last read, write, or change notification.
    pub status: StatusCode,

    /// Source timestamp from the last read or update.
    pub source_timestamp: Option<DateTime<Utc>>,

    /// Server timestamp from the last read or update.
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl Default for AttributeEntry {
    fn default() -> Self {
        Self {
            value: None,
            status: StatusCode::BadNotFound,
            source_timestamp: None,
            server_timestamp: None,
        }
    }
}

// =============================================================================
// Timestamps
// =============================================================================

/// The timestamp pair of a cached attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    /// Source timestamp (when the underlying value changed at its origin).
    pub source: Option<DateTime<Utc>>,

    /// Server timestamp (when the server recorded the value).
    pub server: Option<DateTime<Utc>>,
}

// =============================================================================
// AttributeCache
// =============================================================================

/// Per-node storage of attribute values with freshness metadata.
///
/// Writes are serialized per cache; concurrent reads of settled entries are
/// safe. Readers receive clones taken under the read lock, which together
/// with whole-entry replacement gives the atomicity the rest of the node
/// relies on.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: RwLock<HashMap<AttributeId, AttributeEntry>>,
}

impl AttributeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the full entry for `attribute`, if one exists.
    pub fn get(&self, attribute: AttributeId) -> Option<AttributeEntry> {
        self.entries.read().get(&attribute).cloned()
    }

    /// Returns the cached value for `attribute`.
    ///
    /// `None` until the attribute has been read or updated at least once.
    pub fn value(&self, attribute: AttributeId) -> Option<Variant> {
        self.entries
            .read()
            .get(&attribute)
            .and_then(|entry| entry.value.clone())
    }

    /// Returns the status of the last operation on `attribute`.
    ///
    /// `BadNotFound` for attributes that were never populated.
    pub fn status(&self, attribute: AttributeId) -> StatusCode {
        self.entries
            .read()
            .get(&attribute)
            .map(|entry| entry.status)
            .unwrap_or(StatusCode::BadNotFound)
    }

    /// Returns the timestamp pair for `attribute`, if an entry exists.
    pub fn timestamps(&self, attribute: AttributeId) -> Option<Timestamps> {
        self.entries.read().get(&attribute).map(|entry| Timestamps {
            source: entry.source_timestamp,
            server: entry.server_timestamp,
        })
    }

    /// Returns the source timestamp of the last read or update.
    pub fn source_timestamp(&self, attribute: AttributeId) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .get(&attribute)
            .and_then(|entry| entry.source_timestamp)
    }

    /// Returns the server timestamp of the last read or update.
    pub fn server_timestamp(&self, attribute: AttributeId) -> Option<DateTime<Utc>> {
        self.entries
            .read()
            .get(&attribute)
            .and_then(|entry| entry.server_timestamp)
    }

    /// Replaces the entry for `attribute` in one atomic step.
    pub fn put(
        &self,
        attribute: AttributeId,
        value: Option<Variant>,
        status: StatusCode,
        source_timestamp: Option<DateTime<Utc>>,
        server_timestamp: Option<DateTime<Utc>>,
    ) {
        let entry = AttributeEntry {
            value,
            status,
            source_timestamp,
            server_timestamp,
        };
        self.entries.write().insert(attribute, entry);
    }

    /// Updates status and timestamps while preserving the last known value.
    ///
    /// Used for failed reads: the status must reflect the outcome without
    /// discarding the last good value.
    pub fn update_status(
        &self,
        attribute: AttributeId,
        status: StatusCode,
        source_timestamp: Option<DateTime<Utc>>,
        server_timestamp: Option<DateTime<Utc>>,
    ) {
        let mut entries = self.entries.write();
        let entry = entries.entry(attribute).or_default();
        entry.status = status;
        entry.source_timestamp = source_timestamp;
        entry.server_timestamp = server_timestamp;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_entry_defaults() {
        let cache = AttributeCache::new();

        assert_eq!(cache.value(AttributeId::Value), None);
        assert_eq!(cache.status(AttributeId::Value), StatusCode::BadNotFound);
        assert_eq!(cache.timestamps(AttributeId::Value), None);
        assert_eq!(cache.source_timestamp(AttributeId::Value), None);
        assert_eq!(cache.server_timestamp(AttributeId::Value), None);
    }

    #[test]
    fn test_put_replaces_whole_entry() {
        let cache = AttributeCache::new();
        let ts = Utc::now();

        cache.put(
            AttributeId::Value,
            Some(Variant::Int32(1)),
            StatusCode::Good,
            Some(ts),
            Some(ts),
        );

        let entry = cache.get(AttributeId::Value).unwrap();
        assert_eq!(entry.value, Some(Variant::Int32(1)));
        assert_eq!(entry.status, StatusCode::Good);
        assert_eq!(entry.source_timestamp, Some(ts));

        // A later put fully replaces the previous entry
        cache.put(
            AttributeId::Value,
            Some(Variant::Int32(2)),
            StatusCode::Good,
            None,
            None,
        );
        let entry = cache.get(AttributeId::Value).unwrap();
        assert_eq!(entry.value, Some(Variant::Int32(2)));
        assert_eq!(entry.source_timestamp, None);
    }

    #[test]
    fn test_update_status_preserves_value() {
        let cache = AttributeCache::new();
        let ts = Utc::now();

        cache.put(
            AttributeId::Value,
            Some(Variant::Double(25.5)),
            StatusCode::Good,
            Some(ts),
            Some(ts),
        );

        cache.update_status(AttributeId::Value, StatusCode::BadNodeIdUnknown, None, None);

        let entry = cache.get(AttributeId::Value).unwrap();
        assert_eq!(entry.value, Some(Variant::Double(25.5)));
        assert_eq!(entry.status, StatusCode::BadNodeIdUnknown);
        assert_eq!(entry.source_timestamp, None);
    }

    #[test]
    fn test_update_status_on_absent_entry() {
        let cache = AttributeCache::new();

        cache.update_status(AttributeId::DisplayName, StatusCode::BadAttributeIdInvalid, None, None);

        let entry = cache.get(AttributeId::DisplayName).unwrap();
        assert_eq!(entry.value, None);
        assert_eq!(entry.status, StatusCode::BadAttributeIdInvalid);
    }

    #[test]
    fn test_entries_independent_per_attribute() {
        let cache = AttributeCache::new();

        cache.put(
            AttributeId::Value,
            Some(Variant::Int32(5)),
            StatusCode::Good,
            None,
            None,
        );

        assert_eq!(cache.status(AttributeId::Value), StatusCode::Good);
        assert_eq!(cache.status(AttributeId::DisplayName), StatusCode::BadNotFound);
    }
}
