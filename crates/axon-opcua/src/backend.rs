// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Backend abstraction for node operations.
//!
//! A [`NodeBackend`] is the transport-facing half of a node: it turns
//! dispatch calls into wire requests and later delivers completions through
//! the node's [`NodeEventSink`](crate::node::NodeEventSink). One concrete
//! implementation exists per transport; the node itself never sees protocol
//! messages.
//!
//! Dispatch methods return `bool`: `true` means the request was accepted and
//! exactly one completion will eventually be delivered, `false` means the
//! request was never sent. Remote failures travel inside completions as
//! status codes, never as dispatch results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::attribute::{AttributeId, AttributeSet};
use crate::browse::BrowseOptions;
use crate::monitoring::{MonitoringParameterValue, MonitoringSettings};
use crate::status::StatusCode;
use crate::types::{DataType, IndexRange, MethodArgument, NodeId, Variant};

// =============================================================================
// AttributeReadEntry
// =============================================================================

/// Per-attribute result of a read operation, delivered with the completion.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeReadEntry {
    /// The attribute that was read.
    pub attribute: AttributeId,

    /// The value read, if the read succeeded.
    pub value: Option<Variant>,

    /// Status code of the read.
    pub status: StatusCode,

    /// Source timestamp reported by the server.
    pub source_timestamp: Option<DateTime<Utc>>,

    /// Server timestamp reported by the server.
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl AttributeReadEntry {
    /// Creates a successful read entry.
    pub fn success(attribute: AttributeId, value: Variant) -> Self {
        let now = Utc::now();
        Self {
            attribute,
            value: Some(value),
            status: StatusCode::Good,
            source_timestamp: Some(now),
            server_timestamp: Some(now),
        }
    }

    /// Creates a failed read entry.
    pub fn failure(attribute: AttributeId, status: StatusCode) -> Self {
        Self {
            attribute,
            value: None,
            status,
            source_timestamp: None,
            server_timestamp: Some(Utc::now()),
        }
    }

    /// Sets the timestamps.
    pub fn with_timestamps(
        mut self,
        source: Option<DateTime<Utc>>,
        server: Option<DateTime<Utc>>,
    ) -> Self {
        self.source_timestamp = source;
        self.server_timestamp = server;
        self
    }

    /// Returns `true` if the read succeeded.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.status.is_good()
    }
}

// =============================================================================
// NodeBackend Trait
// =============================================================================

/// Transport-facing dispatch interface of a node.
///
/// Implementations translate each dispatch into the corresponding service
/// request and must preserve per-attribute FIFO ordering of completions for
/// a single node. Completions for a destroyed node are dropped by the
/// [`NodeEventSink`](crate::node::NodeEventSink); implementations do not
/// need to track node lifetime themselves.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow concurrent access from
/// multiple tasks.
#[async_trait]
pub trait NodeBackend: Send + Sync {
    /// Dispatches a batched read of `attributes`, optionally restricted to
    /// `index_range`.
    async fn dispatch_read(&self, attributes: AttributeSet, index_range: IndexRange) -> bool;

    /// Dispatches a write of `value` to `attribute` using wire type
    /// `data_type`, optionally restricted to `index_range`.
    async fn dispatch_write(
        &self,
        attribute: AttributeId,
        value: Variant,
        data_type: DataType,
        index_range: IndexRange,
    ) -> bool;

    /// Dispatches creation of one monitored item per attribute in
    /// `attributes`, all targeting the subscription in `settings`.
    async fn dispatch_enable_monitoring(
        &self,
        attributes: AttributeSet,
        settings: MonitoringSettings,
    ) -> bool;

    /// Dispatches a single-parameter change for the monitored item of
    /// `attribute`.
    async fn dispatch_modify_monitoring(
        &self,
        attribute: AttributeId,
        change: MonitoringParameterValue,
    ) -> bool;

    /// Dispatches removal of the monitored items for `attributes`.
    async fn dispatch_disable_monitoring(&self, attributes: AttributeSet) -> bool;

    /// Dispatches a forward browse from this node.
    async fn dispatch_browse(&self, options: BrowseOptions) -> bool;

    /// Dispatches a remote method invocation.
    async fn dispatch_method_call(&self, method_id: NodeId, args: Vec<MethodArgument>) -> bool;

    /// Returns the node ID this backend is bound to.
    fn node_id(&self) -> NodeId;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_entry_success() {
        let entry = AttributeReadEntry::success(AttributeId::Value, Variant::Double(25.5));
        assert!(entry.is_good());
        assert_eq!(entry.value, Some(Variant::Double(25.5)));
        assert!(entry.source_timestamp.is_some());
        assert!(entry.server_timestamp.is_some());
    }

    #[test]
    fn test_read_entry_failure() {
        let entry = AttributeReadEntry::failure(AttributeId::Value, StatusCode::BadNodeIdUnknown);
        assert!(!entry.is_good());
        assert_eq!(entry.value, None);
        assert_eq!(entry.status, StatusCode::BadNodeIdUnknown);
        assert!(entry.source_timestamp.is_none());
    }

    #[test]
    fn test_read_entry_with_timestamps() {
        let ts = Utc::now();
        let entry = AttributeReadEntry::success(AttributeId::Value, Variant::Int32(1))
            .with_timestamps(Some(ts), None);
        assert_eq!(entry.source_timestamp, Some(ts));
        assert_eq!(entry.server_timestamp, None);
    }
}
