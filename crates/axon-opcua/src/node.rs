// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client-side node handle.
//!
//! A [`Node`] is the basic building block of the OPC UA address space as seen
//! from a client: it reads and writes attributes, watches them through
//! monitored items, browses child references, and calls methods. Results of a
//! read are cached locally and served synchronously through
//! [`attribute`](Node::attribute) after the corresponding
//! [`NodeEvent::AttributeRead`] has been observed.
//!
//! # Dispatch contract
//!
//! Every remote-facing operation first passes the [`RequestGate`] (client
//! alive and connected) and returns a `bool`:
//!
//! - `false`: the request was never sent and no notification will follow
//! - `true`: exactly one matching [`NodeEvent`] will eventually be delivered,
//!   unless the node is destroyed first
//!
//! Remote failures arrive as status codes inside events; the cache keeps the
//! last known good value on failure.
//!
//! # Completion path
//!
//! The backend delivers completions through the [`NodeEventSink`] obtained
//! from [`Node::event_sink`]. The sink holds only a weak reference: once the
//! node is dropped, late completions are silently discarded: no cache write,
//! no event.
//!
//! # Example
//!
//! ```rust,ignore
//! use axon_opcua::attribute::{AttributeId, MANDATORY_BASE_ATTRIBUTES};
//!
//! let mut events = node.subscribe();
//! if node.read_attributes(MANDATORY_BASE_ATTRIBUTES).await {
//!     if let NodeEvent::AttributeRead { attributes } = events.recv().await? {
//!         println!("browse name: {:?}", node.attribute(AttributeId::BrowseName));
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::attribute::{AttributeId, AttributeSet};
use crate::backend::{AttributeReadEntry, NodeBackend};
use crate::browse::{BrowseOptions, NodeClassMask, ReferenceDescription, ReferenceTypeId};
use crate::cache::{AttributeCache, Timestamps};
use crate::client::ClientHandle;
use crate::monitoring::{
    DataChangeFilter, MonitoringParameterValue, MonitoringParameters, MonitoringRegistry,
    MonitoringSettings,
};
use crate::status::StatusCode;
use crate::types::{DataType, IndexRange, MethodArgument, NodeId, Variant};

/// Buffered outward notifications per node before lagging receivers drop.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// RequestGate
// =============================================================================

/// Precondition check in front of every dispatching operation.
///
/// The gate is open while the owning client exists and reports
/// [`ConnectionState::Connected`](crate::client::ConnectionState::Connected).
/// Checking has no side effects.
#[derive(Debug, Clone)]
pub struct RequestGate {
    client: ClientHandle,
}

impl RequestGate {
    /// Creates a gate observing `client`.
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }

    /// Returns `true` if operations may be dispatched.
    pub fn is_open(&self) -> bool {
        self.client.is_connected()
    }
}

// =============================================================================
// NodeEvent
// =============================================================================

/// Outward notification delivered after an asynchronous operation finishes.
///
/// For a single attribute, events arrive in the order the corresponding
/// requests were dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// A read operation finished; per-attribute results are in the cache.
    AttributeRead {
        /// The attributes the read was requested for.
        attributes: AttributeSet,
    },

    /// A write operation finished for one attribute.
    AttributeWritten {
        /// The written attribute.
        attribute: AttributeId,
        /// Outcome of the write.
        status: StatusCode,
    },

    /// A data change notification arrived for a monitored attribute.
    AttributeUpdated {
        /// The changed attribute.
        attribute: AttributeId,
        /// The new value.
        value: Variant,
    },

    /// An enable-monitoring request finished for one attribute.
    MonitoringEnableFinished {
        /// The attribute.
        attribute: AttributeId,
        /// Outcome of the enable.
        status: StatusCode,
    },

    /// A disable-monitoring request finished for one attribute.
    MonitoringDisableFinished {
        /// The attribute.
        attribute: AttributeId,
        /// Outcome of the disable.
        status: StatusCode,
    },

    /// A modify-monitoring request finished.
    MonitoringStatusChanged {
        /// The attribute.
        attribute: AttributeId,
        /// Monitoring state after the change (server-revised).
        parameters: MonitoringParameters,
        /// Outcome of the modification.
        status: StatusCode,
    },

    /// A method call finished.
    MethodCallFinished {
        /// The method node that was called.
        method_id: NodeId,
        /// Output arguments; empty if the method has none or the call failed.
        outputs: Vec<Variant>,
        /// Outcome of the call.
        status: StatusCode,
    },

    /// A browse finished.
    BrowseFinished {
        /// Matching child references; empty on any non-good status.
        children: Vec<ReferenceDescription>,
        /// Outcome of the browse.
        status: StatusCode,
    },
}

// =============================================================================
// NodeInner
// =============================================================================

/// State shared between the node handle and its event sink.
struct NodeInner {
    node_id: NodeId,
    cache: AttributeCache,
    registry: MonitoringRegistry,
    events: broadcast::Sender<NodeEvent>,
}

impl NodeInner {
    fn emit(&self, event: NodeEvent) {
        // Send fails only when no receiver is subscribed; the cache and
        // registry are already up to date at this point.
        let _ = self.events.send(event);
    }
}

// =============================================================================
// NodeEventSink
// =============================================================================

/// Completion channel from the backend into a node.
///
/// Holds a weak reference to the node's state: completions that arrive after
/// the node was destroyed are dropped without touching cache, registry, or
/// subscribers.
#[derive(Clone)]
pub struct NodeEventSink {
    inner: Weak<NodeInner>,
}

impl NodeEventSink {
    fn upgrade(&self) -> Option<Arc<NodeInner>> {
        let inner = self.inner.upgrade();
        if inner.is_none() {
            tracing::debug!("Discarding completion for destroyed node");
        }
        inner
    }

    /// Delivers the completion of a read operation.
    ///
    /// Successful entries replace their cache entry; failed entries update
    /// status and timestamps while keeping the last known value. The
    /// aggregate [`NodeEvent::AttributeRead`] follows the cache update.
    pub fn attribute_read_complete(&self, results: Vec<AttributeReadEntry>) {
        let Some(inner) = self.upgrade() else {
            return;
        };

        let mut attributes = AttributeSet::EMPTY;
        for entry in results {
            attributes = attributes.with(entry.attribute);
            if entry.status.is_good() {
                inner.cache.put(
                    entry.attribute,
                    entry.value,
                    entry.status,
                    entry.source_timestamp,
                    entry.server_timestamp,
                );
            } else {
                inner.cache.update_status(
                    entry.attribute,
                    entry.status,
                    entry.source_timestamp,
                    entry.server_timestamp,
                );
            }
        }

        inner.emit(NodeEvent::AttributeRead { attributes });
    }

    /// Delivers the completion of a write operation for one attribute.
    ///
    /// On success the cache is updated with the written value and fresh
    /// timestamps before the event is sent, so observers reading the cache
    /// inside their handler see the new value. On failure the cache is left
    /// untouched.
    pub fn attribute_write_complete(
        &self,
        attribute: AttributeId,
        value: Variant,
        status: StatusCode,
    ) {
        let Some(inner) = self.upgrade() else {
            return;
        };

        if status.is_good() {
            let now = Utc::now();
            inner
                .cache
                .put(attribute, Some(value), status, Some(now), Some(now));
        } else {
            tracing::warn!(
                node_id = %inner.node_id,
                attribute = %attribute,
                %status,
                "Attribute write failed"
            );
        }

        inner.emit(NodeEvent::AttributeWritten { attribute, status });
    }

    /// Delivers an asynchronous data change notification.
    pub fn attribute_value_changed(
        &self,
        attribute: AttributeId,
        value: Variant,
        status: StatusCode,
        source_timestamp: Option<DateTime<Utc>>,
        server_timestamp: Option<DateTime<Utc>>,
    ) {
        let Some(inner) = self.upgrade() else {
            return;
        };

        inner.cache.put(
            attribute,
            Some(value.clone()),
            status,
            source_timestamp,
            server_timestamp,
        );

        inner.emit(NodeEvent::AttributeUpdated { attribute, value });
    }

    /// Delivers the per-attribute completion of an enable-monitoring request.
    ///
    /// `parameters.status` carries the outcome; on success the (possibly
    /// server-revised) parameters are stored before the event is sent.
    pub fn monitoring_enable_complete(
        &self,
        attribute: AttributeId,
        parameters: MonitoringParameters,
    ) {
        let Some(inner) = self.upgrade() else {
            return;
        };

        let status = parameters.status;
        if status.is_good() {
            inner.registry.set(attribute, parameters);
        } else {
            tracing::warn!(
                node_id = %inner.node_id,
                attribute = %attribute,
                %status,
                "Enable monitoring failed"
            );
        }

        inner.emit(NodeEvent::MonitoringEnableFinished { attribute, status });
    }

    /// Delivers the completion of a modify-monitoring request.
    ///
    /// On success the confirmed (possibly revised) value replaces the
    /// parameter in the registry entry before the event is sent.
    pub fn monitoring_modify_complete(
        &self,
        attribute: AttributeId,
        change: MonitoringParameterValue,
        status: StatusCode,
    ) {
        let Some(inner) = self.upgrade() else {
            return;
        };

        if status.is_good() {
            let _ = inner.registry.apply(attribute, &change);
        }

        let parameters = inner.registry.status(attribute);
        inner.emit(NodeEvent::MonitoringStatusChanged {
            attribute,
            parameters,
            status,
        });
    }

    /// Delivers the per-attribute completion of a disable-monitoring request.
    ///
    /// On success the registry entry is reset to the disabled default before
    /// the event is sent.
    pub fn monitoring_disable_complete(&self, attribute: AttributeId, status: StatusCode) {
        let Some(inner) = self.upgrade() else {
            return;
        };

        if status.is_good() {
            inner.registry.clear(attribute);
        }

        inner.emit(NodeEvent::MonitoringDisableFinished { attribute, status });
    }

    /// Delivers the completion of a browse.
    ///
    /// On any non-good status the delivered list is empty regardless of
    /// partial results.
    pub fn browse_complete(&self, children: Vec<ReferenceDescription>, status: StatusCode) {
        let Some(inner) = self.upgrade() else {
            return;
        };

        let children = if status.is_good() { children } else { Vec::new() };
        inner.emit(NodeEvent::BrowseFinished { children, status });
    }

    /// Delivers the completion of a method call.
    ///
    /// On any non-good status the delivered output list is empty.
    pub fn method_call_complete(
        &self,
        method_id: NodeId,
        outputs: Vec<Variant>,
        status: StatusCode,
    ) {
        let Some(inner) = self.upgrade() else {
            return;
        };

        let outputs = if status.is_good() { outputs } else { Vec::new() };
        inner.emit(NodeEvent::MethodCallFinished {
            method_id,
            outputs,
            status,
        });
    }
}

impl fmt::Debug for NodeEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeEventSink")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

// =============================================================================
// Node
// =============================================================================

/// Client-side handle to one node in a remote address space.
///
/// The node owns its [`AttributeCache`] and [`MonitoringRegistry`]
/// exclusively and routes backend completions into them before notifying
/// subscribers. It does not own the backend or the client: the backend is
/// shared, the client observed weakly.
pub struct Node {
    inner: Arc<NodeInner>,
    backend: Arc<dyn NodeBackend>,
    gate: RequestGate,
}

impl Node {
    /// Creates a node over `backend`, gated on `client`.
    pub fn new(backend: Arc<dyn NodeBackend>, client: ClientHandle) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let inner = Arc::new(NodeInner {
            node_id: backend.node_id(),
            cache: AttributeCache::new(),
            registry: MonitoringRegistry::new(),
            events,
        });

        Self {
            inner,
            backend,
            gate: RequestGate::new(client),
        }
    }

    /// Returns the completion sink to hand to the backend.
    pub fn event_sink(&self) -> NodeEventSink {
        NodeEventSink {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Subscribes to outward notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.inner.events.subscribe()
    }

    // =========================================================================
    // Cache Accessors
    // =========================================================================

    /// Returns the cached value of `attribute`.
    ///
    /// `None` until an [`NodeEvent::AttributeRead`] or
    /// [`NodeEvent::AttributeUpdated`] has been observed for it.
    pub fn attribute(&self, attribute: AttributeId) -> Option<Variant> {
        self.inner.cache.value(attribute)
    }

    /// Returns the status code of the last operation on `attribute`.
    ///
    /// `BadNotFound` for attributes never read, written, or updated.
    pub fn attribute_error(&self, attribute: AttributeId) -> StatusCode {
        self.inner.cache.status(attribute)
    }

    /// Returns the source timestamp from the last read or data change.
    pub fn source_timestamp(&self, attribute: AttributeId) -> Option<DateTime<Utc>> {
        self.inner.cache.source_timestamp(attribute)
    }

    /// Returns the server timestamp from the last read or data change.
    pub fn server_timestamp(&self, attribute: AttributeId) -> Option<DateTime<Utc>> {
        self.inner.cache.server_timestamp(attribute)
    }

    /// Returns both cached timestamps of `attribute`, if an entry exists.
    pub fn timestamps(&self, attribute: AttributeId) -> Option<Timestamps> {
        self.inner.cache.timestamps(attribute)
    }

    /// Returns the monitoring state of `attribute` from the last confirmed
    /// server response. Never touches the network.
    pub fn monitoring_status(&self, attribute: AttributeId) -> MonitoringParameters {
        self.inner.registry.status(attribute)
    }

    /// Returns the node's identifier string (`ns=<idx>;<kind>=<id>`), or an
    /// empty string while not connected.
    pub fn node_id(&self) -> String {
        if !self.gate.is_open() {
            return String::new();
        }
        self.backend.node_id().to_opc_string()
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Starts an asynchronous read of the attributes in `attributes`.
    ///
    /// Returns `true` if the request was dispatched. Values are valid after
    /// the matching [`NodeEvent::AttributeRead`]; per-attribute outcomes are
    /// read with [`attribute_error`](Node::attribute_error).
    pub async fn read_attributes(&self, attributes: AttributeSet) -> bool {
        if !self.check_gate("read_attributes") {
            return false;
        }

        self.backend
            .dispatch_read(attributes, IndexRange::full())
            .await
    }

    /// Starts an asynchronous read of one attribute restricted to
    /// `index_range` (see [`IndexRange`] for the selector grammar).
    pub async fn read_attribute_range(
        &self,
        attribute: AttributeId,
        index_range: IndexRange,
    ) -> bool {
        if !self.check_gate("read_attribute_range") {
            return false;
        }

        self.backend
            .dispatch_read(AttributeSet::single(attribute), index_range)
            .await
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Starts an asynchronous write of `value` to `attribute`.
    ///
    /// If `data_type` is omitted, the wire type is taken from the payload via
    /// the fixed default table ([`Variant::default_data_type`]); payload kinds
    /// without a default are rejected at dispatch time.
    pub async fn write_attribute(
        &self,
        attribute: AttributeId,
        value: Variant,
        data_type: Option<DataType>,
    ) -> bool {
        self.write_attribute_range(attribute, value, IndexRange::full(), data_type)
            .await
    }

    /// Starts an asynchronous write restricted to `index_range`.
    pub async fn write_attribute_range(
        &self,
        attribute: AttributeId,
        value: Variant,
        index_range: IndexRange,
        data_type: Option<DataType>,
    ) -> bool {
        if !self.check_gate("write_attribute") {
            return false;
        }

        let Some(data_type) = Self::resolve_write_type(&value, data_type) else {
            tracing::warn!(
                node_id = %self.inner.node_id,
                attribute = %attribute,
                "Write rejected: no default wire type for payload"
            );
            return false;
        };

        self.backend
            .dispatch_write(attribute, value, data_type, index_range)
            .await
    }

    /// Starts one asynchronous write per entry of `values`.
    ///
    /// One [`NodeEvent::AttributeWritten`] is delivered per attribute, each
    /// carrying that attribute's own outcome. `value_type` applies only to
    /// the [`AttributeId::Value`] entry; all other attributes use the type
    /// implied by their definition.
    ///
    /// Type resolution for the whole batch happens before the first dispatch;
    /// returns `true` only if every write was accepted.
    pub async fn write_attributes(
        &self,
        values: HashMap<AttributeId, Variant>,
        value_type: Option<DataType>,
    ) -> bool {
        if !self.check_gate("write_attributes") {
            return false;
        }

        let mut writes = Vec::with_capacity(values.len());
        for (attribute, value) in values {
            let hint = if attribute == AttributeId::Value {
                value_type
            } else {
                Some(attribute.implied_data_type())
            };
            let Some(data_type) = Self::resolve_write_type(&value, hint) else {
                tracing::warn!(
                    node_id = %self.inner.node_id,
                    attribute = %attribute,
                    "Batch write rejected: no default wire type for payload"
                );
                return false;
            };
            writes.push((attribute, value, data_type));
        }

        let mut accepted = true;
        for (attribute, value, data_type) in writes {
            accepted &= self
                .backend
                .dispatch_write(attribute, value, data_type, IndexRange::full())
                .await;
        }
        accepted
    }

    // =========================================================================
    // Monitoring Operations
    // =========================================================================

    /// Requests one monitored item per attribute in `attributes`, all against
    /// the subscription named in `settings`.
    ///
    /// Each attribute's outcome arrives as a separate
    /// [`NodeEvent::MonitoringEnableFinished`] and updates
    /// [`monitoring_status`](Node::monitoring_status) with the
    /// server-revised parameters.
    pub async fn enable_monitoring(
        &self,
        attributes: AttributeSet,
        settings: MonitoringSettings,
    ) -> bool {
        if !self.check_gate("enable_monitoring") {
            return false;
        }

        if let Err(error) = settings.validate() {
            tracing::warn!(
                node_id = %self.inner.node_id,
                %error,
                "Enable monitoring rejected"
            );
            return false;
        }

        self.backend
            .dispatch_enable_monitoring(attributes, settings)
            .await
    }

    /// Requests a change of one parameter of the monitored item for
    /// `attribute`.
    ///
    /// On success the server-confirmed value replaces the parameter before
    /// the matching [`NodeEvent::MonitoringStatusChanged`] fires.
    pub async fn modify_monitoring(
        &self,
        attribute: AttributeId,
        change: MonitoringParameterValue,
    ) -> bool {
        if !self.check_gate("modify_monitoring") {
            return false;
        }

        self.backend
            .dispatch_modify_monitoring(attribute, change)
            .await
    }

    /// Modifies an existing data change monitoring to use `filter`.
    pub async fn modify_data_change_filter(
        &self,
        attribute: AttributeId,
        filter: DataChangeFilter,
    ) -> bool {
        self.modify_monitoring(attribute, MonitoringParameterValue::Filter(filter))
            .await
    }

    /// Requests removal of the monitored items for `attributes`.
    ///
    /// After the matching [`NodeEvent::MonitoringDisableFinished`],
    /// [`monitoring_status`](Node::monitoring_status) returns the disabled
    /// default for that attribute.
    pub async fn disable_monitoring(&self, attributes: AttributeSet) -> bool {
        if !self.check_gate("disable_monitoring") {
            return false;
        }

        self.backend.dispatch_disable_monitoring(attributes).await
    }

    // =========================================================================
    // Browse & Method Operations
    // =========================================================================

    /// Starts a forward browse from this node.
    ///
    /// `reference_type` restricts the traversed reference kind (for example
    /// [`ReferenceTypeId::HasProperty`] for properties only);
    /// `node_class_mask` filters results by node class. The full ordered
    /// child list arrives in [`NodeEvent::BrowseFinished`].
    pub async fn browse_children(
        &self,
        reference_type: ReferenceTypeId,
        node_class_mask: NodeClassMask,
    ) -> bool {
        if !self.check_gate("browse_children") {
            return false;
        }

        let options = BrowseOptions::new()
            .with_reference_type(reference_type)
            .with_node_class_mask(node_class_mask);
        self.backend.dispatch_browse(options).await
    }

    /// Calls the remote method `method_id` with `args`.
    ///
    /// The result arrives in [`NodeEvent::MethodCallFinished`]; the output
    /// list is empty if the method declares no outputs or the call failed.
    pub async fn call_method(&self, method_id: NodeId, args: Vec<MethodArgument>) -> bool {
        if !self.check_gate("call_method") {
            return false;
        }

        self.backend.dispatch_method_call(method_id, args).await
    }

    // =========================================================================
    // Private
    // =========================================================================

    fn check_gate(&self, operation: &str) -> bool {
        if self.gate.is_open() {
            return true;
        }
        tracing::debug!(
            node_id = %self.inner.node_id,
            operation,
            "Dispatch rejected: client not connected"
        );
        false
    }

    fn resolve_write_type(value: &Variant, hint: Option<DataType>) -> Option<DataType> {
        hint.or_else(|| value.default_data_type())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("node_id", &self.inner.node_id)
            .field("connected", &self.gate.is_open())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
