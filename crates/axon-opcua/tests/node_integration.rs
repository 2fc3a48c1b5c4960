// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node Integration Tests
//!
//! These tests exercise the full dispatch/completion cycle of a [`Node`]
//! against an in-memory mock backend: the test plays the transport role,
//! delivering completions through the node's [`NodeEventSink`] and asserting
//! the observable cache, registry, and notification behavior.
//!
//! No server is required.
//!
//! ```bash
//! cargo test -p axon-opcua --test node_integration
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::TryRecvError;

use axon_opcua::attribute::MANDATORY_BASE_ATTRIBUTES;
use axon_opcua::{
    AttributeId, AttributeReadEntry, AttributeSet, BrowseOptions, ClientState, ConnectionState,
    DataType, IndexRange, MethodArgument, MonitoringParameterValue, MonitoringParameters,
    MonitoringSettings, Node, NodeBackend, NodeClass, NodeClassMask, NodeEvent, NodeId,
    ReferenceDescription, ReferenceTypeId, StatusCode, SubscriptionId, Variant,
};

// =============================================================================
// Mock Backend
// =============================================================================

/// In-memory backend recording every dispatch.
struct MockBackend {
    node_id: NodeId,
    accept: AtomicBool,
    reads: Mutex<Vec<(AttributeSet, IndexRange)>>,
    writes: Mutex<Vec<(AttributeId, Variant, DataType, IndexRange)>>,
    enables: Mutex<Vec<(AttributeSet, MonitoringSettings)>>,
    modifies: Mutex<Vec<(AttributeId, MonitoringParameterValue)>>,
    disables: Mutex<Vec<AttributeSet>>,
    browses: Mutex<Vec<BrowseOptions>>,
    method_calls: Mutex<Vec<(NodeId, Vec<MethodArgument>)>>,
}

impl MockBackend {
    fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            accept: AtomicBool::new(true),
            reads: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            enables: Mutex::new(Vec::new()),
            modifies: Mutex::new(Vec::new()),
            disables: Mutex::new(Vec::new()),
            browses: Mutex::new(Vec::new()),
            method_calls: Mutex::new(Vec::new()),
        }
    }

    fn dispatch_count(&self) -> usize {
        self.reads.lock().unwrap().len()
            + self.writes.lock().unwrap().len()
            + self.enables.lock().unwrap().len()
            + self.modifies.lock().unwrap().len()
            + self.disables.lock().unwrap().len()
            + self.browses.lock().unwrap().len()
            + self.method_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl NodeBackend for MockBackend {
    async fn dispatch_read(&self, attributes: AttributeSet, index_range: IndexRange) -> bool {
        self.reads.lock().unwrap().push((attributes, index_range));
        self.accept.load(Ordering::SeqCst)
    }

    async fn dispatch_write(
        &self,
        attribute: AttributeId,
        value: Variant,
        data_type: DataType,
        index_range: IndexRange,
    ) -> bool {
        self.writes
            .lock()
            .unwrap()
            .push((attribute, value, data_type, index_range));
        self.accept.load(Ordering::SeqCst)
    }

    async fn dispatch_enable_monitoring(
        &self,
        attributes: AttributeSet,
        settings: MonitoringSettings,
    ) -> bool {
        self.enables.lock().unwrap().push((attributes, settings));
        self.accept.load(Ordering::SeqCst)
    }

    async fn dispatch_modify_monitoring(
        &self,
        attribute: AttributeId,
        change: MonitoringParameterValue,
    ) -> bool {
        self.modifies.lock().unwrap().push((attribute, change));
        self.accept.load(Ordering::SeqCst)
    }

    async fn dispatch_disable_monitoring(&self, attributes: AttributeSet) -> bool {
        self.disables.lock().unwrap().push(attributes);
        self.accept.load(Ordering::SeqCst)
    }

    async fn dispatch_browse(&self, options: BrowseOptions) -> bool {
        self.browses.lock().unwrap().push(options);
        self.accept.load(Ordering::SeqCst)
    }

    async fn dispatch_method_call(&self, method_id: NodeId, args: Vec<MethodArgument>) -> bool {
        self.method_calls.lock().unwrap().push((method_id, args));
        self.accept.load(Ordering::SeqCst)
    }

    fn node_id(&self) -> NodeId {
        self.node_id.clone()
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

fn connected_client() -> ClientState {
    let client = ClientState::new();
    client.set_state(ConnectionState::Connected);
    client
}

fn test_node() -> (Node, Arc<MockBackend>, ClientState) {
    let client = connected_client();
    let backend = Arc::new(MockBackend::new(NodeId::numeric(2, 1001)));
    let node = Node::new(backend.clone(), client.handle());
    (node, backend, client)
}

fn test_settings() -> MonitoringSettings {
    MonitoringSettings::new(SubscriptionId::new(1))
        .with_sampling_interval(Duration::from_millis(250))
}

// =============================================================================
// Cache Defaults
// =============================================================================

#[tokio::test]
async fn test_unread_attributes_have_defaults() {
    let (node, _backend, _client) = test_node();

    assert_eq!(node.attribute(AttributeId::Value), None);
    assert_eq!(node.attribute_error(AttributeId::Value), StatusCode::BadNotFound);
    assert_eq!(node.source_timestamp(AttributeId::Value), None);
    assert_eq!(node.server_timestamp(AttributeId::Value), None);
    assert_eq!(node.timestamps(AttributeId::Value), None);
}

// =============================================================================
// Read Operations
// =============================================================================

#[tokio::test]
async fn test_read_dispatch_and_completion() {
    let (node, backend, _client) = test_node();
    let mut events = node.subscribe();

    let attrs = AttributeId::Value | AttributeId::DisplayName;
    assert!(node.read_attributes(attrs).await);
    assert_eq!(backend.reads.lock().unwrap().len(), 1);

    let sink = node.event_sink();
    sink.attribute_read_complete(vec![
        AttributeReadEntry::success(AttributeId::Value, Variant::Double(25.5)),
        AttributeReadEntry::failure(AttributeId::DisplayName, StatusCode::BadAttributeIdInvalid),
    ]);

    // One aggregate notification for the whole set
    match events.try_recv().unwrap() {
        NodeEvent::AttributeRead { attributes } => assert_eq!(attributes, attrs),
        other => panic!("Expected AttributeRead, got {:?}", other),
    }
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // Per-attribute outcomes live in the cache
    assert_eq!(node.attribute(AttributeId::Value), Some(Variant::Double(25.5)));
    assert_eq!(node.attribute_error(AttributeId::Value), StatusCode::Good);
    assert!(node.source_timestamp(AttributeId::Value).is_some());

    assert_eq!(node.attribute(AttributeId::DisplayName), None);
    assert_eq!(
        node.attribute_error(AttributeId::DisplayName),
        StatusCode::BadAttributeIdInvalid
    );
}

#[tokio::test]
async fn test_failed_read_preserves_last_known_value() {
    let (node, _backend, _client) = test_node();
    let sink = node.event_sink();

    sink.attribute_read_complete(vec![AttributeReadEntry::success(
        AttributeId::Value,
        Variant::Int32(100),
    )]);

    assert!(node.read_attributes(AttributeSet::single(AttributeId::Value)).await);
    sink.attribute_read_complete(vec![AttributeReadEntry::failure(
        AttributeId::Value,
        StatusCode::BadNodeIdUnknown,
    )]);

    assert_eq!(node.attribute(AttributeId::Value), Some(Variant::Int32(100)));
    assert_eq!(node.attribute_error(AttributeId::Value), StatusCode::BadNodeIdUnknown);
}

#[tokio::test]
async fn test_read_attribute_range_forwards_selector() {
    let (node, backend, _client) = test_node();

    let range: IndexRange = "0:9".parse().unwrap();
    assert!(node.read_attribute_range(AttributeId::Value, range.clone()).await);

    let reads = backend.reads.lock().unwrap();
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].0, AttributeSet::single(AttributeId::Value));
    assert_eq!(reads[0].1, range);
}

// =============================================================================
// Write Operations
// =============================================================================

#[tokio::test]
async fn test_successful_write_updates_cache_before_notification() {
    let (node, backend, _client) = test_node();
    let mut events = node.subscribe();

    assert!(
        node.write_attribute(AttributeId::Value, Variant::Double(42.0), None)
            .await
    );

    // The default type table applied
    {
        let writes = backend.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].2, DataType::Double);
    }

    let sink = node.event_sink();
    sink.attribute_write_complete(AttributeId::Value, Variant::Double(42.0), StatusCode::Good);

    // The handler observing the notification sees the new value in the cache
    match events.try_recv().unwrap() {
        NodeEvent::AttributeWritten { attribute, status } => {
            assert_eq!(attribute, AttributeId::Value);
            assert_eq!(status, StatusCode::Good);
            assert_eq!(node.attribute(AttributeId::Value), Some(Variant::Double(42.0)));
            assert!(node.source_timestamp(AttributeId::Value).is_some());
        }
        other => panic!("Expected AttributeWritten, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_write_leaves_cache_unmodified() {
    let (node, _backend, _client) = test_node();
    let sink = node.event_sink();

    sink.attribute_write_complete(AttributeId::Value, Variant::Int32(1), StatusCode::Good);
    assert_eq!(node.attribute(AttributeId::Value), Some(Variant::Int32(1)));

    let mut events = node.subscribe();
    sink.attribute_write_complete(
        AttributeId::Value,
        Variant::Int32(2),
        StatusCode::BadNotWritable,
    );

    match events.try_recv().unwrap() {
        NodeEvent::AttributeWritten { status, .. } => {
            assert_eq!(status, StatusCode::BadNotWritable);
        }
        other => panic!("Expected AttributeWritten, got {:?}", other),
    }

    // Prior value survives; status stays from the last successful update
    assert_eq!(node.attribute(AttributeId::Value), Some(Variant::Int32(1)));
    assert_eq!(node.attribute_error(AttributeId::Value), StatusCode::Good);
}

#[tokio::test]
async fn test_write_without_type_mapping_is_rejected() {
    let (node, backend, _client) = test_node();
    let mut events = node.subscribe();

    assert!(!node.write_attribute(AttributeId::Value, Variant::Null, None).await);
    assert!(
        !node
            .write_attribute(AttributeId::Value, Variant::Array(vec![]), None)
            .await
    );

    // Nothing was dispatched and no notification follows
    assert_eq!(backend.dispatch_count(), 0);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // An explicit hint makes the same payload dispatchable
    assert!(
        node.write_attribute(AttributeId::Value, Variant::Null, Some(DataType::Variant))
            .await
    );
    assert_eq!(backend.writes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_write_attributes_one_notification_per_attribute() {
    let (node, backend, _client) = test_node();
    let mut events = node.subscribe();

    let mut values = HashMap::new();
    values.insert(AttributeId::Value, Variant::Double(3.5));
    values.insert(
        AttributeId::DisplayName,
        Variant::String("Pump A".to_string()),
    );

    assert!(node.write_attributes(values, None).await);

    // One dispatch per entry, with the implied type for non-value attributes
    {
        let writes = backend.writes.lock().unwrap();
        assert_eq!(writes.len(), 2);
        for (attribute, _value, data_type, _range) in writes.iter() {
            match attribute {
                AttributeId::Value => assert_eq!(*data_type, DataType::Double),
                AttributeId::DisplayName => assert_eq!(*data_type, DataType::LocalizedText),
                other => panic!("Unexpected write for {:?}", other),
            }
        }
    }

    // Independent outcomes: one succeeds, one fails
    let sink = node.event_sink();
    sink.attribute_write_complete(AttributeId::Value, Variant::Double(3.5), StatusCode::Good);
    sink.attribute_write_complete(
        AttributeId::DisplayName,
        Variant::String("Pump A".to_string()),
        StatusCode::BadNotWritable,
    );

    let first = events.try_recv().unwrap();
    let second = events.try_recv().unwrap();
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    assert_eq!(
        first,
        NodeEvent::AttributeWritten {
            attribute: AttributeId::Value,
            status: StatusCode::Good,
        }
    );
    assert_eq!(
        second,
        NodeEvent::AttributeWritten {
            attribute: AttributeId::DisplayName,
            status: StatusCode::BadNotWritable,
        }
    );

    assert_eq!(node.attribute(AttributeId::Value), Some(Variant::Double(3.5)));
    assert_eq!(node.attribute(AttributeId::DisplayName), None);
}

// =============================================================================
// Monitoring Operations
// =============================================================================

#[tokio::test]
async fn test_enable_monitoring_per_attribute_completions() {
    let (node, backend, _client) = test_node();
    let mut events = node.subscribe();
    let settings = test_settings();

    let attrs = AttributeId::Value | AttributeId::EventNotifier;
    assert!(node.enable_monitoring(attrs, settings.clone()).await);
    assert_eq!(backend.enables.lock().unwrap().len(), 1);

    // Server revises the sampling interval for the value attribute
    let sink = node.event_sink();
    let mut revised = MonitoringParameters::from_settings(&settings);
    revised.sampling_interval = Duration::from_millis(500);
    sink.monitoring_enable_complete(AttributeId::Value, revised);
    sink.monitoring_enable_complete(
        AttributeId::EventNotifier,
        MonitoringParameters::from_settings(&settings),
    );

    assert_eq!(
        events.try_recv().unwrap(),
        NodeEvent::MonitoringEnableFinished {
            attribute: AttributeId::Value,
            status: StatusCode::Good,
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        NodeEvent::MonitoringEnableFinished {
            attribute: AttributeId::EventNotifier,
            status: StatusCode::Good,
        }
    );

    // Revised parameters are visible through the registry
    let status = node.monitoring_status(AttributeId::Value);
    assert_eq!(status.status, StatusCode::Good);
    assert_eq!(status.sampling_interval, Duration::from_millis(500));
    assert_eq!(status.subscription_id, SubscriptionId::new(1));

    let status = node.monitoring_status(AttributeId::EventNotifier);
    assert_eq!(status.sampling_interval, Duration::from_millis(250));
}

#[tokio::test]
async fn test_enable_monitoring_failure_leaves_registry_empty() {
    let (node, _backend, _client) = test_node();
    let mut events = node.subscribe();
    let sink = node.event_sink();

    let mut failed = MonitoringParameters::disabled();
    failed.status = StatusCode::BadTooManyMonitoredItems;
    sink.monitoring_enable_complete(AttributeId::Value, failed);

    assert_eq!(
        events.try_recv().unwrap(),
        NodeEvent::MonitoringEnableFinished {
            attribute: AttributeId::Value,
            status: StatusCode::BadTooManyMonitoredItems,
        }
    );
    assert_eq!(
        node.monitoring_status(AttributeId::Value).status,
        StatusCode::BadMonitoredItemIdInvalid
    );
}

#[tokio::test]
async fn test_disable_monitoring_resets_only_requested_attribute() {
    let (node, _backend, _client) = test_node();
    let settings = test_settings();
    let sink = node.event_sink();

    sink.monitoring_enable_complete(
        AttributeId::Value,
        MonitoringParameters::from_settings(&settings),
    );
    sink.monitoring_enable_complete(
        AttributeId::EventNotifier,
        MonitoringParameters::from_settings(&settings),
    );

    assert!(
        node.disable_monitoring(AttributeSet::single(AttributeId::Value))
            .await
    );

    let mut events = node.subscribe();
    sink.monitoring_disable_complete(AttributeId::Value, StatusCode::Good);

    assert_eq!(
        events.try_recv().unwrap(),
        NodeEvent::MonitoringDisableFinished {
            attribute: AttributeId::Value,
            status: StatusCode::Good,
        }
    );

    // Value is reset to the disabled default, EventNotifier is unaffected
    assert_eq!(
        node.monitoring_status(AttributeId::Value).status,
        StatusCode::BadMonitoredItemIdInvalid
    );
    assert_eq!(
        node.monitoring_status(AttributeId::EventNotifier).status,
        StatusCode::Good
    );
}

#[tokio::test]
async fn test_modify_monitoring_applies_revised_value_before_event() {
    let (node, backend, _client) = test_node();
    let settings = test_settings();
    let sink = node.event_sink();

    sink.monitoring_enable_complete(
        AttributeId::Value,
        MonitoringParameters::from_settings(&settings),
    );

    assert!(
        node.modify_monitoring(
            AttributeId::Value,
            MonitoringParameterValue::SamplingInterval(Duration::from_millis(100)),
        )
        .await
    );
    assert_eq!(backend.modifies.lock().unwrap().len(), 1);

    // Server revises the requested 100ms up to 200ms
    let mut events = node.subscribe();
    sink.monitoring_modify_complete(
        AttributeId::Value,
        MonitoringParameterValue::SamplingInterval(Duration::from_millis(200)),
        StatusCode::Good,
    );

    match events.try_recv().unwrap() {
        NodeEvent::MonitoringStatusChanged {
            attribute,
            parameters,
            status,
        } => {
            assert_eq!(attribute, AttributeId::Value);
            assert_eq!(status, StatusCode::Good);
            assert_eq!(parameters.sampling_interval, Duration::from_millis(200));
        }
        other => panic!("Expected MonitoringStatusChanged, got {:?}", other),
    }

    assert_eq!(
        node.monitoring_status(AttributeId::Value).sampling_interval,
        Duration::from_millis(200)
    );
}

#[tokio::test]
async fn test_modify_monitoring_failure_keeps_parameters() {
    let (node, _backend, _client) = test_node();
    let settings = test_settings();
    let sink = node.event_sink();

    sink.monitoring_enable_complete(
        AttributeId::Value,
        MonitoringParameters::from_settings(&settings),
    );

    let mut events = node.subscribe();
    sink.monitoring_modify_complete(
        AttributeId::Value,
        MonitoringParameterValue::QueueSize(0),
        StatusCode::BadOutOfRange,
    );

    match events.try_recv().unwrap() {
        NodeEvent::MonitoringStatusChanged { status, parameters, .. } => {
            assert_eq!(status, StatusCode::BadOutOfRange);
            assert_eq!(parameters.queue_size, settings.queue_size);
        }
        other => panic!("Expected MonitoringStatusChanged, got {:?}", other),
    }

    assert_eq!(
        node.monitoring_status(AttributeId::Value).queue_size,
        settings.queue_size
    );
}

#[tokio::test]
async fn test_modify_data_change_filter_is_a_filter_modify() {
    let (node, backend, _client) = test_node();

    let filter = axon_opcua::DataChangeFilter::default();
    assert!(node.modify_data_change_filter(AttributeId::Value, filter).await);

    let modifies = backend.modifies.lock().unwrap();
    assert_eq!(modifies.len(), 1);
    assert!(matches!(
        modifies[0].1,
        MonitoringParameterValue::Filter(_)
    ));
}

#[tokio::test]
async fn test_enable_monitoring_rejects_invalid_settings() {
    let (node, backend, _client) = test_node();

    let settings = test_settings().with_queue_size(0);
    assert!(
        !node
            .enable_monitoring(AttributeSet::single(AttributeId::Value), settings)
            .await
    );
    assert_eq!(backend.dispatch_count(), 0);
}

// =============================================================================
// Data Change Notifications
// =============================================================================

#[tokio::test]
async fn test_data_change_updates_cache_and_notifies() {
    let (node, _backend, _client) = test_node();
    let mut events = node.subscribe();
    let sink = node.event_sink();

    let ts = chrono::Utc::now();
    sink.attribute_value_changed(
        AttributeId::Value,
        Variant::Int32(7),
        StatusCode::Good,
        Some(ts),
        Some(ts),
    );

    assert_eq!(
        events.try_recv().unwrap(),
        NodeEvent::AttributeUpdated {
            attribute: AttributeId::Value,
            value: Variant::Int32(7),
        }
    );
    assert_eq!(node.attribute(AttributeId::Value), Some(Variant::Int32(7)));
    assert_eq!(node.source_timestamp(AttributeId::Value), Some(ts));
    assert_eq!(node.server_timestamp(AttributeId::Value), Some(ts));
}

// =============================================================================
// Browse Operations
// =============================================================================

#[tokio::test]
async fn test_browse_children_forwards_filters() {
    let (node, backend, _client) = test_node();

    assert!(
        node.browse_children(
            ReferenceTypeId::HasProperty,
            NodeClassMask::single(NodeClass::Variable),
        )
        .await
    );

    let browses = backend.browses.lock().unwrap();
    assert_eq!(browses.len(), 1);
    assert_eq!(browses[0].reference_type, ReferenceTypeId::HasProperty);
    assert!(browses[0].node_class_mask.matches(NodeClass::Variable));
    assert!(!browses[0].node_class_mask.matches(NodeClass::Object));
}

#[tokio::test]
async fn test_browse_no_children_yields_empty_good() {
    let (node, _backend, _client) = test_node();
    let mut events = node.subscribe();

    assert!(
        node.browse_children(ReferenceTypeId::References, NodeClassMask::ANY)
            .await
    );
    node.event_sink().browse_complete(Vec::new(), StatusCode::Good);

    assert_eq!(
        events.try_recv().unwrap(),
        NodeEvent::BrowseFinished {
            children: Vec::new(),
            status: StatusCode::Good,
        }
    );
}

#[tokio::test]
async fn test_failed_browse_discards_partial_results() {
    let (node, _backend, _client) = test_node();
    let mut events = node.subscribe();

    let partial = vec![ReferenceDescription::new(
        NodeId::string(2, "Pump.Speed"),
        "Speed",
        NodeClass::Variable,
        ReferenceTypeId::HasComponent,
    )];
    node.event_sink()
        .browse_complete(partial, StatusCode::BadNodeIdUnknown);

    match events.try_recv().unwrap() {
        NodeEvent::BrowseFinished { children, status } => {
            assert!(children.is_empty());
            assert_eq!(status, StatusCode::BadNodeIdUnknown);
        }
        other => panic!("Expected BrowseFinished, got {:?}", other),
    }
}

// =============================================================================
// Method Calls
// =============================================================================

#[tokio::test]
async fn test_method_call_round_trip() {
    let (node, backend, _client) = test_node();
    let mut events = node.subscribe();

    let method_id = NodeId::string(2, "Pump.Start");
    let args = vec![MethodArgument::new(Variant::UInt32(3), DataType::UInt32)];
    assert!(node.call_method(method_id.clone(), args).await);
    assert_eq!(backend.method_calls.lock().unwrap().len(), 1);

    node.event_sink().method_call_complete(
        method_id.clone(),
        vec![Variant::Boolean(true)],
        StatusCode::Good,
    );

    assert_eq!(
        events.try_recv().unwrap(),
        NodeEvent::MethodCallFinished {
            method_id,
            outputs: vec![Variant::Boolean(true)],
            status: StatusCode::Good,
        }
    );
}

#[tokio::test]
async fn test_failed_method_call_has_empty_outputs() {
    let (node, _backend, _client) = test_node();
    let mut events = node.subscribe();

    let method_id = NodeId::string(2, "Pump.Start");
    node.event_sink().method_call_complete(
        method_id.clone(),
        vec![Variant::Boolean(true)],
        StatusCode::BadNotSupported,
    );

    assert_eq!(
        events.try_recv().unwrap(),
        NodeEvent::MethodCallFinished {
            method_id,
            outputs: Vec::new(),
            status: StatusCode::BadNotSupported,
        }
    );
}

// =============================================================================
// Request Gate
// =============================================================================

#[tokio::test]
async fn test_disconnected_client_rejects_every_operation() {
    let client = ClientState::new();
    let backend = Arc::new(MockBackend::new(NodeId::numeric(2, 1001)));
    let node = Node::new(backend.clone(), client.handle());
    let mut events = node.subscribe();

    assert!(!node.read_attributes(MANDATORY_BASE_ATTRIBUTES).await);
    assert!(
        !node
            .read_attribute_range(AttributeId::Value, IndexRange::full())
            .await
    );
    assert!(
        !node
            .write_attribute(AttributeId::Value, Variant::Int32(1), None)
            .await
    );
    assert!(
        !node
            .write_attributes(
                HashMap::from([(AttributeId::Value, Variant::Int32(1))]),
                None,
            )
            .await
    );
    assert!(
        !node
            .enable_monitoring(AttributeSet::single(AttributeId::Value), test_settings())
            .await
    );
    assert!(
        !node
            .modify_monitoring(
                AttributeId::Value,
                MonitoringParameterValue::QueueSize(5),
            )
            .await
    );
    assert!(
        !node
            .disable_monitoring(AttributeSet::single(AttributeId::Value))
            .await
    );
    assert!(
        !node
            .browse_children(ReferenceTypeId::References, NodeClassMask::ANY)
            .await
    );
    assert!(!node.call_method(NodeId::numeric(2, 9), Vec::new()).await);

    // Nothing reached the backend and no notification was produced
    assert_eq!(backend.dispatch_count(), 0);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_operations_rejected_after_client_drop() {
    let (node, backend, client) = test_node();
    assert!(node.read_attributes(MANDATORY_BASE_ATTRIBUTES).await);

    drop(client);
    assert!(!node.read_attributes(MANDATORY_BASE_ATTRIBUTES).await);
    assert_eq!(backend.reads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_node_id_string_follows_connection() {
    let (node, _backend, client) = test_node();
    assert_eq!(node.node_id(), "ns=2;i=1001");

    client.set_state(ConnectionState::Disconnected);
    assert_eq!(node.node_id(), "");

    client.set_state(ConnectionState::Connected);
    assert_eq!(node.node_id(), "ns=2;i=1001");
}

// =============================================================================
// Node Destruction
// =============================================================================

#[tokio::test]
async fn test_completion_after_destruction_is_discarded() {
    let (node, _backend, _client) = test_node();
    let mut events = node.subscribe();
    let sink = node.event_sink();

    assert!(node.read_attributes(AttributeSet::single(AttributeId::Value)).await);
    drop(node);

    // The in-flight read completes after the node is gone
    sink.attribute_read_complete(vec![AttributeReadEntry::success(
        AttributeId::Value,
        Variant::Int32(1),
    )]);
    sink.attribute_write_complete(AttributeId::Value, Variant::Int32(1), StatusCode::Good);
    sink.browse_complete(Vec::new(), StatusCode::Good);

    // No notification was delivered, only the channel-closed marker remains
    assert!(events.try_recv().is_err());
}
