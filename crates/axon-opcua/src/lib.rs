// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client-side OPC UA node abstraction for the AXON toolkit.
//!
//! This crate provides the [`Node`] handle: the client-side representation of
//! a single addressable node in an OPC UA address space. A node coordinates
//! asynchronous attribute reads and writes, caches attribute values with
//! freshness metadata, manages monitored-item state for data change
//! notifications, browses child references, and invokes remote methods.
//!
//! Transport, session, and subscription keep-alive mechanics live behind the
//! [`NodeBackend`] trait: one concrete implementation exists per transport,
//! selected at node construction. The node calls into the backend to dispatch
//! requests and receives completions back through its [`NodeEventSink`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Caller                                │
//! │        (dispatch bool now, NodeEvent notification later)        │
//! └─────────────────────────────────────────────────────────────────┘
//!                   │ operations            ▲ events
//!                   ▼                       │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Node                                 │
//! │   RequestGate ─ AttributeCache ─ MonitoringRegistry ─ events    │
//! └─────────────────────────────────────────────────────────────────┘
//!                   │ dispatch              ▲ completions (weak)
//!                   ▼                       │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     NodeBackend / transport                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Dispatch contract
//!
//! Every remote-facing operation checks connection liveness and returns a
//! `bool` immediately: `false` means the request was never sent and no
//! notification will follow; `true` guarantees exactly one corresponding
//! [`NodeEvent`], unless the node is destroyed first. Remote failures are
//! status codes inside events, never errors or panics.
//!
//! # Example
//!
//! ```rust,ignore
//! use axon_opcua::{AttributeId, ClientState, ConnectionState, Node, NodeEvent};
//! use axon_opcua::attribute::MANDATORY_BASE_ATTRIBUTES;
//!
//! let client = ClientState::new();
//! client.set_state(ConnectionState::Connected);
//!
//! let node = Node::new(backend, client.handle());
//! let mut events = node.subscribe();
//!
//! if node.read_attributes(MANDATORY_BASE_ATTRIBUTES).await {
//!     if let NodeEvent::AttributeRead { .. } = events.recv().await? {
//!         println!("display name: {:?}", node.attribute(AttributeId::DisplayName));
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod attribute;
pub mod backend;
pub mod browse;
pub mod cache;
pub mod client;
pub mod error;
pub mod monitoring;
pub mod node;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use error::{AxonError, AxonResult, ConfigurationError};

pub use status::StatusCode;

pub use types::{DataType, IndexRange, MethodArgument, NodeId, NodeIdentifier, Variant};

pub use attribute::{AttributeId, AttributeSet, ALL_BASE_ATTRIBUTES, MANDATORY_BASE_ATTRIBUTES};

pub use cache::{AttributeCache, AttributeEntry, Timestamps};

pub use monitoring::{
    DataChangeFilter, DataChangeTrigger, DeadbandFilter, MonitoringMode, MonitoringParameter,
    MonitoringParameterValue, MonitoringParameters, MonitoringRegistry, MonitoringSettings,
    SubscriptionId,
};

pub use browse::{
    BrowseOptions, NodeClass, NodeClassMask, ReferenceDescription, ReferenceTypeId,
};

pub use backend::{AttributeReadEntry, NodeBackend};

pub use client::{ClientHandle, ClientState, ConnectionState};

pub use node::{Node, NodeEvent, NodeEventSink, RequestGate};
