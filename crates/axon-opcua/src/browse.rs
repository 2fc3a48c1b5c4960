// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Browse filters and reference descriptions.
//!
//! Browsing follows reference edges from a node to discover connected nodes.
//! A browse can be restricted to a single reference kind
//! ([`ReferenceTypeId`]) and filtered by node class ([`NodeClassMask`]).
//!
//! # Examples
//!
//! ```
//! use axon_opcua::browse::{BrowseOptions, NodeClass, NodeClassMask, ReferenceTypeId};
//!
//! // Only properties that are variables
//! let options = BrowseOptions::new()
//!     .with_reference_type(ReferenceTypeId::HasProperty)
//!     .with_node_class_mask(NodeClassMask::single(NodeClass::Variable));
//! assert!(options.node_class_mask.matches(NodeClass::Variable));
//! ```

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

// =============================================================================
// ReferenceTypeId
// =============================================================================

/// Well-known OPC UA reference types used to restrict a browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceTypeId {
    /// Any reference (no restriction).
    #[default]
    References,

    /// Any hierarchical reference.
    HierarchicalReferences,

    /// Any non-hierarchical reference.
    NonHierarchicalReferences,

    /// Parent-child references.
    HasChild,

    /// Folder organization references.
    Organizes,

    /// Aggregation references.
    Aggregates,

    /// Component containment references.
    HasComponent,

    /// Property references.
    HasProperty,

    /// Subtype references.
    HasSubtype,

    /// Type definition references.
    HasTypeDefinition,

    /// Modelling rule references.
    HasModellingRule,

    /// Event source references.
    HasEventSource,
}

impl ReferenceTypeId {
    /// Returns the numeric node ID of the reference type (ns=0).
    pub const fn value(&self) -> u32 {
        match self {
            Self::References => 31,
            Self::HierarchicalReferences => 33,
            Self::NonHierarchicalReferences => 32,
            Self::HasChild => 34,
            Self::Organizes => 35,
            Self::Aggregates => 44,
            Self::HasComponent => 47,
            Self::HasProperty => 46,
            Self::HasSubtype => 45,
            Self::HasTypeDefinition => 40,
            Self::HasModellingRule => 37,
            Self::HasEventSource => 36,
        }
    }

    /// Returns the node ID of the reference type.
    pub fn node_id(&self) -> NodeId {
        NodeId::numeric(0, self.value())
    }

    /// Returns the reference type name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::References => "References",
            Self::HierarchicalReferences => "HierarchicalReferences",
            Self::NonHierarchicalReferences => "NonHierarchicalReferences",
            Self::HasChild => "HasChild",
            Self::Organizes => "Organizes",
            Self::Aggregates => "Aggregates",
            Self::HasComponent => "HasComponent",
            Self::HasProperty => "HasProperty",
            Self::HasSubtype => "HasSubtype",
            Self::HasTypeDefinition => "HasTypeDefinition",
            Self::HasModellingRule => "HasModellingRule",
            Self::HasEventSource => "HasEventSource",
        }
    }
}

impl fmt::Display for ReferenceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// NodeClass
// =============================================================================

/// OPC UA node class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    /// Object node.
    Object,
    /// Variable node.
    Variable,
    /// Method node.
    Method,
    /// Object type node.
    ObjectType,
    /// Variable type node.
    VariableType,
    /// Reference type node.
    ReferenceType,
    /// Data type node.
    DataType,
    /// View node.
    View,
}

impl NodeClass {
    /// Returns the OPC UA bit mask value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Object => 1,
            Self::Variable => 2,
            Self::Method => 4,
            Self::ObjectType => 8,
            Self::VariableType => 16,
            Self::ReferenceType => 32,
            Self::DataType => 64,
            Self::View => 128,
        }
    }

    /// Creates from an OPC UA value.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Object),
            2 => Some(Self::Variable),
            4 => Some(Self::Method),
            8 => Some(Self::ObjectType),
            16 => Some(Self::VariableType),
            32 => Some(Self::ReferenceType),
            64 => Some(Self::DataType),
            128 => Some(Self::View),
            _ => None,
        }
    }

    /// Returns `true` if this node class can have a value attribute.
    pub const fn has_value(&self) -> bool {
        matches!(self, Self::Variable)
    }
}

// =============================================================================
// NodeClassMask
// =============================================================================

/// Node-class filter for browse results.
///
/// The empty mask ([`NodeClassMask::ANY`]) matches every node class, per the
/// protocol's browse semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeClassMask(u32);

impl NodeClassMask {
    /// The unrestricted mask (matches all node classes).
    pub const ANY: Self = Self(0);

    /// Creates a mask matching a single node class.
    #[inline]
    pub const fn single(class: NodeClass) -> Self {
        Self(class.value())
    }

    /// Returns a copy with `class` added.
    #[inline]
    pub const fn with(self, class: NodeClass) -> Self {
        Self(self.0 | class.value())
    }

    /// Returns `true` if the mask matches `class`.
    #[inline]
    pub const fn matches(&self, class: NodeClass) -> bool {
        self.0 == 0 || self.0 & class.value() != 0
    }

    /// Returns `true` if the mask is unrestricted.
    #[inline]
    pub const fn is_any(&self) -> bool {
        self.0 == 0
    }

    /// Returns the raw mask bits.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }
}

impl From<NodeClass> for NodeClassMask {
    fn from(class: NodeClass) -> Self {
        Self::single(class)
    }
}

impl BitOr for NodeClassMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<NodeClass> for NodeClassMask {
    type Output = Self;

    fn bitor(self, rhs: NodeClass) -> Self {
        self.with(rhs)
    }
}

impl BitOr for NodeClass {
    type Output = NodeClassMask;

    fn bitor(self, rhs: Self) -> NodeClassMask {
        NodeClassMask::single(self).with(rhs)
    }
}

// =============================================================================
// BrowseOptions
// =============================================================================

/// Filters for a forward browse from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BrowseOptions {
    /// Reference kind to traverse.
    #[serde(default)]
    pub reference_type: ReferenceTypeId,

    /// Whether subtypes of the reference kind are traversed as well.
    #[serde(default = "default_true")]
    pub include_subtypes: bool,

    /// Node-class filter applied to results.
    #[serde(default)]
    pub node_class_mask: NodeClassMask,
}

fn default_true() -> bool {
    true
}

impl BrowseOptions {
    /// Creates unrestricted browse options.
    pub fn new() -> Self {
        Self {
            reference_type: ReferenceTypeId::References,
            include_subtypes: true,
            node_class_mask: NodeClassMask::ANY,
        }
    }

    /// Restricts the traversed reference kind.
    pub fn with_reference_type(mut self, reference_type: ReferenceTypeId) -> Self {
        self.reference_type = reference_type;
        self
    }

    /// Sets the node-class filter.
    pub fn with_node_class_mask(mut self, mask: NodeClassMask) -> Self {
        self.node_class_mask = mask;
        self
    }
}

// =============================================================================
// ReferenceDescription
// =============================================================================

/// Description of one reference discovered by a browse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDescription {
    /// Target node of the reference.
    pub node_id: NodeId,

    /// Browse name of the target node.
    pub browse_name: String,

    /// Display name of the target node.
    pub display_name: String,

    /// Node class of the target node.
    pub node_class: NodeClass,

    /// Kind of reference that connects the nodes.
    pub reference_type: ReferenceTypeId,

    /// Type definition of the target node, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub type_definition: Option<NodeId>,
}

impl ReferenceDescription {
    /// Creates a reference description.
    pub fn new(
        node_id: NodeId,
        browse_name: impl Into<String>,
        node_class: NodeClass,
        reference_type: ReferenceTypeId,
    ) -> Self {
        let browse_name = browse_name.into();
        Self {
            node_id,
            display_name: browse_name.clone(),
            browse_name,
            node_class,
            reference_type,
            type_definition: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Sets the type definition node.
    pub fn with_type_definition(mut self, type_definition: NodeId) -> Self {
        self.type_definition = Some(type_definition);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
