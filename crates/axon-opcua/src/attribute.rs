// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Node attribute identifiers and attribute sets.
//!
//! Attributes are the named properties of a node (value, display name, node
//! class, ...). Batch operations select attributes through [`AttributeSet`],
//! a value type with set semantics over the OPC UA attribute bit positions.
//!
//! # Examples
//!
//! ```
//! use axon_opcua::attribute::{AttributeId, AttributeSet, MANDATORY_BASE_ATTRIBUTES};
//!
//! let set = AttributeId::Value | AttributeId::DisplayName;
//! assert!(set.contains(AttributeId::Value));
//! assert_eq!(set.len(), 2);
//!
//! assert!(MANDATORY_BASE_ATTRIBUTES.contains(AttributeId::BrowseName));
//! ```

use std::fmt;
use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

use crate::types::DataType;

// =============================================================================
// AttributeId
// =============================================================================

/// OPC UA node attribute identifiers (part 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttributeId {
    /// Node ID attribute.
    NodeId,
    /// Node class attribute.
    NodeClass,
    /// Browse name attribute.
    BrowseName,
    /// Display name attribute.
    DisplayName,
    /// Description attribute.
    Description,
    /// Write mask attribute.
    WriteMask,
    /// User write mask attribute.
    UserWriteMask,
    /// Is abstract attribute.
    IsAbstract,
    /// Symmetric attribute.
    Symmetric,
    /// Inverse name attribute.
    InverseName,
    /// Contains no loops attribute.
    ContainsNoLoops,
    /// Event notifier attribute.
    EventNotifier,
    /// Value attribute.
    #[default]
    Value,
    /// Data type attribute.
    DataType,
    /// Value rank attribute.
    ValueRank,
    /// Array dimensions attribute.
    ArrayDimensions,
    /// Access level attribute.
    AccessLevel,
    /// User access level attribute.
    UserAccessLevel,
    /// Minimum sampling interval attribute.
    MinimumSamplingInterval,
    /// Historizing attribute.
    Historizing,
    /// Executable attribute.
    Executable,
    /// User executable attribute.
    UserExecutable,
}

/// All attribute identifiers in protocol order.
const ALL_ATTRIBUTE_IDS: [AttributeId; 22] = [
    AttributeId::NodeId,
    AttributeId::NodeClass,
    AttributeId::BrowseName,
    AttributeId::DisplayName,
    AttributeId::Description,
    AttributeId::WriteMask,
    AttributeId::UserWriteMask,
    AttributeId::IsAbstract,
    AttributeId::Symmetric,
    AttributeId::InverseName,
    AttributeId::ContainsNoLoops,
    AttributeId::EventNotifier,
    AttributeId::Value,
    AttributeId::DataType,
    AttributeId::ValueRank,
    AttributeId::ArrayDimensions,
    AttributeId::AccessLevel,
    AttributeId::UserAccessLevel,
    AttributeId::MinimumSamplingInterval,
    AttributeId::Historizing,
    AttributeId::Executable,
    AttributeId::UserExecutable,
];

impl AttributeId {
    /// Returns the OPC UA numeric value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::NodeId => 1,
            Self::NodeClass => 2,
            Self::BrowseName => 3,
            Self::DisplayName => 4,
            Self::Description => 5,
            Self::WriteMask => 6,
            Self::UserWriteMask => 7,
            Self::IsAbstract => 8,
            Self::Symmetric => 9,
            Self::InverseName => 10,
            Self::ContainsNoLoops => 11,
            Self::EventNotifier => 12,
            Self::Value => 13,
            Self::DataType => 14,
            Self::ValueRank => 15,
            Self::ArrayDimensions => 16,
            Self::AccessLevel => 17,
            Self::UserAccessLevel => 18,
            Self::MinimumSamplingInterval => 19,
            Self::Historizing => 20,
            Self::Executable => 21,
            Self::UserExecutable => 22,
        }
    }

    /// Creates from the OPC UA numeric value.
    pub fn from_value(value: u32) -> Option<Self> {
        ALL_ATTRIBUTE_IDS
            .iter()
            .copied()
            .find(|attr| attr.value() == value)
    }

    /// Returns the wire type implied by the attribute's definition.
    ///
    /// Used by [`Node::write_attributes`] for every attribute except
    /// [`AttributeId::Value`], whose type comes from the payload or an
    /// explicit hint.
    ///
    /// [`Node::write_attributes`]: crate::node::Node::write_attributes
    pub const fn implied_data_type(&self) -> DataType {
        match self {
            Self::NodeId => DataType::NodeId,
            Self::NodeClass => DataType::Int32,
            Self::BrowseName => DataType::QualifiedName,
            Self::DisplayName => DataType::LocalizedText,
            Self::Description => DataType::LocalizedText,
            Self::WriteMask => DataType::UInt32,
            Self::UserWriteMask => DataType::UInt32,
            Self::IsAbstract => DataType::Boolean,
            Self::Symmetric => DataType::Boolean,
            Self::InverseName => DataType::LocalizedText,
            Self::ContainsNoLoops => DataType::Boolean,
            Self::EventNotifier => DataType::Byte,
            Self::Value => DataType::Variant,
            Self::DataType => DataType::NodeId,
            Self::ValueRank => DataType::Int32,
            Self::ArrayDimensions => DataType::UInt32,
            Self::AccessLevel => DataType::Byte,
            Self::UserAccessLevel => DataType::Byte,
            Self::MinimumSamplingInterval => DataType::Double,
            Self::Historizing => DataType::Boolean,
            Self::Executable => DataType::Boolean,
            Self::UserExecutable => DataType::Boolean,
        }
    }

    /// Returns the attribute name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NodeId => "NodeId",
            Self::NodeClass => "NodeClass",
            Self::BrowseName => "BrowseName",
            Self::DisplayName => "DisplayName",
            Self::Description => "Description",
            Self::WriteMask => "WriteMask",
            Self::UserWriteMask => "UserWriteMask",
            Self::IsAbstract => "IsAbstract",
            Self::Symmetric => "Symmetric",
            Self::InverseName => "InverseName",
            Self::ContainsNoLoops => "ContainsNoLoops",
            Self::EventNotifier => "EventNotifier",
            Self::Value => "Value",
            Self::DataType => "DataType",
            Self::ValueRank => "ValueRank",
            Self::ArrayDimensions => "ArrayDimensions",
            Self::AccessLevel => "AccessLevel",
            Self::UserAccessLevel => "UserAccessLevel",
            Self::MinimumSamplingInterval => "MinimumSamplingInterval",
            Self::Historizing => "Historizing",
            Self::Executable => "Executable",
            Self::UserExecutable => "UserExecutable",
        }
    }

    /// Returns the bit used for this attribute in an [`AttributeSet`].
    const fn bit(&self) -> u32 {
        1 << (self.value() - 1)
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// AttributeSet
// =============================================================================

/// A set of node attributes.
///
/// Backed by the protocol's attribute bit positions; union and intersection
/// are constant-time. Sets can be built with `|` from [`AttributeId`] values.
///
/// # Examples
///
/// ```
/// use axon_opcua::attribute::{AttributeId, AttributeSet};
///
/// let set = AttributeId::NodeId | AttributeId::Value;
/// let other = AttributeSet::single(AttributeId::Value);
/// assert_eq!(set.intersection(other), other);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(u32);

impl AttributeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Creates a set containing a single attribute.
    #[inline]
    pub const fn single(attribute: AttributeId) -> Self {
        Self(attribute.bit())
    }

    /// Returns `true` if the set contains `attribute`.
    #[inline]
    pub const fn contains(&self, attribute: AttributeId) -> bool {
        self.0 & attribute.bit() != 0
    }

    /// Returns a copy with `attribute` inserted.
    #[inline]
    pub const fn with(self, attribute: AttributeId) -> Self {
        Self(self.0 | attribute.bit())
    }

    /// Returns a copy with `attribute` removed.
    #[inline]
    pub const fn without(self, attribute: AttributeId) -> Self {
        Self(self.0 & !attribute.bit())
    }

    /// Returns the union of both sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the intersection of both sets.
    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the number of attributes in the set.
    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterates the attributes in protocol order.
    pub fn iter(&self) -> impl Iterator<Item = AttributeId> + '_ {
        let bits = self.0;
        ALL_ATTRIBUTE_IDS
            .iter()
            .copied()
            .filter(move |attr| bits & attr.bit() != 0)
    }
}

impl From<AttributeId> for AttributeSet {
    fn from(attribute: AttributeId) -> Self {
        Self::single(attribute)
    }
}

impl FromIterator<AttributeId> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = AttributeId>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::EMPTY, |set, attr| set.with(attr))
    }
}

impl BitOr for AttributeSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOr<AttributeId> for AttributeSet {
    type Output = Self;

    fn bitor(self, rhs: AttributeId) -> Self {
        self.with(rhs)
    }
}

impl BitOr for AttributeId {
    type Output = AttributeSet;

    fn bitor(self, rhs: Self) -> AttributeSet {
        AttributeSet::single(self).with(rhs)
    }
}

impl BitOr<AttributeSet> for AttributeId {
    type Output = AttributeSet;

    fn bitor(self, rhs: AttributeSet) -> AttributeSet {
        rhs.with(self)
    }
}

impl BitAnd for AttributeSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl fmt::Debug for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Base Attribute Sets
// =============================================================================

/// The mandatory attributes of the OPC UA base node class.
pub const MANDATORY_BASE_ATTRIBUTES: AttributeSet = AttributeSet::single(AttributeId::NodeId)
    .with(AttributeId::NodeClass)
    .with(AttributeId::BrowseName)
    .with(AttributeId::DisplayName);

/// All attributes of the OPC UA base node class.
pub const ALL_BASE_ATTRIBUTES: AttributeSet = MANDATORY_BASE_ATTRIBUTES
    .with(AttributeId::Description)
    .with(AttributeId::WriteMask)
    .with(AttributeId::UserWriteMask);

// =============================================================================
// Tests
// =============================================================================
