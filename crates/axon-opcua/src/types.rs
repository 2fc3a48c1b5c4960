// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core OPC UA value and identifier types.
//!
//! This module provides the data-model primitives the node abstraction is
//! built on:
//!
//! - **NodeId**: all four OPC UA node identifier kinds with parsing and
//!   formatting
//! - **DataType**: the OPC UA built-in data types used as wire-type hints
//! - **Variant**: typed attribute payloads with the fixed default-type table
//! - **IndexRange**: array subrange selectors (`""`, `"1"`, `"0:9"`, `"0,1"`)
//! - **MethodArgument**: typed input arguments for remote method calls
//!
//! # Examples
//!
//! ```
//! use axon_opcua::types::{NodeId, Variant, DataType};
//!
//! let node_id = NodeId::string(2, "Pump.Setpoint");
//! assert_eq!(node_id.to_opc_string(), "ns=2;s=Pump.Setpoint");
//!
//! let value = Variant::Double(42.5);
//! assert_eq!(value.default_data_type(), Some(DataType::Double));
//! ```

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AxonError, ConfigurationError};

// =============================================================================
// NodeId
// =============================================================================

/// OPC UA node identifier.
///
/// A `NodeId` uniquely identifies a node within a server's address space. It
/// consists of a namespace index and an identifier which can be numeric,
/// string, GUID, or opaque (byte string).
///
/// # Examples
///
/// ```
/// use axon_opcua::types::NodeId;
///
/// let numeric = NodeId::numeric(2, 1001);
/// let parsed: NodeId = "ns=2;s=Motor.Speed".parse().unwrap();
/// assert!(parsed.is_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index (0 = OPC UA standard namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    /// Creates a numeric node ID.
    #[inline]
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }

    /// Creates a string node ID.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::String(value.into()),
        }
    }

    /// Creates a GUID node ID.
    #[inline]
    pub fn guid(namespace_index: u16, value: Uuid) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Guid(value),
        }
    }

    /// Creates an opaque (byte string) node ID.
    #[inline]
    pub fn opaque(namespace_index: u16, value: Vec<u8>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Opaque(value),
        }
    }

    // =========================================================================
    // Standard Node IDs
    // =========================================================================

    /// Root folder node (ns=0, i=84).
    pub const ROOT_FOLDER: NodeId = NodeId {
        namespace_index: 0,
        identifier: NodeIdentifier::Numeric(84),
    };

    /// Objects folder node (ns=0, i=85).
    pub const OBJECTS_FOLDER: NodeId = NodeId {
        namespace_index: 0,
        identifier: NodeIdentifier::Numeric(85),
    };

    /// Server node (ns=0, i=2253).
    pub const SERVER: NodeId = NodeId {
        namespace_index: 0,
        identifier: NodeIdentifier::Numeric(2253),
    };

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns `true` if this is a numeric identifier.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        matches!(self.identifier, NodeIdentifier::Numeric(_))
    }

    /// Returns `true` if this is a string identifier.
    #[inline]
    pub const fn is_string(&self) -> bool {
        matches!(self.identifier, NodeIdentifier::String(_))
    }

    /// Returns `true` if this is a GUID identifier.
    #[inline]
    pub const fn is_guid(&self) -> bool {
        matches!(self.identifier, NodeIdentifier::Guid(_))
    }

    /// Returns `true` if this is an opaque identifier.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        matches!(self.identifier, NodeIdentifier::Opaque(_))
    }

    /// Returns `true` if this is the null node ID (ns=0, i=0).
    #[inline]
    pub fn is_null(&self) -> bool {
        self.namespace_index == 0 && matches!(self.identifier, NodeIdentifier::Numeric(0))
    }

    /// Returns the null node ID (ns=0, i=0).
    #[inline]
    pub const fn null() -> Self {
        Self {
            namespace_index: 0,
            identifier: NodeIdentifier::Numeric(0),
        }
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Converts to the OPC UA string format.
    ///
    /// Format: `ns=<namespace>;<i|s|g|b>=<identifier>`. The namespace part is
    /// always present, including namespace 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use axon_opcua::types::NodeId;
    ///
    /// assert_eq!(NodeId::numeric(0, 84).to_opc_string(), "ns=0;i=84");
    /// assert_eq!(NodeId::string(2, "Tank.Level").to_opc_string(), "ns=2;s=Tank.Level");
    /// ```
    pub fn to_opc_string(&self) -> String {
        format!("ns={};{}", self.namespace_index, self.identifier)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_opc_string())
    }
}

impl FromStr for NodeId {
    type Err = AxonError;

    /// Parses a node ID from OPC UA string format.
    ///
    /// Supported forms:
    /// - `ns=2;i=1001` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `ns=2;g=550e8400-e29b-41d4-a716-446655440000` (GUID)
    /// - `ns=2;b=SGVsbG8=` (opaque, base64)
    /// - `i=1001` etc. (namespace 0 implied)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (namespace_index, identifier_part) = if let Some(rest) = s.strip_prefix("ns=") {
            let (ns_str, id_part) = rest.split_once(';').ok_or_else(|| {
                AxonError::configuration(ConfigurationError::invalid_node_id(
                    s,
                    "Missing identifier after namespace",
                ))
            })?;

            let ns: u16 = ns_str.parse().map_err(|_| {
                AxonError::configuration(ConfigurationError::invalid_node_id(
                    s,
                    "Invalid namespace index",
                ))
            })?;

            (ns, id_part)
        } else {
            (0, s)
        };

        let identifier = if let Some(id) = identifier_part.strip_prefix("i=") {
            let value: u32 = id.parse().map_err(|_| {
                AxonError::configuration(ConfigurationError::invalid_node_id(
                    s,
                    "Invalid numeric identifier",
                ))
            })?;
            NodeIdentifier::Numeric(value)
        } else if let Some(id) = identifier_part.strip_prefix("s=") {
            NodeIdentifier::String(id.to_string())
        } else if let Some(id) = identifier_part.strip_prefix("g=") {
            let uuid = Uuid::parse_str(id).map_err(|e| {
                AxonError::configuration(ConfigurationError::invalid_node_id(
                    s,
                    format!("Invalid GUID: {}", e),
                ))
            })?;
            NodeIdentifier::Guid(uuid)
        } else if let Some(id) = identifier_part.strip_prefix("b=") {
            let bytes = BASE64.decode(id).map_err(|e| {
                AxonError::configuration(ConfigurationError::invalid_node_id(
                    s,
                    format!("Invalid base64: {}", e),
                ))
            })?;
            NodeIdentifier::Opaque(bytes)
        } else {
            return Err(AxonError::configuration(ConfigurationError::invalid_node_id(
                s,
                "Unknown identifier type. Expected i=, s=, g=, or b=",
            )));
        };

        Ok(Self {
            namespace_index,
            identifier,
        })
    }
}

// =============================================================================
// NodeIdentifier
// =============================================================================

/// The four OPC UA node identifier kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NodeIdentifier {
    /// Numeric identifier (most efficient, used for standard nodes).
    Numeric(u32),

    /// String identifier (human-readable, used for custom nodes).
    String(String),

    /// GUID identifier (globally unique).
    Guid(Uuid),

    /// Opaque identifier (application-specific byte array).
    Opaque(Vec<u8>),
}

impl NodeIdentifier {
    /// Returns the identifier type prefix used in the string format.
    pub const fn type_prefix(&self) -> char {
        match self {
            Self::Numeric(_) => 'i',
            Self::String(_) => 's',
            Self::Guid(_) => 'g',
            Self::Opaque(_) => 'b',
        }
    }
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
            Self::Guid(v) => write!(f, "g={}", v),
            Self::Opaque(v) => write!(f, "b={}", BASE64.encode(v)),
        }
    }
}

// =============================================================================
// DataType
// =============================================================================

/// OPC UA built-in data types used as wire-type hints for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Boolean value.
    Boolean,

    /// Signed 8-bit integer.
    SByte,

    /// Unsigned 8-bit integer.
    Byte,

    /// Signed 16-bit integer.
    Int16,

    /// Unsigned 16-bit integer.
    UInt16,

    /// Signed 32-bit integer.
    Int32,

    /// Unsigned 32-bit integer.
    UInt32,

    /// Signed 64-bit integer.
    Int64,

    /// Unsigned 64-bit integer.
    UInt64,

    /// 32-bit IEEE 754 float.
    Float,

    /// 64-bit IEEE 754 double.
    Double,

    /// UTF-8 string.
    String,

    /// Date and time.
    DateTime,

    /// GUID.
    Guid,

    /// Raw byte string.
    ByteString,

    /// Node ID.
    NodeId,

    /// Qualified name.
    QualifiedName,

    /// Localized text.
    LocalizedText,

    /// Status code.
    StatusCode,

    /// Variant (can contain any type).
    #[default]
    Variant,
}

impl DataType {
    /// Returns the OPC UA built-in type ID.
    pub const fn type_id(&self) -> u32 {
        match self {
            Self::Boolean => 1,
            Self::SByte => 2,
            Self::Byte => 3,
            Self::Int16 => 4,
            Self::UInt16 => 5,
            Self::Int32 => 6,
            Self::UInt32 => 7,
            Self::Int64 => 8,
            Self::UInt64 => 9,
            Self::Float => 10,
            Self::Double => 11,
            Self::String => 12,
            Self::DateTime => 13,
            Self::Guid => 14,
            Self::ByteString => 15,
            Self::NodeId => 17,
            Self::StatusCode => 19,
            Self::QualifiedName => 20,
            Self::LocalizedText => 21,
            Self::Variant => 24,
        }
    }

    /// Returns `true` if this is a numeric type.
    #[inline]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::SByte
                | Self::Byte
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
                | Self::Float
                | Self::Double
        )
    }

    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Guid => "Guid",
            Self::ByteString => "ByteString",
            Self::NodeId => "NodeId",
            Self::QualifiedName => "QualifiedName",
            Self::LocalizedText => "LocalizedText",
            Self::StatusCode => "StatusCode",
            Self::Variant => "Variant",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DataType {
    type Err = AxonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bool" | "boolean" => Ok(Self::Boolean),
            "sbyte" | "int8" | "i8" => Ok(Self::SByte),
            "byte" | "uint8" | "u8" => Ok(Self::Byte),
            "int16" | "i16" => Ok(Self::Int16),
            "uint16" | "u16" => Ok(Self::UInt16),
            "int32" | "i32" | "int" => Ok(Self::Int32),
            "uint32" | "u32" | "uint" => Ok(Self::UInt32),
            "int64" | "i64" => Ok(Self::Int64),
            "uint64" | "u64" => Ok(Self::UInt64),
            "float" | "f32" => Ok(Self::Float),
            "double" | "f64" => Ok(Self::Double),
            "string" | "str" => Ok(Self::String),
            "datetime" => Ok(Self::DateTime),
            "guid" | "uuid" => Ok(Self::Guid),
            "bytestring" | "bytes" => Ok(Self::ByteString),
            "nodeid" => Ok(Self::NodeId),
            "qualifiedname" => Ok(Self::QualifiedName),
            "localizedtext" => Ok(Self::LocalizedText),
            "statuscode" => Ok(Self::StatusCode),
            "variant" | "any" => Ok(Self::Variant),
            _ => Err(AxonError::configuration(
                ConfigurationError::invalid_data_type(s),
            )),
        }
    }
}

// =============================================================================
// Variant
// =============================================================================

/// Typed attribute payload.
///
/// A `Variant` carries the value of a node attribute through reads, writes,
/// and data change notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Variant {
    /// Boolean value.
    Boolean(bool),

    /// Signed byte.
    SByte(i8),

    /// Unsigned byte.
    Byte(u8),

    /// 16-bit signed integer.
    Int16(i16),

    /// 16-bit unsigned integer.
    UInt16(u16),

    /// 32-bit signed integer.
    Int32(i32),

    /// 32-bit unsigned integer.
    UInt32(u32),

    /// 64-bit signed integer.
    Int64(i64),

    /// 64-bit unsigned integer.
    UInt64(u64),

    /// 32-bit float.
    Float(f32),

    /// 64-bit double.
    Double(f64),

    /// String value.
    String(String),

    /// Date/time value.
    DateTime(DateTime<Utc>),

    /// GUID value.
    Guid(Uuid),

    /// Byte string.
    ByteString(Vec<u8>),

    /// Array of values.
    Array(Vec<Variant>),

    /// Null value.
    Null,
}

impl Variant {
    /// Returns the default wire type for this payload kind.
    ///
    /// This is the fixed table used by [`Node::write_attribute`] when no
    /// explicit type hint is supplied. `Array` and `Null` have no default
    /// and must be written with an explicit hint.
    ///
    /// [`Node::write_attribute`]: crate::node::Node::write_attribute
    pub const fn default_data_type(&self) -> Option<DataType> {
        match self {
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::SByte(_) => Some(DataType::SByte),
            Self::Byte(_) => Some(DataType::Byte),
            Self::Int16(_) => Some(DataType::Int16),
            Self::UInt16(_) => Some(DataType::UInt16),
            Self::Int32(_) => Some(DataType::Int32),
            Self::UInt32(_) => Some(DataType::UInt32),
            Self::Int64(_) => Some(DataType::Int64),
            Self::UInt64(_) => Some(DataType::UInt64),
            Self::Float(_) => Some(DataType::Float),
            Self::Double(_) => Some(DataType::Double),
            Self::String(_) => Some(DataType::String),
            Self::DateTime(_) => Some(DataType::DateTime),
            Self::Guid(_) => Some(DataType::Guid),
            Self::ByteString(_) => Some(DataType::ByteString),
            Self::Array(_) | Self::Null => None,
        }
    }

    /// Returns `true` if this is a null value.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get the value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::SByte(v) => Some(*v as i64),
            Self::Byte(v) => Some(*v as i64),
            Self::Int16(v) => Some(*v as i64),
            Self::UInt16(v) => Some(*v as i64),
            Self::Int32(v) => Some(*v as i64),
            Self::UInt32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Attempts to get the value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::SByte(v) => Some(*v as f64),
            Self::Byte(v) => Some(*v as f64),
            Self::Int16(v) => Some(*v as f64),
            Self::UInt16(v) => Some(*v as f64),
            Self::Int32(v) => Some(*v as f64),
            Self::UInt32(v) => Some(*v as f64),
            Self::Int64(v) => Some(*v as f64),
            Self::UInt64(v) => Some(*v as f64),
            Self::Float(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get the value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::SByte(v) => write!(f, "{}", v),
            Self::Byte(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Guid(v) => write!(f, "{}", v),
            Self::ByteString(v) => write!(f, "<{} bytes>", v.len()),
            Self::Array(v) => write!(f, "[{} items]", v.len()),
            Self::Null => write!(f, "null"),
        }
    }
}

// =============================================================================
// IndexRange
// =============================================================================

/// Array subrange selector for reads and writes.
///
/// The grammar follows OPC UA part 4, 7.22: an empty range selects the whole
/// value, `"1"` selects element 1, `"0:9"` selects the first ten elements,
/// and comma-separated dimensions address multi-dimensional arrays
/// (`"0,1"` is the second element of the first row).
///
/// # Examples
///
/// ```
/// use axon_opcua::types::IndexRange;
///
/// let whole = IndexRange::full();
/// assert!(whole.is_full());
///
/// let range: IndexRange = "0:9".parse().unwrap();
/// assert_eq!(range.as_str(), "0:9");
///
/// assert!("3:1".parse::<IndexRange>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexRange(String);

impl IndexRange {
    /// Returns the selector for the whole value.
    #[inline]
    pub const fn full() -> Self {
        Self(String::new())
    }

    /// Returns `true` if this selector addresses the whole value.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the selector string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parse_dimension(s: &str, input: &str) -> Result<(), AxonError> {
        let invalid = |reason: &str| {
            AxonError::configuration(ConfigurationError::invalid_index_range(input, reason))
        };

        match s.split_once(':') {
            None => {
                s.parse::<u32>().map_err(|_| invalid("Bound is not a number"))?;
                Ok(())
            }
            Some((lo, hi)) => {
                let lo: u32 = lo.parse().map_err(|_| invalid("Bound is not a number"))?;
                let hi: u32 = hi.parse().map_err(|_| invalid("Bound is not a number"))?;
                if lo >= hi {
                    return Err(invalid("Lower bound must be less than upper bound"));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IndexRange {
    type Err = AxonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::full());
        }

        for dimension in s.split(',') {
            Self::parse_dimension(dimension, s)?;
        }

        Ok(Self(s.to_string()))
    }
}

// =============================================================================
// MethodArgument
// =============================================================================

/// A typed input argument for a remote method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodArgument {
    /// The argument value.
    pub value: Variant,

    /// The wire type of the argument.
    pub data_type: DataType,
}

impl MethodArgument {
    /// Creates a new method argument.
    pub fn new(value: Variant, data_type: DataType) -> Self {
        Self { value, data_type }
    }

    /// Creates an argument using the value's default wire type.
    ///
    /// Returns `None` for payload kinds with no default type mapping.
    pub fn inferred(value: Variant) -> Option<Self> {
        let data_type = value.default_data_type()?;
        Some(Self { value, data_type })
    }
}

// =============================================================================
// Tests
// =============================================================================
