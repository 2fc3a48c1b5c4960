// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Monitored item configuration and per-attribute monitoring state.
//!
//! Monitored items are the server-side watchers behind data change
//! notifications. This module provides:
//!
//! - [`MonitoringSettings`]: the configuration sent with an enable request
//! - [`MonitoringParameters`]: the server-confirmed (possibly revised) state
//!   of one monitored attribute, including its status code
//! - [`MonitoringParameterValue`]: a typed single-parameter change for modify
//!   requests
//! - [`MonitoringRegistry`]: the local registry answering monitoring status
//!   queries without a network round trip
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use axon_opcua::monitoring::{MonitoringSettings, SubscriptionId};
//!
//! let settings = MonitoringSettings::new(SubscriptionId::new(1))
//!     .with_sampling_interval(Duration::from_millis(100))
//!     .with_queue_size(20);
//! assert!(settings.validate().is_ok());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeId, AttributeSet};
use crate::error::{AxonResult, ConfigurationError};
use crate::status::StatusCode;

// =============================================================================
// SubscriptionId
// =============================================================================

/// Unique identifier of a server-side subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SubscriptionId(pub u32);

impl SubscriptionId {
    /// Creates a new subscription ID.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

impl From<u32> for SubscriptionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// =============================================================================
// MonitoringMode
// =============================================================================

/// OPC UA monitoring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringMode {
    /// Monitoring disabled.
    Disabled,

    /// Sampling enabled, reporting disabled.
    Sampling,

    /// Sampling and reporting enabled.
    #[default]
    Reporting,
}

impl MonitoringMode {
    /// Returns the OPC UA value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::Sampling => 1,
            Self::Reporting => 2,
        }
    }
}

// =============================================================================
// DeadbandFilter
// =============================================================================

/// Deadband applied to a data change filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeadbandFilter {
    /// No deadband filtering.
    #[default]
    None,

    /// Report only when the change exceeds an absolute threshold.
    Absolute {
        /// Absolute change threshold.
        value: f64,
    },

    /// Report only when the change exceeds a percentage of the EU range.
    Percent {
        /// Percentage of engineering unit range (0-100).
        percent: f64,
    },
}

impl DeadbandFilter {
    /// Creates an absolute deadband.
    pub fn absolute(value: f64) -> Self {
        Self::Absolute { value }
    }

    /// Creates a percent deadband.
    pub fn percent(percent: f64) -> Self {
        Self::Percent { percent }
    }

    /// Returns `true` if no deadband is applied.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// =============================================================================
// DataChangeTrigger
// =============================================================================

/// Condition that causes a monitored item to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataChangeTrigger {
    /// Report on status changes only.
    Status,

    /// Report on status or value changes.
    #[default]
    StatusValue,

    /// Report on status, value, or source timestamp changes.
    StatusValueTimestamp,
}

impl DataChangeTrigger {
    /// Returns the OPC UA value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::Status => 0,
            Self::StatusValue => 1,
            Self::StatusValueTimestamp => 2,
        }
    }
}

// =============================================================================
// DataChangeFilter
// =============================================================================

/// Filter controlling which data changes a monitored item reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DataChangeFilter {
    /// Reporting trigger.
    #[serde(default)]
    pub trigger: DataChangeTrigger,

    /// Deadband applied to value changes.
    #[serde(default)]
    pub deadband: DeadbandFilter,
}

impl DataChangeFilter {
    /// Creates a filter with the given trigger and no deadband.
    pub fn new(trigger: DataChangeTrigger) -> Self {
        Self {
            trigger,
            deadband: DeadbandFilter::None,
        }
    }

    /// Sets the deadband.
    pub fn with_deadband(mut self, deadband: DeadbandFilter) -> Self {
        self.deadband = deadband;
        self
    }
}

// =============================================================================
// MonitoringSettings
// =============================================================================

/// Configuration for an enable-monitoring request.
///
/// All monitored items created by one request target the subscription named
/// here. The server may revise the sampling interval and queue size; the
/// confirmed values arrive in [`MonitoringParameters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSettings {
    /// Target subscription.
    pub subscription_id: SubscriptionId,

    /// Requested sampling interval.
    #[serde(default = "default_sampling_interval")]
    #[serde(with = "humantime_serde")]
    pub sampling_interval: Duration,

    /// Queue size for buffered values.
    #[serde(default = "default_queue_size")]
    pub queue_size: u32,

    /// Whether to discard the oldest value when the queue is full.
    #[serde(default = "default_true")]
    pub discard_oldest: bool,

    /// Monitoring mode.
    #[serde(default)]
    pub monitoring_mode: MonitoringMode,

    /// Optional data change filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub filter: Option<DataChangeFilter>,
}

fn default_sampling_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_queue_size() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

impl MonitoringSettings {
    /// Creates settings targeting `subscription_id` with defaults.
    pub fn new(subscription_id: SubscriptionId) -> Self {
        Self {
            subscription_id,
            sampling_interval: default_sampling_interval(),
            queue_size: default_queue_size(),
            discard_oldest: true,
            monitoring_mode: MonitoringMode::default(),
            filter: None,
        }
    }

    /// Sets the sampling interval.
    pub fn with_sampling_interval(mut self, interval: Duration) -> Self {
        self.sampling_interval = interval;
        self
    }

    /// Sets the queue size.
    pub fn with_queue_size(mut self, queue_size: u32) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Sets the discard policy.
    pub fn with_discard_oldest(mut self, discard_oldest: bool) -> Self {
        self.discard_oldest = discard_oldest;
        self
    }

    /// Sets the monitoring mode.
    pub fn with_monitoring_mode(mut self, mode: MonitoringMode) -> Self {
        self.monitoring_mode = mode;
        self
    }

    /// Sets the data change filter.
    pub fn with_filter(mut self, filter: DataChangeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Validates these settings.
    pub fn validate(&self) -> AxonResult<()> {
        if self.queue_size == 0 {
            return Err(ConfigurationError::invalid_monitoring_settings(
                "Queue size must be greater than 0",
            )
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// MonitoringParameter / MonitoringParameterValue
// =============================================================================

/// Names of the monitored item parameters this client can modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringParameter {
    /// Sampling interval of the monitored item.
    SamplingInterval,

    /// Queue size of the monitored item.
    QueueSize,

    /// Discard policy of the monitored item.
    DiscardOldest,

    /// Monitoring mode of the monitored item.
    MonitoringMode,

    /// Data change filter of the monitored item.
    Filter,
}

impl fmt::Display for MonitoringParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SamplingInterval => write!(f, "SamplingInterval"),
            Self::QueueSize => write!(f, "QueueSize"),
            Self::DiscardOldest => write!(f, "DiscardOldest"),
            Self::MonitoringMode => write!(f, "MonitoringMode"),
            Self::Filter => write!(f, "Filter"),
        }
    }
}

/// A single-parameter change for a modify-monitoring request.
///
/// The variant identifies the parameter and carries its new (or, in
/// completions, server-revised) value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "parameter", content = "value", rename_all = "snake_case")]
pub enum MonitoringParameterValue {
    /// New sampling interval.
    SamplingInterval(#[serde(with = "humantime_serde")] Duration),

    /// New queue size.
    QueueSize(u32),

    /// New discard policy.
    DiscardOldest(bool),

    /// New monitoring mode.
    MonitoringMode(MonitoringMode),

    /// New data change filter.
    Filter(DataChangeFilter),
}

impl MonitoringParameterValue {
    /// Returns the parameter this value targets.
    pub const fn parameter(&self) -> MonitoringParameter {
        match self {
            Self::SamplingInterval(_) => MonitoringParameter::SamplingInterval,
            Self::QueueSize(_) => MonitoringParameter::QueueSize,
            Self::DiscardOldest(_) => MonitoringParameter::DiscardOldest,
            Self::MonitoringMode(_) => MonitoringParameter::MonitoringMode,
            Self::Filter(_) => MonitoringParameter::Filter,
        }
    }
}

// =============================================================================
// MonitoringParameters
// =============================================================================

/// Server-confirmed monitoring state of one attribute.
///
/// Produced by enable completions, revised by modify completions, and reset
/// to [`MonitoringParameters::disabled`] by disable completions. The status
/// code reflects the most recent enable, modify, or disable outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringParameters {
    /// Subscription the monitored item belongs to.
    pub subscription_id: SubscriptionId,

    /// Monitoring mode.
    pub monitoring_mode: MonitoringMode,

    /// Server-revised sampling interval.
    #[serde(with = "humantime_serde")]
    pub sampling_interval: Duration,

    /// Server-revised queue size.
    pub queue_size: u32,

    /// Discard policy.
    pub discard_oldest: bool,

    /// Active data change filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub filter: Option<DataChangeFilter>,

    /// Result of the most recent monitoring operation.
    pub status: StatusCode,
}

impl MonitoringParameters {
    /// Returns the disabled default ("not monitored").
    pub fn disabled() -> Self {
        Self {
            subscription_id: SubscriptionId::new(0),
            monitoring_mode: MonitoringMode::Disabled,
            sampling_interval: Duration::ZERO,
            queue_size: 0,
            discard_oldest: false,
            filter: None,
            status: StatusCode::BadMonitoredItemIdInvalid,
        }
    }

    /// Creates confirmed parameters from the requested settings.
    ///
    /// Used by backends when the server accepts the requested values
    /// unrevised.
    pub fn from_settings(settings: &MonitoringSettings) -> Self {
        Self {
            subscription_id: settings.subscription_id,
            monitoring_mode: settings.monitoring_mode,
            sampling_interval: settings.sampling_interval,
            queue_size: settings.queue_size,
            discard_oldest: settings.discard_oldest,
            filter: settings.filter,
            status: StatusCode::Good,
        }
    }

    /// Returns `true` if these parameters describe an active monitored item.
    pub fn is_monitored(&self) -> bool {
        self.status.is_good()
    }

    /// Applies a server-confirmed parameter change.
    pub fn apply(&mut self, change: &MonitoringParameterValue) {
        match change {
            MonitoringParameterValue::SamplingInterval(interval) => {
                self.sampling_interval = *interval;
            }
            MonitoringParameterValue::QueueSize(size) => self.queue_size = *size,
            MonitoringParameterValue::DiscardOldest(discard) => self.discard_oldest = *discard,
            MonitoringParameterValue::MonitoringMode(mode) => self.monitoring_mode = *mode,
            MonitoringParameterValue::Filter(filter) => self.filter = Some(*filter),
        }
    }
}

impl Default for MonitoringParameters {
    fn default() -> Self {
        Self::disabled()
    }
}

// =============================================================================
// MonitoringRegistry
// =============================================================================

/// Per-attribute registry of server-confirmed monitoring state.
///
/// The registry answers [`status`](Self::status) synchronously from the last
/// confirmed state; it never triggers a network round trip. Absence of an
/// entry means "not monitored".
#[derive(Debug, Default)]
pub struct MonitoringRegistry {
    items: RwLock<HashMap<AttributeId, MonitoringParameters>>,
}

impl MonitoringRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the monitoring state for `attribute`.
    ///
    /// The disabled default (status `BadMonitoredItemIdInvalid`) is returned
    /// for attributes without a monitored item.
    pub fn status(&self, attribute: AttributeId) -> MonitoringParameters {
        self.items
            .read()
            .get(&attribute)
            .cloned()
            .unwrap_or_else(MonitoringParameters::disabled)
    }

    /// Returns `true` if a monitored item exists for `attribute`.
    pub fn is_monitored(&self, attribute: AttributeId) -> bool {
        self.items.read().contains_key(&attribute)
    }

    /// Returns the set of attributes with a monitored item.
    pub fn monitored_attributes(&self) -> AttributeSet {
        self.items.read().keys().copied().collect()
    }

    /// Stores server-confirmed parameters for `attribute`.
    pub fn set(&self, attribute: AttributeId, parameters: MonitoringParameters) {
        self.items.write().insert(attribute, parameters);
    }

    /// Resets `attribute` to the disabled default.
    pub fn clear(&self, attribute: AttributeId) {
        self.items.write().remove(&attribute);
    }

    /// Applies a confirmed parameter change to an existing entry.
    ///
    /// Returns the updated parameters, or `None` if no monitored item exists
    /// for `attribute`.
    pub fn apply(
        &self,
        attribute: AttributeId,
        change: &MonitoringParameterValue,
    ) -> Option<MonitoringParameters> {
        let mut items = self.items.write();
        let entry = items.get_mut(&attribute)?;
        entry.apply(change);
        Some(entry.clone())
    }
}

// =============================================================================
// humantime_serde helper
// =============================================================================

pub(crate) mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        humantime::format_duration(*duration)
            .to_string()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
