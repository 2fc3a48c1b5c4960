// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Client connection liveness.
//!
//! Nodes do not own their client: they hold a [`ClientHandle`], a weak view
//! of the owning client's [`ConnectionState`]. Every dispatching node
//! operation consults the handle first; when the client is gone or not
//! connected, the operation is rejected locally without touching the
//! backend.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// =============================================================================
// ConnectionState
// =============================================================================

/// Connection state of the owning client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// The client is not connected.
    #[default]
    Disconnected,

    /// The client is establishing a connection.
    Connecting,

    /// The client is connected and ready.
    Connected,

    /// The client is reconnecting after a failure.
    Reconnecting,

    /// The connection has failed.
    Failed,
}

impl ConnectionState {
    /// Returns `true` if operations can be dispatched in this state.
    #[inline]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if this is a transitional state.
    #[inline]
    pub const fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting | Self::Reconnecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Reconnecting => write!(f, "Reconnecting"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// ClientState
// =============================================================================

/// Owner-side cell holding the client's connection state.
///
/// The client object owns a `ClientState` and updates it as the session
/// comes and goes; nodes observe it through [`ClientHandle`]s. Dropping the
/// `ClientState` invalidates all handles, which makes every node reject
/// further dispatches.
#[derive(Debug, Default)]
pub struct ClientState {
    shared: Arc<RwLock<ConnectionState>>,
}

impl ClientState {
    /// Creates a state cell in [`ConnectionState::Disconnected`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.read()
    }

    /// Updates the connection state.
    pub fn set_state(&self, state: ConnectionState) {
        let mut current = self.shared.write();
        let previous = *current;
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "Client connection state changed");
            *current = state;
        }
    }

    /// Returns a weak handle for nodes.
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

// =============================================================================
// ClientHandle
// =============================================================================

/// Weak, node-side view of the owning client's connection state.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    shared: Weak<RwLock<ConnectionState>>,
}

impl ClientHandle {
    /// Returns the current state, or `None` if the client is gone.
    pub fn state(&self) -> Option<ConnectionState> {
        self.shared.upgrade().map(|shared| *shared.read())
    }

    /// Returns `true` if the client exists and is connected.
    pub fn is_connected(&self) -> bool {
        matches!(self.state(), Some(state) if state.is_connected())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_predicates() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Disconnected.is_connected());
        assert!(ConnectionState::Connecting.is_transitioning());
        assert!(ConnectionState::Reconnecting.is_transitioning());
        assert!(!ConnectionState::Failed.is_transitioning());
    }

    #[test]
    fn test_handle_tracks_state() {
        let client = ClientState::new();
        let handle = client.handle();

        assert_eq!(handle.state(), Some(ConnectionState::Disconnected));
        assert!(!handle.is_connected());

        client.set_state(ConnectionState::Connected);
        assert!(handle.is_connected());

        client.set_state(ConnectionState::Reconnecting);
        assert!(!handle.is_connected());
    }

    #[test]
    fn test_handle_after_client_drop() {
        let client = ClientState::new();
        client.set_state(ConnectionState::Connected);
        let handle = client.handle();
        assert!(handle.is_connected());

        drop(client);
        assert_eq!(handle.state(), None);
        assert!(!handle.is_connected());
    }
}
