use serde::{Deserialize, Serialize};
use std::fmt;

/// Chat payload sent over the socket, serialized as
/// `{"client_id":"...","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub client_id: String,
    pub message: String,
}

impl OutboundMessage {
    pub fn new(client_id: &str, message: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            message: message.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Lifecycle of a single chat connection. There is no path back to `Open`
/// once a connection has closed or errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Errored,
    Closed,
}

impl ConnectionState {
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }

    /// Whether moving from `self` to `next` is a transition the transport can produce.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Connecting, Open)
                | (Connecting, Errored)
                | (Connecting, Closed)
                | (Open, Errored)
                | (Open, Closed)
                | (Errored, Closed)
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Errored => "errored",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Notification delivered by a chat connection, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Open,
    /// Raw inbound text, unparsed.
    Message(String),
    Error(String),
    Closed,
}
