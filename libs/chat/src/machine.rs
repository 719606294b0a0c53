/// Lifecycle of the chat socket.
///
/// `attempt` counts consecutive failed connects in the current outage; it is
/// forgotten on a successful open so the next outage backs off from scratch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting { attempt: u32 },
    Open,
    Retrying { attempt: u32 },
    /// Explicit teardown. The only terminal state; nothing leaves it.
    Closed,
}

/// Tagged events consumed by the transition function. Socket error events are
/// reported as `ConnectionLost`: an error is treated as a close.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    HandshakeFailed,
    ConnectionLost,
    RetryElapsed,
    Teardown,
}

impl ConnectionState {
    pub fn initial() -> Self {
        ConnectionState::Connecting { attempt: 0 }
    }

    /// The single transition function. Teardown wins from anywhere;
    /// irrelevant events leave the state untouched.
    pub fn apply(self, event: TransportEvent) -> Self {
        use ConnectionState::*;
        use TransportEvent::*;
        match (self, event) {
            (_, Teardown) => Closed,
            (Closed, _) => Closed,
            (Connecting { .. }, Opened) => Open,
            (Connecting { attempt }, HandshakeFailed | ConnectionLost) => Retrying { attempt },
            (Open, ConnectionLost) => Retrying { attempt: 0 },
            (Retrying { attempt }, RetryElapsed) => Connecting {
                attempt: attempt.saturating_add(1),
            },
            (state, _) => state,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }
}
