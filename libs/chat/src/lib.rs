//! Realtime transport for the crewdesk assistant.
//!
//! One tokio task owns the socket and the conversation state. The connection
//! lives through an explicit state machine ([`machine::ConnectionState`]),
//! reconnects with capped exponential backoff, and never surfaces transport
//! errors to the host: the only externally visible failure mode is the
//! connection-status flag going false. Sends issued while the channel is down
//! are dropped, not queued.
pub mod backoff;
pub mod conversation;
pub mod machine;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use conversation::ConversationLog;
pub use machine::{ConnectionState, TransportEvent};
pub use transport::{ChatConfig, ChatHandle, connect};
