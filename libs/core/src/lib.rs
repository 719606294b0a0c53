//! Crewdesk core contracts and value types.
//!
//! This crate exposes the data structures exchanged between the dashboard
//! clients and the backend: credentials, users, chat messages and frames, and
//! the REST resource records the endpoint modules pass through verbatim.
pub mod auth;
pub mod chat;
pub mod resources;

pub use auth::*;
pub use chat::*;
pub use resources::*;
