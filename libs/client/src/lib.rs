//! Authenticated REST client for the crewdesk dashboard.
//!
//! The pipeline attaches bearer credentials to every request and recovers
//! from expired access tokens with a single-flight refresh: the first 401
//! triggers one call to `/auth/refresh` while every other request hitting a
//! 401 parks on the same in-flight attempt and replays with the rotated
//! token. Terminal refresh failures clear the stored session and notify the
//! host through [`SessionEvents`].
pub mod api;
pub mod error;
pub mod events;
pub mod http;
pub mod refresh;
pub mod session;
pub mod store;

pub use error::{ApiError, RefreshError};
pub use events::SessionEvents;
pub use http::ApiClient;
pub use refresh::{RefreshGate, Ticket};
pub use session::AuthSession;
pub use store::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, SharedCredentialStore,
};
