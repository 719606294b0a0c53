//! Typed pass-through wrappers for the backend's REST surface.
//!
//! Each function issues exactly one request through the pipeline; filtering,
//! validation, and business rules all live server-side.
pub mod ai;
pub mod auth;
pub mod categories;
pub mod finance;
pub mod notes;
pub mod notifications;
pub mod schedules;
pub mod tasks;
pub mod timecards;
pub mod uploads;
pub mod users;
