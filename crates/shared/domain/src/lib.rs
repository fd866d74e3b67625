//! # Domain Models
//!
//! Pure data for the gateway: the configuration snapshot, route constants and the
//! JSON shapes exchanged with the store and the route modules.
//! Keep it lean: `serde` only, no I/O, networking or heavy logic.

pub mod config;
pub mod constants;
pub mod models;
