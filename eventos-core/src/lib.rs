//! Core types for the eventos client.
//!
//! This crate provides everything the roster view needs apart from rendering:
//! - `Event` and the id newtypes
//! - `remote` for the list/join/leave HTTP exchanges
//! - `roster` for the in-memory, identity-keyed event list
//! - `membership` for confirm-then-apply join/leave toggles
//! - `layout` for masonry placement and viewport queries

pub mod config;
pub mod error;
pub mod event;
pub mod layout;
pub mod membership;
pub mod remote;
pub mod roster;

// Re-export all event types at crate root for convenience
pub use event::*;
