//! # Listing Services
//!
//! Campground listings and the reviews attached to them: record types, form
//! validation, persistence (Postgres or in memory) and the ownership rules that
//! decide who may change what.

/// In-memory campground and review store.
pub mod memory;
/// Campground and review operations with validation and ownership checks.
pub mod service;
/// Persistence traits and the Postgres implementation.
pub mod store;
/// Types and structures used by listing services.
pub mod types;
