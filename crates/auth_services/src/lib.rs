//! # Auth Services
//!
//! Account registration, credential checking and the cookie-backed session layer.
//! It includes the session token codec, the flash queue kept in the `actix-session`
//! cookie, the request middleware that rehydrates the current user, and the
//! sign-in guard.

/// Session token signing and verification.
pub mod jwt;
/// In-memory account store used for local development and tests.
pub mod memory;
/// Middleware and extractors for the per-request session context.
pub mod middleware;
/// Account registration and authentication.
pub mod service;
/// Per-request session context and the two-channel flash queue.
pub mod session;
/// Account persistence trait and its Postgres implementation.
pub mod store;
/// Types and structures used in authentication services.
pub mod types;
