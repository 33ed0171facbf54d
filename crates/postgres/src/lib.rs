//! # Postgres
//!
//! Connection pool, schema migrations and connection monitoring for the Yelp Camp
//! PostgreSQL database.

/// Database client for the Yelp Camp application.
pub mod database;
