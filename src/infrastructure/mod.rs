//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and background work.
//!
//! # Modules
//!
//! - [`cache`] - Cache abstraction (Redis and in-memory implementations)
//! - [`persistence`] - PostgreSQL and in-memory repository implementations
//! - [`tasks`] - Detached task spawning for redirect telemetry

pub mod cache;
pub mod persistence;
pub mod tasks;
