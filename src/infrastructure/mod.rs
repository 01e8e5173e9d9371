//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the `Bus` trait defined in the Domain layer (Redis, in-memory).

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_bus;
