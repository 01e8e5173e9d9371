//! # Marionette
//!
//! Coordination layer for a robot driven over a publish-subscribe bus:
//! - Domain: topics, actions, events, configuration, errors and traits
//! - Infrastructure: bus adapters (Redis, in-memory)
//! - Application: decoder, dispatch loop, action correlator, dialogue turns, session
//! - Interface: CLI and command handlers

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;
