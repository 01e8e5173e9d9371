//! # Interface Layer
//!
//! Command line, command handlers and the event logging handler.

pub mod cli;
pub mod commands;
pub mod event_log;
