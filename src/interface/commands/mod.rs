//! # Command Handlers
//!
//! One handler per CLI subcommand (`greet`, `say`, `listen`).
//! Each runs against an already started session.

pub mod greet;
pub mod listen;
pub mod say;
