//! # Application Layer
//!
//! The coordination core: decoding, the dispatch loop, action correlation,
//! dialogue turns and the session that wires them together.

pub mod correlator;
pub mod decoder;
pub mod dialogue;
pub mod dispatcher;
pub mod logging;
pub mod robot;
pub mod session;
