//! # Strings Module
//!
//! Centralizes log lines and spoken prompts.
//! Ensures consistency in messaging and easier localization/updates.

pub mod logs;
pub mod messages;
