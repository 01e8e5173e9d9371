//! # Domain Layer
//!
//! Core definitions, types, and traits that define the robot's bus protocol.
//! Independent of specific transports, serving as the contract for other layers.

pub mod action;
pub mod config;
pub mod emotion;
pub mod error;
pub mod event;
pub mod topics;
pub mod traits;
pub mod types;
