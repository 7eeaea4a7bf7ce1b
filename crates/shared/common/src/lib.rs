//! Common utilities shared across services.
//!
//! This crate provides:
//! - Unified error handling for repositories, services and HTTP
//! - Database configuration loaded from the environment

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
