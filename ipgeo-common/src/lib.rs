//! # ipgeo Common Library
//!
//! Shared code for the ipgeo crates including:
//! - Error type
//! - Configuration loading (TOML file, environment, defaults)
//! - Batch event types and the broadcast event bus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
