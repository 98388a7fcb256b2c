//! ipgeo-batch library interface
//!
//! Resolves batches of IP addresses to geolocation/ISP metadata:
//! - [`fields`]: requested field catalog and ordered selection
//! - [`services::lookup_client`]: one lookup per address, failures folded into results
//! - [`services::resolution_engine`]: bounded concurrent batch resolution
//! - [`services::result_sink`]: CSV export

pub mod config;
pub mod console;
pub mod error;
pub mod event_bridge;
pub mod fields;
pub mod models;
pub mod services;
pub mod shutdown;

pub use crate::error::{Error, Result};
pub use crate::fields::{Field, FieldSet};
pub use crate::models::{AddressRecord, LookupResult, ProgressState, ResultSet};
pub use crate::services::{LookupClient, ResolutionEngine};
