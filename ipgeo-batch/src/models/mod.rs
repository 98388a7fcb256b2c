//! Data models for batch resolution

pub mod address;
pub mod lookup_result;
pub mod progress;
pub mod result_set;

pub use address::AddressRecord;
pub use lookup_result::{LookupResult, NOT_FOUND};
pub use progress::ProgressState;
pub use result_set::ResultSet;
