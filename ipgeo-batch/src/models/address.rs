//! Input address

use std::fmt;

/// One address to resolve
///
/// Treated as opaque: no syntax validation happens here, the lookup service
/// reports anything it cannot resolve. Duplicates are legal and each one is
/// resolved on its own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AddressRecord(String);

impl AddressRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AddressRecord {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for AddressRecord {
    fn from(address: String) -> Self {
        Self(address)
    }
}
