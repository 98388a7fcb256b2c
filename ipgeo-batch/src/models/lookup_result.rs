//! Per-address lookup outcome
//!
//! Every result carries a value for every requested field. Failures are
//! written into the values as `Error: <cause>` markers so that exports stay
//! rectangular whatever happened on the wire.

use super::AddressRecord;
use crate::fields::{Field, FieldSet};
use serde_json::{Map, Value};
use std::fmt;

/// Value used when the service omits a requested field
pub const NOT_FOUND: &str = "Not found";

/// Result of resolving one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    address: AddressRecord,
    /// One entry per requested field, in FieldSet order
    values: Vec<(Field, String)>,
    failure: Option<String>,
}

impl LookupResult {
    /// Project a response payload onto the requested fields
    pub fn from_payload(
        address: AddressRecord,
        fields: &FieldSet,
        payload: &Map<String, Value>,
    ) -> Self {
        let values = fields
            .iter()
            .map(|field| {
                let value = match payload.get(field.as_str()) {
                    Some(value) => render_value(value),
                    None => NOT_FOUND.to_string(),
                };
                (field, value)
            })
            .collect();

        Self {
            address,
            values,
            failure: None,
        }
    }

    /// Mark every requested field with the failure cause
    pub fn failed(address: AddressRecord, fields: &FieldSet, cause: impl Into<String>) -> Self {
        let cause = cause.into();
        let marker = format!("Error: {}", cause);
        let values = fields.iter().map(|field| (field, marker.clone())).collect();

        Self {
            address,
            values,
            failure: Some(cause),
        }
    }

    pub fn address(&self) -> &AddressRecord {
        &self.address
    }

    /// Value (or error marker) for a field; `None` only if it was not requested
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, value)| value.as_str())
    }

    /// `(field, value)` pairs in FieldSet order
    pub fn values(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Failure cause, when the lookup as a whole failed
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// `address: field=value, field=value`
impl fmt::Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.address)?;
        for (i, (field, value)) in self.values.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}={}", sep, field, value)?;
        }
        Ok(())
    }
}

/// JSON scalar as plain text; strings unquoted, null empty
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
