//! Field selection
//!
//! The lookup service answers with a JSON object keyed by field name. The
//! catalog below is the full set of names this tool may request; a
//! [`FieldSet`] is the caller's ordered choice from it and fixes the column
//! order of every export.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// One requestable metadata field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Status,
    Message,
    Country,
    CountryCode,
    Region,
    RegionName,
    City,
    District,
    Zip,
    Lat,
    Lon,
    Timezone,
    Isp,
    Org,
    Mobile,
}

impl Field {
    /// Every field, in catalog (default presentation) order
    pub const CATALOG: [Field; 15] = [
        Field::Status,
        Field::Message,
        Field::Country,
        Field::CountryCode,
        Field::Region,
        Field::RegionName,
        Field::City,
        Field::District,
        Field::Zip,
        Field::Lat,
        Field::Lon,
        Field::Timezone,
        Field::Isp,
        Field::Org,
        Field::Mobile,
    ];

    /// Name used both as request parameter and response key
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Status => "status",
            Field::Message => "message",
            Field::Country => "country",
            Field::CountryCode => "countryCode",
            Field::Region => "region",
            Field::RegionName => "regionName",
            Field::City => "city",
            Field::District => "district",
            Field::Zip => "zip",
            Field::Lat => "lat",
            Field::Lon => "lon",
            Field::Timezone => "timezone",
            Field::Isp => "isp",
            Field::Org => "org",
            Field::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = Error;

    /// Exact, case-sensitive match against the catalog names
    fn from_str(s: &str) -> Result<Self> {
        Field::CATALOG
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

/// Ordered, duplicate-free, non-empty selection of fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    /// Build from a selection, keeping selection order
    ///
    /// Repeated fields keep their first position. An empty selection is
    /// rejected with [`Error::EmptyFieldSet`].
    pub fn new(selection: impl IntoIterator<Item = Field>) -> Result<Self> {
        let mut fields: Vec<Field> = Vec::new();
        for field in selection {
            if fields.contains(&field) {
                tracing::debug!(field = %field, "Dropping repeated field selection");
                continue;
            }
            fields.push(field);
        }

        if fields.is_empty() {
            return Err(Error::EmptyFieldSet);
        }
        Ok(Self { fields })
    }

    /// Parse field names (e.g. from `country,isp` split on commas)
    ///
    /// Surrounding whitespace and empty segments are ignored.
    pub fn parse<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let fields = names
            .into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Field::from_str)
            .collect::<Result<Vec<_>>>()?;
        Self::new(fields)
    }

    /// The whole catalog, in catalog order
    pub fn catalog() -> Self {
        Self {
            fields: Field::CATALOG.to_vec(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a constructed set; present for API symmetry
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Comma-joined names for the `fields` query parameter
    pub fn query_param(&self) -> String {
        self.names().join(",")
    }

    /// Field names in column order
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(Field::as_str).collect()
    }
}
