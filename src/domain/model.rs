use serde::{Deserialize, Serialize};
use std::fmt;

/// One record's address lines joined into a single lookup string.
///
/// Construction trims the input and rejects blank strings, so a query held
/// by the resolver is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AddressQuery(String);

impl AddressQuery {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Joins the non-blank fields with a single space.
    pub fn from_fields<'a, I>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let joined = fields
            .into_iter()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(&joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-level status reported by the geocoding service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    Unrecognized(String),
}

impl GeocodeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, GeocodeStatus::Ok)
    }
}

impl From<String> for GeocodeStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OK" => GeocodeStatus::Ok,
            "ZERO_RESULTS" => GeocodeStatus::ZeroResults,
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => GeocodeStatus::OverQueryLimit,
            "REQUEST_DENIED" => GeocodeStatus::RequestDenied,
            "INVALID_REQUEST" => GeocodeStatus::InvalidRequest,
            "UNKNOWN_ERROR" => GeocodeStatus::UnknownError,
            _ => GeocodeStatus::Unrecognized(value),
        }
    }
}

impl<'de> Deserialize<'de> for GeocodeStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(GeocodeStatus::from)
    }
}

/// Category tag attached to an address component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Country,
    Political,
    Locality,
    Sublocality,
    PostalCode,
    Route,
    StreetNumber,
    Premise,
    AdministrativeAreaLevel1,
    AdministrativeAreaLevel2,
    Other(String),
}

impl From<String> for ComponentType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "country" => ComponentType::Country,
            "political" => ComponentType::Political,
            "locality" => ComponentType::Locality,
            "sublocality" => ComponentType::Sublocality,
            "postal_code" => ComponentType::PostalCode,
            "route" => ComponentType::Route,
            "street_number" => ComponentType::StreetNumber,
            "premise" => ComponentType::Premise,
            "administrative_area_level_1" => ComponentType::AdministrativeAreaLevel1,
            "administrative_area_level_2" => ComponentType::AdministrativeAreaLevel2,
            _ => ComponentType::Other(value),
        }
    }
}

impl From<&str> for ComponentType {
    fn from(value: &str) -> Self {
        ComponentType::from(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ComponentType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(ComponentType::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    pub types: Vec<ComponentType>,
}

impl AddressComponent {
    pub fn has_type(&self, tag: &ComponentType) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

/// Status plus the tagged components of the best match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeResponse {
    pub status: GeocodeStatus,
    pub components: Vec<AddressComponent>,
}

impl GeocodeResponse {
    pub fn new(status: GeocodeStatus, components: Vec<AddressComponent>) -> Self {
        Self { status, components }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub long_name: String,
    pub short_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountryResult {
    Found(Country),
    Absent,
}

impl CountryResult {
    pub fn found(long_name: impl Into<String>, short_code: impl Into<String>) -> Self {
        CountryResult::Found(Country {
            long_name: long_name.into(),
            short_code: short_code.into(),
        })
    }

    pub fn is_found(&self) -> bool {
        matches!(self, CountryResult::Found(_))
    }

    pub fn country(&self) -> Option<&Country> {
        match self {
            CountryResult::Found(country) => Some(country),
            CountryResult::Absent => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub query: AddressQuery,
    pub result: CountryResult,
}

/// Input table as read from CSV, header order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressTable {
    pub headers: Vec<String>,
    pub rows: Vec<AddressRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRow {
    pub values: Vec<String>,
    /// `None` when every address column of the row was blank.
    pub query: Option<AddressQuery>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    /// Normalized form, as sent to the geocoder.
    pub query: String,
    /// First raw address seen for this query, as it appeared in the input.
    pub original_query: String,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    pub total_rows: usize,
    pub skipped_rows: usize,
    pub unique_queries: usize,
    pub resolved_queries: usize,
    pub unresolved_queries: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct ResolutionReport {
    pub headers: Vec<String>,
    /// One entry per input row, aligned with the input order.
    pub rows: Vec<(Vec<String>, CountryResult)>,
    pub manual_review: Vec<ReviewEntry>,
    pub summary: ResolutionSummary,
}
