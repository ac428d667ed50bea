use crate::core::Geocoder;
use crate::domain::extract::extract_country;
use crate::domain::model::{AddressQuery, CountryResult, ResolvedAddress};
use crate::domain::normalize::normalize_address;

/// Resolves one address string to the country reported by the geocoder.
///
/// Stateless apart from the geocoder it wraps: each call normalizes, makes
/// at most one lookup, and scans the response for the `country` component.
/// Lookup failures are logged and reported as [`CountryResult::Absent`],
/// never returned as errors, so one bad address cannot abort a batch.
pub struct AddressCountryResolver<G: Geocoder> {
    geocoder: G,
}

impl<G: Geocoder> AddressCountryResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    pub async fn resolve(&self, query: &AddressQuery) -> CountryResult {
        let normalized = normalize_address(query.as_str());
        if normalized.is_empty() {
            tracing::debug!(
                "Query {:?} is empty after normalization, skipping lookup",
                query.as_str()
            );
            return CountryResult::Absent;
        }

        tracing::debug!("Geocoding {:?}", normalized);
        let response = match self.geocoder.geocode(&normalized).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("⚠️ Geocoding failed for {:?}: {}", normalized, e);
                return CountryResult::Absent;
            }
        };

        let result = extract_country(&response);
        if !result.is_found() {
            tracing::debug!(
                "No country component for {:?} (status {:?}, {} components)",
                normalized,
                response.status,
                response.components.len()
            );
        }
        result
    }

    pub async fn resolve_address(&self, query: AddressQuery) -> ResolvedAddress {
        let result = self.resolve(&query).await;
        ResolvedAddress { query, result }
    }
}
