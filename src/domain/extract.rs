use crate::domain::model::{ComponentType, CountryResult, GeocodeResponse};

/// Locate the country component of a geocode response by its tag.
///
/// Component order differs between addresses (a postal-code-only match has
/// fewer components than a full street address), so the list is scanned by
/// tag membership. When several components carry the `country` tag the first
/// one in response order wins.
pub fn extract_country(response: &GeocodeResponse) -> CountryResult {
    if !response.status.is_success() {
        return CountryResult::Absent;
    }

    response
        .components
        .iter()
        .find(|component| component.has_type(&ComponentType::Country))
        .map(|component| CountryResult::found(&component.long_name, &component.short_name))
        .unwrap_or(CountryResult::Absent)
}
