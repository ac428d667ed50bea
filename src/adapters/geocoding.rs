use crate::core::{ConfigProvider, Geocoder};
use crate::domain::model::{AddressComponent, GeocodeResponse, GeocodeStatus};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_required_secret;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Wire shape of a Google-compatible geocode JSON body.
#[derive(Debug, Deserialize)]
struct GeocodeApiResponse {
    status: GeocodeStatus,
    #[serde(default)]
    results: Vec<GeocodeApiResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeApiResult {
    address_components: Vec<AddressComponent>,
    #[serde(default)]
    formatted_address: Option<String>,
}

/// Geocoder backed by an HTTP endpoint speaking the Google Geocoding JSON
/// format. The JSON output always carries the full component list.
pub struct HttpGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
    language: Option<String>,
    region: Option<String>,
    timeout: Duration,
}

impl HttpGeocoder {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            language: None,
            region: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Build from configuration; a missing API key aborts before any lookup.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let api_key = validate_required_secret("api_key", config.api_key())?;

        let mut geocoder = Self::new(config.api_endpoint(), api_key)
            .with_timeout(Duration::from_secs(config.timeout_seconds()));
        geocoder.language = config.language().map(str::to_string);
        geocoder.region = config.region().map(str::to_string);
        Ok(geocoder)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeocodeResponse> {
        let mut params = vec![("address", query), ("key", self.api_key.as_str())];
        if let Some(language) = &self.language {
            params.push(("language", language.as_str()));
        }
        if let Some(region) = &self.region {
            params.push(("region", region.as_str()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?;

        tracing::debug!("Geocoding response status: {}", response.status());

        if !response.status().is_success() {
            return Err(EtlError::GeocodingStatus {
                status: response.status().as_u16(),
                endpoint: self.endpoint.clone(),
            });
        }

        let body = response.text().await?;
        let parsed: GeocodeApiResponse =
            serde_json::from_str(&body).map_err(|e| EtlError::MalformedResponse {
                message: e.to_string(),
            })?;

        if let Some(message) = &parsed.error_message {
            tracing::debug!("Geocoding service message ({:?}): {}", parsed.status, message);
        }

        // 只取最佳匹配（第一筆結果）的元件列表
        let components = match parsed.results.into_iter().next() {
            Some(best) => {
                if let Some(formatted) = &best.formatted_address {
                    tracing::debug!("Best match: {}", formatted);
                }
                best.address_components
            }
            None => Vec::new(),
        };

        Ok(GeocodeResponse::new(parsed.status, components))
    }
}
