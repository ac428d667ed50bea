use crate::domain::model::{AddressTable, GeocodeResponse, ResolutionReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn address_columns(&self) -> &[String];
    fn concurrent_requests(&self) -> usize;
    fn timeout_seconds(&self) -> u64;
    fn language(&self) -> Option<&str>;
    fn region(&self) -> Option<&str>;
    fn compress(&self) -> bool;
}

/// Outbound lookup against a geocoding service.
///
/// Implementations must request the detailed response shape (status plus
/// tagged component list) and perform exactly one call per invocation.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<GeocodeResponse>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<AddressTable>;
    async fn transform(&self, table: AddressTable) -> Result<ResolutionReport>;
    async fn load(&self, report: ResolutionReport) -> Result<String>;
}
