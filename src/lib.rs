pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{geocoding::HttpGeocoder, storage::LocalStorage};
pub use config::toml_config::TomlConfig;
pub use crate::core::{etl::EtlEngine, pipeline::CountryPipeline, resolver::AddressCountryResolver};
pub use domain::model::{AddressQuery, Country, CountryResult, ResolvedAddress};
pub use utils::error::{EtlError, Result};
