pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::geocoding::DEFAULT_GEOCODING_ENDPOINT;
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_provider, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "country-etl")]
#[command(about = "Resolve country name/code pairs for free-text address fields")]
pub struct CliConfig {
    /// Load settings from a TOML file instead of the flags below
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, default_value = "addresses.csv")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Columns joined into the address query; defaults to every header containing "address"
    #[arg(long, value_delimiter = ',')]
    pub address_columns: Vec<String>,

    #[arg(long, default_value = DEFAULT_GEOCODING_ENDPOINT)]
    pub api_endpoint: String,

    #[arg(long, env = "GEOCODING_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[arg(long, default_value = "5")]
    pub concurrent_requests: usize,

    #[arg(long, default_value = "10")]
    pub timeout_seconds: u64,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long, help = "Bundle outputs into a single zip archive")]
    pub compress: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn address_columns(&self) -> &[String] {
        &self.address_columns
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    fn compress(&self) -> bool {
        self.compress
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_flags() {
        let config = CliConfig::try_parse_from([
            "country-etl",
            "--input",
            "wires.csv",
            "--address-columns",
            "addr_line_1,addr_line_2",
            "--api-key",
            "secret",
            "--concurrent-requests",
            "3",
            "--compress",
        ])
        .unwrap();

        assert_eq!(config.input_path(), "wires.csv");
        assert_eq!(config.address_columns(), ["addr_line_1", "addr_line_2"]);
        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.concurrent_requests(), 3);
        assert_eq!(config.api_endpoint(), DEFAULT_GEOCODING_ENDPOINT);
        assert!(config.compress());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_fails_validation() {
        let config = CliConfig::try_parse_from([
            "country-etl",
            "--api-key",
            "secret",
            "--concurrent-requests",
            "0",
        ])
        .unwrap();

        assert!(config.validate().is_err());
    }
}
