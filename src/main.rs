use clap::Parser;
use country_etl::core::ConfigProvider;
use country_etl::utils::error::ErrorSeverity;
use country_etl::utils::{logger, validation::Validate};
use country_etl::{CliConfig, CountryPipeline, EtlEngine, HttpGeocoder, LocalStorage, TomlConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 若指定了 TOML 檔案則以檔案設定為準
    let toml_config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let verbose = cli.verbose || toml_config.as_ref().is_some_and(|c| c.verbose());
    let json_logs = cli.log_json || toml_config.as_ref().is_some_and(|c| c.json_logs());
    if json_logs {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting country-etl");

    let result = match toml_config {
        Some(config) => {
            tracing::info!("📁 Using configuration file: {}", cli.config.as_deref().unwrap_or_default());
            run(config).await
        }
        None => run(cli).await,
    };

    match result {
        Ok(output_path) => {
            tracing::info!("✅ Country resolution completed successfully!");
            println!("✅ Country resolution completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Country resolution failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(config: C) -> country_etl::Result<String> {
    // 設定錯誤（例如缺少 API key）必須在任何查詢之前中止
    config.validate()?;

    let geocoder = HttpGeocoder::from_config(&config)?;
    let storage = LocalStorage::new(".");
    let pipeline = CountryPipeline::new(storage, config, geocoder);

    EtlEngine::new(pipeline).run().await
}
