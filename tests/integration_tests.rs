use anyhow::Result;
use country_etl::core::{ConfigProvider, Pipeline};
use country_etl::utils::validation::Validate;
use country_etl::{
    AddressCountryResolver, AddressQuery, CountryPipeline, CountryResult, EtlEngine, EtlError,
    HttpGeocoder, LocalStorage, TomlConfig,
};
use httpmock::prelude::*;
use tempfile::TempDir;

fn geocode_body(components: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "results": [{ "address_components": components }]
    })
}

fn singapore_components() -> serde_json::Value {
    serde_json::json!([
        {"long_name": "18", "short_name": "18", "types": ["street_number"]},
        {"long_name": "Canal Road", "short_name": "Canal Rd", "types": ["route"]},
        {"long_name": "Downtown Core", "short_name": "Downtown Core", "types": ["neighborhood", "political"]},
        {"long_name": "Singapore", "short_name": "SG", "types": ["country", "political"]},
        {"long_name": "Singapore", "short_name": "Singapore", "types": ["locality", "political"]},
        {"long_name": "048830", "short_name": "048830", "types": ["postal_code"]}
    ])
}

fn colombia_components() -> serde_json::Value {
    serde_json::json!([
        {"long_name": "Colombia", "short_name": "CO", "types": ["country", "political"]},
        {"long_name": "Bogotá", "short_name": "Bogotá", "types": ["locality", "political"]}
    ])
}

fn toml_config(endpoint: &str, extra: &str) -> Result<TomlConfig> {
    let content = format!(
        r#"
[source]
endpoint = "{endpoint}"
api_key = "integration-key"
timeout_seconds = 5

[input]
path = "addresses.csv"
address_columns = ["address_line_1", "address_line_2"]

[resolve]
concurrent_requests = 3

[load]
output_path = "out"
{extra}
"#
    );
    Ok(TomlConfig::from_toml_str(&content)?)
}

#[tokio::test]
async fn test_resolver_singapore_end_to_end() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/geocode/json")
            .query_param("address", "18N CanalRd Singapore 48830");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(geocode_body(singapore_components()));
    });

    let resolver = AddressCountryResolver::new(HttpGeocoder::new(server.url("/geocode/json"), "k"));
    let query = AddressQuery::new("18N CanalRd Singapore 48830").unwrap();

    assert_eq!(
        resolver.resolve(&query).await,
        CountryResult::found("Singapore", "SG")
    );
    api_mock.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn test_resolver_sends_normalized_bogota_query() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/geocode/json")
            .query_param("address", "Cra. 13 8525 BogotaColombia");
        then.status(200)
            .json_body(geocode_body(colombia_components()));
    });

    let resolver = AddressCountryResolver::new(HttpGeocoder::new(server.url("/geocode/json"), "k"));
    let query = AddressQuery::new("Cra. 13 #8525 BogotáColombia").unwrap();

    assert_eq!(
        resolver.resolve(&query).await,
        CountryResult::found("Colombia", "CO")
    );
    api_mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_batch_continues_after_failed_lookup() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().to_str().unwrap().to_string();

    tokio::fs::write(
        temp_dir.path().join("addresses.csv"),
        "ref,address_line_1,address_line_2\n\
MT103-1,18N CanalRd,Singapore 48830\n\
MT103-2,Broken Street 9,\n\
MT103-3,Cra. 13 #8525,BogotáColombia\n\
MT103-4,18N CanalRd,Singapore 48830\n\
MT103-5,,\n",
    )
    .await?;

    let server = MockServer::start();
    let singapore = server.mock(|when, then| {
        when.method(GET)
            .path("/geocode/json")
            .query_param("address", "18N CanalRd Singapore 48830")
            .query_param("key", "integration-key");
        then.status(200)
            .json_body(geocode_body(singapore_components()));
    });
    let broken = server.mock(|when, then| {
        when.method(GET)
            .path("/geocode/json")
            .query_param("address", "Broken Street 9");
        then.status(500);
    });
    let bogota = server.mock(|when, then| {
        when.method(GET)
            .path("/geocode/json")
            .query_param("address", "Cra. 13 8525 BogotaColombia");
        then.status(200)
            .json_body(geocode_body(colombia_components()));
    });

    let config = toml_config(&server.url("/geocode/json"), "")?;
    config.validate()?;

    let geocoder = HttpGeocoder::from_config(&config)?;
    let pipeline = CountryPipeline::new(LocalStorage::new(root.clone()), config, geocoder);
    let output_path = EtlEngine::new(pipeline).run().await?;

    assert_eq!(output_path, "out/resolved.csv");
    // duplicate rows share a single lookup
    singapore.assert_hits(1);
    broken.assert_hits(1);
    bogota.assert_hits(1);

    let resolved = tokio::fs::read_to_string(temp_dir.path().join("out/resolved.csv")).await?;
    let mut reader = csv::Reader::from_reader(resolved.as_bytes());
    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
        .collect::<std::result::Result<_, _>>()?;

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0][3..], ["Singapore", "SG"]);
    assert_eq!(rows[1][3..], ["", ""]);
    assert_eq!(rows[2][3..], ["Colombia", "CO"]);
    assert_eq!(rows[3][3..], ["Singapore", "SG"]);
    assert_eq!(rows[4][3..], ["", ""]);

    let review = tokio::fs::read_to_string(temp_dir.path().join("out/manual_review.csv")).await?;
    assert!(review.starts_with("query,original_query,row_count"));
    assert!(review.contains("Broken Street 9,Broken Street 9,1"));

    let summary: serde_json::Value = serde_json::from_str(
        &tokio::fs::read_to_string(temp_dir.path().join("out/summary.json")).await?,
    )?;
    assert_eq!(summary["total_rows"], 5);
    assert_eq!(summary["skipped_rows"], 1);
    assert_eq!(summary["unique_queries"], 3);
    assert_eq!(summary["resolved_queries"], 2);

    Ok(())
}

#[tokio::test]
async fn test_compressed_output_bundle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().to_str().unwrap().to_string();
    tokio::fs::write(
        temp_dir.path().join("addresses.csv"),
        "address_line_1,address_line_2\n18N CanalRd,Singapore 48830\n",
    )
    .await?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/geocode/json");
        then.status(200)
            .json_body(geocode_body(singapore_components()));
    });

    let config = toml_config(&server.url("/geocode/json"), "compress = true")?;
    assert!(config.compress());

    let geocoder = HttpGeocoder::from_config(&config)?;
    let pipeline = CountryPipeline::new(LocalStorage::new(root), config, geocoder);
    let output_path = EtlEngine::new(pipeline).run().await?;

    assert_eq!(output_path, "out/country_output.zip");
    let zip_data = std::fs::read(temp_dir.path().join("out/country_output.zip"))?;
    let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data))?;
    assert_eq!(archive.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_missing_api_key_aborts_before_any_lookup() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/geocode/json");
        then.status(200)
            .json_body(geocode_body(singapore_components()));
    });

    let content = format!(
        r#"
[source]
endpoint = "{}"

[input]
path = "addresses.csv"

[load]
output_path = "out"
"#,
        server.url("/geocode/json")
    );
    let config = TomlConfig::from_toml_str(&content)?;

    assert!(matches!(
        config.validate(),
        Err(EtlError::MissingConfigError { .. })
    ));
    assert!(matches!(
        HttpGeocoder::from_config(&config),
        Err(EtlError::MissingConfigError { .. })
    ));
    api_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_extract_reports_row_queries() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(
        temp_dir.path().join("addresses.csv"),
        "address_line_1,address_line_2\n  18N CanalRd , Singapore 48830 \n,\n",
    )
    .await?;

    let config = toml_config("http://localhost:1/geocode/json", "")?;
    let geocoder = HttpGeocoder::from_config(&config)?;
    let pipeline = CountryPipeline::new(
        LocalStorage::new(temp_dir.path().to_str().unwrap()),
        config,
        geocoder,
    );

    let table = pipeline.extract().await?;
    assert_eq!(table.rows.len(), 2);
    assert_eq!(
        table.rows[0].query.as_ref().map(|q| q.as_str()),
        Some("18N CanalRd Singapore 48830")
    );
    assert!(table.rows[1].query.is_none());
    Ok(())
}
