use crate::core::resolver::AddressCountryResolver;
use crate::core::{ConfigProvider, Geocoder, Pipeline, Storage};
use crate::domain::model::{
    AddressQuery, AddressRow, AddressTable, CountryResult, ResolutionReport, ResolutionSummary,
    ReviewEntry,
};
use crate::domain::normalize::normalize_address;
use crate::utils::error::{EtlError, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const RESOLVED_FILE: &str = "resolved.csv";
pub const REVIEW_FILE: &str = "manual_review.csv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const ARCHIVE_FILE: &str = "country_output.zip";

/// Batch driver: reads address rows from CSV, resolves each unique
/// normalized query once, and writes the country columns back per row.
pub struct CountryPipeline<S: Storage, C: ConfigProvider, G: Geocoder> {
    storage: S,
    config: C,
    resolver: AddressCountryResolver<G>,
}

impl<S: Storage, C: ConfigProvider, G: Geocoder> CountryPipeline<S, C, G> {
    pub fn new(storage: S, config: C, geocoder: G) -> Self {
        Self {
            storage,
            config,
            resolver: AddressCountryResolver::new(geocoder),
        }
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }
}

/// Parse CSV bytes and build one query per row from the address columns.
///
/// Ragged rows are padded or truncated to the header width and invalid UTF-8
/// is replaced lossily, so one damaged record never drops the rest.
pub fn parse_table(data: &[u8], address_columns: &[String]) -> Result<AddressTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| {
            String::from_utf8_lossy(h)
                .trim_start_matches('\u{feff}')
                .trim()
                .to_string()
        })
        .collect();
    let indices = address_column_indices(&headers, address_columns)?;
    tracing::debug!(
        "Address columns: {:?}",
        indices.iter().map(|&i| &headers[i]).collect::<Vec<_>>()
    );

    let mut rows = Vec::new();
    for (line, record) in reader.byte_records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("⚠️ Skipping unreadable CSV record {}: {}", line + 1, e);
                continue;
            }
        };

        let mut values: Vec<String> = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        if values.len() != headers.len() {
            tracing::warn!(
                "⚠️ Record {} has {} fields, expected {}",
                line + 1,
                values.len(),
                headers.len()
            );
            values.resize(headers.len(), String::new());
        }

        let query = AddressQuery::from_fields(indices.iter().map(|&i| values[i].as_str()));
        rows.push(AddressRow { values, query });
    }

    Ok(AddressTable { headers, rows })
}

fn address_column_indices(headers: &[String], address_columns: &[String]) -> Result<Vec<usize>> {
    if address_columns.is_empty() {
        let indices: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.to_lowercase().contains("address"))
            .map(|(i, _)| i)
            .collect();

        if indices.is_empty() {
            return Err(EtlError::ValidationError {
                message: format!(
                    "No address columns configured and no header contains 'address' (headers: {})",
                    headers.join(", ")
                ),
            });
        }
        return Ok(indices);
    }

    let mut indices = Vec::with_capacity(address_columns.len());
    let mut missing = Vec::new();
    for column in address_columns {
        match headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(column.trim()))
        {
            Some(i) => indices.push(i),
            None => missing.push(column.as_str()),
        }
    }

    if !missing.is_empty() {
        return Err(EtlError::ValidationError {
            message: format!("Address columns not found in input: {}", missing.join(", ")),
        });
    }
    Ok(indices)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, G: Geocoder> Pipeline for CountryPipeline<S, C, G> {
    async fn extract(&self) -> Result<AddressTable> {
        tracing::debug!("Reading input from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        parse_table(&data, self.config.address_columns())
    }

    async fn transform(&self, table: AddressTable) -> Result<ResolutionReport> {
        let total_rows = table.rows.len();

        // 以正規化後的字串去重，相同地址只查詢一次
        let mut row_keys: Vec<Option<String>> = Vec::with_capacity(table.rows.len());
        let mut row_counts: HashMap<String, usize> = HashMap::new();
        let mut original_queries: HashMap<String, String> = HashMap::new();
        let mut unique_queries: Vec<AddressQuery> = Vec::new();

        for row in &table.rows {
            let key = row
                .query
                .as_ref()
                .and_then(|q| AddressQuery::new(&normalize_address(q.as_str())));

            if let (Some(query), Some(raw)) = (&key, &row.query) {
                original_queries
                    .entry(query.as_str().to_string())
                    .or_insert_with(|| raw.as_str().to_string());
                let count = row_counts.entry(query.as_str().to_string()).or_insert(0);
                if *count == 0 {
                    unique_queries.push(query.clone());
                }
                *count += 1;
            }
            row_keys.push(key.map(|q| q.as_str().to_string()));
        }

        let skipped_rows = row_keys.iter().filter(|k| k.is_none()).count();
        let unique_count = unique_queries.len();
        tracing::info!(
            "🔎 Resolving {} unique addresses for {} rows ({} rows without address)",
            unique_count,
            total_rows,
            skipped_rows
        );

        let resolver = &self.resolver;
        let resolved: HashMap<String, CountryResult> = stream::iter(unique_queries)
            .map(|query| resolver.resolve_address(query))
            .buffer_unordered(self.config.concurrent_requests().max(1))
            .fold(HashMap::new(), |mut acc, resolved| async move {
                acc.insert(resolved.query.as_str().to_string(), resolved.result);
                acc
            })
            .await;

        let mut manual_review: Vec<ReviewEntry> = resolved
            .iter()
            .filter(|(_, result)| !result.is_found())
            .map(|(query, _)| ReviewEntry {
                query: query.clone(),
                original_query: original_queries.get(query).cloned().unwrap_or_default(),
                row_count: row_counts.get(query).copied().unwrap_or(0),
            })
            .collect();
        manual_review.sort_by(|a, b| a.query.cmp(&b.query));

        let rows: Vec<(Vec<String>, CountryResult)> = table
            .rows
            .into_iter()
            .zip(row_keys)
            .map(|(row, key)| {
                let result = key
                    .and_then(|k| resolved.get(&k).cloned())
                    .unwrap_or(CountryResult::Absent);
                (row.values, result)
            })
            .collect();

        let unresolved_queries = manual_review.len();
        if unresolved_queries > 0 {
            tracing::warn!(
                "⚠️ {} of {} unique addresses need manual review",
                unresolved_queries,
                unique_count
            );
        }

        Ok(ResolutionReport {
            headers: table.headers,
            rows,
            manual_review,
            summary: ResolutionSummary {
                total_rows,
                skipped_rows,
                unique_queries: unique_count,
                resolved_queries: unique_count - unresolved_queries,
                unresolved_queries,
                generated_at: chrono::Utc::now(),
            },
        })
    }

    async fn load(&self, report: ResolutionReport) -> Result<String> {
        let resolved_csv = render_resolved_csv(&report)?;
        let review_csv = render_review_csv(&report.manual_review)?;
        let summary_json = serde_json::to_string_pretty(&report.summary)?;

        if self.config.compress() {
            tracing::debug!("Creating ZIP archive with 3 files");

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

                zip.start_file::<_, ()>(RESOLVED_FILE, FileOptions::default())?;
                zip.write_all(&resolved_csv)?;

                zip.start_file::<_, ()>(REVIEW_FILE, FileOptions::default())?;
                zip.write_all(&review_csv)?;

                zip.start_file::<_, ()>(SUMMARY_FILE, FileOptions::default())?;
                zip.write_all(summary_json.as_bytes())?;

                zip.finish()?.into_inner()
            };

            let archive_path = self.output_file(ARCHIVE_FILE);
            tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), archive_path);
            self.storage.write_file(&archive_path, &zip_data).await?;
            return Ok(archive_path);
        }

        let resolved_path = self.output_file(RESOLVED_FILE);
        self.storage.write_file(&resolved_path, &resolved_csv).await?;
        self.storage
            .write_file(&self.output_file(REVIEW_FILE), &review_csv)
            .await?;
        self.storage
            .write_file(&self.output_file(SUMMARY_FILE), summary_json.as_bytes())
            .await?;

        Ok(resolved_path)
    }
}

fn render_resolved_csv(report: &ResolutionReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut headers = report.headers.clone();
    headers.push("country_name".to_string());
    headers.push("country_code".to_string());
    writer.write_record(&headers)?;

    for (values, result) in &report.rows {
        let (name, code) = match result.country() {
            Some(country) => (country.long_name.as_str(), country.short_code.as_str()),
            None => ("", ""),
        };
        writer.write_record(values.iter().map(String::as_str).chain([name, code]))?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to finish resolved CSV: {}", e),
    })
}

fn render_review_csv(entries: &[ReviewEntry]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["query", "original_query", "row_count"])?;
    for entry in entries {
        let row_count = entry.row_count.to_string();
        writer.write_record([
            entry.query.as_str(),
            entry.original_query.as_str(),
            row_count.as_str(),
        ])?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to finish review CSV: {}", e),
    })
}
