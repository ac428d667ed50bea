use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting country resolution...");

        // Extract
        let table = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} rows", table.rows.len());

        // Transform
        let report = self.pipeline.transform(table).await?;
        tracing::info!(
            "🌍 Resolved {}/{} unique addresses",
            report.summary.resolved_queries,
            report.summary.unique_queries
        );

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
