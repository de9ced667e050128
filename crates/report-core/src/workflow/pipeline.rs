//! Fetch-then-render report pipeline

use super::traits::ReportSource;
use crate::error::Result;
use crate::services::{format_periods, parse_periods_list, MarkdownReportGenerator, ReportRequest};
use chrono::NaiveDateTime;
use report_types::{GeneratedReport, PeriodsMarkdown};
use std::path::PathBuf;

/// Which cached report to turn into a document, and where to put it
#[derive(Debug, Clone, Default)]
pub struct ReportJob {
    pub ticker: String,
    pub year: Option<i64>,
    pub quarter: Option<i64>,
    pub company_name: Option<String>,
    pub output_filename: Option<String>,
    pub save_path: Option<PathBuf>,
}

/// Chains a report source with the Markdown generator
pub struct ReportPipeline<S: ReportSource> {
    source: S,
    generator: MarkdownReportGenerator,
}

impl<S: ReportSource> ReportPipeline<S> {
    pub fn new(source: S, generator: MarkdownReportGenerator) -> Self {
        Self { source, generator }
    }

    /// Fetch the cached report for a job and write it as Markdown
    pub async fn generate_report(&self, job: &ReportJob) -> Result<GeneratedReport> {
        log::info!("Generating report for ticker {}", job.ticker);

        let report_data = self
            .source
            .fetch_cached_report(&job.ticker, job.year, job.quarter)
            .await?;

        let request = ReportRequest {
            report_data,
            company_name: job.company_name.clone(),
            output_filename: job.output_filename.clone(),
            save_path: job.save_path.clone(),
        };

        let generated = self.generator.generate(&request)?;
        log::info!("{}", generated.status);
        Ok(generated)
    }

    /// Fetch the cached periods and render them as Markdown tables
    pub async fn list_periods(&self, generated_at: Option<NaiveDateTime>) -> Result<PeriodsMarkdown> {
        let periods_list = self.source.fetch_cached_periods().await?;
        let periods = parse_periods_list(&periods_list)?;

        log::info!("Formatting {} cached periods", periods.len());
        Ok(format_periods(&periods, generated_at))
    }
}
