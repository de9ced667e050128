//! Markdown report generation from cached report data

use crate::config::{DocumentConfig, StorageConfig};
use crate::error::{ReportError, Result};
use crate::paths;
use crate::services::assembler::DocumentAssembler;
use crate::services::classifier::classify;
use report_types::{GeneratedReport, QaRecord, ReportDocument, ReportPayload};
use serde_json::Value;
use std::path::PathBuf;

/// Inputs of one report generation run
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    /// Raw `{ "data": { "year", "quarter", "reports" } }` payload
    pub report_data: Value,
    pub company_name: Option<String>,
    pub output_filename: Option<String>,
    pub save_path: Option<PathBuf>,
}

/// Parse the `report_data` payload.
///
/// Missing or mistyped `data`, `year`, `quarter` or `reports` fields are
/// validation errors. Individual report entries that are not objects or
/// lack a textual question/answer are skipped.
pub fn parse_report_payload(report_data: &Value) -> Result<ReportPayload> {
    let data = report_data
        .get("data")
        .ok_or_else(|| missing_field("data"))?;

    if !data.is_object() {
        return Err(ReportError::Validation("'data' should be an object".to_string()));
    }

    let year = data
        .get("year")
        .ok_or_else(|| missing_field("year"))?
        .as_i64()
        .ok_or_else(|| ReportError::Validation("'year' should be an integer".to_string()))?;

    let quarter = data
        .get("quarter")
        .ok_or_else(|| missing_field("quarter"))?
        .as_i64()
        .ok_or_else(|| ReportError::Validation("'quarter' should be an integer".to_string()))?;

    let reports = data
        .get("reports")
        .ok_or_else(|| missing_field("reports"))?
        .as_array()
        .ok_or_else(|| ReportError::Validation("'reports' should be a list".to_string()))?;

    let records: Vec<QaRecord> = reports
        .iter()
        .filter_map(|entry| {
            let question = entry.get("question").and_then(Value::as_str).unwrap_or("");
            let answer = entry.get("answer").and_then(Value::as_str).unwrap_or("");
            QaRecord::new(question, answer)
        })
        .collect();

    if records.len() < reports.len() {
        log::debug!("Skipped {} incomplete report entries", reports.len() - records.len());
    }

    Ok(ReportPayload { year, quarter, records })
}

fn missing_field(name: &str) -> ReportError {
    ReportError::Validation(format!("Missing required field '{}' in report data", name))
}

/// Classifies report content, renders it as Markdown and writes it to disk
pub struct MarkdownReportGenerator {
    storage: StorageConfig,
    assembler: DocumentAssembler,
}

impl MarkdownReportGenerator {
    pub fn new(storage: StorageConfig, document: DocumentConfig) -> Self {
        Self {
            storage,
            assembler: DocumentAssembler::new(document),
        }
    }

    /// Render a payload without touching the file system.
    /// Returns the document and the number of records it contains.
    pub fn render(&self, payload: &ReportPayload, company_name: Option<&str>) -> (ReportDocument, usize) {
        let classified = classify(&payload.records);
        let document = self.assembler.assemble(payload.year, payload.quarter, company_name, &classified);
        (document, classified.total())
    }

    /// Parse, render and write the report.
    ///
    /// Nothing is written unless the whole document has been assembled.
    pub fn generate(&self, request: &ReportRequest) -> Result<GeneratedReport> {
        let payload = parse_report_payload(&request.report_data)?;
        let company_name = request.company_name.as_deref();

        let (document, item_count) = self.render(&payload, company_name);

        let file_path = paths::resolve_report_path(
            &self.storage,
            request.save_path.as_deref(),
            request.output_filename.as_deref(),
            company_name,
            payload.year,
            payload.quarter,
        );

        paths::ensure_parent_dir(&file_path)?;
        std::fs::write(&file_path, &document.body)?;

        log::info!(
            "Wrote Markdown report '{}' with {} Q&A items to {}",
            document.title,
            item_count,
            file_path.display()
        );

        Ok(GeneratedReport {
            md_content: document.body,
            file_path,
            status: format!("Successfully generated MD report with {} Q&A items", item_count),
            title: document.title,
        })
    }
}
