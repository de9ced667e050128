//! Pipeline tests against an in-memory report source

use async_trait::async_trait;
use report_core::config::{DocumentConfig, StorageConfig};
use report_core::{MarkdownReportGenerator, ReportError, ReportJob, ReportPipeline, ReportSource, Result};
use serde_json::{json, Value};
use std::sync::Mutex;

struct MockReportSource {
    report: Value,
    periods: Value,
    should_fail: bool,
    requests: Mutex<Vec<(String, Option<i64>, Option<i64>)>>,
}

impl MockReportSource {
    fn new(report: Value, periods: Value) -> Self {
        Self {
            report,
            periods,
            should_fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new(Value::Null, Value::Null)
        }
    }
}

#[async_trait]
impl ReportSource for MockReportSource {
    async fn fetch_cached_report(
        &self,
        ticker: &str,
        year: Option<i64>,
        quarter: Option<i64>,
    ) -> Result<Value> {
        if self.should_fail {
            return Err(ReportError::ServiceUnavailable("Test error".to_string()));
        }
        self.requests
            .lock()
            .unwrap()
            .push((ticker.to_string(), year, quarter));
        Ok(self.report.clone())
    }

    async fn fetch_cached_periods(&self) -> Result<Value> {
        if self.should_fail {
            return Err(ReportError::ServiceUnavailable("Test error".to_string()));
        }
        Ok(self.periods.clone())
    }
}

fn generator(dir: &std::path::Path) -> MarkdownReportGenerator {
    MarkdownReportGenerator::new(
        StorageConfig { storage_dir: dir.to_path_buf() },
        DocumentConfig::default(),
    )
}

#[tokio::test]
async fn test_generate_report_from_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockReportSource::new(
        json!({
            "data": {
                "year": 2024,
                "quarter": 2,
                "reports": [
                    {"question": "毛利率", "answer": "45%"},
                    {"question": "市场竞争", "answer": "加剧"}
                ]
            }
        }),
        json!({"data": []}),
    );
    let pipeline = ReportPipeline::new(source, generator(dir.path()));

    let job = ReportJob {
        ticker: "AAPL".to_string(),
        year: Some(2024),
        quarter: Some(2),
        company_name: Some("Apple".to_string()),
        ..ReportJob::default()
    };

    let result = pipeline.generate_report(&job).await.expect("pipeline should succeed");

    assert_eq!(result.title, "Apple 财务分析报告 (2024Q2)");
    assert_eq!(result.file_path, dir.path().join("Apple_financial_report_2024Q2.md"));
    assert!(result.md_content.contains("## 1. 毛利率"));
    assert!(result.md_content.contains("## 2. 业务运营分析"));
    assert!(result.md_content.contains("### 2.1 市场竞争"));
}

#[tokio::test]
async fn test_file_name_uses_payload_period() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockReportSource::new(
        json!({"data": {"year": 2023, "quarter": 4, "reports": []}}),
        json!({"data": []}),
    );
    let pipeline = ReportPipeline::new(source, generator(dir.path()));

    let job = ReportJob {
        ticker: "MSFT".to_string(),
        year: Some(2023),
        quarter: None,
        ..ReportJob::default()
    };
    pipeline.generate_report(&job).await.unwrap();

    // Year and quarter in the file name come from the returned payload
    assert!(dir.path().join("financial_report_2023Q4.md").is_file());
}

#[tokio::test]
async fn test_source_records_requests() {
    let source = MockReportSource::new(
        json!({"data": {"year": 2023, "quarter": 1, "reports": []}}),
        json!({"data": []}),
    );

    source.fetch_cached_report("TSLA", Some(2023), Some(1)).await.unwrap();
    let requests = source.requests.lock().unwrap();
    assert_eq!(requests.as_slice(), &[("TSLA".to_string(), Some(2023), Some(1))]);
}

#[tokio::test]
async fn test_list_periods() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockReportSource::new(
        Value::Null,
        json!({
            "data": [
                {"ticker": "X", "year": 2023, "quarter": 2},
                {"ticker": "X", "year": 2023, "quarter": 1}
            ]
        }),
    );
    let pipeline = ReportPipeline::new(source, generator(dir.path()));

    let periods = pipeline.list_periods(None).await.unwrap();
    assert_eq!(periods.periods_count, 2);
    assert_eq!(periods.markdown.matches("### X").count(), 1);

    let q1 = periods.markdown.find("Q1 2023").unwrap();
    let q2 = periods.markdown.find("Q2 2023").unwrap();
    assert!(q1 < q2);
}

#[tokio::test]
async fn test_source_errors_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = ReportPipeline::new(MockReportSource::failing(), generator(dir.path()));

    let job = ReportJob {
        ticker: "AAPL".to_string(),
        ..ReportJob::default()
    };

    let err = pipeline.generate_report(&job).await.unwrap_err();
    assert!(matches!(err, ReportError::ServiceUnavailable(_)));

    let err = pipeline.list_periods(None).await.unwrap_err();
    assert!(matches!(err, ReportError::ServiceUnavailable(_)));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_malformed_payload_is_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockReportSource::new(json!({"unexpected": true}), json!({"rows": []}));
    let pipeline = ReportPipeline::new(source, generator(dir.path()));

    let job = ReportJob {
        ticker: "AAPL".to_string(),
        ..ReportJob::default()
    };

    assert!(matches!(
        pipeline.generate_report(&job).await.unwrap_err(),
        ReportError::Validation(_)
    ));
    assert!(matches!(
        pipeline.list_periods(None).await.unwrap_err(),
        ReportError::Validation(_)
    ));
}
