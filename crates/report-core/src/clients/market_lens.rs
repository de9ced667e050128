//! Market Lens fundamental-report API client

use crate::config::MarketLensConfig;
use crate::error::{ReportError, Result};
use log::{debug, info, warn};
use reqwest::header::ACCEPT;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const CACHED_REPORT_PATH: &str = "/api/fundamental/cached_report";
const CACHED_PERIODS_PATH: &str = "/api/fundamental/cached_report_periods";
const PREDEFINED_QUESTIONS_PATH: &str = "/api/fundamental/predefined_report_questions";
const REPORT_SUMMARY_PATH: &str = "/api/fundamental/report_summary";

/// Body of a report summary request
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SummaryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
}

impl SummaryRequest {
    pub fn new(company_symbol: &str, report_period: Option<&str>, questions: Option<&str>) -> Self {
        Self {
            company_symbol: Some(company_symbol.to_string()).filter(|s| !s.is_empty()),
            report_period: report_period.filter(|p| !p.is_empty()).map(str::to_string),
            questions: questions.filter(|q| !q.is_empty()).map(parse_questions),
        }
    }
}

/// Questions are given as a JSON array of strings or as one plain question
pub fn parse_questions(text: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(text).unwrap_or_else(|_| vec![text.to_string()])
}

pub struct MarketLensClient {
    config: MarketLensConfig,
    http_client: HttpClient,
}

impl MarketLensClient {
    pub fn new(config: MarketLensConfig) -> Result<Self> {
        config.validate()?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    // JSON bodies carry their own Content-Type
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "application/json")
    }

    /// Cached Q&A report for a ticker, optionally narrowed to a period
    pub async fn get_cached_report(
        &self,
        ticker: &str,
        year: Option<i64>,
        quarter: Option<i64>,
    ) -> Result<Value> {
        let url = self.url(CACHED_REPORT_PATH);

        let mut query = vec![("ticker", ticker.to_string())];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }
        if let Some(quarter) = quarter {
            query.push(("quarter", quarter.to_string()));
        }

        info!("Fetching cached report for {} ({:?}Q{:?})", ticker, year, quarter);

        let response = self
            .send_with_retry(|| self.http_client.get(&url).query(&query))
            .await?;

        self.parse_response(response, "No cached report data found for the specified parameters")
            .await
    }

    /// All periods that have a cached report
    pub async fn get_cached_periods(&self) -> Result<Value> {
        let url = self.url(CACHED_PERIODS_PATH);
        info!("Fetching cached report periods");

        let response = self.send_with_retry(|| self.http_client.get(&url)).await?;
        self.parse_response(response, "Endpoint not found. Please verify the API base URL")
            .await
    }

    /// Questions the service answers for every report
    pub async fn get_predefined_questions(&self) -> Result<Value> {
        let url = self.url(PREDEFINED_QUESTIONS_PATH);
        info!("Fetching predefined report questions");

        let response = self.send_with_retry(|| self.http_client.get(&url)).await?;
        self.parse_response(response, "Endpoint not found. Please verify the API base URL")
            .await
    }

    /// Generate a custom summary for a company and period
    pub async fn generate_report_summary(&self, request: &SummaryRequest) -> Result<Value> {
        if request.company_symbol.is_none() {
            return Err(ReportError::Validation(
                "Company symbol is required for report summary".to_string()
            ));
        }

        let url = self.url(REPORT_SUMMARY_PATH);
        info!("Requesting report summary for {:?}", request.company_symbol);

        let response = self
            .send_with_retry(|| self.http_client.post(&url).json(request))
            .await?;

        self.parse_response(response, "Analysis endpoint not found. Please verify the API base URL")
            .await
    }

    /// Send a request, retrying connection failures and timeouts with
    /// exponential backoff (base delay doubled per attempt).
    async fn send_with_retry<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempt: u32 = 0;

        loop {
            let request = self.authorize(build());

            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if is_transient(&e) => {
                    attempt += 1;
                    if attempt >= max_attempts {
                        return Err(ReportError::Network(format!(
                            "Network connection failed after {} attempts: {}",
                            attempt, e
                        )));
                    }

                    let delay = backoff_delay(self.config.retry_base_delay_ms, attempt - 1);
                    warn!(
                        "Request attempt {} failed ({}), retrying in {} ms",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(ReportError::Http(e)),
            }
        }
    }

    async fn parse_response(&self, response: Response, not_found_message: &str) -> Result<Value> {
        let status = response.status();
        debug!("Market Lens responded with {}", status);

        if status.is_success() {
            let body = response.text().await?;
            return Ok(serde_json::from_str(&body)?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body, not_found_message))
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// `base_ms * 2^exponent`
fn backoff_delay(base_ms: u64, exponent: u32) -> Duration {
    let multiplier = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(multiplier))
}

/// Map a non-success status to an error
fn status_error(status: StatusCode, body: &str, not_found_message: &str) -> ReportError {
    match status {
        StatusCode::BAD_REQUEST => {
            let detail = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "Invalid request parameters.".to_string());
            ReportError::BadRequest(detail)
        }
        StatusCode::UNAUTHORIZED => {
            ReportError::Auth("Please check your API key.".to_string())
        }
        StatusCode::FORBIDDEN => {
            ReportError::Forbidden("Insufficient permissions for this endpoint.".to_string())
        }
        StatusCode::NOT_FOUND => ReportError::NotFound(not_found_message.to_string()),
        StatusCode::UNPROCESSABLE_ENTITY => ReportError::Validation(
            "Please check company symbol and report period format.".to_string()
        ),
        StatusCode::TOO_MANY_REQUESTS => {
            ReportError::RateLimited("Please retry after some time.".to_string())
        }
        s if s.is_server_error() => ReportError::ServiceUnavailable(format!(
            "Server error {}. Service may be temporarily unavailable.",
            s.as_u16()
        )),
        s => ReportError::ServiceUnavailable(format!("Unexpected status {} - {}", s, body)),
    }
}
