//! Shared types for the financial report tasks

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// One question/answer pair extracted from a financial report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
}

impl QaRecord {
    /// Build a record from raw text, trimming both sides.
    /// Returns `None` when either side is blank after trimming.
    pub fn new(question: &str, answer: &str) -> Option<Self> {
        let question = question.trim();
        let answer = answer.trim();

        if question.is_empty() || answer.is_empty() {
            return None;
        }

        Some(Self {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }
}

/// Content class used to group records into document sections.
///
/// Declaration order is the fixed section order of the document, so the
/// derived `Ord` can be relied on for iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Financial,
    Business,
    Analysis,
    Management,
    Governance,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Financial,
        Category::Business,
        Category::Analysis,
        Category::Management,
        Category::Governance,
        Category::Other,
    ];

    /// Stable machine key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Business => "business",
            Self::Analysis => "analysis",
            Self::Management => "management",
            Self::Governance => "governance",
            Self::Other => "other",
        }
    }

    /// Heading used for the category's section in the Markdown document
    pub fn section_title(&self) -> &'static str {
        match self {
            Self::Financial => "财务分析",
            Self::Business => "业务运营分析",
            Self::Analysis => "专项分析",
            Self::Management => "管理层分析",
            Self::Governance => "公司治理与合规",
            Self::Other => "其他信息",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Records grouped by category. All six buckets are always present and
/// every stored record is trimmed and non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawClassifiedReport")]
pub struct ClassifiedReport {
    buckets: BTreeMap<Category, Vec<QaRecord>>,
}

#[derive(Deserialize)]
struct RawClassifiedReport {
    #[serde(default)]
    buckets: BTreeMap<Category, Vec<QaRecord>>,
}

impl From<RawClassifiedReport> for ClassifiedReport {
    fn from(raw: RawClassifiedReport) -> Self {
        let mut report = Self::new();
        for (category, records) in raw.buckets {
            for record in records {
                report.push(category, record);
            }
        }
        report
    }
}

impl ClassifiedReport {
    pub fn new() -> Self {
        let buckets = Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        Self { buckets }
    }

    /// Add a record to a bucket, trimming it first.
    /// Returns `false` and drops the record when either side is blank.
    pub fn push(&mut self, category: Category, record: QaRecord) -> bool {
        match QaRecord::new(&record.question, &record.answer) {
            Some(record) => {
                self.buckets.entry(category).or_default().push(record);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, category: Category) -> &[QaRecord] {
        self.buckets.get(&category).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Buckets in fixed category order, including empty ones
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[QaRecord])> {
        self.buckets.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Total number of classified records across all buckets
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Default for ClassifiedReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendered Markdown report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    pub body: String,
}

/// Parsed `report_data` input: one reporting period and its Q&A records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub year: i64,
    pub quarter: i64,
    pub records: Vec<QaRecord>,
}

/// A cached report period for a ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub quarter: Option<i64>,
}

fn default_ticker() -> String {
    "Unknown".to_string()
}

impl ReportPeriod {
    pub fn new(ticker: &str, year: i64, quarter: i64) -> Self {
        Self {
            ticker: ticker.to_string(),
            year: Some(year),
            quarter: Some(quarter),
        }
    }

    /// `Q3 2024` when both parts are known, otherwise `2024-N/A` style
    pub fn label(&self) -> String {
        match (self.year, self.quarter) {
            (Some(year), Some(quarter)) => format!("Q{} {}", quarter, year),
            (year, quarter) => format!("{}-{}", display_or_na(year), display_or_na(quarter)),
        }
    }
}

/// Render an optional period component, using `N/A` when absent
pub fn display_or_na(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Markdown listing of cached periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodsMarkdown {
    pub markdown: String,
    pub periods_count: usize,
}

/// Result of the Markdown report task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedReport {
    pub md_content: String,
    pub file_path: PathBuf,
    pub status: String,
    pub title: String,
}
