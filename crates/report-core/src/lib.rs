//! Financial Report Core Library
//!
//! Classification and Markdown assembly of financial report Q&A content,
//! plus the Market Lens API client and the fetch-then-render pipeline.

pub mod config;
pub mod clients;
pub mod constants;
pub mod services;
pub mod workflow;
pub mod error;
pub mod paths;

// Re-export main types for easy access
pub use config::ReportConfig;
pub use error::{ReportError, Result};

pub use clients::{MarketLensClient, SummaryRequest};

// Re-export service types
pub use services::{
    DocumentAssembler,
    MarkdownReportGenerator,
    ReportRequest,
    classify,
    categorize,
    format_periods,
};

pub use workflow::{ReportJob, ReportPipeline, ReportSource};

pub use report_types::{
    Category,
    ClassifiedReport,
    GeneratedReport,
    PeriodsMarkdown,
    QaRecord,
    ReportDocument,
    ReportPayload,
    ReportPeriod,
};
