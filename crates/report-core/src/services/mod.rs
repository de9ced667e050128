//! Service modules for report processing

pub mod assembler;
pub mod classifier;
pub mod periods_formatter;
pub mod report_generator;

// Re-export service types
pub use assembler::DocumentAssembler;
pub use classifier::{categorize, classify};
pub use periods_formatter::{format_periods, parse_periods_list};
pub use report_generator::{parse_report_payload, MarkdownReportGenerator, ReportRequest};
