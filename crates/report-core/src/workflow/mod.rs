//! Report workflow module

pub mod traits;
pub mod pipeline;

pub use traits::ReportSource;
pub use pipeline::{ReportJob, ReportPipeline};
