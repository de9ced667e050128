//! Client modules for external services

pub mod market_lens;

pub use market_lens::{MarketLensClient, SummaryRequest};
