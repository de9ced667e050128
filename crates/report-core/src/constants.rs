/// Report task constants

/// Number of answer characters appended to the question when classifying
pub const CLASSIFY_ANSWER_PROBE_CHARS: usize = 100;

/// Default label in the document title, e.g. `ACME 财务分析报告 (2024Q3)`
pub const DEFAULT_REPORT_LABEL: &str = "财务分析报告";

/// Default heading for the optional table of contents
pub const DEFAULT_TOC_TITLE: &str = "目录";

/// Default directory for generated reports when no save path is given
pub const DEFAULT_STORAGE_DIR: &str = "/oomol-driver/oomol-storage";

/// Default Market Lens API root
pub const DEFAULT_MARKET_LENS_URL: &str = "https://market-lens.innolabs.cc";

/// Attempts made for a request that fails to connect or times out
pub const DEFAULT_MAX_RETRIES: u32 = 3;
