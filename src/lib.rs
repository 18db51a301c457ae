// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod vault;
pub mod sanitize;
pub mod partition;
pub mod narrator;
pub mod pipeline;
pub mod report;

// Re-export commonly used items
pub use types::*;
pub use error::ReporterError;
pub use config::{load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use vault::{metrics_url, MetricsFetcher};
pub use sanitize::{sanitize, UNDEFINED_VALUE_MARKER};
pub use partition::partition;
pub use narrator::{build_prompt, interpret_response, Narrator};
pub use pipeline::{run_from_env, HealthPipeline, Stage};
pub use report::{HealthReport, ReportSummary};
