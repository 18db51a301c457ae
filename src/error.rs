use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("{0} environment variable not set")]
    Config(&'static str),

    #[error("Invalid {var}: {value:?}")]
    InvalidConfig { var: &'static str, value: String },

    #[error("request to {endpoint} failed")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("LLM API error: {status}\n{body}")]
    Response {
        status: reqwest::StatusCode,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, ReporterError>;
