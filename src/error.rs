use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),
    #[error("unsupported metric `{0}` (expected one of: kills, dmg, dapm, as)")]
    UnsupportedMetric(String),
    #[error("could not read a log id from `{0}`")]
    InvalidLogId(String),
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request for log {id} failed: {source}")]
    Http {
        id: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("log {id} returned http {status}")]
    HttpStatus { id: String, status: u16 },
    #[error("log {0} returned an empty body")]
    EmptyResponse(String),
    #[error("log {id} is not valid json: {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StatsError>;
