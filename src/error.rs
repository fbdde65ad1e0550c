use thiserror::Error;

/// Raised when a string is not one of the eight ABO/Rh blood groups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown blood group: {0:?}")]
pub struct ParseBloodGroupError(pub String);

#[derive(Error, Debug)]
pub enum BloodMatchError {
    #[error(transparent)]
    BloodGroup(#[from] ParseBloodGroupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported dataset file: {path}")]
    UnsupportedFormat { path: String },

    #[error("Unrecognized JSON layout in {path}: expected an object or an array of requests, profiles or locations")]
    UnknownJsonLayout { path: String },

    #[error("No dataset file could be parsed ({failed} failed); first error in {path}: {message}")]
    NoDatasetParsed {
        failed: usize,
        path: String,
        message: String,
    },

    #[error("Unrecognized CSV layout in {path}: headers {headers:?}")]
    UnknownCsvLayout { path: String, headers: Vec<String> },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, BloodMatchError>;
