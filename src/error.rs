use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelterError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Missing file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] calamine::Error),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("InvalidData: {0}")]
    InvalidData(String),
}

impl ShelterError {
    /// True when the error means "the file simply isn't there" - the
    /// condition load_all downgrades to a warning for optional sources.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, ShelterError::MissingFile(_))
    }
}

#[cfg(feature = "python")]
impl From<ShelterError> for pyo3::PyErr {
    fn from(err: ShelterError) -> pyo3::PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}
