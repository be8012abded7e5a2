use std::path::PathBuf;

use thiserror::Error;

use super::model::Country;

/// Why the dataset could not be built. Every variant is fatal to `load`;
/// no partial dataset is returned alongside it.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cleaned data file not found for {country} at {}", path.display())]
    MissingFile { country: Country, path: PathBuf },

    #[error("{}: missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: row {row}, column '{column}': {message}", path.display())]
    Parse {
        path: PathBuf,
        /// 1-based data row (the header is not counted).
        row: usize,
        column: String,
        message: String,
    },

    #[error("reading {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl LoadError {
    /// The country whose file was missing, if that is what went wrong.
    pub fn missing_country(&self) -> Option<&Country> {
        match self {
            LoadError::MissingFile { country, .. } => Some(country),
            _ => None,
        }
    }
}

/// A metric name outside the supported set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown metric '{0}' (expected one of GHI, DNI, DHI, Tamb, RH, WS, BP)")]
pub struct UnknownMetric(pub String);
