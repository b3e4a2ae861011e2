//! Domain error types.

/// Reasons a price or signal series cannot be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("series is empty")]
    EmptySeries,

    #[error("timestamps are not strictly increasing at index {index}")]
    NonMonotonic { index: usize },

    #[error("every close price is missing or non-numeric")]
    NoPrices,
}

/// Top-level error type for macross.
#[derive(Debug, thiserror::Error)]
pub enum MacrossError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid data: {0}")]
    Data(#[from] DataError),

    #[error("precondition failed: {reason}")]
    Precondition { reason: String },

    #[error("market data error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MacrossError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        MacrossError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        MacrossError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// True for the configuration family of errors.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            MacrossError::ConfigParse { .. }
                | MacrossError::ConfigMissing { .. }
                | MacrossError::ConfigInvalid { .. }
        )
    }
}

impl From<&MacrossError> for std::process::ExitCode {
    fn from(err: &MacrossError) -> Self {
        let code: u8 = match err {
            MacrossError::Io(_) => 1,
            MacrossError::ConfigParse { .. }
            | MacrossError::ConfigMissing { .. }
            | MacrossError::ConfigInvalid { .. } => 2,
            MacrossError::DataSource { .. } => 3,
            MacrossError::Data(_) => 5,
            MacrossError::Precondition { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
