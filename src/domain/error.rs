//! Domain error types.

/// Top-level error type for stockview.
#[derive(Debug, thiserror::Error)]
pub enum StockviewError {
    #[error("symbol not found: {symbol}")]
    NotFound { symbol: String },

    #[error("upstream error for {symbol}: {reason}")]
    Upstream { symbol: String, reason: String },

    #[error("upstream timed out for {symbol}")]
    Timeout { symbol: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("cache unavailable: {reason}")]
    CacheUnavailable { reason: String },

    #[error("chart render failed: {reason}")]
    Render { reason: String },

    #[error("invalid config value {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockviewError {
    pub fn data(reason: impl Into<String>) -> Self {
        StockviewError::Data {
            reason: reason.into(),
        }
    }

    pub fn cache(reason: impl Into<String>) -> Self {
        StockviewError::CacheUnavailable {
            reason: reason.into(),
        }
    }

    /// True for failures that the service reports to callers as "not found".
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            StockviewError::NotFound { .. }
                | StockviewError::Upstream { .. }
                | StockviewError::Timeout { .. }
        )
    }
}

impl From<&StockviewError> for std::process::ExitCode {
    fn from(err: &StockviewError) -> Self {
        let code: u8 = match err {
            StockviewError::Io(_) | StockviewError::Render { .. } => 1,
            StockviewError::ConfigInvalid { .. } => 2,
            StockviewError::CacheUnavailable { .. } => 3,
            StockviewError::NotFound { .. } => 4,
            StockviewError::Data { .. } => 5,
            StockviewError::Upstream { .. } | StockviewError::Timeout { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
