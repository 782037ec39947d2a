use thiserror::Error;

/// Errors raised by core domain parsing and configuration loading.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid institution type: {0}")]
    InvalidInstitutionType(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Why a [`SyncConfig`](crate::SyncConfig) was rejected at startup.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { var, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
