use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickerdash_core::ValidationError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

impl From<tickerdash_core::CoreError> for CliError {
    fn from(error: tickerdash_core::CoreError) -> Self {
        match error {
            tickerdash_core::CoreError::Validation(error) => Self::Validation(error),
            tickerdash_core::CoreError::Serialization(error) => Self::Serialization(error),
        }
    }
}

/// Exit code of a `snapshot` whose data could not be fetched.
pub const DATA_UNAVAILABLE_EXIT: u8 = 3;
