use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] spikewire_core::ConfigError),

    #[error(transparent)]
    Validation(#[from] spikewire_core::ValidationError),

    #[error(transparent)]
    Report(#[from] spikewire_core::ReportError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Validation(_) => 2,
            Self::Serialization(_) => 4,
            Self::Report(spikewire_core::ReportError::Serialize(_)) => 4,
            Self::Report(spikewire_core::ReportError::Io { .. }) => 10,
            Self::Io(_) => 10,
        }
    }
}
