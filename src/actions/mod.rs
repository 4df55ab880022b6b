use thiserror::Error;

use crate::exit_codes::WapictlExitCode;

pub mod certs;
pub mod config;
pub mod csv;
pub mod diagnostics;
pub mod grid;
pub mod tasks;
pub mod utils;

#[derive(Debug, Error)]
pub enum CliActionError {
    #[error("{0}")]
    ConfigurationError(#[from] crate::configuration::ConfigurationError),

    #[error("{0}")]
    FormattingError(#[from] crate::format::FormattingError),

    #[error("{0}")]
    ModelError(#[from] crate::model::ModelError),

    #[error("failed to set up the HTTP client: {0}")]
    TransportError(#[from] crate::transport::TransportError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),
}

impl CliActionError {
    pub fn exit_code(&self) -> WapictlExitCode {
        match self {
            CliActionError::ConfigurationError(_) => WapictlExitCode::ConfigError,
            CliActionError::FormattingError(_) => WapictlExitCode::DataError,
            CliActionError::ModelError(crate::model::ModelError::CsvError(e)) if e.is_io_error() => {
                WapictlExitCode::NoInput
            }
            CliActionError::ModelError(_) => WapictlExitCode::DataError,
            CliActionError::TransportError(_) => WapictlExitCode::ConfigError,
            CliActionError::IoError(_) => WapictlExitCode::OSError,
            CliActionError::MissingRequiredArgument(_) => WapictlExitCode::UsageError,
        }
    }
}
