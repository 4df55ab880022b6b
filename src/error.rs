use std::path::PathBuf;

use thiserror::Error;

use crate::{exit_codes::WapictlExitCode, transport::TransportError};

/// Failure detected locally, before any request is sent.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("file not found: {0:?}")]
    FileNotFound(PathBuf),
    #[error("not a regular file: {0:?}")]
    NotAFile(PathBuf),
    #[error("malformed subject alternative name {0:?}, expected TYPE/VALUE")]
    MalformedSan(String),
    #[error("unsupported subject alternative name type {0:?}, expected one of DNS, IP, URI, EMAIL")]
    UnknownSanType(String),
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid value {value:?} for {field}")]
    InvalidValue { field: String, value: String },
}

/// Error returned by every network-facing operation of the client.
///
/// The variant text carries the added context only; the underlying cause is
/// reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum WapiError {
    #[error("request to {short_path} failed after {attempts} attempt(s)")]
    Request {
        short_path: String,
        attempts: u32,
        #[source]
        source: TransportError,
    },
    #[error("failed to decode response from {short_path}")]
    Decode {
        short_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("I/O error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("operation cancelled")]
    Cancelled,
}

impl WapiError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WapiError::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status of the underlying server response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            WapiError::Request { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Error types that can occur during CLI command execution
#[derive(Debug, Error)]
pub enum CliError {
    /// Error when an unsupported or undefined subcommand is encountered
    #[error("Undefined or unsupported subcommand: {0}")]
    UnsupportedSubcommand(String),
    /// Error related to configuration loading or management
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] crate::configuration::ConfigurationError),
    /// Error related to data formatting
    #[error("Formatting error: {0}")]
    FormattingError(#[from] crate::format::FormattingError),
    /// Error when a required command-line argument is missing
    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),
    #[error("API error: {0}")]
    WapiError(#[from] WapiError),
    /// A polled task did not reach a terminal state in time
    #[error("Task {task_ref} did not finish within {seconds}s (last status {status})")]
    PollTimeout {
        task_ref: String,
        seconds: u64,
        status: String,
    },
    /// A polled task finished in a failed state
    #[error("Task {task_ref} finished with status {status}")]
    TaskFailed { task_ref: String, status: String },
    #[error("{0}")]
    ActionError(#[from] crate::actions::CliActionError),
}

impl CliError {
    /// Get the appropriate exit code for this error
    ///
    /// - `UsageError` for unsupported commands, missing arguments and local precondition failures
    /// - `ConfigError` for configuration errors
    /// - `DataError` for formatting errors
    /// - `AuthError` for 401/403 responses
    /// - `NetworkError` for requests that never got a response
    /// - `ApiError` for any other server-side failure
    pub fn exit_code(&self) -> WapictlExitCode {
        match self {
            CliError::UnsupportedSubcommand(_) => WapictlExitCode::UsageError,
            CliError::MissingRequiredArgument(_) => WapictlExitCode::UsageError,
            CliError::ConfigurationError(_) => WapictlExitCode::ConfigError,
            CliError::FormattingError(_) => WapictlExitCode::DataError,
            CliError::PollTimeout { .. } => WapictlExitCode::TempFail,
            CliError::TaskFailed { .. } => WapictlExitCode::ApiError,
            CliError::ActionError(e) => e.exit_code(),
            CliError::WapiError(e) => wapi_exit_code(e),
        }
    }
}

pub(crate) fn wapi_exit_code(e: &WapiError) -> WapictlExitCode {
    match e {
        WapiError::Precondition(PreconditionError::FileNotFound(_)) => WapictlExitCode::NoInput,
        WapiError::Precondition(_) => WapictlExitCode::UsageError,
        WapiError::Io { .. } => WapictlExitCode::OSError,
        WapiError::Cancelled => WapictlExitCode::TempFail,
        WapiError::Decode { .. } => WapictlExitCode::DataError,
        WapiError::Request { source, .. } => match source.status() {
            Some(401) | Some(403) => WapictlExitCode::AuthError,
            Some(404) => WapictlExitCode::NotFound,
            Some(_) => WapictlExitCode::ApiError,
            None => WapictlExitCode::NetworkError,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_request_error_keeps_cause() {
        let e = WapiError::Request {
            short_path: "fileop".to_string(),
            attempts: 3,
            source: TransportError::Status {
                status: 503,
                body: "busy".to_string(),
            },
        };
        assert_eq!(e.to_string(), "request to fileop failed after 3 attempt(s)");
        assert_eq!(e.status(), Some(503));
        let cause = e.source().unwrap().to_string();
        assert!(cause.contains("503"));
        assert!(cause.contains("busy"));
    }

    #[test]
    fn test_exit_codes() {
        let auth: CliError = WapiError::Request {
            short_path: "fileop".to_string(),
            attempts: 1,
            source: TransportError::Status {
                status: 401,
                body: String::new(),
            },
        }
        .into();
        assert_eq!(auth.exit_code(), WapictlExitCode::AuthError);

        let network: CliError = WapiError::Request {
            short_path: "fileop".to_string(),
            attempts: 3,
            source: TransportError::Connect("refused".to_string()),
        }
        .into();
        assert_eq!(network.exit_code(), WapictlExitCode::NetworkError);

        let missing: CliError =
            WapiError::from(PreconditionError::FileNotFound(PathBuf::from("x.csv"))).into();
        assert_eq!(missing.exit_code(), WapictlExitCode::NoInput);
    }
}
