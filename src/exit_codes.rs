//! Process exit codes for wapictl.
//!
//! Scripts driving backups or CSV imports from cron need to tell a bad
//! argument apart from an unreachable grid manager, so every failure maps
//! to a distinct code.

/// Exit codes
///
/// These follow the BSD sysexits.h conventions where possible:
/// - 0: Success
/// - 64-78: Standard exit codes from sysexits.h
/// - 100+: Application-specific codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WapictlExitCode {
    /// Success (0) - Command completed successfully
    Success = exitcode::OK as isize,

    /// Command line usage error (64) - Bad argument or local precondition
    UsageError = exitcode::USAGE as isize,

    /// Data format error (65) - Response or output could not be (de)serialized
    DataError = exitcode::DATAERR as isize,

    /// Cannot open input file (66) - Upload source missing
    NoInput = exitcode::NOINPUT as isize,

    /// Addressee unknown (67) - Object or task reference not found
    NotFound = exitcode::NOUSER as isize,

    /// Temporary failure (75) - Poll timeout or cancellation, retry later
    TempFail = exitcode::TEMPFAIL as isize,

    /// Internal software error (70) - Unexpected application error
    SoftwareError = exitcode::SOFTWARE as isize,

    /// System error (71) - Local file could not be read or written
    OSError = exitcode::OSERR as isize,

    /// Configuration error (78) - Application configuration issue
    ConfigError = exitcode::CONFIG as isize,

    /// Authentication error (100) - Rejected credentials
    AuthError = 100,

    /// Network error (101) - No response from the grid manager
    NetworkError = 101,

    /// API error (102) - Grid manager returned an error
    ApiError = 102,
}

impl WapictlExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Get descriptive message for the exit code
    pub fn message(&self) -> &'static str {
        match self {
            WapictlExitCode::Success => "Success",
            WapictlExitCode::UsageError => "Command line usage error",
            WapictlExitCode::DataError => "Data format error",
            WapictlExitCode::NoInput => "Cannot open input file",
            WapictlExitCode::NotFound => "Resource not found",
            WapictlExitCode::TempFail => "Temporary failure",
            WapictlExitCode::SoftwareError => "Internal software error",
            WapictlExitCode::OSError => "Operating system error",
            WapictlExitCode::ConfigError => "Configuration error",
            WapictlExitCode::AuthError => "Authentication error",
            WapictlExitCode::NetworkError => "Network communication error",
            WapictlExitCode::ApiError => "Remote API error",
        }
    }
}

impl From<WapictlExitCode> for i32 {
    fn from(code: WapictlExitCode) -> Self {
        code.code()
    }
}
