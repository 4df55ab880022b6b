//! Shared command parameters for all CLI commands.
//!
//! This module defines parameter names and the argument builders that more
//! than one command group uses.

use crate::format::OutputFormat;
use clap::{Arg, ArgAction};
use std::path::PathBuf;

// Command groups
pub const COMMAND_CSV: &str = "csv";
pub const COMMAND_TASK: &str = "task";
pub const COMMAND_GRID: &str = "grid";
pub const COMMAND_CERT: &str = "cert";
pub const COMMAND_LOGS: &str = "logs";
pub const COMMAND_SUPPORT_BUNDLE: &str = "support-bundle";
pub const COMMAND_MEMBER_CONFIG: &str = "member-config";
pub const COMMAND_LEASE_HISTORY: &str = "lease-history";
pub const COMMAND_CONFIG: &str = "config";

// CSV commands
pub const COMMAND_IMPORT: &str = "import";
pub const COMMAND_EXPORT: &str = "export";
pub const COMMAND_ERROR_LOG: &str = "error-log";
pub const COMMAND_CHECK: &str = "check";

// Task commands
pub const COMMAND_STATUS: &str = "status";

// Grid commands
pub const COMMAND_BACKUP: &str = "backup";
pub const COMMAND_RESTORE: &str = "restore";

// Certificate commands
pub const COMMAND_GENERATE: &str = "generate";
pub const COMMAND_CSR: &str = "csr";
pub const COMMAND_DOWNLOAD: &str = "download";
pub const COMMAND_UPLOAD: &str = "upload";

// Config commands
pub const COMMAND_GET: &str = "get";
pub const COMMAND_PATH: &str = "path";

// Connection parameters
pub const PARAMETER_VERBOSE: &str = "verbose";
pub const PARAMETER_GRID_MGR: &str = "grid-mgr";
pub const PARAMETER_WAPI_VERSION: &str = "wapi-version";
pub const PARAMETER_USERNAME: &str = "username";
pub const PARAMETER_PASSWORD: &str = "password";
pub const PARAMETER_INSECURE: &str = "insecure";
pub const PARAMETER_TIMEOUT: &str = "timeout";

// Output parameters
pub const PARAMETER_FORMAT: &str = "format";
pub const PARAMETER_PRETTY: &str = "pretty";
pub const PARAMETER_HEADERS: &str = "headers";
pub const PARAMETER_OUTPUT_DIR: &str = "output-dir";
pub const PARAMETER_OUTPUT_FILE: &str = "output-file";

// Operation parameters
pub const PARAMETER_FILE: &str = "file";
pub const PARAMETER_OPERATION: &str = "operation";
pub const PARAMETER_ON_ERROR: &str = "on-error";
pub const PARAMETER_SKIP_CHECK: &str = "skip-check";
pub const PARAMETER_OBJECT: &str = "object";
pub const PARAMETER_IMPORT_ID: &str = "import-id";
pub const PARAMETER_REF: &str = "ref";
pub const PARAMETER_WAIT: &str = "wait";
pub const PARAMETER_POLL_INTERVAL: &str = "poll-interval";
pub const PARAMETER_POLL_TIMEOUT: &str = "poll-timeout";
pub const PARAMETER_BACKUP_TYPE: &str = "type";
pub const PARAMETER_DISCOVERY_DATA: &str = "discovery-data";
pub const PARAMETER_KEEP_LOCAL_COPY: &str = "keep-local-copy";
pub const PARAMETER_NIOS_DATA: &str = "nios-data";
pub const PARAMETER_MODE: &str = "mode";
pub const PARAMETER_KEEP_GRID_IP: &str = "keep-grid-ip";
pub const PARAMETER_MEMBER: &str = "member";
pub const PARAMETER_CN: &str = "cn";
pub const PARAMETER_SANS: &str = "sans";
pub const PARAMETER_ALGORITHM: &str = "algorithm";
pub const PARAMETER_USAGE: &str = "usage";
pub const PARAMETER_KEY_SIZE: &str = "key-size";
pub const PARAMETER_DAYS_VALID: &str = "days-valid";
pub const PARAMETER_COMMENT: &str = "comment";
pub const PARAMETER_COUNTRY: &str = "country";
pub const PARAMETER_EMAIL: &str = "email";
pub const PARAMETER_LOCALITY: &str = "locality";
pub const PARAMETER_ORG: &str = "org";
pub const PARAMETER_ORG_UNIT: &str = "org-unit";
pub const PARAMETER_STATE: &str = "state";
pub const PARAMETER_LOG_TYPE: &str = "log-type";
pub const PARAMETER_NODE_TYPE: &str = "node-type";
pub const PARAMETER_INCLUDE_ROTATED: &str = "include-rotated";
pub const PARAMETER_ENDPOINT: &str = "endpoint";
pub const PARAMETER_MSSERVER: &str = "msserver";
pub const PARAMETER_CACHED_ZONE_DATA: &str = "cached-zone-data";
pub const PARAMETER_CORE_FILES: &str = "core-files";
pub const PARAMETER_LOG_FILES: &str = "log-files";
pub const PARAMETER_NM_SNMP_LOGS: &str = "nm-snmp-logs";
pub const PARAMETER_RECURSIVE_CACHE_FILE: &str = "recursive-cache-file";
pub const PARAMETER_ROTATE_LOG_FILES: &str = "rotate-log-files";
pub const PARAMETER_DATA_TYPE: &str = "data-type";
pub const PARAMETER_START_TIME: &str = "start-time";
pub const PARAMETER_END_TIME: &str = "end-time";
pub const PARAMETER_TERMINATED: &str = "terminated";
pub const PARAMETER_PROPERTY: &str = "property";

pub const DEFAULT_POLL_INTERVAL: &str = "5";
pub const DEFAULT_POLL_TIMEOUT: &str = "600";

/// Connection and output flags shared by every subcommand.
pub fn global_parameters() -> Vec<Arg> {
    vec![
        Arg::new(PARAMETER_VERBOSE)
            .short('v')
            .long(PARAMETER_VERBOSE)
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Enable verbose output for debugging"),
        Arg::new(PARAMETER_GRID_MGR)
            .long(PARAMETER_GRID_MGR)
            .num_args(1)
            .env("WAPICTL_GRID_MGR")
            .global(true)
            .help("Grid manager host name or address (overrides the configuration file)"),
        Arg::new(PARAMETER_WAPI_VERSION)
            .long(PARAMETER_WAPI_VERSION)
            .num_args(1)
            .env("WAPICTL_WAPI_VERSION")
            .global(true)
            .help("WAPI version, e.g. 2.12"),
        Arg::new(PARAMETER_USERNAME)
            .short('u')
            .long(PARAMETER_USERNAME)
            .num_args(1)
            .env("WAPICTL_USERNAME")
            .global(true)
            .help("Grid manager account name"),
        Arg::new(PARAMETER_PASSWORD)
            .short('p')
            .long(PARAMETER_PASSWORD)
            .num_args(1)
            .env("WAPICTL_PASSWORD")
            .hide_env_values(true)
            .global(true)
            .help("Grid manager account password; never stored"),
        Arg::new(PARAMETER_INSECURE)
            .short('k')
            .long(PARAMETER_INSECURE)
            .action(ArgAction::SetTrue)
            .env("WAPICTL_INSECURE")
            .global(true)
            .help("Do not verify the grid manager's TLS certificate"),
        Arg::new(PARAMETER_TIMEOUT)
            .long(PARAMETER_TIMEOUT)
            .num_args(1)
            .env("WAPICTL_TIMEOUT")
            .global(true)
            .value_parser(clap::value_parser!(u64))
            .help("Per-request timeout in seconds (default: wait forever)"),
        format_parameter(),
        format_pretty_parameter(),
        format_with_headers_parameter(),
    ]
}

/// Create the global format parameter.
pub fn format_parameter() -> Arg {
    Arg::new(PARAMETER_FORMAT)
        .short('f')
        .long(PARAMETER_FORMAT)
        .num_args(1)
        .required(false)
        .env("WAPICTL_FORMAT")
        .default_value("json")
        .global(true)
        .help("Output data format")
        .value_parser(OutputFormat::names())
}

pub fn format_pretty_parameter() -> Arg {
    Arg::new(PARAMETER_PRETTY)
        .long(PARAMETER_PRETTY)
        .action(ArgAction::SetTrue)
        .required(false)
        .global(true)
        .help("Format the output pretty")
}

pub fn format_with_headers_parameter() -> Arg {
    Arg::new(PARAMETER_HEADERS)
        .long(PARAMETER_HEADERS)
        .action(ArgAction::SetTrue)
        .required(false)
        .env("WAPICTL_HEADERS")
        .global(true)
        .help("Format the output with headers")
}

/// Local file to upload.
pub fn file_parameter(help: &'static str) -> Arg {
    Arg::new(PARAMETER_FILE)
        .long(PARAMETER_FILE)
        .num_args(1)
        .required(true)
        .help(help)
        .value_parser(clap::value_parser!(PathBuf))
}

pub fn output_dir_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT_DIR)
        .short('o')
        .long(PARAMETER_OUTPUT_DIR)
        .num_args(1)
        .default_value(".")
        .help("Directory to write the downloaded file into")
        .value_parser(clap::value_parser!(PathBuf))
}

pub fn output_file_parameter() -> Arg {
    Arg::new(PARAMETER_OUTPUT_FILE)
        .long(PARAMETER_OUTPUT_FILE)
        .num_args(1)
        .help("File name to save as, instead of the name the server suggests")
}

pub fn member_parameter(required: bool) -> Arg {
    Arg::new(PARAMETER_MEMBER)
        .short('m')
        .long(PARAMETER_MEMBER)
        .num_args(1)
        .required(required)
        .help("Grid member host name")
}

pub fn wait_parameter() -> Arg {
    Arg::new(PARAMETER_WAIT)
        .short('w')
        .long(PARAMETER_WAIT)
        .action(ArgAction::SetTrue)
        .help("Poll the task until it finishes")
}

pub fn poll_interval_parameter() -> Arg {
    Arg::new(PARAMETER_POLL_INTERVAL)
        .long(PARAMETER_POLL_INTERVAL)
        .num_args(1)
        .default_value(DEFAULT_POLL_INTERVAL)
        .requires(PARAMETER_WAIT)
        .value_parser(clap::value_parser!(u64).range(1..))
        .help("Seconds between status polls")
}

pub fn poll_timeout_parameter() -> Arg {
    Arg::new(PARAMETER_POLL_TIMEOUT)
        .long(PARAMETER_POLL_TIMEOUT)
        .num_args(1)
        .default_value(DEFAULT_POLL_TIMEOUT)
        .requires(PARAMETER_WAIT)
        .value_parser(clap::value_parser!(u64))
        .help("Give up waiting after this many seconds")
}

/// A flag that is only sent when given; absent means the server default.
pub fn optional_switch(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help)
}
