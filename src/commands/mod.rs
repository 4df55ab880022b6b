//! CLI command definitions and argument parsing.
//!
//! This module defines all the CLI commands and their arguments using the clap
//! builder API, one file per command group.

use clap::{ArgMatches, Command};

pub mod cert;
pub mod config;
pub mod csv;
pub mod diagnostics;
pub mod grid;
pub mod params;
pub mod task;

pub use params::{
    COMMAND_BACKUP, COMMAND_CERT, COMMAND_CHECK, COMMAND_CONFIG, COMMAND_CSR, COMMAND_CSV,
    COMMAND_DOWNLOAD, COMMAND_ERROR_LOG, COMMAND_EXPORT, COMMAND_GENERATE, COMMAND_GET,
    COMMAND_GRID, COMMAND_IMPORT, COMMAND_LEASE_HISTORY, COMMAND_LOGS, COMMAND_MEMBER_CONFIG,
    COMMAND_PATH, COMMAND_RESTORE, COMMAND_STATUS, COMMAND_SUPPORT_BUNDLE, COMMAND_TASK,
    COMMAND_UPLOAD, PARAMETER_VERBOSE,
};

/// The complete command tree, without parsing anything.
pub fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args(params::global_parameters())
        .subcommand(csv::csv_command())
        .subcommand(task::task_command())
        .subcommand(grid::grid_command())
        .subcommand(cert::cert_command())
        .subcommand(diagnostics::logs_command())
        .subcommand(diagnostics::support_bundle_command())
        .subcommand(diagnostics::member_config_command())
        .subcommand(diagnostics::lease_history_command())
        .subcommand(config::config_command())
}

/// Parse the process arguments, exiting with usage help on error.
pub fn create_cli_commands() -> ArgMatches {
    cli().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileop::submit::{CsvOperation, OnError};
    use std::path::PathBuf;

    #[test]
    fn test_command_tree_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_csv_import_arguments() {
        let matches = cli()
            .try_get_matches_from([
                "wapictl",
                "--grid-mgr",
                "gm.example.com",
                "csv",
                "import",
                "--file",
                "hosts.csv",
                "--operation",
                "merge",
                "--wait",
            ])
            .unwrap();
        let (name, csv) = matches.subcommand().unwrap();
        assert_eq!(name, COMMAND_CSV);
        let (name, import) = csv.subcommand().unwrap();
        assert_eq!(name, COMMAND_IMPORT);
        assert_eq!(
            import.get_one::<PathBuf>(params::PARAMETER_FILE),
            Some(&PathBuf::from("hosts.csv"))
        );
        assert_eq!(
            import.get_one::<CsvOperation>(params::PARAMETER_OPERATION),
            Some(&CsvOperation::Merge)
        );
        assert_eq!(
            import.get_one::<OnError>(params::PARAMETER_ON_ERROR),
            Some(&OnError::Stop)
        );
        assert_eq!(import.get_one::<u64>(params::PARAMETER_POLL_INTERVAL), Some(&5));
        assert_eq!(
            import.get_one::<String>(params::PARAMETER_GRID_MGR).map(String::as_str),
            Some("gm.example.com")
        );
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let result = cli().try_get_matches_from([
            "wapictl", "csv", "import", "--file", "hosts.csv", "--operation", "UPSERT",
        ]);
        assert!(result.is_err());
    }
}
