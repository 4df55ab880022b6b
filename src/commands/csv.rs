//! CSV job command definitions.

use crate::commands::params::{
    file_parameter, output_dir_parameter, output_file_parameter, poll_interval_parameter,
    poll_timeout_parameter, wait_parameter, COMMAND_CHECK, COMMAND_CSV, COMMAND_ERROR_LOG,
    COMMAND_EXPORT, COMMAND_IMPORT, PARAMETER_IMPORT_ID, PARAMETER_OBJECT, PARAMETER_ON_ERROR,
    PARAMETER_OPERATION, PARAMETER_SKIP_CHECK,
};
use crate::fileop::submit::{CsvOperation, OnError};
use clap::{Arg, ArgAction, Command};
use std::str::FromStr;

/// Create the csv command with all its subcommands.
pub fn csv_command() -> Command {
    Command::new(COMMAND_CSV)
        .about("Bulk CSV import and export")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_IMPORT)
                .about("Upload a CSV file and start an import task")
                .arg(file_parameter("CSV file to import"))
                .arg(
                    Arg::new(PARAMETER_OPERATION)
                        .long(PARAMETER_OPERATION)
                        .num_args(1)
                        .default_value("INSERT")
                        .value_parser(CsvOperation::from_str)
                        .help("INSERT, UPDATE, DELETE, REPLACE, MERGE, OVERRIDE or CUSTOM"),
                )
                .arg(
                    Arg::new(PARAMETER_ON_ERROR)
                        .long(PARAMETER_ON_ERROR)
                        .num_args(1)
                        .default_value("STOP")
                        .value_parser(OnError::from_str)
                        .help("STOP or CONTINUE when a row fails"),
                )
                .arg(
                    Arg::new(PARAMETER_SKIP_CHECK)
                        .long(PARAMETER_SKIP_CHECK)
                        .action(ArgAction::SetTrue)
                        .help("Upload without checking the file's header rows locally"),
                )
                .arg(wait_parameter())
                .arg(poll_interval_parameter())
                .arg(poll_timeout_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_EXPORT)
                .about("Export all objects of one type to a CSV file")
                .arg(
                    Arg::new(PARAMETER_OBJECT)
                        .long(PARAMETER_OBJECT)
                        .num_args(1)
                        .required(true)
                        .help("Object type to export, e.g. record:a or network"),
                )
                .arg(output_dir_parameter())
                .arg(output_file_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_ERROR_LOG)
                .about("Download the error log of a finished import")
                .arg(
                    Arg::new(PARAMETER_IMPORT_ID)
                        .long(PARAMETER_IMPORT_ID)
                        .num_args(1)
                        .required(true)
                        .help("Import id reported by the task status"),
                )
                .arg(output_dir_parameter())
                .arg(output_file_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_CHECK)
                .about("Check an import file's header rows and import-action values locally")
                .arg(file_parameter("CSV file to check")),
        )
}
