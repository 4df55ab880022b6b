//! Grid backup and restore command definitions.

use crate::commands::params::{
    file_parameter, optional_switch, output_dir_parameter, output_file_parameter,
    COMMAND_BACKUP, COMMAND_GRID, COMMAND_RESTORE, PARAMETER_BACKUP_TYPE,
    PARAMETER_DISCOVERY_DATA, PARAMETER_KEEP_GRID_IP, PARAMETER_KEEP_LOCAL_COPY, PARAMETER_MODE,
    PARAMETER_NIOS_DATA,
};
use crate::fileop::submit::{BackupType, RestoreMode};
use clap::{Arg, ArgAction, Command};
use std::str::FromStr;

/// Create the grid command with all its subcommands.
pub fn grid_command() -> Command {
    Command::new(COMMAND_GRID)
        .about("Grid database backup and restore")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_BACKUP)
                .about("Create a grid backup and download it")
                .arg(
                    Arg::new(PARAMETER_BACKUP_TYPE)
                        .long(PARAMETER_BACKUP_TYPE)
                        .num_args(1)
                        .default_value("BACKUP")
                        .value_parser(BackupType::from_str)
                        .help("BACKUP, NIOS or DISCOVERY"),
                )
                .arg(optional_switch(
                    PARAMETER_DISCOVERY_DATA,
                    "Include network discovery data",
                ))
                .arg(optional_switch(
                    PARAMETER_KEEP_LOCAL_COPY,
                    "Keep a copy of the backup on the grid master",
                ))
                .arg(optional_switch(PARAMETER_NIOS_DATA, "Include NIOS data"))
                .arg(output_dir_parameter())
                .arg(output_file_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_RESTORE)
                .about("Upload a backup file and restore the grid database from it")
                .arg(file_parameter("Backup file to restore"))
                .arg(
                    Arg::new(PARAMETER_MODE)
                        .long(PARAMETER_MODE)
                        .num_args(1)
                        .default_value("NORMAL")
                        .value_parser(RestoreMode::from_str)
                        .help("NORMAL, FORCED or CLONE"),
                )
                .arg(
                    Arg::new(PARAMETER_KEEP_GRID_IP)
                        .long(PARAMETER_KEEP_GRID_IP)
                        .action(ArgAction::SetTrue)
                        .help("Keep the current grid master address"),
                ),
        )
}
