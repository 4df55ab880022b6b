//! Task command definitions.

use crate::commands::params::{
    poll_interval_parameter, poll_timeout_parameter, wait_parameter, COMMAND_STATUS,
    COMMAND_TASK, PARAMETER_REF,
};
use clap::{Arg, Command};

/// Create the task command with all its subcommands.
pub fn task_command() -> Command {
    Command::new(COMMAND_TASK)
        .about("Long-running server task status")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_STATUS)
                .about("Show the status of a CSV import task")
                .arg(
                    Arg::new(PARAMETER_REF)
                        .long(PARAMETER_REF)
                        .num_args(1)
                        .required(true)
                        .help("Task reference returned by 'csv import', e.g. csvimporttask/ZG5z...:1"),
                )
                .arg(wait_parameter())
                .arg(poll_interval_parameter())
                .arg(poll_timeout_parameter()),
        )
}
