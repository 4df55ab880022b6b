//! Configuration command definitions.
//!
//! This module defines CLI commands related to configuration management.

use crate::commands::params::{COMMAND_CONFIG, COMMAND_GET, COMMAND_PATH, PARAMETER_PROPERTY};
use crate::configuration::Configuration;
use clap::{Arg, Command};

/// Create the config command with all its subcommands.
pub fn config_command() -> Command {
    Command::new(COMMAND_CONFIG)
        .about("Configuration management")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_GET)
                .about("Get configuration details")
                .arg(
                    Arg::new(PARAMETER_PROPERTY)
                        .num_args(1)
                        .value_parser(Configuration::property_names())
                        .help("Print only this property"),
                ),
        )
        .subcommand(Command::new(COMMAND_PATH).about("Show configuration file path"))
}
