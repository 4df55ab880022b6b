//! Dispatch of parsed command-line arguments to actions.

use clap::ArgMatches;

use crate::{
    actions::{certs, config, csv, diagnostics, grid, tasks},
    commands::{
        COMMAND_BACKUP, COMMAND_CERT, COMMAND_CHECK, COMMAND_CONFIG, COMMAND_CSR, COMMAND_CSV,
        COMMAND_DOWNLOAD, COMMAND_ERROR_LOG, COMMAND_EXPORT, COMMAND_GENERATE, COMMAND_GET,
        COMMAND_GRID, COMMAND_IMPORT, COMMAND_LEASE_HISTORY, COMMAND_LOGS, COMMAND_MEMBER_CONFIG,
        COMMAND_PATH, COMMAND_RESTORE, COMMAND_STATUS, COMMAND_SUPPORT_BUNDLE, COMMAND_TASK,
        COMMAND_UPLOAD,
    },
    configuration::Configuration,
    error::CliError,
};

fn extract_subcommand_name(sub_matches: &ArgMatches) -> String {
    let message = match sub_matches.subcommand() {
        Some(m) => m.0,
        None => "unknown",
    };

    message.to_string()
}

pub async fn execute_command(
    configuration: &Configuration,
    commands: &ArgMatches,
) -> Result<(), CliError> {
    match commands.subcommand() {
        Some((COMMAND_CSV, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_IMPORT, sub_matches)) => csv::import(configuration, sub_matches).await,
            Some((COMMAND_EXPORT, sub_matches)) => csv::export(configuration, sub_matches).await,
            Some((COMMAND_ERROR_LOG, sub_matches)) => {
                csv::error_log(configuration, sub_matches).await
            }
            Some((COMMAND_CHECK, sub_matches)) => csv::check(sub_matches),
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
        },
        Some((COMMAND_TASK, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_STATUS, sub_matches)) => tasks::status(configuration, sub_matches).await,
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
        },
        Some((COMMAND_GRID, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_BACKUP, sub_matches)) => grid::backup(configuration, sub_matches).await,
            Some((COMMAND_RESTORE, sub_matches)) => {
                grid::restore(configuration, sub_matches).await
            }
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
        },
        Some((COMMAND_CERT, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_GENERATE, sub_matches)) => {
                certs::generate(configuration, sub_matches).await
            }
            Some((COMMAND_CSR, sub_matches)) => certs::csr(configuration, sub_matches).await,
            Some((COMMAND_DOWNLOAD, sub_matches)) => {
                certs::download(configuration, sub_matches).await
            }
            Some((COMMAND_UPLOAD, sub_matches)) => certs::upload(configuration, sub_matches).await,
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
        },
        Some((COMMAND_LOGS, sub_matches)) => diagnostics::logs(configuration, sub_matches).await,
        Some((COMMAND_SUPPORT_BUNDLE, sub_matches)) => {
            diagnostics::support_bundle(configuration, sub_matches).await
        }
        Some((COMMAND_MEMBER_CONFIG, sub_matches)) => {
            diagnostics::member_config(configuration, sub_matches).await
        }
        Some((COMMAND_LEASE_HISTORY, sub_matches)) => {
            diagnostics::lease_history(configuration, sub_matches).await
        }
        Some((COMMAND_CONFIG, sub_matches)) => match sub_matches.subcommand() {
            Some((COMMAND_GET, sub_matches)) => {
                Ok(config::print_configuration(configuration, sub_matches)?)
            }
            Some((COMMAND_PATH, _)) => Ok(config::print_configuration_path()?),
            _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
                sub_matches,
            ))),
        },
        _ => Err(CliError::UnsupportedSubcommand(extract_subcommand_name(
            commands,
        ))),
    }
}
