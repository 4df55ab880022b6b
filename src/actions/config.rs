use clap::ArgMatches;
use tracing::trace;

use crate::{
    actions::{utils::print_formatted, CliActionError},
    commands::params::PARAMETER_PROPERTY,
    configuration::Configuration,
};

pub fn print_configuration(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    trace!("Executing \"config get\" command...");
    match sub_matches.get_one::<String>(PARAMETER_PROPERTY) {
        Some(name) => {
            println!("{}", configuration.property(name).unwrap_or_default());
            Ok(())
        }
        None => print_formatted(configuration, sub_matches),
    }
}

pub fn print_configuration_path() -> Result<(), CliActionError> {
    trace!("Executing \"config path\" command...");
    let path = Configuration::get_default_configuration_file_path()?;
    println!("{}", path.display());
    Ok(())
}
