use tracing_subscriber::EnvFilter;
use wapictl::{
    cli::execute_command,
    commands::{create_cli_commands, PARAMETER_VERBOSE},
    configuration::Configuration,
    error::CliError,
    error_utils::{report_error, user_hint},
};

/// Main entry point for the program
#[tokio::main]
async fn main() {
    let commands = create_cli_commands();

    // Intialize the logging subsystem; -v wins over RUST_LOG
    let filter = if commands.get_flag(PARAMETER_VERBOSE) {
        EnvFilter::new("wapictl=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match Configuration::load_or_default() {
        Ok(configuration) => execute_command(&configuration, &commands).await,
        Err(e) => Err(CliError::from(e)),
    };

    if let Err(e) = result {
        report_error(&e);
        if let CliError::WapiError(wapi_error) = &e {
            if let Some(hint) = user_hint(wapi_error.status()) {
                eprintln!("{}", hint);
            }
        }
        ::std::process::exit(e.exit_code().into());
    }
}
