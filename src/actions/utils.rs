//! Helpers shared by all actions: connection settings, output formatting,
//! download targets and the task wait loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::{
    actions::CliActionError,
    client::{DownloadTarget, WapiClient},
    commands::params::{
        PARAMETER_FORMAT, PARAMETER_GRID_MGR, PARAMETER_HEADERS, PARAMETER_INSECURE,
        PARAMETER_OUTPUT_DIR, PARAMETER_OUTPUT_FILE, PARAMETER_PASSWORD,
        PARAMETER_POLL_INTERVAL, PARAMETER_POLL_TIMEOUT, PARAMETER_PRETTY, PARAMETER_TIMEOUT,
        PARAMETER_USERNAME, PARAMETER_WAPI_VERSION,
    },
    configuration::Configuration,
    error::{CliError, WapiError},
    fileop::{poll::CsvImportTask, TaskReference},
    format::{Formattable, OutputFormat, OutputFormatOptions},
    http_utils::{HttpRequestConfig, HttpTransport},
    retry::RetryPolicy,
};

/// Merge command-line flags over the configuration file.
pub fn http_config(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<HttpRequestConfig, CliActionError> {
    let grid_mgr = match sub_matches.get_one::<String>(PARAMETER_GRID_MGR) {
        Some(grid_mgr) => grid_mgr.clone(),
        None => configuration.require_grid_mgr()?.to_string(),
    };
    let username = sub_matches
        .get_one::<String>(PARAMETER_USERNAME)
        .cloned()
        .or_else(|| configuration.username.clone())
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_USERNAME.to_string()))?;
    let password = sub_matches
        .get_one::<String>(PARAMETER_PASSWORD)
        .cloned()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(PARAMETER_PASSWORD.to_string()))?;
    let wapi_version = sub_matches
        .get_one::<String>(PARAMETER_WAPI_VERSION)
        .cloned()
        .unwrap_or_else(|| configuration.wapi_version.clone());
    let ssl_verify = configuration.ssl_verify && !sub_matches.get_flag(PARAMETER_INSECURE);
    let timeout = sub_matches
        .get_one::<u64>(PARAMETER_TIMEOUT)
        .copied()
        .or(configuration.timeout);

    Ok(HttpRequestConfig {
        grid_mgr,
        wapi_version,
        username,
        password,
        ssl_verify,
        timeout,
        ..Default::default()
    })
}

/// Build a client for the grid manager named by flags or configuration.
///
/// Ctrl-C cancels the client's operations; partial downloads are removed.
pub fn connect(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<WapiClient, CliActionError> {
    let config = http_config(configuration, sub_matches)?;
    debug!("Connecting to {}", config.base_url());
    let transport = HttpTransport::new(config)?;
    let client = WapiClient::with_policy(
        Arc::new(transport),
        RetryPolicy::new(configuration.retry.clone()),
        configuration.chunk_size,
    );

    let cancel = client.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling");
            cancel.cancel();
        }
    });

    Ok(client)
}

pub fn output_format(sub_matches: &ArgMatches) -> Result<OutputFormat, CliActionError> {
    let format_str = sub_matches
        .get_one::<String>(PARAMETER_FORMAT)
        .cloned()
        .unwrap_or_else(|| "json".to_string());
    let options = OutputFormatOptions {
        with_headers: sub_matches.get_flag(PARAMETER_HEADERS),
        pretty: sub_matches.get_flag(PARAMETER_PRETTY),
    };
    Ok(OutputFormat::from_string_with_options(&format_str, options)?)
}

pub fn print_formatted<T: Formattable>(
    value: &T,
    sub_matches: &ArgMatches,
) -> Result<(), CliActionError> {
    let format = output_format(sub_matches)?;
    println!("{}", value.format(&format)?.trim_end());
    Ok(())
}

pub fn download_target(sub_matches: &ArgMatches) -> DownloadTarget {
    let dir = sub_matches
        .get_one::<PathBuf>(PARAMETER_OUTPUT_DIR)
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    match sub_matches.get_one::<String>(PARAMETER_OUTPUT_FILE) {
        Some(filename) => DownloadTarget::named(dir, filename.clone()),
        None => DownloadTarget::new(dir),
    }
}

/// Value of a string argument that clap already enforces as required.
pub fn required_string(sub_matches: &ArgMatches, name: &str) -> Result<String, CliActionError> {
    sub_matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(name.to_string()))
}

pub fn required_path(sub_matches: &ArgMatches, name: &str) -> Result<PathBuf, CliActionError> {
    sub_matches
        .get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| CliActionError::MissingRequiredArgument(name.to_string()))
}

/// Cadence of the `--wait` loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn from_matches(sub_matches: &ArgMatches) -> Self {
        let interval = sub_matches
            .get_one::<u64>(PARAMETER_POLL_INTERVAL)
            .copied()
            .unwrap_or(5);
        let timeout = sub_matches
            .get_one::<u64>(PARAMETER_POLL_TIMEOUT)
            .copied()
            .unwrap_or(600);
        Self {
            interval: Duration::from_secs(interval),
            timeout: Duration::from_secs(timeout),
        }
    }
}

/// Poll until the task reaches a terminal state or the timeout expires.
pub async fn wait_for_task(
    client: &WapiClient,
    task: &TaskReference,
    settings: PollSettings,
) -> Result<CsvImportTask, CliError> {
    trace!("Waiting for {}", task.reference());
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.enable_steady_tick(Duration::from_millis(120));

    let deadline = Instant::now() + settings.timeout;
    let cancel = client.cancel_token();
    loop {
        let status = match client.csv_task_status(task).await {
            Ok(status) => status,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e.into());
            }
        };
        spinner.set_message(format!(
            "{} {} ({} lines processed)",
            task.reference(),
            status.status,
            status.lines_processed.unwrap_or_default()
        ));
        if status.status.is_terminal() {
            spinner.finish_and_clear();
            return Ok(status);
        }
        if Instant::now() + settings.interval > deadline {
            spinner.finish_and_clear();
            return Err(CliError::PollTimeout {
                task_ref: task.reference().to_string(),
                seconds: settings.timeout.as_secs(),
                status: status.status.to_string(),
            });
        }
        tokio::select! {
            _ = tokio::time::sleep(settings.interval) => {}
            _ = cancel.cancelled() => {
                spinner.finish_and_clear();
                return Err(WapiError::Cancelled.into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cli;
    use crate::fileop::testing::MockTransport;
    use serde_json::json;

    fn matches_for(args: &[&str]) -> ArgMatches {
        let matches = cli().try_get_matches_from(args.iter().copied()).unwrap();
        let (_, group) = matches.subcommand().unwrap();
        match group.subcommand() {
            Some((_, leaf)) => leaf.clone(),
            None => group.clone(),
        }
    }

    #[test]
    fn test_flags_override_configuration() {
        let configuration = Configuration {
            grid_mgr: Some("from-file".to_string()),
            username: Some("file-user".to_string()),
            timeout: Some(30),
            ..Default::default()
        };
        let sub_matches = matches_for(&[
            "wapictl", "--grid-mgr", "10.0.0.1", "--password", "pw", "-k", "task", "status",
            "--ref", "csvimporttask/x:1",
        ]);
        let config = http_config(&configuration, &sub_matches).unwrap();
        assert_eq!(config.grid_mgr, "10.0.0.1");
        assert_eq!(config.username, "file-user");
        assert_eq!(config.password, "pw");
        assert!(!config.ssl_verify);
        assert_eq!(config.timeout, Some(30));
    }

    #[test]
    fn test_missing_password_is_reported() {
        let configuration = Configuration {
            grid_mgr: Some("gm".to_string()),
            username: Some("admin".to_string()),
            ..Default::default()
        };
        let sub_matches = matches_for(&["wapictl", "task", "status", "--ref", "x"]);
        if std::env::var("WAPICTL_PASSWORD").is_err() {
            assert!(matches!(
                http_config(&configuration, &sub_matches),
                Err(CliActionError::MissingRequiredArgument(name)) if name == "password"
            ));
        }
    }

    #[test]
    fn test_download_target_from_flags() {
        let sub_matches = matches_for(&[
            "wapictl", "csv", "export", "--object", "record:a", "-o", "/tmp/out",
            "--output-file", "a.csv",
        ]);
        assert_eq!(
            download_target(&sub_matches),
            DownloadTarget::named("/tmp/out", "a.csv")
        );
    }

    #[tokio::test]
    async fn test_wait_for_task_stops_at_terminal_state() {
        let transport = Arc::new(
            MockTransport::new("gm")
                .json(json!({"status": "PENDING"}))
                .json(json!({"status": "COMPLETED", "lines_processed": 3})),
        );
        let client = WapiClient::new(transport.clone());
        let settings = PollSettings {
            interval: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        };
        let status = wait_for_task(&client, &TaskReference::new("csvimporttask/x:1"), settings)
            .await
            .unwrap();
        assert_eq!(status.lines_processed, Some(3));
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_wait_for_task_times_out() {
        let transport = Arc::new(MockTransport::new("gm").json(json!({"status": "RUNNING"})));
        let client = WapiClient::new(transport);
        let settings = PollSettings {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(1),
        };
        let result =
            wait_for_task(&client, &TaskReference::new("csvimporttask/x:1"), settings).await;
        assert!(matches!(
            result,
            Err(CliError::PollTimeout { status, .. }) if status == "RUNNING"
        ));
    }
}
