use clap::ArgMatches;
use tracing::{info, trace};

use crate::{
    actions::utils::{
        connect, download_target, print_formatted, required_path, required_string,
        wait_for_task, PollSettings,
    },
    commands::params::{
        PARAMETER_FILE, PARAMETER_IMPORT_ID, PARAMETER_OBJECT, PARAMETER_ON_ERROR,
        PARAMETER_OPERATION, PARAMETER_SKIP_CHECK, PARAMETER_WAIT,
    },
    configuration::Configuration,
    error::CliError,
    fileop::submit::{CsvOperation, OnError},
    model::{check_csv_file, is_failed, SavedFile},
};

pub async fn import(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"csv import\" command...");
    let path = required_path(sub_matches, PARAMETER_FILE)?;
    let operation = sub_matches
        .get_one::<CsvOperation>(PARAMETER_OPERATION)
        .copied()
        .unwrap_or(CsvOperation::Insert);
    let on_error = sub_matches
        .get_one::<OnError>(PARAMETER_ON_ERROR)
        .copied()
        .unwrap_or_default();

    if !sub_matches.get_flag(PARAMETER_SKIP_CHECK) {
        let report = check_csv_file(&path).map_err(crate::actions::CliActionError::from)?;
        info!(
            "{:?}: {} section(s), {} row(s)",
            path,
            report.sections.len(),
            report.total_rows()
        );
    }

    let client = connect(configuration, sub_matches)?;
    let task = client.csv_import(&path, operation, on_error).await?;

    if !sub_matches.get_flag(PARAMETER_WAIT) {
        print_formatted(&task, sub_matches)?;
        return Ok(());
    }

    let status = wait_for_task(&client, &task, PollSettings::from_matches(sub_matches)).await?;
    print_formatted(&status, sub_matches)?;
    if is_failed(status.status) {
        return Err(CliError::TaskFailed {
            task_ref: task.reference().to_string(),
            status: status.status.to_string(),
        });
    }
    Ok(())
}

pub async fn export(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"csv export\" command...");
    let object = required_string(sub_matches, PARAMETER_OBJECT)?;
    let client = connect(configuration, sub_matches)?;
    let path = client
        .csv_export(&object, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("csv_export", path), sub_matches)?;
    Ok(())
}

pub async fn error_log(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliError> {
    trace!("Executing \"csv error-log\" command...");
    let import_id = required_string(sub_matches, PARAMETER_IMPORT_ID)?;
    let client = connect(configuration, sub_matches)?;
    let path = client
        .csv_error_log(&import_id, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("csv_error_log", path), sub_matches)?;
    Ok(())
}

/// Local only; never contacts the grid manager.
pub fn check(sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"csv check\" command...");
    let path = required_path(sub_matches, PARAMETER_FILE)?;
    let report = check_csv_file(&path).map_err(crate::actions::CliActionError::from)?;
    print_formatted(&report, sub_matches)?;
    Ok(())
}
