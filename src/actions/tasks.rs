use clap::ArgMatches;
use tracing::trace;

use crate::{
    actions::utils::{connect, print_formatted, required_string, wait_for_task, PollSettings},
    commands::params::{PARAMETER_REF, PARAMETER_WAIT},
    configuration::Configuration,
    error::CliError,
    fileop::TaskReference,
    model::is_failed,
};

pub async fn status(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"task status\" command...");
    let task = TaskReference::new(required_string(sub_matches, PARAMETER_REF)?);
    let client = connect(configuration, sub_matches)?;

    let status = if sub_matches.get_flag(PARAMETER_WAIT) {
        wait_for_task(&client, &task, PollSettings::from_matches(sub_matches)).await?
    } else {
        client.csv_task_status(&task).await?
    };
    print_formatted(&status, sub_matches)?;

    if is_failed(status.status) {
        return Err(CliError::TaskFailed {
            task_ref: task.reference().to_string(),
            status: status.status.to_string(),
        });
    }
    Ok(())
}
