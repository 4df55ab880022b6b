use clap::ArgMatches;
use tracing::trace;

use crate::{
    actions::utils::{connect, download_target, print_formatted, required_path},
    commands::params::{
        PARAMETER_BACKUP_TYPE, PARAMETER_DISCOVERY_DATA, PARAMETER_FILE, PARAMETER_KEEP_GRID_IP,
        PARAMETER_KEEP_LOCAL_COPY, PARAMETER_MODE, PARAMETER_NIOS_DATA,
    },
    configuration::Configuration,
    error::CliError,
    fileop::submit::{BackupType, GridBackupOptions, RestoreMode},
    model::SavedFile,
};

/// `Some(true)` when the switch is given, otherwise left to the server.
pub(crate) fn switch(sub_matches: &ArgMatches, name: &str) -> Option<bool> {
    sub_matches.get_flag(name).then_some(true)
}

pub fn backup_options(sub_matches: &ArgMatches) -> GridBackupOptions {
    GridBackupOptions {
        backup_type: sub_matches
            .get_one::<BackupType>(PARAMETER_BACKUP_TYPE)
            .copied()
            .unwrap_or_default(),
        discovery_data: switch(sub_matches, PARAMETER_DISCOVERY_DATA),
        keep_local_copy: switch(sub_matches, PARAMETER_KEEP_LOCAL_COPY),
        nios_data: switch(sub_matches, PARAMETER_NIOS_DATA),
    }
}

pub async fn backup(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"grid backup\" command...");
    let options = backup_options(sub_matches);
    let client = connect(configuration, sub_matches)?;
    let path = client
        .grid_backup(&options, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("grid_backup", path), sub_matches)?;
    Ok(())
}

pub async fn restore(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"grid restore\" command...");
    let path = required_path(sub_matches, PARAMETER_FILE)?;
    let mode = sub_matches
        .get_one::<RestoreMode>(PARAMETER_MODE)
        .copied()
        .unwrap_or_default();
    let keep_grid_ip = sub_matches.get_flag(PARAMETER_KEEP_GRID_IP);

    let client = connect(configuration, sub_matches)?;
    client.grid_restore(&path, mode, keep_grid_ip).await?;
    eprintln!("Restore of {} submitted; the grid will restart.", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cli;

    #[test]
    fn test_backup_options_only_send_given_switches() {
        let matches = cli()
            .try_get_matches_from(["wapictl", "grid", "backup", "--type", "nios", "--nios-data"])
            .unwrap();
        let (_, grid) = matches.subcommand().unwrap();
        let (_, backup) = grid.subcommand().unwrap();
        assert_eq!(
            backup_options(backup),
            GridBackupOptions {
                backup_type: BackupType::Nios,
                discovery_data: None,
                keep_local_copy: None,
                nios_data: Some(true),
            }
        );
    }
}
