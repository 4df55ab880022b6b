use clap::ArgMatches;
use tracing::trace;

use crate::{
    actions::{
        grid::switch,
        utils::{connect, download_target, print_formatted, required_string},
    },
    commands::params::{
        PARAMETER_CACHED_ZONE_DATA, PARAMETER_CORE_FILES, PARAMETER_DATA_TYPE, PARAMETER_END_TIME,
        PARAMETER_ENDPOINT, PARAMETER_INCLUDE_ROTATED, PARAMETER_LOG_FILES, PARAMETER_LOG_TYPE,
        PARAMETER_MEMBER, PARAMETER_MSSERVER, PARAMETER_NM_SNMP_LOGS, PARAMETER_NODE_TYPE,
        PARAMETER_RECURSIVE_CACHE_FILE, PARAMETER_ROTATE_LOG_FILES, PARAMETER_START_TIME,
        PARAMETER_TERMINATED,
    },
    configuration::Configuration,
    error::CliError,
    fileop::submit::{
        LeaseHistoryOptions, LogFilesOptions, LogType, MemberDataType, NodeType,
        SupportBundleOptions,
    },
    model::SavedFile,
};

pub fn log_files_options(sub_matches: &ArgMatches) -> LogFilesOptions {
    LogFilesOptions {
        log_type: sub_matches
            .get_one::<LogType>(PARAMETER_LOG_TYPE)
            .copied()
            .unwrap_or_default(),
        member: sub_matches.get_one::<String>(PARAMETER_MEMBER).cloned(),
        node_type: sub_matches
            .get_one::<NodeType>(PARAMETER_NODE_TYPE)
            .copied()
            .unwrap_or_default(),
        include_rotated: sub_matches.get_flag(PARAMETER_INCLUDE_ROTATED),
        endpoint: sub_matches.get_one::<String>(PARAMETER_ENDPOINT).cloned(),
        msserver: sub_matches.get_one::<String>(PARAMETER_MSSERVER).cloned(),
    }
}

pub async fn logs(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"logs\" command...");
    let options = log_files_options(sub_matches);
    let client = connect(configuration, sub_matches)?;
    let path = client
        .get_log_files(&options, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("get_log_files", path), sub_matches)?;
    Ok(())
}

pub async fn support_bundle(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliError> {
    trace!("Executing \"support-bundle\" command...");
    let options = SupportBundleOptions {
        member: required_string(sub_matches, PARAMETER_MEMBER)?,
        cached_zone_data: sub_matches.get_flag(PARAMETER_CACHED_ZONE_DATA),
        core_files: sub_matches.get_flag(PARAMETER_CORE_FILES),
        log_files: sub_matches.get_flag(PARAMETER_LOG_FILES),
        nm_snmp_logs: sub_matches.get_flag(PARAMETER_NM_SNMP_LOGS),
        recursive_cache_file: sub_matches.get_flag(PARAMETER_RECURSIVE_CACHE_FILE),
        rotate_log_files: sub_matches.get_flag(PARAMETER_ROTATE_LOG_FILES),
    };
    let client = connect(configuration, sub_matches)?;
    let path = client
        .get_support_bundle(&options, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("get_support_bundle", path), sub_matches)?;
    Ok(())
}

pub async fn member_config(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliError> {
    trace!("Executing \"member-config\" command...");
    let member = required_string(sub_matches, PARAMETER_MEMBER)?;
    let data_type = sub_matches
        .get_one::<MemberDataType>(PARAMETER_DATA_TYPE)
        .copied()
        .ok_or_else(|| CliError::MissingRequiredArgument(PARAMETER_DATA_TYPE.to_string()))?;
    let client = connect(configuration, sub_matches)?;
    let path = client
        .member_config(&member, data_type, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("getmemberdata", path), sub_matches)?;
    Ok(())
}

pub async fn lease_history(
    configuration: &Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), CliError> {
    trace!("Executing \"lease-history\" command...");
    let options = LeaseHistoryOptions {
        member: required_string(sub_matches, PARAMETER_MEMBER)?,
        start_time: sub_matches.get_one::<i64>(PARAMETER_START_TIME).copied(),
        end_time: sub_matches.get_one::<i64>(PARAMETER_END_TIME).copied(),
        terminated: switch(sub_matches, PARAMETER_TERMINATED),
    };
    let client = connect(configuration, sub_matches)?;
    let path = client
        .get_lease_history(&options, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("get_lease_history", path), sub_matches)?;
    Ok(())
}
