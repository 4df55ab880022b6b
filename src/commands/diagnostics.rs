//! Diagnostic download command definitions: logs, support bundles,
//! member configuration files and lease history.

use crate::commands::params::{
    member_parameter, optional_switch, output_dir_parameter, output_file_parameter,
    COMMAND_LEASE_HISTORY, COMMAND_LOGS, COMMAND_MEMBER_CONFIG, COMMAND_SUPPORT_BUNDLE,
    PARAMETER_CACHED_ZONE_DATA, PARAMETER_CORE_FILES, PARAMETER_DATA_TYPE, PARAMETER_END_TIME,
    PARAMETER_ENDPOINT, PARAMETER_INCLUDE_ROTATED, PARAMETER_LOG_FILES, PARAMETER_LOG_TYPE,
    PARAMETER_MSSERVER, PARAMETER_NM_SNMP_LOGS, PARAMETER_NODE_TYPE,
    PARAMETER_RECURSIVE_CACHE_FILE, PARAMETER_ROTATE_LOG_FILES, PARAMETER_START_TIME,
    PARAMETER_TERMINATED,
};
use crate::fileop::submit::{LogType, MemberDataType, NodeType};
use clap::{Arg, Command};
use std::str::FromStr;

pub fn logs_command() -> Command {
    Command::new(COMMAND_LOGS)
        .about("Download member log files")
        .arg(
            Arg::new(PARAMETER_LOG_TYPE)
                .long(PARAMETER_LOG_TYPE)
                .num_args(1)
                .default_value("SYSLOG")
                .value_parser(LogType::from_str)
                .help("SYSLOG, AUDITLOG, MSMGMTLOG, DELTALOG, OUTBOUND, PTOPLOG or DISCOVERY_CSV_ERRLOG"),
        )
        .arg(member_parameter(false))
        .arg(
            Arg::new(PARAMETER_NODE_TYPE)
                .long(PARAMETER_NODE_TYPE)
                .num_args(1)
                .default_value("ACTIVE")
                .value_parser(NodeType::from_str)
                .help("ACTIVE or BACKUP node of an HA pair"),
        )
        .arg(optional_switch(
            PARAMETER_INCLUDE_ROTATED,
            "Include rotated log files",
        ))
        .arg(
            Arg::new(PARAMETER_ENDPOINT)
                .long(PARAMETER_ENDPOINT)
                .num_args(1)
                .help("Outbound endpoint name, for OUTBOUND logs"),
        )
        .arg(
            Arg::new(PARAMETER_MSSERVER)
                .long(PARAMETER_MSSERVER)
                .num_args(1)
                .help("Microsoft server address, for MSMGMTLOG logs"),
        )
        .arg(output_dir_parameter())
        .arg(output_file_parameter())
}

pub fn support_bundle_command() -> Command {
    Command::new(COMMAND_SUPPORT_BUNDLE)
        .about("Build and download a member support bundle")
        .arg(member_parameter(true))
        .arg(optional_switch(PARAMETER_CACHED_ZONE_DATA, "Include cached zone data"))
        .arg(optional_switch(PARAMETER_CORE_FILES, "Include core files"))
        .arg(optional_switch(PARAMETER_LOG_FILES, "Include log files"))
        .arg(optional_switch(PARAMETER_NM_SNMP_LOGS, "Include network management SNMP logs"))
        .arg(optional_switch(
            PARAMETER_RECURSIVE_CACHE_FILE,
            "Include the recursive DNS cache file",
        ))
        .arg(optional_switch(PARAMETER_ROTATE_LOG_FILES, "Include rotated log files"))
        .arg(output_dir_parameter())
        .arg(output_file_parameter())
}

pub fn member_config_command() -> Command {
    Command::new(COMMAND_MEMBER_CONFIG)
        .about("Download a member's generated configuration or data file")
        .arg(member_parameter(true))
        .arg(
            Arg::new(PARAMETER_DATA_TYPE)
                .long(PARAMETER_DATA_TYPE)
                .num_args(1)
                .required(true)
                .value_parser(MemberDataType::from_str)
                .help("e.g. DNS_CFG, DHCP_CFG, DHCPV6_CFG, NTP_KEY_FILE, TLS_CERTS"),
        )
        .arg(output_dir_parameter())
        .arg(output_file_parameter())
}

pub fn lease_history_command() -> Command {
    Command::new(COMMAND_LEASE_HISTORY)
        .about("Download DHCP lease history of a member")
        .arg(member_parameter(true))
        .arg(
            Arg::new(PARAMETER_START_TIME)
                .long(PARAMETER_START_TIME)
                .num_args(1)
                .value_parser(clap::value_parser!(i64))
                .help("Start of the window, seconds since the epoch"),
        )
        .arg(
            Arg::new(PARAMETER_END_TIME)
                .long(PARAMETER_END_TIME)
                .num_args(1)
                .value_parser(clap::value_parser!(i64))
                .help("End of the window, seconds since the epoch"),
        )
        .arg(optional_switch(
            PARAMETER_TERMINATED,
            "Only include terminated leases",
        ))
        .arg(output_dir_parameter())
        .arg(output_file_parameter())
}
