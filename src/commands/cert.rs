//! Certificate command definitions.

use crate::commands::params::{
    file_parameter, member_parameter, output_dir_parameter, output_file_parameter, COMMAND_CERT,
    COMMAND_CSR, COMMAND_DOWNLOAD, COMMAND_GENERATE, COMMAND_UPLOAD, PARAMETER_ALGORITHM,
    PARAMETER_CN, PARAMETER_COMMENT, PARAMETER_COUNTRY, PARAMETER_DAYS_VALID, PARAMETER_EMAIL,
    PARAMETER_KEY_SIZE, PARAMETER_LOCALITY, PARAMETER_ORG, PARAMETER_ORG_UNIT, PARAMETER_SANS,
    PARAMETER_STATE, PARAMETER_USAGE,
};
use crate::fileop::cert::{Algorithm, CertificateUsage};
use clap::{Arg, Command};
use std::str::FromStr;

fn usage_parameter() -> Arg {
    Arg::new(PARAMETER_USAGE)
        .long(PARAMETER_USAGE)
        .num_args(1)
        .default_value("ADMIN")
        .value_parser(CertificateUsage::from_str)
        .help("ADMIN, CAPTIVE_PORTAL, SFNT_CLIENT_CERT or IFMAP_DHCP")
}

fn text_parameter(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).num_args(1).help(help)
}

/// Arguments shared by self-signed certificate and CSR generation.
fn request_parameters() -> Vec<Arg> {
    vec![
        Arg::new(PARAMETER_CN)
            .long(PARAMETER_CN)
            .num_args(1)
            .required(true)
            .help("Common name"),
        member_parameter(true),
        Arg::new(PARAMETER_SANS)
            .long(PARAMETER_SANS)
            .num_args(1)
            .help("Subject alternative names as TYPE/VALUE[,TYPE/VALUE...]; TYPE is DNS, IP, URI or EMAIL"),
        Arg::new(PARAMETER_ALGORITHM)
            .long(PARAMETER_ALGORITHM)
            .num_args(1)
            .default_value("SHA-256")
            .value_parser(Algorithm::from_str)
            .help("SHA-1 or SHA-256"),
        usage_parameter(),
        Arg::new(PARAMETER_KEY_SIZE)
            .long(PARAMETER_KEY_SIZE)
            .num_args(1)
            .default_value("2048")
            .value_parser(clap::value_parser!(u32))
            .help("Key size in bits"),
        text_parameter(PARAMETER_COMMENT, "Comment"),
        text_parameter(PARAMETER_COUNTRY, "Two-letter country code"),
        text_parameter(PARAMETER_EMAIL, "Contact e-mail address"),
        text_parameter(PARAMETER_LOCALITY, "Locality"),
        text_parameter(PARAMETER_ORG, "Organization"),
        text_parameter(PARAMETER_ORG_UNIT, "Organizational unit"),
        text_parameter(PARAMETER_STATE, "State or province"),
        output_dir_parameter(),
        output_file_parameter(),
    ]
}

/// Create the cert command with all its subcommands.
pub fn cert_command() -> Command {
    Command::new(COMMAND_CERT)
        .about("Member certificates and signing requests")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_GENERATE)
                .about("Generate a self-signed certificate and download it")
                .args(request_parameters())
                .arg(
                    Arg::new(PARAMETER_DAYS_VALID)
                        .long(PARAMETER_DAYS_VALID)
                        .num_args(1)
                        .default_value("365")
                        .value_parser(clap::value_parser!(u32))
                        .help("Validity period in days"),
                ),
        )
        .subcommand(
            Command::new(COMMAND_CSR)
                .about("Generate a certificate signing request and download it")
                .args(request_parameters()),
        )
        .subcommand(
            Command::new(COMMAND_DOWNLOAD)
                .about("Download a member's current certificate")
                .arg(member_parameter(true))
                .arg(usage_parameter())
                .arg(output_dir_parameter())
                .arg(output_file_parameter()),
        )
        .subcommand(
            Command::new(COMMAND_UPLOAD)
                .about("Upload a certificate to a member")
                .arg(member_parameter(true))
                .arg(usage_parameter())
                .arg(file_parameter("Certificate file in PEM format")),
        )
}
