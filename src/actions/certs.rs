use clap::ArgMatches;
use tracing::trace;

use crate::{
    actions::utils::{connect, download_target, print_formatted, required_path, required_string},
    commands::params::{
        PARAMETER_ALGORITHM, PARAMETER_CN, PARAMETER_COMMENT, PARAMETER_COUNTRY,
        PARAMETER_DAYS_VALID, PARAMETER_EMAIL, PARAMETER_FILE, PARAMETER_KEY_SIZE,
        PARAMETER_LOCALITY, PARAMETER_MEMBER, PARAMETER_ORG, PARAMETER_ORG_UNIT, PARAMETER_SANS,
        PARAMETER_STATE, PARAMETER_USAGE,
    },
    configuration::Configuration,
    error::{CliError, WapiError},
    fileop::cert::{Algorithm, CertificateRequestSpec, CertificateUsage},
    model::SavedFile,
};

fn usage(sub_matches: &ArgMatches) -> CertificateUsage {
    sub_matches
        .get_one::<CertificateUsage>(PARAMETER_USAGE)
        .copied()
        .unwrap_or_default()
}

fn optional(sub_matches: &ArgMatches, name: &str) -> Option<String> {
    sub_matches.get_one::<String>(name).cloned()
}

/// Build and validate a request from flags. SANs are parsed here so that a
/// malformed value fails before any connection is made.
pub fn request_spec(sub_matches: &ArgMatches) -> Result<CertificateRequestSpec, CliError> {
    let mut spec = CertificateRequestSpec::new(
        required_string(sub_matches, PARAMETER_CN)?,
        required_string(sub_matches, PARAMETER_MEMBER)?,
    );
    if let Some(sans) = sub_matches.get_one::<String>(PARAMETER_SANS) {
        spec = spec.with_sans(sans).map_err(WapiError::from)?;
    }
    if let Some(algorithm) = sub_matches.get_one::<Algorithm>(PARAMETER_ALGORITHM) {
        spec.algorithm = *algorithm;
    }
    spec.certificate_usage = usage(sub_matches);
    if let Some(key_size) = sub_matches.get_one::<u32>(PARAMETER_KEY_SIZE) {
        spec.key_size = *key_size;
    }
    // only defined for self-signed certificates
    if let Ok(Some(days_valid)) = sub_matches.try_get_one::<u32>(PARAMETER_DAYS_VALID) {
        spec.days_valid = *days_valid;
    }
    spec.comment = optional(sub_matches, PARAMETER_COMMENT);
    spec.country = optional(sub_matches, PARAMETER_COUNTRY);
    spec.email = optional(sub_matches, PARAMETER_EMAIL);
    spec.locality = optional(sub_matches, PARAMETER_LOCALITY);
    spec.org = optional(sub_matches, PARAMETER_ORG);
    spec.org_unit = optional(sub_matches, PARAMETER_ORG_UNIT);
    spec.state = optional(sub_matches, PARAMETER_STATE);

    spec.validate().map_err(WapiError::from)?;
    Ok(spec)
}

pub async fn generate(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"cert generate\" command...");
    let spec = request_spec(sub_matches)?;
    let client = connect(configuration, sub_matches)?;
    let path = client
        .generate_selfsigned_cert(&spec, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("generate_selfsigned_cert", path), sub_matches)?;
    Ok(())
}

pub async fn csr(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"cert csr\" command...");
    let spec = request_spec(sub_matches)?;
    let client = connect(configuration, sub_matches)?;
    let path = client
        .generate_csr(&spec, &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("generate_csr", path), sub_matches)?;
    Ok(())
}

pub async fn download(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"cert download\" command...");
    let member = required_string(sub_matches, PARAMETER_MEMBER)?;
    let client = connect(configuration, sub_matches)?;
    let path = client
        .download_certificate(&member, usage(sub_matches), &download_target(sub_matches))
        .await?;
    print_formatted(&SavedFile::new("download_certificate", path), sub_matches)?;
    Ok(())
}

pub async fn upload(configuration: &Configuration, sub_matches: &ArgMatches) -> Result<(), CliError> {
    trace!("Executing \"cert upload\" command...");
    let member = required_string(sub_matches, PARAMETER_MEMBER)?;
    let path = required_path(sub_matches, PARAMETER_FILE)?;
    let client = connect(configuration, sub_matches)?;
    client
        .upload_certificate(&member, usage(sub_matches), &path)
        .await?;
    eprintln!("Certificate {} uploaded to {}", path.display(), member);
    Ok(())
}
