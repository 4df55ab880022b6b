//! Builders and submission for long-running `fileop` jobs.
//!
//! CSV import answers with a task reference. Every other artifact-producing
//! function answers with a [`DownloadDescriptor`] that must be handed to
//! [`super::transfer::FileTransfer::download`] right away. Restore and
//! certificate upload consume an [`UploadToken`] and return nothing.

use serde_json::{json, Map, Value};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use super::{
    cert::{CertificateRequestSpec, CertificateUsage},
    DownloadDescriptor, FileFunction, FileOpContext, TaskReference, UploadToken,
};
use crate::error::{PreconditionError, WapiError};

/// Operation requested from a CSV import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CsvOperation {
    Insert,
    Update,
    Delete,
    Replace,
    Merge,
    Override,
    Custom,
}

impl CsvOperation {
    /// Wire `operation` and optional `update_method`.
    ///
    /// The server only knows `UPDATE` with a method qualifier, never `MERGE` or `OVERRIDE` alone.
    pub fn wire_values(&self) -> (&'static str, Option<&'static str>) {
        match self {
            CsvOperation::Insert => ("INSERT", None),
            CsvOperation::Update => ("UPDATE", None),
            CsvOperation::Delete => ("DELETE", None),
            CsvOperation::Replace => ("REPLACE", None),
            CsvOperation::Merge => ("UPDATE", Some("MERGE")),
            CsvOperation::Override => ("UPDATE", Some("OVERRIDE")),
            CsvOperation::Custom => ("CUSTOM", None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum OnError {
    #[default]
    Stop,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RestoreMode {
    #[default]
    Normal,
    Forced,
    #[strum(serialize = "CLONE")]
    CloneGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum BackupType {
    #[default]
    Backup,
    Nios,
    Discovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LogType {
    #[default]
    Syslog,
    Auditlog,
    Msmgmtlog,
    Deltalog,
    Outbound,
    Ptoplog,
    #[strum(serialize = "DISCOVERY_CSV_ERRLOG")]
    DiscoveryCsvErrlog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum NodeType {
    #[default]
    Active,
    Backup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum MemberDataType {
    NtpKeyFile,
    SnmpMibsFile,
    DnsCfg,
    DhcpCfg,
    Dhcpv6Cfg,
    TrafficCaptureFile,
    DnsCache,
    DnsAccelCache,
    DhcpExpertModeCfg,
    DnsExpertModeCfg,
    TlsCerts,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridBackupOptions {
    pub backup_type: BackupType,
    pub discovery_data: Option<bool>,
    pub keep_local_copy: Option<bool>,
    pub nios_data: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilesOptions {
    pub log_type: LogType,
    pub member: Option<String>,
    pub node_type: NodeType,
    pub include_rotated: bool,
    pub endpoint: Option<String>,
    pub msserver: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportBundleOptions {
    pub member: String,
    pub cached_zone_data: bool,
    pub core_files: bool,
    pub log_files: bool,
    pub nm_snmp_logs: bool,
    pub recursive_cache_file: bool,
    pub rotate_log_files: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaseHistoryOptions {
    pub member: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub terminated: Option<bool>,
}

fn insert_opt<T: Into<Value>>(payload: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        payload.insert(key.to_string(), value.into());
    }
}

fn require(field: &str, value: &str) -> Result<(), PreconditionError> {
    if value.trim().is_empty() {
        Err(PreconditionError::MissingField(field.to_string()))
    } else {
        Ok(())
    }
}

pub fn csv_import_payload(operation: CsvOperation, token: &str, on_error: OnError) -> Value {
    let (operation, update_method) = operation.wire_values();
    let mut payload = json!({
        "action": "START",
        "doimport": true,
        "on_error": on_error.to_string(),
        "operation": operation,
        "separator": "COMMA",
        "token": token,
    });
    if let Some(method) = update_method {
        payload["update_method"] = json!(method);
    }
    payload
}

pub fn grid_backup_payload(options: &GridBackupOptions) -> Value {
    let mut payload = Map::new();
    payload.insert("type".into(), options.backup_type.to_string().into());
    insert_opt(&mut payload, "discovery_data", options.discovery_data);
    insert_opt(&mut payload, "keep_local_copy", options.keep_local_copy);
    insert_opt(&mut payload, "nios_data", options.nios_data);
    Value::Object(payload)
}

pub fn log_files_payload(options: &LogFilesOptions) -> Value {
    let mut payload = Map::new();
    payload.insert("log_type".into(), options.log_type.to_string().into());
    payload.insert("node_type".into(), options.node_type.to_string().into());
    payload.insert("include_rotated".into(), options.include_rotated.into());
    insert_opt(&mut payload, "member", options.member.clone());
    insert_opt(&mut payload, "endpoint", options.endpoint.clone());
    insert_opt(&mut payload, "msserver", options.msserver.clone());
    Value::Object(payload)
}

pub fn lease_history_payload(options: &LeaseHistoryOptions) -> Value {
    let mut payload = Map::new();
    payload.insert("member".into(), options.member.clone().into());
    insert_opt(&mut payload, "start_time", options.start_time);
    insert_opt(&mut payload, "end_time", options.end_time);
    insert_opt(&mut payload, "terminated", options.terminated);
    Value::Object(payload)
}

/// Builds and submits job requests.
#[derive(Clone)]
pub struct TaskSubmitter {
    context: FileOpContext,
}

impl TaskSubmitter {
    pub fn new(context: FileOpContext) -> Self {
        Self { context }
    }

    pub async fn csv_import(
        &self,
        operation: CsvOperation,
        token: &UploadToken,
        on_error: OnError,
    ) -> Result<TaskReference, WapiError> {
        let payload = csv_import_payload(operation, &token.token, on_error);
        debug!("Submitting CSV import: {}", payload);
        self.context.call(FileFunction::CsvImport, payload).await
    }

    pub async fn csv_export(&self, object: &str) -> Result<DownloadDescriptor, WapiError> {
        require("_object", object)?;
        self.context
            .call(FileFunction::CsvExport, json!({ "_object": object }))
            .await
    }

    pub async fn csv_error_log(&self, import_id: &str) -> Result<DownloadDescriptor, WapiError> {
        require("import_id", import_id)?;
        self.context
            .call(FileFunction::CsvErrorLog, json!({ "import_id": import_id }))
            .await
    }

    pub async fn grid_backup(
        &self,
        options: &GridBackupOptions,
    ) -> Result<DownloadDescriptor, WapiError> {
        self.context
            .call(FileFunction::GetGridData, grid_backup_payload(options))
            .await
    }

    /// Starts the restore; the grid manager restarts afterwards, so nothing comes back.
    pub async fn restore_database(
        &self,
        token: &UploadToken,
        mode: RestoreMode,
        keep_grid_ip: bool,
    ) -> Result<(), WapiError> {
        let payload = json!({
            "mode": mode.to_string(),
            "keep_grid_ip": keep_grid_ip,
            "token": token.token,
        });
        self.context
            .call_unit(FileFunction::RestoreDatabase, payload)
            .await
    }

    pub async fn generate_selfsigned_cert(
        &self,
        spec: &CertificateRequestSpec,
    ) -> Result<DownloadDescriptor, WapiError> {
        spec.validate()?;
        self.context
            .call(FileFunction::GenerateSelfSignedCert, spec.to_payload(true))
            .await
    }

    pub async fn generate_csr(
        &self,
        spec: &CertificateRequestSpec,
    ) -> Result<DownloadDescriptor, WapiError> {
        spec.validate()?;
        self.context
            .call(FileFunction::GenerateCsr, spec.to_payload(false))
            .await
    }

    pub async fn download_certificate(
        &self,
        member: &str,
        usage: CertificateUsage,
    ) -> Result<DownloadDescriptor, WapiError> {
        require("member", member)?;
        let payload = json!({
            "member": member,
            "certificate_usage": usage.to_string(),
        });
        self.context
            .call(FileFunction::DownloadCertificate, payload)
            .await
    }

    pub async fn upload_certificate(
        &self,
        member: &str,
        usage: CertificateUsage,
        token: &UploadToken,
    ) -> Result<(), WapiError> {
        require("member", member)?;
        let payload = json!({
            "member": member,
            "certificate_usage": usage.to_string(),
            "token": token.token,
        });
        self.context
            .call_unit(FileFunction::UploadCertificate, payload)
            .await
    }

    pub async fn get_log_files(
        &self,
        options: &LogFilesOptions,
    ) -> Result<DownloadDescriptor, WapiError> {
        self.context
            .call(FileFunction::GetLogFiles, log_files_payload(options))
            .await
    }

    pub async fn get_support_bundle(
        &self,
        options: &SupportBundleOptions,
    ) -> Result<DownloadDescriptor, WapiError> {
        require("member", &options.member)?;
        let payload = json!({
            "member": options.member,
            "cached_zone_data": options.cached_zone_data,
            "core_files": options.core_files,
            "log_files": options.log_files,
            "nm_snmp_logs": options.nm_snmp_logs,
            "recursive_cache_file": options.recursive_cache_file,
            "rotate_log_files": options.rotate_log_files,
        });
        self.context
            .call(FileFunction::GetSupportBundle, payload)
            .await
    }

    pub async fn get_member_data(
        &self,
        member: &str,
        data_type: MemberDataType,
    ) -> Result<DownloadDescriptor, WapiError> {
        require("member", member)?;
        let payload = json!({
            "member": member,
            "type": data_type.to_string(),
        });
        self.context
            .call(FileFunction::GetMemberData, payload)
            .await
    }

    pub async fn get_lease_history(
        &self,
        options: &LeaseHistoryOptions,
    ) -> Result<DownloadDescriptor, WapiError> {
        require("member", &options.member)?;
        self.context
            .call(
                FileFunction::GetLeaseHistoryFiles,
                lease_history_payload(options),
            )
            .await
    }
}
