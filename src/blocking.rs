//! Blocking facade over [`crate::client::WapiClient`].
//!
//! The async client is the only implementation; this wrapper drives it on a
//! private current-thread runtime. Do not call it from inside another tokio
//! runtime.

use std::path::{Path, PathBuf};

use tokio::runtime::{Builder, Runtime};

use crate::{
    cancel::CancelToken,
    client::{self, DownloadTarget},
    error::WapiError,
    fileop::{
        cert::{CertificateRequestSpec, CertificateUsage},
        poll::CsvImportTask,
        submit::{
            CsvOperation, GridBackupOptions, LeaseHistoryOptions, LogFilesOptions,
            MemberDataType, OnError, RestoreMode, SupportBundleOptions,
        },
        TaskReference,
    },
};

pub struct WapiClient {
    inner: client::WapiClient,
    runtime: Runtime,
}

impl WapiClient {
    pub fn new(inner: client::WapiClient) -> std::io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { inner, runtime })
    }

    /// Cancelling this token from another thread aborts the running operation.
    pub fn cancel_token(&self) -> CancelToken {
        self.inner.cancel_token()
    }

    pub fn csv_import(
        &self,
        path: &Path,
        operation: CsvOperation,
        on_error: OnError,
    ) -> Result<TaskReference, WapiError> {
        self.runtime
            .block_on(self.inner.csv_import(path, operation, on_error))
    }

    pub fn csv_task_status(&self, task: &TaskReference) -> Result<CsvImportTask, WapiError> {
        self.runtime.block_on(self.inner.csv_task_status(task))
    }

    pub fn csv_export(&self, object: &str, target: &DownloadTarget) -> Result<PathBuf, WapiError> {
        self.runtime.block_on(self.inner.csv_export(object, target))
    }

    pub fn csv_error_log(
        &self,
        import_id: &str,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime
            .block_on(self.inner.csv_error_log(import_id, target))
    }

    pub fn grid_backup(
        &self,
        options: &GridBackupOptions,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime.block_on(self.inner.grid_backup(options, target))
    }

    pub fn grid_restore(
        &self,
        path: &Path,
        mode: RestoreMode,
        keep_grid_ip: bool,
    ) -> Result<(), WapiError> {
        self.runtime
            .block_on(self.inner.grid_restore(path, mode, keep_grid_ip))
    }

    pub fn generate_selfsigned_cert(
        &self,
        spec: &CertificateRequestSpec,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime
            .block_on(self.inner.generate_selfsigned_cert(spec, target))
    }

    pub fn generate_csr(
        &self,
        spec: &CertificateRequestSpec,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime.block_on(self.inner.generate_csr(spec, target))
    }

    pub fn download_certificate(
        &self,
        member: &str,
        usage: CertificateUsage,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime
            .block_on(self.inner.download_certificate(member, usage, target))
    }

    pub fn upload_certificate(
        &self,
        member: &str,
        usage: CertificateUsage,
        path: &Path,
    ) -> Result<(), WapiError> {
        self.runtime
            .block_on(self.inner.upload_certificate(member, usage, path))
    }

    pub fn get_log_files(
        &self,
        options: &LogFilesOptions,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime
            .block_on(self.inner.get_log_files(options, target))
    }

    pub fn get_support_bundle(
        &self,
        options: &SupportBundleOptions,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime
            .block_on(self.inner.get_support_bundle(options, target))
    }

    pub fn member_config(
        &self,
        member: &str,
        data_type: MemberDataType,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime
            .block_on(self.inner.member_config(member, data_type, target))
    }

    pub fn get_lease_history(
        &self,
        options: &LeaseHistoryOptions,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.runtime
            .block_on(self.inner.get_lease_history(options, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileop::testing::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_blocking_export_matches_async_behavior() {
        let transport = Arc::new(
            MockTransport::new("gm")
                .json(json!({"token": "ex", "url": "https://gm/x/Export.csv"}))
                .json(json!({"header-arecord": 1}))
                .json(json!({})),
        );
        let client = WapiClient::new(client::WapiClient::new(transport.clone())).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = client
            .csv_export("record:a", &DownloadTarget::new(dir.path()))
            .unwrap();
        assert_eq!(path, dir.path().join("export.csv"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("header-arecord"));
        assert_eq!(transport.functions(), vec!["csv_export", "downloadcomplete"]);
    }
}
