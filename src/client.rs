//! High-level file operations against a grid manager.
//!
//! [`WapiClient`] wires a caller-supplied [`Transport`] to the transfer,
//! submit and poll components and runs each operation's phases strictly in
//! order: upload, submit, then download and acknowledge.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    cancel::CancelToken,
    error::WapiError,
    fileop::{
        cert::{CertificateRequestSpec, CertificateUsage},
        poll::{CsvImportTask, TaskPoller},
        submit::{
            CsvOperation, GridBackupOptions, LeaseHistoryOptions, LogFilesOptions,
            MemberDataType, OnError, RestoreMode, SupportBundleOptions, TaskSubmitter,
        },
        transfer::{FileTransfer, DEFAULT_CHUNK_SIZE},
        DownloadDescriptor, FileOpContext, TaskReference,
    },
    retry::RetryPolicy,
    transport::Transport,
};

/// Where a downloaded artifact is written.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DownloadTarget {
    pub dir: PathBuf,
    /// Overrides the name derived from the server's descriptor.
    pub filename: Option<String>,
}

impl DownloadTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            filename: None,
        }
    }

    pub fn named(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            filename: Some(filename.into()),
        }
    }
}

#[derive(Clone)]
pub struct WapiClient {
    context: FileOpContext,
    transfer: FileTransfer,
    submitter: TaskSubmitter,
    poller: TaskPoller,
}

impl WapiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_policy(transport, RetryPolicy::default(), DEFAULT_CHUNK_SIZE)
    }

    pub fn with_policy(transport: Arc<dyn Transport>, retry: RetryPolicy, chunk_size: usize) -> Self {
        let context = FileOpContext::new(transport, Arc::new(retry), CancelToken::new());
        Self::from_context(context, chunk_size)
    }

    fn from_context(context: FileOpContext, chunk_size: usize) -> Self {
        Self {
            transfer: FileTransfer::new(context.clone()).with_chunk_size(chunk_size),
            submitter: TaskSubmitter::new(context.clone()),
            poller: TaskPoller::new(context.clone()),
            context,
        }
    }

    /// Same transport and policy, fresh cancellation scope.
    pub fn scoped(&self, cancel: CancelToken) -> Self {
        let context = FileOpContext::new(
            self.context.transport().clone(),
            self.context.retry_handle(),
            cancel,
        );
        Self::from_context(context, self.transfer.chunk_size())
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.context.cancel_token().clone()
    }

    pub fn transfer(&self) -> &FileTransfer {
        &self.transfer
    }

    pub fn submitter(&self) -> &TaskSubmitter {
        &self.submitter
    }

    pub fn poller(&self) -> &TaskPoller {
        &self.poller
    }

    async fn fetch(
        &self,
        descriptor: DownloadDescriptor,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        self.transfer
            .download(&descriptor, &target.dir, target.filename.as_deref())
            .await
    }

    /// Upload `path` and start an import job. Poll the returned reference for progress.
    pub async fn csv_import(
        &self,
        path: &Path,
        operation: CsvOperation,
        on_error: OnError,
    ) -> Result<TaskReference, WapiError> {
        let token = self.transfer.upload_file(path).await?;
        let task = self.submitter.csv_import(operation, &token, on_error).await?;
        info!("CSV import of {:?} submitted as {}", path, task.reference());
        Ok(task)
    }

    pub async fn csv_task_status(&self, task: &TaskReference) -> Result<CsvImportTask, WapiError> {
        self.poller.poll_status(task).await
    }

    pub async fn csv_export(
        &self,
        object: &str,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.csv_export(object).await?;
        self.fetch(descriptor, target).await
    }

    pub async fn csv_error_log(
        &self,
        import_id: &str,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.csv_error_log(import_id).await?;
        self.fetch(descriptor, target).await
    }

    pub async fn grid_backup(
        &self,
        options: &GridBackupOptions,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.grid_backup(options).await?;
        self.fetch(descriptor, target).await
    }

    /// Upload a backup and restore it. The grid manager restarts; there is nothing to download.
    pub async fn grid_restore(
        &self,
        path: &Path,
        mode: RestoreMode,
        keep_grid_ip: bool,
    ) -> Result<(), WapiError> {
        let token = self.transfer.upload_file(path).await?;
        self.submitter
            .restore_database(&token, mode, keep_grid_ip)
            .await?;
        info!("Restore of {:?} started in {} mode", path, mode);
        Ok(())
    }

    pub async fn generate_selfsigned_cert(
        &self,
        spec: &CertificateRequestSpec,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.generate_selfsigned_cert(spec).await?;
        self.fetch(descriptor, target).await
    }

    pub async fn generate_csr(
        &self,
        spec: &CertificateRequestSpec,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.generate_csr(spec).await?;
        self.fetch(descriptor, target).await
    }

    pub async fn download_certificate(
        &self,
        member: &str,
        usage: CertificateUsage,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.download_certificate(member, usage).await?;
        self.fetch(descriptor, target).await
    }

    pub async fn upload_certificate(
        &self,
        member: &str,
        usage: CertificateUsage,
        path: &Path,
    ) -> Result<(), WapiError> {
        let token = self.transfer.upload_file(path).await?;
        self.submitter
            .upload_certificate(member, usage, &token)
            .await?;
        debug!("Certificate {:?} uploaded to {}", path, member);
        Ok(())
    }

    pub async fn get_log_files(
        &self,
        options: &LogFilesOptions,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.get_log_files(options).await?;
        self.fetch(descriptor, target).await
    }

    pub async fn get_support_bundle(
        &self,
        options: &SupportBundleOptions,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.get_support_bundle(options).await?;
        self.fetch(descriptor, target).await
    }

    pub async fn member_config(
        &self,
        member: &str,
        data_type: MemberDataType,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.get_member_data(member, data_type).await?;
        self.fetch(descriptor, target).await
    }

    pub async fn get_lease_history(
        &self,
        options: &LeaseHistoryOptions,
        target: &DownloadTarget,
    ) -> Result<PathBuf, WapiError> {
        let descriptor = self.submitter.get_lease_history(options).await?;
        self.fetch(descriptor, target).await
    }
}
