//! Status lookup for submitted jobs.
//!
//! Polling cadence is left to the caller: a ten-row import and a
//! ten-million-row import need very different patience.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use super::{FileOpContext, TaskReference};
use crate::{error::WapiError, transport::WapiRequest};

pub const TASK_RETURN_FIELDS: &str =
    "status,lines_processed,lines_failed,lines_warning,import_id,file_name,start_time,end_time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Uploaded,
    Running,
    Completed,
    Failed,
    Stopped,
    /// A value this client does not know; treated as still in progress.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Stopped
        )
    }
}

/// A CSV import job as reported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvImportTask {
    #[serde(rename = "_ref", default)]
    pub reference: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_failed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_warning: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

#[derive(Clone)]
pub struct TaskPoller {
    context: FileOpContext,
}

impl TaskPoller {
    pub fn new(context: FileOpContext) -> Self {
        Self { context }
    }

    /// One GET of the task's own reference. Does not loop.
    pub async fn poll_status(&self, task: &TaskReference) -> Result<CsvImportTask, WapiError> {
        let reference = task.reference();
        let request = WapiRequest::get(reference).param("_return_fields+", TASK_RETURN_FIELDS);
        let response = self.context.send(request).await?;
        let mut status: CsvImportTask =
            response.json().map_err(|source| WapiError::Decode {
                short_path: reference.to_string(),
                source,
            })?;
        if status.reference.is_empty() {
            status.reference = reference.to_string();
        }
        debug!("Task {} is {}", reference, status.status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fileop::testing::{context, Call, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_terminal_states() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Stopped.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_unknown_status_decodes() {
        let task: CsvImportTask = serde_json::from_value(json!({"status": "QUEUED"})).unwrap();
        assert_eq!(task.status, TaskStatus::Unknown);
    }

    #[tokio::test]
    async fn test_poll_issues_single_get() {
        let transport = Arc::new(MockTransport::new("gm").json(json!({
            "_ref": "csvimporttask/abc:7",
            "status": "RUNNING",
            "lines_processed": 2,
        })));
        let (context, _) = context(transport.clone());
        let poller = TaskPoller::new(context);
        let status = poller
            .poll_status(&TaskReference::new("csvimporttask/abc:7"))
            .await
            .unwrap();
        assert_eq!(status.status, TaskStatus::Running);
        assert_eq!(status.lines_processed, Some(2));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Request(request) => {
                assert_eq!(request.method, crate::transport::Method::Get);
                assert_eq!(request.path, "csvimporttask/abc:7");
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }
}
