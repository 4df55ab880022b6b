//! File-operation and long-running task layer.
//!
//! Every upload, download and job submission goes through the `fileop`
//! object with a `_function` selector. The pieces here are composed by
//! [`crate::client::WapiClient`]:
//!
//! - [`transfer::FileTransfer`]: two-phase upload and download
//! - [`submit::TaskSubmitter`]: per-operation payload builders
//! - [`poll::TaskPoller`]: one-shot status lookup of a submitted job
//! - [`cert`]: certificate request values and SAN parsing

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};
use tracing::trace;

use crate::{
    cancel::CancelToken,
    error::WapiError,
    retry::RetryPolicy,
    transport::{Transport, WapiRequest, WapiResponse},
};

pub mod cert;
pub mod poll;
pub mod submit;
pub mod transfer;

pub const FILEOP_OBJECT: &str = "fileop";
pub const FUNCTION_PARAMETER: &str = "_function";

/// `_function` selectors understood by the `fileop` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum FileFunction {
    #[strum(serialize = "uploadinit")]
    UploadInit,
    #[strum(serialize = "csv_export")]
    CsvExport,
    #[strum(serialize = "csv_import")]
    CsvImport,
    #[strum(serialize = "csv_error_log")]
    CsvErrorLog,
    #[strum(serialize = "downloadcertificate")]
    DownloadCertificate,
    #[strum(serialize = "uploadcertificate")]
    UploadCertificate,
    #[strum(serialize = "generateselfsignedcert")]
    GenerateSelfSignedCert,
    #[strum(serialize = "generatecsr")]
    GenerateCsr,
    #[strum(serialize = "get_log_files")]
    GetLogFiles,
    #[strum(serialize = "get_support_bundle")]
    GetSupportBundle,
    #[strum(serialize = "getgriddata")]
    GetGridData,
    #[strum(serialize = "restoredatabase")]
    RestoreDatabase,
    #[strum(serialize = "getmemberdata")]
    GetMemberData,
    #[strum(serialize = "getleasehistoryfiles")]
    GetLeaseHistoryFiles,
    #[strum(serialize = "downloadcomplete")]
    DownloadComplete,
}

/// Issued by `uploadinit`. The token is echoed on the submit call, the URL receives the bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadToken {
    pub token: String,
    pub url: String,
}

/// Issued by every artifact-producing function. Consumed once: download, then acknowledge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    pub token: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

/// Handle returned by a CSV import submission, used only as a polling key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReference {
    pub csv_import_task: ObjectRef,
}

impl TaskReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            csv_import_task: ObjectRef {
                reference: reference.into(),
            },
        }
    }

    pub fn reference(&self) -> &str {
        &self.csv_import_task.reference
    }
}

/// What the transfer, submit and poll components share: the transport,
/// the retry policy and the cancellation scope of the current client.
#[derive(Clone)]
pub struct FileOpContext {
    transport: Arc<dyn Transport>,
    retry: Arc<RetryPolicy>,
    cancel: CancelToken,
}

impl FileOpContext {
    pub fn new(transport: Arc<dyn Transport>, retry: Arc<RetryPolicy>, cancel: CancelToken) -> Self {
        Self {
            transport,
            retry,
            cancel,
        }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub(crate) fn retry_handle(&self) -> Arc<RetryPolicy> {
        Arc::clone(&self.retry)
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn grid_mgr(&self) -> &str {
        self.transport.grid_mgr()
    }

    /// Send `request` through the retry policy, aborting on cancellation.
    pub(crate) async fn send(&self, request: WapiRequest) -> Result<WapiResponse, WapiError> {
        let short_path = short_path(&request);
        trace!("{} {}", request.method, short_path);
        self.cancel
            .guard(
                self.retry
                    .run(&short_path, || self.transport.request(request.clone())),
            )
            .await
    }

    /// POST `payload` to `fileop?_function=<function>` and decode the answer.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        function: FileFunction,
        payload: Value,
    ) -> Result<T, WapiError> {
        let request = fileop_request(function, payload);
        let short_path = short_path(&request);
        let response = self.send(request).await?;
        response.json().map_err(|source| WapiError::Decode {
            short_path,
            source,
        })
    }

    /// Like [`FileOpContext::call`] for functions whose answer carries nothing of interest.
    pub(crate) async fn call_unit(
        &self,
        function: FileFunction,
        payload: Value,
    ) -> Result<(), WapiError> {
        self.send(fileop_request(function, payload)).await?;
        Ok(())
    }
}

pub(crate) fn fileop_request(function: FileFunction, payload: Value) -> WapiRequest {
    WapiRequest::post(FILEOP_OBJECT, payload).param(FUNCTION_PARAMETER, function.to_string())
}

fn short_path(request: &WapiRequest) -> String {
    match request.param_value(FUNCTION_PARAMETER) {
        Some(function) => format!("{}?{}={}", request.path, FUNCTION_PARAMETER, function),
        None => request.path.clone(),
    }
}

/// Scripted transport shared by the unit tests of this module tree.
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::retry::{tests::RecordingSleeper, RetryConfig};
    use crate::transport::{ByteStream, TransportError};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Request(WapiRequest),
        Upload {
            url: String,
            filename: String,
            body: Bytes,
        },
        Download(String),
    }

    pub(crate) enum Reply {
        Json(Value),
        Fail(TransportError),
        Chunks(Vec<Result<Bytes, TransportError>>),
        /// Stream back the body of the most recent upload in small pieces.
        EchoUpload,
    }

    /// Replays canned replies in order and records every call.
    pub(crate) struct MockTransport {
        grid_mgr: String,
        replies: Mutex<VecDeque<Reply>>,
        pub(crate) calls: Mutex<Vec<Call>>,
    }

    impl MockTransport {
        pub(crate) fn new(grid_mgr: &str) -> Self {
            Self {
                grid_mgr: grid_mgr.to_string(),
                replies: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn reply(self, reply: Reply) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        pub(crate) fn json(self, value: Value) -> Self {
            self.reply(Reply::Json(value))
        }

        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        /// `_function` selectors of all fileop requests, in order.
        pub(crate) fn functions(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Request(request) => request
                        .param_value(FUNCTION_PARAMETER)
                        .map(|function| function.to_string()),
                    _ => None,
                })
                .collect()
        }

        fn next(&self) -> Reply {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Reply::Json(serde_json::json!({})))
        }

        fn answer(reply: Reply) -> Result<WapiResponse, TransportError> {
            match reply {
                Reply::Json(value) => Ok(WapiResponse::new(200, value.to_string())),
                Reply::Fail(e) => Err(e),
                Reply::Chunks(_) | Reply::EchoUpload => {
                    panic!("streaming reply scripted for a plain request")
                }
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn grid_mgr(&self) -> &str {
            &self.grid_mgr
        }

        async fn request(&self, request: WapiRequest) -> Result<WapiResponse, TransportError> {
            self.calls.lock().unwrap().push(Call::Request(request));
            Self::answer(self.next())
        }

        async fn upload(
            &self,
            url: &str,
            filename: &str,
            body: Bytes,
        ) -> Result<WapiResponse, TransportError> {
            self.calls.lock().unwrap().push(Call::Upload {
                url: url.to_string(),
                filename: filename.to_string(),
                body,
            });
            Self::answer(self.next())
        }

        async fn download(&self, url: &str) -> Result<ByteStream, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Download(url.to_string()));
            match self.next() {
                Reply::Chunks(chunks) => Ok(Box::pin(futures::stream::iter(chunks))),
                Reply::Fail(e) => Err(e),
                Reply::EchoUpload => {
                    let body = self
                        .calls()
                        .into_iter()
                        .rev()
                        .find_map(|call| match call {
                            Call::Upload { body, .. } => Some(body),
                            _ => None,
                        })
                        .unwrap_or_default();
                    let chunks: Vec<Result<Bytes, TransportError>> = body
                        .chunks(7)
                        .map(|piece| Ok(Bytes::copy_from_slice(piece)))
                        .collect();
                    Ok(Box::pin(futures::stream::iter(chunks)))
                }
                Reply::Json(value) => Ok(Box::pin(futures::stream::iter(vec![Ok(
                    Bytes::from(value.to_string()),
                )]))),
            }
        }
    }

    pub(crate) fn context(transport: Arc<MockTransport>) -> (FileOpContext, RecordingSleeper) {
        let sleeper = RecordingSleeper::default();
        let retry = RetryPolicy::with_sleeper(RetryConfig::default(), Box::new(sleeper.clone()));
        let context = FileOpContext::new(transport, Arc::new(retry), CancelToken::new());
        (context, sleeper)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_function_selectors_round_trip() {
        for function in FileFunction::iter() {
            let name = function.to_string();
            assert_eq!(FileFunction::from_str(&name).unwrap(), function);
        }
        assert_eq!(FileFunction::GenerateSelfSignedCert.to_string(), "generateselfsignedcert");
        assert_eq!(FileFunction::GetLogFiles.to_string(), "get_log_files");
    }

    #[test]
    fn test_task_reference_wire_shape() {
        let value = serde_json::json!({"csv_import_task": {"_ref": "csvimporttask/abc:1"}});
        let task: TaskReference = serde_json::from_value(value).unwrap();
        assert_eq!(task.reference(), "csvimporttask/abc:1");
    }

    #[tokio::test]
    async fn test_decode_failure_is_not_retried() {
        let transport = Arc::new(MockTransport::new("gm").json(serde_json::json!({"unexpected": 1})));
        let (context, sleeper) = context(transport.clone());
        let result: Result<UploadToken, WapiError> = context
            .call(FileFunction::UploadInit, serde_json::json!({"filename": "a"}))
            .await;
        match result {
            Err(WapiError::Decode { short_path, .. }) => {
                assert_eq!(short_path, "fileop?_function=uploadinit")
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(transport.calls().len(), 1);
        assert!(sleeper.seconds().is_empty());
    }
}
