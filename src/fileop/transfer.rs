//! Two-phase upload and download through `fileop`.
//!
//! Upload: `uploadinit` hands out a token and a URL, the file body is then
//! POSTed to that URL. Download: the server-issued URL is streamed to disk,
//! then `downloadcomplete` releases the server-side temp file.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::StreamExt;
use serde_json::json;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

use super::{DownloadDescriptor, FileFunction, FileOpContext, UploadToken};
use crate::{
    error::{PreconditionError, WapiError},
    transport::TransportError,
    url_rewrite::rewrite_url,
};

pub const DEFAULT_CHUNK_SIZE: usize = 1024;
const FALLBACK_FILENAME: &str = "download";

/// The server's job manager treats hyphens specially in generated names.
pub fn sanitize_filename(filename: &str) -> String {
    filename.replace('-', "_")
}

/// Lower-cased last path segment of `url`, ignoring query and fragment.
pub fn filename_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split_once("://").map(|(_, rest)| rest).unwrap_or(path);
    let (_, path) = path.split_once('/')?;
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_lowercase)
}

/// Final component of a server-supplied name, so the file stays in the target directory.
pub fn local_filename(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct FileTransfer {
    context: FileOpContext,
    chunk_size: usize,
}

impl FileTransfer {
    pub fn new(context: FileOpContext) -> Self {
        Self {
            context,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Phase 1 of an upload.
    pub async fn init_upload(&self, filename: &str) -> Result<UploadToken, WapiError> {
        let filename = sanitize_filename(filename);
        debug!("Initializing upload of {}", filename);
        self.context
            .call(FileFunction::UploadInit, json!({ "filename": filename }))
            .await
    }

    /// Phase 2 of an upload. Not retried: a failed transfer needs a fresh token.
    pub async fn send_bytes(
        &self,
        token: &UploadToken,
        filename: &str,
        body: Bytes,
    ) -> Result<(), WapiError> {
        let url = rewrite_url(&token.url, self.context.grid_mgr());
        debug!("Uploading {} bytes to {}", body.len(), url);
        let transport = self.context.transport();
        self.context
            .cancel_token()
            .guard(async {
                transport
                    .upload(&url, filename, body)
                    .await
                    .map(|_| ())
                    .map_err(|source| WapiError::Request {
                        short_path: url.clone(),
                        attempts: 1,
                        source,
                    })
            })
            .await
    }

    /// Both upload phases for a local file. Returns the token to submit with.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadToken, WapiError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PreconditionError::FileNotFound(path.to_path_buf()).into())
            }
            Err(e) => return Err(WapiError::io(path, e)),
        };
        if !metadata.is_file() {
            return Err(PreconditionError::NotAFile(path.to_path_buf()).into());
        }
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| PreconditionError::InvalidValue {
                field: "filename".to_string(),
                value: path.display().to_string(),
            })?
            .to_string();

        let body = tokio::fs::read(path)
            .await
            .map_err(|e| WapiError::io(path, e))?;

        let token = self.init_upload(&filename).await?;
        self.send_bytes(&token, &sanitize_filename(&filename), Bytes::from(body))
            .await?;
        Ok(token)
    }

    /// Download phase 1: stream `url` into `dest`. Returns the byte count.
    ///
    /// A partially written file is removed if the stream fails or the
    /// operation is cancelled.
    pub async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, WapiError> {
        let url = rewrite_url(url, self.context.grid_mgr());
        debug!("Downloading {} to {:?}", url, dest);

        let transport = self.context.transport();
        let mut stream = self
            .context
            .cancel_token()
            .guard(
                self.context
                    .retry()
                    .run(&url, || transport.download(&url)),
            )
            .await?;

        let mut file = File::create(dest)
            .await
            .map_err(|e| WapiError::io(dest, e))?;

        let result: Result<u64, WapiError> = async {
            let mut written = 0u64;
            loop {
                let chunk = tokio::select! {
                    biased;
                    _ = self.context.cancel_token().cancelled() => return Err(WapiError::Cancelled),
                    chunk = stream.next() => chunk,
                };
                let chunk = match chunk {
                    Some(chunk) => chunk.map_err(|source| stream_error(&url, source))?,
                    None => break,
                };
                for piece in chunk.chunks(self.chunk_size) {
                    file.write_all(piece)
                        .await
                        .map_err(|e| WapiError::io(dest, e))?;
                    written += piece.len() as u64;
                }
                trace!("{} bytes written to {:?}", written, dest);
            }
            file.flush().await.map_err(|e| WapiError::io(dest, e))?;
            Ok(written)
        }
        .await;
        drop(file);

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(dest).await {
                warn!("Failed to remove partial download {:?}: {}", dest, e);
            }
        }
        result
    }

    /// Download phase 2: release the server-side resource behind `token`.
    pub async fn acknowledge_complete(&self, token: &str) -> Result<(), WapiError> {
        self.context
            .call_unit(FileFunction::DownloadComplete, json!({ "token": token }))
            .await
    }

    /// Both download phases for a descriptor.
    ///
    /// The file lands in `dest_dir` under `filename`, else the descriptor's
    /// filename, else the lower-cased last URL segment. Names from the server
    /// are reduced to their final path component. The acknowledgement
    /// is sent once, even when the transfer failed, and its own failure is
    /// only logged: the file on disk stays valid.
    pub async fn download(
        &self,
        descriptor: &DownloadDescriptor,
        dest_dir: &Path,
        filename: Option<&str>,
    ) -> Result<PathBuf, WapiError> {
        let name = filename
            .map(str::to_string)
            .or_else(|| descriptor.filename.as_deref().and_then(local_filename))
            .or_else(|| filename_from_url(&descriptor.url).as_deref().and_then(local_filename))
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
        let dest = dest_dir.join(name);

        let fetched = self.fetch_to_file(&descriptor.url, &dest).await;

        if let Err(e) = self.acknowledge_complete(&descriptor.token).await {
            warn!(
                "Download of {:?} finished but releasing the server copy failed: {}",
                dest,
                crate::error_utils::error_chain(&e)
            );
        }

        let bytes = fetched?;
        debug!("Downloaded {} bytes to {:?}", bytes, dest);
        Ok(dest)
    }
}

fn stream_error(url: &str, source: TransportError) -> WapiError {
    WapiError::Request {
        short_path: url.to_string(),
        attempts: 1,
        source,
    }
}
