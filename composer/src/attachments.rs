//! Attachment list and upload lifecycle.
//!
//! [`AttachmentList`] owns every file the user has attached and drives each
//! one through the upload state machine:
//!
//! - no handler configured: attachments are marked done immediately (local
//!   mode, nothing to upload);
//! - handler configured: pending -> uploading -> done | error, with progress
//!   reported through a callback the handler may call any number of times.
//!
//! `add_files` appends attachments in input order, then processes all new
//! attachments concurrently and resolves only once every one of them has
//! reached a terminal status. Handler failures are caught per attachment and
//! surfaced as `UploadStatus::Error`; they never propagate to the caller.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Opaque locally generated attachment identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttachmentId(String);

impl AttachmentId {
    fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An owned byte handle for a user-added file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSource {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileSource {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Server-side result of a completed upload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Uploading,
    Done,
    Error,
}

/// One locally tracked file, pending or completed upload.
#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub id: AttachmentId,
    /// Original bytes; absent once the attachment is purely
    /// server-represented.
    pub source: Option<FileSource>,
    pub name: String,
    pub mime_type: String,
    pub status: UploadStatus,
    /// 0-100, monotonically non-decreasing while uploading.
    pub progress: u8,
    /// Present iff `status` is [`UploadStatus::Error`].
    pub error: Option<String>,
    /// Present iff `status` is [`UploadStatus::Done`].
    pub server_result: Option<UploadResult>,
}

impl Attachment {
    fn from_source(source: FileSource) -> Self {
        Self {
            id: AttachmentId::new(),
            name: source.name.clone(),
            mime_type: source.mime_type.clone(),
            source: Some(source),
            status: UploadStatus::Pending,
            progress: 0,
            error: None,
            server_result: None,
        }
    }
}

/// Progress reporter handed to upload handlers. Values are clamped to 0-100
/// and applied monotonically.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Caller-supplied upload transport. Must eventually settle; an `Err` fails
/// the attachment.
#[async_trait]
pub trait UploadHandler: Send + Sync {
    async fn upload(&self, file: &FileSource, progress: ProgressFn) -> Result<UploadResult>;
}

/// The attachment upload manager. Cheap to clone; clones share the list.
#[derive(Clone, Default)]
pub struct AttachmentList {
    files: Arc<Mutex<Vec<Attachment>>>,
    handler: Option<Arc<dyn UploadHandler>>,
}

fn lock(files: &Mutex<Vec<Attachment>>) -> MutexGuard<'_, Vec<Attachment>> {
    files.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AttachmentList {
    pub fn new(handler: Option<Arc<dyn UploadHandler>>) -> Self {
        Self {
            files: Arc::new(Mutex::new(Vec::new())),
            handler,
        }
    }

    /// Append one pending attachment per input file (input order), then
    /// process every new attachment concurrently. Resolves once all new
    /// attachments are done or errored; returns their ids.
    ///
    /// TODO: enforce accept/max_size/max_files here before creating
    /// attachments; the limits are currently declared on the session config
    /// but not checked, matching the observed upstream behavior.
    pub async fn add_files(&self, sources: Vec<FileSource>) -> Vec<AttachmentId> {
        let ids: Vec<AttachmentId> = {
            let mut files = lock(&self.files);
            sources
                .into_iter()
                .map(|source| {
                    let attachment = Attachment::from_source(source);
                    let id = attachment.id.clone();
                    files.push(attachment);
                    id
                })
                .collect()
        };

        join_all(ids.iter().map(|id| self.process(id))).await;
        ids
    }

    /// Re-run processing for a failed (or any existing) attachment. No-op
    /// when the id is unknown. Independent of any in-flight batch.
    pub async fn retry_upload(&self, id: &AttachmentId) {
        let known = lock(&self.files).iter().any(|f| &f.id == id);
        if known {
            self.process(id).await;
        }
    }

    /// Remove by id; idempotent.
    pub fn remove_file(&self, id: &AttachmentId) {
        lock(&self.files).retain(|f| &f.id != id);
    }

    /// Empty the list unconditionally.
    pub fn clear_files(&self) {
        lock(&self.files).clear();
    }

    /// True iff any attachment is currently uploading. Recomputed on read.
    pub fn is_uploading(&self) -> bool {
        lock(&self.files)
            .iter()
            .any(|f| f.status == UploadStatus::Uploading)
    }

    /// True iff any attachment ended in error status.
    pub fn has_errors(&self) -> bool {
        lock(&self.files)
            .iter()
            .any(|f| f.status == UploadStatus::Error)
    }

    pub fn len(&self) -> usize {
        lock(&self.files).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.files).is_empty()
    }

    /// Snapshot of the current attachment list, in insertion order.
    pub fn snapshot(&self) -> Vec<Attachment> {
        lock(&self.files).clone()
    }

    /// Drive one attachment to a terminal status.
    async fn process(&self, id: &AttachmentId) {
        let Some(handler) = self.handler.clone() else {
            self.mark_done_local(id);
            return;
        };

        let source = {
            let mut files = lock(&self.files);
            let Some(attachment) = files.iter_mut().find(|f| &f.id == id) else {
                return;
            };
            let Some(source) = attachment.source.clone() else {
                // Nothing left to upload; treat as already resolved.
                attachment.status = UploadStatus::Done;
                attachment.progress = 100;
                return;
            };
            attachment.status = UploadStatus::Uploading;
            attachment.progress = 0;
            attachment.error = None;
            source
        };

        let progress: ProgressFn = {
            let files = Arc::clone(&self.files);
            let id = id.clone();
            Arc::new(move |value| {
                let mut files = lock(&files);
                if let Some(attachment) = files.iter_mut().find(|f| f.id == id)
                    && attachment.status == UploadStatus::Uploading
                {
                    attachment.progress = attachment.progress.max(value.min(100));
                }
            })
        };

        match handler.upload(&source, progress).await {
            Ok(result) => {
                let mut files = lock(&self.files);
                if let Some(attachment) = files.iter_mut().find(|f| &f.id == id) {
                    attachment.status = UploadStatus::Done;
                    attachment.progress = 100;
                    attachment.server_result = Some(result);
                } else {
                    tracing::debug!("attachment {id} removed while uploading");
                }
            }
            Err(err) => {
                tracing::error!("upload failed for {}: {err:#}", source.name);
                let mut files = lock(&self.files);
                if let Some(attachment) = files.iter_mut().find(|f| &f.id == id) {
                    attachment.status = UploadStatus::Error;
                    attachment.error = Some(format!("{err:#}"));
                }
            }
        }
    }

    fn mark_done_local(&self, id: &AttachmentId) {
        let mut files = lock(&self.files);
        if let Some(attachment) = files.iter_mut().find(|f| &f.id == id) {
            attachment.status = UploadStatus::Done;
            attachment.progress = 100;
        }
    }
}
