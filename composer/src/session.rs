//! Session context: one shared surface tying the composer, the attachment
//! list and the renderer registry together, and the single place the submit
//! gate is enforced.
//!
//! The context outlives any individual editor session; `mount` installs an
//! engine and `unmount` releases it. Every accessor that needs a live
//! session returns [`SessionError::NotMounted`] instead of panicking.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use promptline_engine::Document;
use promptline_engine::EditorEngine;
use thiserror::Error;

use crate::attachments::Attachment;
use crate::attachments::AttachmentId;
use crate::attachments::AttachmentList;
use crate::attachments::FileSource;
use crate::attachments::UploadHandler;
use crate::composer::Composer;
use crate::composer::ComposerParams;
use crate::composer::InputResult;
use crate::registry::ContextItemRegistry;
use crate::shortcuts::PromptShortcut;
use crate::shortcuts::default_shortcuts;
use crate::suggestion::MentionCandidate;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no editor session is mounted")]
    NotMounted,
}

/// Host-facing configuration, fixed for the lifetime of the context except
/// for `disabled` and `loading`, which the host may toggle at any time.
pub struct SessionConfig {
    /// Host-driven hard disable; blocks submit while set.
    pub disabled: bool,
    /// Host-driven busy flag (e.g. a response is streaming); blocks submit
    /// while set.
    pub loading: bool,
    pub placeholder: Option<String>,
    /// Accepted file patterns (e.g. `"image/*,.pdf"`). Declared so hosts can
    /// surface them in pickers; not enforced on add.
    pub accept: Option<String>,
    /// Per-file size limit in bytes. Declared, not enforced on add.
    pub max_size: Option<u64>,
    /// Attachment count limit. Declared, not enforced on add.
    pub max_files: Option<usize>,
    /// Prompt history, oldest to newest. Read-only to the context.
    pub history: Vec<String>,
    pub shortcuts: Vec<PromptShortcut>,
    pub mention_candidates: Vec<MentionCandidate>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            loading: false,
            placeholder: None,
            accept: None,
            max_size: None,
            max_files: None,
            history: Vec::new(),
            shortcuts: default_shortcuts(),
            mention_candidates: Vec::new(),
        }
    }
}

/// What the host receives on a successful submit.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitPayload {
    /// Full rich document, chips included.
    pub document: Document,
    /// Plain-text projection of the document.
    pub text: String,
    /// Attachment snapshot at submit time.
    pub attachments: Vec<Attachment>,
}

pub type SubmitCallback = Box<dyn FnMut(SubmitPayload) + Send>;

pub struct SessionContext {
    config: SessionConfig,
    pub attachments: AttachmentList,
    pub registry: ContextItemRegistry,
    composer: Option<Composer>,
    on_submit: Option<SubmitCallback>,
}

impl SessionContext {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            attachments: AttachmentList::new(None),
            registry: ContextItemRegistry::new(),
            composer: None,
            on_submit: None,
        }
    }

    /// Route uploads through the given transport instead of resolving
    /// attachments locally. Replaces the attachment list; call before any
    /// files are added.
    pub fn with_upload_handler(mut self, handler: Arc<dyn UploadHandler>) -> Self {
        self.attachments = AttachmentList::new(Some(handler));
        self
    }

    pub fn on_submit(&mut self, callback: impl FnMut(SubmitPayload) + Send + 'static) {
        self.on_submit = Some(Box::new(callback));
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.config.loading = loading;
    }

    // ------------------------------------------------------------------
    // Derived flags, recomputed on every read
    // ------------------------------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.config.loading
    }

    pub fn is_disabled(&self) -> bool {
        self.config.disabled || self.config.loading
    }

    pub fn is_uploading(&self) -> bool {
        self.attachments.is_uploading()
    }

    /// True when there is nothing to send: document empty (or no session)
    /// and no attachments.
    pub fn is_empty(&self) -> bool {
        self.composer
            .as_ref()
            .is_none_or(|composer| composer.is_empty())
            && self.attachments.is_empty()
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Install an engine, replacing (and destroying) any current session.
    pub fn mount(&mut self, engine: Box<dyn EditorEngine>) {
        self.unmount();
        let mut composer = Composer::new(
            engine,
            ComposerParams {
                placeholder: self.config.placeholder.clone(),
                history: self.config.history.clone(),
                shortcuts: self.config.shortcuts.clone(),
                mention_candidates: self.config.mention_candidates.clone(),
            },
        );
        composer.focus();
        self.composer = Some(composer);
    }

    /// Release the current session. Idempotent.
    pub fn unmount(&mut self) {
        if let Some(mut composer) = self.composer.take() {
            composer.destroy();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.composer.is_some()
    }

    pub fn composer(&self) -> Result<&Composer, SessionError> {
        self.composer.as_ref().ok_or(SessionError::NotMounted)
    }

    pub fn composer_mut(&mut self) -> Result<&mut Composer, SessionError> {
        self.composer.as_mut().ok_or(SessionError::NotMounted)
    }

    // ------------------------------------------------------------------
    // Key routing and the submit gate
    // ------------------------------------------------------------------

    /// Route a key through the composer. A submit request that passes the
    /// gate fires the callback and comes back as `Submitted`; one the gate
    /// blocks is consumed and comes back as `Handled`.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<InputResult, SessionError> {
        let result = self.composer_mut()?.handle_key_event(key);
        if result != InputResult::Submitted {
            return Ok(result);
        }
        if self.submit()? {
            Ok(InputResult::Submitted)
        } else {
            Ok(InputResult::Handled)
        }
    }

    /// Submit gate: mounted, not disabled, something to send, no upload in
    /// flight, no attachment stuck in error.
    pub fn can_submit(&self) -> bool {
        self.is_mounted()
            && !self.is_disabled()
            && !self.is_empty()
            && !self.attachments.is_uploading()
            && !self.attachments.has_errors()
    }

    /// Fire the submit callback if the gate passes. On success the document
    /// is echoed into history recall, then the composer and the attachment
    /// list are cleared. Returns whether a submit actually happened.
    pub fn submit(&mut self) -> Result<bool, SessionError> {
        if !self.is_mounted() {
            return Err(SessionError::NotMounted);
        }
        if !self.can_submit() {
            tracing::debug!("submit blocked: empty document or upload in flight");
            return Ok(false);
        }
        let payload = {
            let composer = self.composer_mut()?;
            let document = composer.document();
            let text = document.to_plain_text();
            composer.record_submission(&text);
            composer.clear();
            SubmitPayload {
                document,
                text,
                attachments: self.attachments.snapshot(),
            }
        };
        self.attachments.clear_files();
        if let Some(callback) = self.on_submit.as_mut() {
            callback(payload);
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // File intake
    // ------------------------------------------------------------------

    /// OS files dropped onto the surface become attachments. Resolves when
    /// every file has reached a terminal upload status.
    pub async fn handle_os_file_drop(&self, files: Vec<FileSource>) -> Vec<AttachmentId> {
        self.attachments.add_files(files).await
    }

    /// Pasted file payloads take the same path as drops.
    pub async fn handle_paste_files(&self, files: Vec<FileSource>) -> Vec<AttachmentId> {
        self.attachments.add_files(files).await
    }

    pub fn remove_file(&self, id: &AttachmentId) {
        self.attachments.remove_file(id);
    }

    pub async fn retry_upload(&self, id: &AttachmentId) {
        self.attachments.retry_upload(id).await;
    }

    pub fn focus(&mut self) -> Result<(), SessionError> {
        self.composer_mut()?.focus();
        Ok(())
    }
}
