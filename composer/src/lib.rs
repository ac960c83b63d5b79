//! Editor-state core for a rich prompt composer.
//!
//! This crate holds everything an AI-input surface needs short of the
//! rendering host: a rich inline document behind the engine trait from
//! `promptline-engine`, `@`-mention and `/`-command suggestion popups, a
//! slash-command template set, an attachment upload manager, shell-style
//! prompt history, a pluggable chip renderer registry, and the session
//! context that ties them together and enforces the submit gate.
//!
//! Hosts own the event loop and the frame; they feed key events into
//! [`SessionContext::handle_key_event`], draw [`Composer::document_lines`]
//! and the popup wherever they anchor it, and receive a [`SubmitPayload`]
//! when a submit passes the gate.

mod attachments;
mod composer;
mod history;
mod registry;
mod session;
mod shortcuts;
mod suggestion;

pub use attachments::Attachment;
pub use attachments::AttachmentId;
pub use attachments::AttachmentList;
pub use attachments::FileSource;
pub use attachments::ProgressFn;
pub use attachments::UploadHandler;
pub use attachments::UploadResult;
pub use attachments::UploadStatus;
pub use composer::Composer;
pub use composer::ComposerParams;
pub use composer::DEFAULT_PLACEHOLDER;
pub use composer::INTERNAL_REF_MIME;
pub use composer::InputResult;
pub use registry::ContextItemActions;
pub use registry::ContextItemProps;
pub use registry::ContextItemRegistry;
pub use registry::ContextItemRenderer;
pub use registry::DEFAULT_KIND;
pub use registry::EntryMeta;
pub use registry::NoopActions;
pub use registry::RegistryEntry;
pub use registry::RendererLoader;
pub use session::SessionConfig;
pub use session::SessionContext;
pub use session::SessionError;
pub use session::SubmitCallback;
pub use session::SubmitPayload;
pub use shortcuts::PromptShortcut;
pub use shortcuts::Template;
pub use shortcuts::default_shortcuts;
pub use suggestion::ActiveTrigger;
pub use suggestion::MentionCandidate;
pub use suggestion::SuggestionKind;
pub use suggestion::find_active_trigger;
