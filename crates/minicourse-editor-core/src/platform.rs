//! Platform abstraction traits for the editor page.
//!
//! These traits define the interface between the editor logic and the page it
//! drives. The browser implementation talks to the DOM and to Quill; tests
//! record what the session asked for.

use miette::Diagnostic;
use minicourse_common::{BlockId, BlockType};

use crate::blocks::BlockForm;
use crate::patch::ViewPatch;
use crate::types::FormField;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
#[error("platform error: {0}")]
#[diagnostic(code(minicourse::platform))]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// A rich-text editor instance bound to one container element.
pub trait RichTextEditor {
    /// Current content as an HTML fragment.
    fn html(&self) -> String;

    /// Replace the displayed content with an HTML fragment.
    fn set_html(&self, html: &str);

    /// Replace the displayed content with plain text.
    fn set_text(&self, text: &str);
}

/// Page services the editor session needs.
///
/// Reads return `None` when the element is absent; the session treats that
/// as "nothing to do" rather than as a failure.
pub trait Platform {
    type RichText: RichTextEditor;

    /// Blocking notification.
    fn alert(&self, message: &str);

    /// Blocking yes/no question.
    fn confirm(&self, message: &str) -> bool;

    /// Create a rich-text editor in the element with id `container_id`.
    ///
    /// `Ok(None)` if no such element exists.
    fn create_rich_text(&self, container_id: &str)
    -> Result<Option<Self::RichText>, PlatformError>;

    /// Current value of a form field.
    fn read_field(&self, field: FormField) -> Option<String>;

    /// Current state of a block's non-rich-text form.
    fn read_block(&self, block_id: BlockId, block_type: &BlockType) -> Option<BlockForm>;

    /// Apply one view change.
    fn apply(&self, patch: ViewPatch);
}

/// The control that started an AI request.
///
/// It is put into a busy state for the duration of the request and restored
/// afterwards, whatever the outcome.
pub trait TriggerControl {
    fn set_busy(&self, label: &str);
    fn restore(&self);
}

/// Requests that are not started from a button (concept explanations).
impl TriggerControl for () {
    fn set_busy(&self, _label: &str) {}
    fn restore(&self) {}
}

impl<T: TriggerControl> TriggerControl for &T {
    fn set_busy(&self, label: &str) {
        (*self).set_busy(label)
    }

    fn restore(&self) {
        (*self).restore()
    }
}
