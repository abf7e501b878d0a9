//! `Platform` implementation for the live editor page.

use web_sys::{Document, Window};

use minicourse_editor_core::common::{BlockId, BlockType};
use minicourse_editor_core::{BlockForm, FormField, Platform, PlatformError, ViewPatch};

use crate::dom::{block_selector, by_id, is_checked, query, query_all, query_doc, value};
use crate::dom_sync::apply_patch;
use crate::quill::QuillEditor;

/// The editor page: blocking dialogs through `window`, everything else
/// through `document`.
pub struct BrowserPlatform {
    window: Window,
    document: Document,
}

impl BrowserPlatform {
    pub fn new() -> Result<Self, PlatformError> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        Ok(Self { window, document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn field_value(&self, root: &web_sys::Element, selector: &str) -> String {
        query(root, selector)
            .and_then(|el| value(&el))
            .unwrap_or_default()
    }
}

impl Platform for BrowserPlatform {
    type RichText = QuillEditor;

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            tracing::warn!("alert failed: {:?}", e);
        }
    }

    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn create_rich_text(&self, container_id: &str) -> Result<Option<QuillEditor>, PlatformError> {
        match by_id(&self.document, container_id) {
            Some(container) => QuillEditor::attach(&container).map(Some),
            None => Ok(None),
        }
    }

    fn read_field(&self, field: FormField) -> Option<String> {
        query_doc(&self.document, field.selector()).and_then(|el| value(&el))
    }

    fn read_block(&self, block_id: BlockId, block_type: &BlockType) -> Option<BlockForm> {
        let block = query_doc(&self.document, &block_selector(block_id))?;
        match block_type {
            BlockType::Image => Some(BlockForm::Image {
                url: self.field_value(&block, ".image-url"),
                alt: self.field_value(&block, ".image-alt"),
            }),
            BlockType::Video => Some(BlockForm::Video {
                url: self.field_value(&block, ".video-url"),
            }),
            BlockType::Quiz => {
                let rows = query_all(&block, ".quiz-option-item");
                let options = rows
                    .iter()
                    .map(|row| self.field_value(row, ".quiz-option-text"))
                    .collect();
                let radio = format!("input[name=\"correct_answer_{block_id}\"]");
                let checked = rows
                    .iter()
                    .position(|row| query(row, &radio).is_some_and(|r| is_checked(&r)));
                Some(BlockForm::Quiz {
                    question: self.field_value(&block, ".quiz-question"),
                    kind: self.field_value(&block, ".quiz-type"),
                    options,
                    checked,
                })
            }
            BlockType::Text | BlockType::Action | BlockType::Unsupported(_) => None,
        }
    }

    fn apply(&self, patch: ViewPatch) {
        apply_patch(&self.document, patch);
    }
}
