//! Rich-text editor instances by container id.

use std::collections::HashMap;

use minicourse_common::{BlockId, CourseSection};
use smol_str::{SmolStr, format_smolstr};

use crate::platform::{PlatformError, RichTextEditor};

/// Container id of a text or action block's editor.
pub fn block_container_id(block_id: BlockId) -> SmolStr {
    format_smolstr!("block-editor-{}", block_id)
}

/// Container id of the intro or conclusion editor.
pub fn section_container_id(section: CourseSection) -> &'static str {
    match section {
        CourseSection::Intro => "intro-content-editor",
        CourseSection::Conclusion => "conclusion-content-editor",
    }
}

/// At most one editor per container id.
#[derive(Debug)]
pub struct RichTextRegistry<R> {
    editors: HashMap<SmolStr, R>,
}

impl<R> Default for RichTextRegistry<R> {
    fn default() -> Self {
        Self {
            editors: HashMap::new(),
        }
    }
}

impl<R: RichTextEditor> RichTextRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `html` in the editor for `container_id`, creating it on first use.
    ///
    /// An existing instance is reused and only its content replaced. Returns
    /// false when the container is not on the page.
    pub fn init(
        &mut self,
        container_id: &str,
        html: &str,
        create: impl FnOnce(&str) -> Result<Option<R>, PlatformError>,
    ) -> Result<bool, PlatformError> {
        if let Some(editor) = self.editors.get(container_id) {
            editor.set_html(html);
            return Ok(true);
        }
        let Some(editor) = create(container_id)? else {
            tracing::debug!(container_id, "rich-text container not found");
            return Ok(false);
        };
        editor.set_html(html);
        self.editors.insert(SmolStr::new(container_id), editor);
        Ok(true)
    }

    pub fn get(&self, container_id: &str) -> Option<&R> {
        self.editors.get(container_id)
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.editors.contains_key(container_id)
    }

    /// Forget an editor whose container left the page.
    pub fn remove(&mut self, container_id: &str) -> Option<R> {
        self.editors.remove(container_id)
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}
