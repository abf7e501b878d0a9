//! View changes requested by the session.
//!
//! The session never touches the page directly. Each confirmed transition is
//! described as a `ViewPatch`, which the platform applies to the DOM (or a
//! test records). Patches that target an element which is no longer on the
//! page are dropped by the platform.

use minicourse_common::{BlockId, Direction, EntityKind, ModuleId};

use crate::settings::CounterKind;
use crate::types::{FormField, NodeKind, NodeRef};

/// Where an AI suggestion is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionTarget {
    Outcome,
    Audience,
    Structure,
    /// The suggestion panel inside an image block.
    Image(BlockId),
}

impl SuggestionTarget {
    /// Element id of the page-level suggestion panels. Image suggestions live
    /// inside their block and have no id.
    pub fn element_id(&self) -> Option<&'static str> {
        match self {
            SuggestionTarget::Outcome => Some("ai-outcome-suggestion"),
            SuggestionTarget::Audience => Some("ai-audience-suggestion"),
            SuggestionTarget::Structure => Some("ai-structure-suggestion"),
            SuggestionTarget::Image(_) => None,
        }
    }
}

/// Suggestion panel content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionBody {
    /// Set as text content.
    Text(String),
    /// Markup produced by [`crate::render`], already escaped.
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPatch {
    // === Panels ===
    /// Hide every editor panel, then show this one.
    ShowPanel(NodeKind),
    HidePanel(NodeKind),
    SetField {
        field: FormField,
        value: String,
    },
    SetCounter {
        counter: CounterKind,
        text: String,
        over_limit: bool,
    },
    SetDocumentTitle(String),

    // === Structure tree ===
    /// Clear every active marking, then mark this node.
    MarkActive(NodeRef),
    SetNodeTitle {
        node: NodeRef,
        title: String,
    },
    AppendModule {
        html: String,
    },
    AppendLesson {
        module_id: ModuleId,
        html: String,
    },
    RemoveNode(NodeRef),
    /// Swap a module, lesson or block with its adjacent sibling.
    MoveItem {
        kind: EntityKind,
        id: i64,
        direction: Direction,
    },

    // === Content blocks ===
    /// Replace the whole block area.
    RenderBlocks {
        html: String,
    },
    /// Append one block, dropping the empty-lesson placeholder if shown.
    AppendBlock {
        html: String,
    },
    ReplaceBlock {
        block_id: BlockId,
        html: String,
    },
    RemoveBlock(BlockId),
    AppendQuizOption {
        block_id: BlockId,
        html: String,
    },
    RemoveQuizOption {
        block_id: BlockId,
        index: usize,
    },

    // === AI ===
    ShowSuggestion {
        target: SuggestionTarget,
        body: SuggestionBody,
    },
    ShowModal {
        html: String,
    },
    /// Hide the modal and reset it to [`crate::render::MODAL_RESET_HTML`].
    HideModal,
}
