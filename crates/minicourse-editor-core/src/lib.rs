//! minicourse-editor-core: editor page logic without DOM dependencies.
//!
//! This crate provides:
//! - `StructureTree` and `BlockList`: local mirrors of the course outline and
//!   the open lesson's content blocks
//! - `RichTextRegistry`: one rich-text editor per container id
//! - `Platform`: the seam to the DOM (alerts, rich-text editors, form reads,
//!   `ViewPatch` application)
//! - `ClickTarget` → `Action` resolution for delegated click handling
//! - `EditorSession`: owns the page state and runs every operation against
//!   a `CourseApi + AiApi` backend

pub mod actions;
pub mod ai;
pub mod blocks;
pub mod error;
pub mod ordering;
pub mod patch;
pub mod platform;
pub mod registry;
pub mod render;
pub mod session;
pub mod settings;
pub mod tree;
pub mod types;

pub use actions::{Action, BlockAction, ClickTarget, PanelAction, StructureAction};
pub use ai::{AiTrigger, BusyGuard};
pub use blocks::{BlockEditor, BlockForm, BlockList};
pub use error::EditorError;
pub use patch::{SuggestionBody, SuggestionTarget, ViewPatch};
pub use platform::{Platform, PlatformError, RichTextEditor, TriggerControl};
pub use registry::RichTextRegistry;
pub use session::{EditorSession, EditorState};
pub use settings::{CharCounter, CounterKind};
pub use smol_str::SmolStr;
pub use tree::{LessonNode, ModuleNode, StructureTree};
pub use types::{FormField, NodeKind, NodeRef};

pub use minicourse_common as common;
