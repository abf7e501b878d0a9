//! Click resolution for delegated event handling.
//!
//! The browser layer listens once per region and reduces the clicked
//! element's ancestry to a [`ClickTarget`]. [`ClickTarget::resolve`] turns
//! that into the one [`Action`] the click means, if any.

use minicourse_common::{BlockId, CourseSection, Direction, ModuleId};
use smol_str::SmolStr;

use crate::ai::AiTrigger;
use crate::types::NodeRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureAction {
    Select(NodeRef),
    Move { node: NodeRef, direction: Direction },
    Delete(NodeRef),
    AddModule,
    AddLesson(ModuleId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAction {
    Save(BlockId),
    Delete(BlockId),
    Move { id: BlockId, direction: Direction },
    /// Add a block of the type picked on the page to the current lesson.
    Add,
    AddOption(BlockId),
    RemoveOption { id: BlockId, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    SaveSettings,
    SaveSection(CourseSection),
    SaveModuleTitle,
    SaveLessonTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Structure(StructureAction),
    Block(BlockAction),
    Panel(PanelAction),
    Ai(AiTrigger),
    CloseModal,
}

/// What was clicked, reduced from DOM ancestry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickTarget {
    /// `id` of the clicked control (the closest button, or the element itself).
    pub control_id: Option<SmolStr>,
    /// Class list of the clicked control.
    pub control_classes: Vec<SmolStr>,
    /// Closest structure node (`li[data-type]`).
    pub node: Option<NodeRef>,
    /// Inside a node's `.actions` toolbar or on an add-lesson button.
    pub in_node_controls: bool,
    /// `data-module-id` of the clicked control.
    pub module_id: Option<ModuleId>,
    /// Closest `.content-block`.
    pub block_id: Option<BlockId>,
    /// Position of the closest `.quiz-option-item` among its siblings.
    pub option_index: Option<usize>,
    /// `data-concept` of the closest `.tooltip-container`.
    pub concept: Option<SmolStr>,
    /// The modal backdrop itself, not its content.
    pub modal_backdrop: bool,
    /// A control carrying `data-dismiss="modal"`.
    pub modal_dismiss: bool,
}

impl ClickTarget {
    pub fn has_class(&self, class: &str) -> bool {
        self.control_classes.iter().any(|c| c == class)
    }

    fn has_id(&self, id: &str) -> bool {
        self.control_id.as_deref() == Some(id)
    }

    /// Name of the AI control that was clicked, if it is one.
    fn ai_control(&self) -> Option<&str> {
        if !self.has_class("ai-btn") {
            return None;
        }
        self.control_id
            .as_deref()
            .filter(|id| id.starts_with("ai-"))
            .or_else(|| {
                self.control_classes
                    .iter()
                    .map(SmolStr::as_str)
                    .find(|c| *c != "ai-btn" && c.starts_with("ai-") && c.ends_with("-btn"))
            })
    }

    /// Explicit controls win over the node or block they sit in; a click
    /// anywhere else on a structure node selects it.
    pub fn resolve(&self) -> Option<Action> {
        if self.modal_dismiss || self.modal_backdrop {
            return Some(Action::CloseModal);
        }

        if let Some(name) = self.ai_control() {
            return AiTrigger::from_control(name, self.block_id).map(Action::Ai);
        }

        if let Some(action) = self.structure_control() {
            return Some(Action::Structure(action));
        }

        if let Some(action) = self.block_control() {
            return Some(Action::Block(action));
        }

        if let Some(action) = self.panel_control() {
            return Some(Action::Panel(action));
        }

        if let Some(concept) = self.concept.as_ref().filter(|c| !c.is_empty()) {
            return Some(Action::Ai(AiTrigger::Explain {
                concept: concept.clone(),
            }));
        }

        match self.node {
            Some(node) if !self.in_node_controls => {
                Some(Action::Structure(StructureAction::Select(node)))
            }
            _ => None,
        }
    }

    fn structure_control(&self) -> Option<StructureAction> {
        if self.has_id("add-module-btn") {
            return Some(StructureAction::AddModule);
        }
        if self.has_class("add-lesson-btn") {
            return self.module_id.map(StructureAction::AddLesson);
        }
        let node = self.node?;
        if self.has_class("move-up") {
            Some(StructureAction::Move {
                node,
                direction: Direction::Up,
            })
        } else if self.has_class("move-down") {
            Some(StructureAction::Move {
                node,
                direction: Direction::Down,
            })
        } else if self.has_class("delete-item") {
            Some(StructureAction::Delete(node))
        } else {
            None
        }
    }

    fn block_control(&self) -> Option<BlockAction> {
        if self.has_id("add-content-block-btn") {
            return Some(BlockAction::Add);
        }
        let id = self.block_id?;
        if self.has_class("save-block-btn") {
            Some(BlockAction::Save(id))
        } else if self.has_class("delete-block-btn") {
            Some(BlockAction::Delete(id))
        } else if self.has_class("move-block-up") {
            Some(BlockAction::Move {
                id,
                direction: Direction::Up,
            })
        } else if self.has_class("move-block-down") {
            Some(BlockAction::Move {
                id,
                direction: Direction::Down,
            })
        } else if self.has_class("add-option-btn") {
            Some(BlockAction::AddOption(id))
        } else if self.has_class("remove-option-btn") {
            self.option_index
                .map(|index| BlockAction::RemoveOption { id, index })
        } else {
            None
        }
    }

    fn panel_control(&self) -> Option<PanelAction> {
        if self.has_class("save-settings-btn") {
            Some(PanelAction::SaveSettings)
        } else if self.has_class("save-intro-btn") {
            Some(PanelAction::SaveSection(CourseSection::Intro))
        } else if self.has_class("save-conclusion-btn") {
            Some(PanelAction::SaveSection(CourseSection::Conclusion))
        } else if self.has_class("save-module-btn") {
            Some(PanelAction::SaveModuleTitle)
        } else if self.has_class("save-lesson-btn") {
            Some(PanelAction::SaveLessonTitle)
        } else {
            None
        }
    }
}
