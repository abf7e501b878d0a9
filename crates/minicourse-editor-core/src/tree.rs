//! Local mirror of the course outline shown in the structure panel.
//!
//! The page renders the initial outline; the browser layer reads it into a
//! `StructureTree` at mount. Afterwards the tree only changes when the
//! backend confirms a mutation, and every change is mirrored to the page
//! through a view patch.

use minicourse_common::{CourseId, Direction, LessonId, ModuleId, StructureItem};

use crate::ordering;
use crate::types::{NodeKind, NodeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonNode {
    pub id: LessonId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    pub id: ModuleId,
    pub title: String,
    pub lessons: Vec<LessonNode>,
}

impl ModuleNode {
    pub fn new(id: ModuleId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            lessons: Vec::new(),
        }
    }

    pub fn with_lesson(mut self, id: LessonId, title: impl Into<String>) -> Self {
        self.lessons.push(LessonNode {
            id,
            title: title.into(),
        });
        self
    }
}

/// Course → module → lesson outline plus the active node.
///
/// The course, intro and conclusion nodes are fixed and always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureTree {
    course_id: CourseId,
    modules: Vec<ModuleNode>,
    active: Option<NodeRef>,
}

impl StructureTree {
    pub fn new(course_id: CourseId) -> Self {
        Self {
            course_id,
            modules: Vec::new(),
            active: None,
        }
    }

    pub fn with_modules(mut self, modules: Vec<ModuleNode>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_active(mut self, active: Option<NodeRef>) -> Self {
        self.active = active.filter(|node| self.contains(*node));
        self
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn modules(&self) -> &[ModuleNode] {
        &self.modules
    }

    pub fn module(&self, id: ModuleId) -> Option<&ModuleNode> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Module that holds `lesson_id`.
    pub fn module_of(&self, lesson_id: LessonId) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|m| m.lessons.iter().any(|l| l.id == lesson_id))
            .map(|m| m.id)
    }

    pub fn contains(&self, node: NodeRef) -> bool {
        match node.kind {
            NodeKind::Course | NodeKind::Intro | NodeKind::Conclusion => node.id == self.course_id,
            NodeKind::Module => self.module(node.id).is_some(),
            NodeKind::Lesson => self.module_of(node.id).is_some(),
        }
    }

    pub fn active(&self) -> Option<NodeRef> {
        self.active
    }

    /// Make `node` the single active node. Returns false if it is not in the tree.
    pub fn set_active(&mut self, node: NodeRef) -> bool {
        if !self.contains(node) {
            return false;
        }
        self.active = Some(node);
        true
    }

    pub fn push_module(&mut self, item: &StructureItem) {
        self.modules.push(ModuleNode::new(item.id, item.title.clone()));
    }

    /// Returns false if the module is gone.
    pub fn push_lesson(&mut self, module_id: ModuleId, item: &StructureItem) -> bool {
        match self.modules.iter_mut().find(|m| m.id == module_id) {
            Some(module) => {
                module.lessons.push(LessonNode {
                    id: item.id,
                    title: item.title.clone(),
                });
                true
            }
            None => false,
        }
    }

    pub fn rename(&mut self, node: NodeRef, title: &str) -> bool {
        let slot = match node.kind {
            NodeKind::Module => self
                .modules
                .iter_mut()
                .find(|m| m.id == node.id)
                .map(|m| &mut m.title),
            NodeKind::Lesson => self
                .modules
                .iter_mut()
                .flat_map(|m| m.lessons.iter_mut())
                .find(|l| l.id == node.id)
                .map(|l| &mut l.title),
            _ => None,
        };
        match slot {
            Some(slot) => {
                *slot = title.to_owned();
                true
            }
            None => false,
        }
    }

    /// Whether `node` has a sibling in `direction`. Fixed nodes never move.
    pub fn can_move(&self, node: NodeRef, direction: Direction) -> bool {
        match self.sibling_position(node) {
            Some((len, index)) => ordering::adjacent(len, index, direction).is_some(),
            None => false,
        }
    }

    /// Swap `node` with its sibling. Returns false if there is none.
    pub fn swap(&mut self, node: NodeRef, direction: Direction) -> bool {
        match node.kind {
            NodeKind::Module => match self.modules.iter().position(|m| m.id == node.id) {
                Some(index) => ordering::swap_adjacent(&mut self.modules, index, direction),
                None => false,
            },
            NodeKind::Lesson => {
                let Some(module) = self
                    .modules
                    .iter_mut()
                    .find(|m| m.lessons.iter().any(|l| l.id == node.id))
                else {
                    return false;
                };
                match module.lessons.iter().position(|l| l.id == node.id) {
                    Some(index) => ordering::swap_adjacent(&mut module.lessons, index, direction),
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Remove a module (with its lessons) or a lesson.
    ///
    /// Returns `None` if the node was not in the tree, otherwise whether the
    /// active node was removed with it. A removed active node is cleared.
    pub fn remove(&mut self, node: NodeRef) -> Option<bool> {
        let removed_lessons: Vec<LessonId> = match node.kind {
            NodeKind::Module => {
                let index = self.modules.iter().position(|m| m.id == node.id)?;
                let module = self.modules.remove(index);
                module.lessons.into_iter().map(|l| l.id).collect()
            }
            NodeKind::Lesson => {
                let module = self
                    .modules
                    .iter_mut()
                    .find(|m| m.lessons.iter().any(|l| l.id == node.id))?;
                module.lessons.retain(|l| l.id != node.id);
                vec![node.id]
            }
            _ => return None,
        };

        let active_removed = match self.active {
            Some(active) if active == node => true,
            Some(NodeRef {
                kind: NodeKind::Lesson,
                id,
            }) => removed_lessons.contains(&id),
            _ => false,
        };
        if active_removed {
            self.active = None;
        }
        Some(active_removed)
    }

    /// Sibling count and index of `node` within its parent.
    fn sibling_position(&self, node: NodeRef) -> Option<(usize, usize)> {
        match node.kind {
            NodeKind::Module => {
                let index = self.modules.iter().position(|m| m.id == node.id)?;
                Some((self.modules.len(), index))
            }
            NodeKind::Lesson => self.modules.iter().find_map(|m| {
                m.lessons
                    .iter()
                    .position(|l| l.id == node.id)
                    .map(|index| (m.lessons.len(), index))
            }),
            _ => None,
        }
    }
}
