//! Structure-tree node identities and the page's form fields.

use std::fmt;

use minicourse_common::{CourseId, CourseSection, EntityKind};

/// Kind of a structure-tree node. Each kind has its own editor panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Course,
    Intro,
    Module,
    Lesson,
    Conclusion,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Course,
        NodeKind::Intro,
        NodeKind::Module,
        NodeKind::Lesson,
        NodeKind::Conclusion,
    ];

    /// Parse a `data-type` attribute value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "course" => Some(NodeKind::Course),
            "intro" => Some(NodeKind::Intro),
            "module" => Some(NodeKind::Module),
            "lesson" => Some(NodeKind::Lesson),
            "conclusion" => Some(NodeKind::Conclusion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Course => "course",
            NodeKind::Intro => "intro",
            NodeKind::Module => "module",
            NodeKind::Lesson => "lesson",
            NodeKind::Conclusion => "conclusion",
        }
    }

    /// Element id of the editor panel shown for this kind.
    pub fn panel_id(&self) -> &'static str {
        match self {
            NodeKind::Course => "course-settings-view",
            NodeKind::Intro => "intro-view",
            NodeKind::Module => "module-view",
            NodeKind::Lesson => "lesson-view",
            NodeKind::Conclusion => "conclusion-view",
        }
    }

    /// Modules and lessons are backend entities; the other nodes are fixed.
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            NodeKind::Module => Some(EntityKind::Module),
            NodeKind::Lesson => Some(EntityKind::Lesson),
            _ => None,
        }
    }

    pub fn section(&self) -> Option<CourseSection> {
        match self {
            NodeKind::Intro => Some(CourseSection::Intro),
            NodeKind::Conclusion => Some(CourseSection::Conclusion),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the structure tree.
///
/// Course, intro and conclusion nodes carry the course id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: i64,
}

impl NodeRef {
    pub fn new(kind: NodeKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn course(course_id: CourseId) -> Self {
        Self::new(NodeKind::Course, course_id)
    }

    pub fn module(id: i64) -> Self {
        Self::new(NodeKind::Module, id)
    }

    pub fn lesson(id: i64) -> Self {
        Self::new(NodeKind::Lesson, id)
    }
}

/// Form fields the editor reads from, or writes to, the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    CourseTitle,
    CourseDescription,
    CourseOutcome,
    CourseAudience,
    ModuleTitle,
    CurrentModuleId,
    LessonTitle,
    CurrentLessonId,
    /// Block type picked for the next "add block".
    NewBlockType,
}

impl FormField {
    /// CSS selector locating the field on the editor page.
    pub fn selector(&self) -> &'static str {
        match self {
            FormField::CourseTitle => "#course-title",
            FormField::CourseDescription => "#course-description",
            FormField::CourseOutcome => "#course-outcome",
            FormField::CourseAudience => "#course-audience",
            FormField::ModuleTitle => "input[name=\"module_title\"]",
            FormField::CurrentModuleId => "input[name=\"current_module_id\"]",
            FormField::LessonTitle => "input[name=\"lesson_title\"]",
            FormField::CurrentLessonId => "input[name=\"current_lesson_id\"]",
            FormField::NewBlockType => "#add-block-type",
        }
    }
}
