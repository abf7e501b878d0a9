use miette::Diagnostic;
use minicourse_common::ApiError;

use crate::platform::PlatformError;

/// Why an editor operation did not complete.
///
/// The session has already notified the user by the time one of these is
/// returned; callers only log it.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum EditorError {
    #[error(transparent)]
    #[diagnostic_source]
    Api(#[from] ApiError),

    /// Something the operation depends on has not been chosen yet.
    #[error("{0}")]
    #[diagnostic(code(minicourse::editor::missing_prerequisite))]
    MissingPrerequisite(&'static str),

    /// A required input was left empty.
    #[error("{0}")]
    #[diagnostic(code(minicourse::editor::missing_input))]
    MissingInput(&'static str),

    /// The target is no longer (or never was) part of the page.
    #[error("unknown {kind} {id}")]
    #[diagnostic(code(minicourse::editor::unknown_item))]
    UnknownItem { kind: &'static str, id: i64 },

    #[error(transparent)]
    #[diagnostic_source]
    Platform(#[from] PlatformError),
}

impl EditorError {
    pub fn unknown(kind: &'static str, id: i64) -> Self {
        EditorError::UnknownItem { kind, id }
    }
}
