//! Browser DOM layer for the Mini-Course Creator editor.
//!
//! This crate implements the core `Platform` against the live page and wires
//! page events to an `EditorSession`. It assumes a `wasm32-unknown-unknown`
//! target environment.
//!
//! # Architecture
//!
//! - `quill`: bindings to the page's Quill rich-text editor
//! - `dom`: small element lookup and form helpers
//! - `dom_sync`: reads the server-rendered outline, applies view patches
//! - `platform`: `BrowserPlatform`, the `Platform` implementation
//! - `control`: busy state for the button that started an AI request
//! - `events`: delegated click and input listeners
//!
//! # Re-exports
//!
//! This crate re-exports `minicourse-editor-core` for convenience, so consumers
//! only need to depend on `minicourse-editor-browser`.

// Re-export core crate
pub use minicourse_editor_core;
pub use minicourse_editor_core::*;

pub mod control;
pub mod dom;
pub mod dom_sync;
pub mod events;
pub mod platform;
pub mod quill;

pub use control::ButtonControl;
pub use dom_sync::{apply_patch, read_structure};
pub use events::{EventBindings, bind_events, click_target, trigger_control};
pub use platform::BrowserPlatform;
pub use quill::QuillEditor;
