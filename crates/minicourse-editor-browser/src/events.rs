//! Delegated event handling.
//!
//! One click listener per page region reduces the clicked element's ancestry
//! to a `ClickTarget`; the resolved `Action` runs on the session in a local
//! task so other clicks keep working while a request is pending.

use gloo_events::EventListener;
use smol_str::SmolStr;
use wasm_bindgen::JsCast;
use web_sys::{Element, Node};

use minicourse_editor_core::common::{AiApi, CourseApi, CourseId};
use minicourse_editor_core::{Action, ClickTarget, CounterKind, EditorSession, StructureAction};

use crate::control::ButtonControl;
use crate::dom::{by_id, closest, data, index_among, query_doc};
use crate::dom_sync::{EDITOR_PANEL_ID, MODAL_ID, STRUCTURE_PANEL_ID, mount_counters, read_node};
use crate::platform::BrowserPlatform;

/// Page listeners. Dropping this detaches them.
pub struct EventBindings {
    listeners: Vec<EventListener>,
}

impl EventBindings {
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

/// Elements that act as a clickable control.
const CONTROL_SELECTOR: &str = "button, .btn";

/// The control a click landed in, if any.
pub fn trigger_control(target: &Element) -> Option<Element> {
    closest(target, CONTROL_SELECTOR)
}

/// Reduce a clicked element to what the click can mean.
pub fn click_target(target: &Element, course_id: CourseId, modal: Option<&Element>) -> ClickTarget {
    let control = trigger_control(target).unwrap_or_else(|| target.clone());
    let target_node: &Node = target;

    ClickTarget {
        control_id: Some(control.id())
            .filter(|id| !id.is_empty())
            .map(SmolStr::from),
        control_classes: control
            .class_name()
            .split_whitespace()
            .map(SmolStr::new)
            .collect(),
        node: closest(target, "li[data-type]").and_then(|li| read_node(&li, course_id)),
        in_node_controls: closest(target, ".actions").is_some()
            || closest(target, ".add-lesson-btn").is_some(),
        module_id: data(&control, "data-module-id"),
        block_id: closest(target, ".content-block").and_then(|b| data(&b, "data-block-id")),
        option_index: closest(target, ".quiz-option-item").and_then(|row| {
            let editor = closest(&row, ".quiz-options-editor")?;
            index_among(&editor, ".quiz-option-item", &row)
        }),
        concept: closest(target, ".tooltip-container")
            .and_then(|tip| tip.get_attribute("data-concept"))
            .map(SmolStr::from),
        modal_backdrop: modal.is_some_and(|m| m.is_same_node(Some(target_node))),
        modal_dismiss: closest(target, "[data-dismiss=\"modal\"]").is_some(),
    }
}

fn spawn_action<A>(session: EditorSession<A, BrowserPlatform>, action: Action, button: Option<Element>)
where
    A: CourseApi + AiApi + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        let result = match button {
            Some(button) => session.dispatch(action, ButtonControl::new(button)).await,
            None => session.dispatch(action, ()).await,
        };
        if let Err(err) = result {
            tracing::debug!(error = %err, "editor action did not complete");
        }
    });
}

/// Attach click delegation to the structure panel, the editor panel and
/// the AI modal, plus the live character counters.
pub fn bind_events<A>(session: &EditorSession<A, BrowserPlatform>) -> EventBindings
where
    A: CourseApi + AiApi + 'static,
{
    let document = session.platform().document().clone();
    let course_id = session.course_id();
    let modal = by_id(&document, MODAL_ID);
    let mut listeners = Vec::new();

    for region_id in [STRUCTURE_PANEL_ID, EDITOR_PANEL_ID, MODAL_ID] {
        let Some(region) = by_id(&document, region_id) else {
            tracing::debug!(region_id, "region not on page");
            continue;
        };
        let session = session.clone();
        let modal = modal.clone();
        listeners.push(EventListener::new(&region, "click", move |event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Some(action) = click_target(&target, course_id, modal.as_ref()).resolve() else {
                return;
            };
            // Regions may nest (the modal can sit inside the editor panel).
            event.stop_propagation();
            if !matches!(action, Action::Structure(StructureAction::Select(_))) {
                event.prevent_default();
            }
            spawn_action(session.clone(), action, trigger_control(&target));
        }));
    }

    mount_counters(&document);
    for counter in CounterKind::ALL {
        let Some(field) = query_doc(&document, counter.field().selector()) else {
            continue;
        };
        session.update_counter(counter);
        let session = session.clone();
        listeners.push(EventListener::new(&field, "input", move |_| {
            session.update_counter(counter);
        }));
    }

    tracing::debug!(listeners = listeners.len(), "editor events bound");
    EventBindings { listeners }
}
