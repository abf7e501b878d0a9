//! Element lookup and form helpers.
//!
//! Lookups return `None` for anything absent; callers treat a missing
//! element as nothing to do.

use std::str::FromStr;

use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

use minicourse_editor_core::NodeRef;
use minicourse_editor_core::common::BlockId;

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn by_id(document: &Document, id: &str) -> Option<Element> {
    document.get_element_by_id(id)
}

pub fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn query_doc(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

/// All matches, in document order.
pub fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

pub fn data<T: FromStr>(element: &Element, name: &str) -> Option<T> {
    element.get_attribute(name)?.trim().parse().ok()
}

/// `<li>` of a structure node.
pub fn node_selector(node: NodeRef) -> String {
    format!("li[data-type=\"{}\"][data-id=\"{}\"]", node.kind, node.id)
}

pub fn block_selector(block_id: BlockId) -> String {
    format!(".content-block[data-block-id=\"{block_id}\"]")
}

pub fn set_display(element: &Element, visible: bool) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        let value = if visible { "block" } else { "none" };
        let _ = el.style().set_property("display", value);
    }
}

pub fn set_color(element: &Element, color: &str) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        let _ = el.style().set_property("color", color);
    }
}

/// Value of an input, textarea or select.
pub fn value(element: &Element) -> Option<String> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        Some(input.value())
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        Some(area.value())
    } else {
        element.dyn_ref::<HtmlSelectElement>().map(|s| s.value())
    }
}

pub fn set_value(element: &Element, value: &str) {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value(value);
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        select.set_value(value);
    }
}

pub fn is_checked(element: &Element) -> bool {
    element
        .dyn_ref::<HtmlInputElement>()
        .is_some_and(HtmlInputElement::checked)
}

/// Insert markup as the last children of `parent`.
pub fn append_html(parent: &Element, html: &str) {
    if let Err(e) = parent.insert_adjacent_html("beforeend", html) {
        tracing::warn!("failed to insert markup: {:?}", e);
    }
}

/// Position of `element` among the matches of `selector` under `root`.
pub fn index_among(root: &Element, selector: &str, element: &Element) -> Option<usize> {
    let node: &web_sys::Node = element;
    query_all(root, selector)
        .iter()
        .position(|candidate| candidate.is_same_node(Some(node)))
}
