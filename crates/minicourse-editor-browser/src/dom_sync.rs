//! DOM synchronization for the editor page.
//!
//! Reads the server-rendered course outline into a `StructureTree` at mount,
//! and applies the session's `ViewPatch`es to the page afterwards.

use web_sys::{Document, Element};

use minicourse_editor_core::render::MODAL_RESET_HTML;
use minicourse_editor_core::common::{BlockId, CourseId, Direction, EntityKind};
use minicourse_editor_core::{
    CounterKind, ModuleNode, NodeKind, NodeRef, StructureTree, SuggestionBody, SuggestionTarget,
    ViewPatch,
};

use crate::dom::{
    append_html, block_selector, by_id, data, node_selector, query, query_all, query_doc,
    set_color, set_display, set_value,
};

pub const STRUCTURE_PANEL_ID: &str = "structure-panel";
pub const EDITOR_PANEL_ID: &str = "editor-panel";
pub const MODULE_LIST_ID: &str = "module-list";
pub const BLOCKS_AREA_ID: &str = "content-blocks-area";
pub const MODAL_ID: &str = "ai-popup-modal";
pub const MODAL_CONTENT_ID: &str = "ai-popup-content";

const COUNTER_COLOR: &str = "#6c757d";
const COUNTER_OVER_COLOR: &str = "red";

/// Id of the counter shown under a counted field.
pub fn counter_id(counter: CounterKind) -> &'static str {
    match counter {
        CounterKind::Outcome => "course-outcome-counter",
        CounterKind::Audience => "course-audience-counter",
    }
}

/// The structure node an `<li data-type>` stands for.
///
/// Fixed nodes without a `data-id` belong to the course.
pub fn read_node(li: &Element, course_id: CourseId) -> Option<NodeRef> {
    let kind = NodeKind::parse(&li.get_attribute("data-type")?)?;
    let id = match data(li, "data-id") {
        Some(id) => id,
        None if kind.entity().is_none() => course_id,
        None => return None,
    };
    Some(NodeRef::new(kind, id))
}

fn item_title(li: &Element) -> String {
    query(li, ".item-title")
        .and_then(|title| title.text_content())
        .map(|title| title.trim().to_owned())
        .unwrap_or_default()
}

/// Build the outline from `#structure-panel`.
///
/// `None` if the panel or its course node is missing.
pub fn read_structure(document: &Document) -> Option<StructureTree> {
    let panel = by_id(document, STRUCTURE_PANEL_ID)?;
    let course = query(&panel, "li[data-type=\"course\"]")?;
    let course_id: CourseId = data(&course, "data-id")?;

    let modules = query_all(&panel, "li[data-type=\"module\"]")
        .iter()
        .filter_map(|li| {
            let module = ModuleNode::new(data(li, "data-id")?, item_title(li));
            Some(
                query_all(li, "li[data-type=\"lesson\"]")
                    .iter()
                    .filter_map(|lesson| Some((data(lesson, "data-id")?, item_title(lesson))))
                    .fold(module, |module, (id, title)| module.with_lesson(id, title)),
            )
        })
        .collect();
    let active = query(&panel, "li.active").and_then(|li| read_node(&li, course_id));

    tracing::debug!(course_id, ?active, "read course outline");
    Some(
        StructureTree::new(course_id)
            .with_modules(modules)
            .with_active(active),
    )
}

/// Put an empty counter under each counted field that lacks one.
pub fn mount_counters(document: &Document) {
    for counter in CounterKind::ALL {
        if by_id(document, counter_id(counter)).is_some() {
            continue;
        }
        let Some(parent) = query_doc(document, counter.field().selector())
            .and_then(|field| field.parent_element())
        else {
            continue;
        };
        let Ok(el) = document.create_element("div") else {
            continue;
        };
        el.set_id(counter_id(counter));
        el.set_class_name("char-counter");
        let _ = el.set_attribute(
            "style",
            "font-size: 0.8em; margin-top: 5px; color: #6c757d;",
        );
        let _ = parent.append_child(&el);
    }
}

fn structure_element(document: &Document, node: NodeRef) -> Option<Element> {
    let panel = by_id(document, STRUCTURE_PANEL_ID)?;
    query(&panel, &node_selector(node))
}

fn block_element(document: &Document, block_id: BlockId) -> Option<Element> {
    query_doc(document, &block_selector(block_id))
}

fn move_element(element: &Element, direction: Direction) {
    let Some(parent) = element.parent_node() else {
        return;
    };
    let result = match direction {
        Direction::Up => match element.previous_element_sibling() {
            Some(sibling) => parent.insert_before(element, Some(&*sibling)),
            None => return,
        },
        Direction::Down => match element.next_element_sibling() {
            Some(sibling) => parent.insert_before(&sibling, Some(&**element)),
            None => return,
        },
    };
    if let Err(e) = result {
        tracing::warn!("failed to reorder element: {:?}", e);
    }
}

/// Apply one view change. Changes aimed at elements that are not on the
/// page are dropped.
pub fn apply_patch(document: &Document, patch: ViewPatch) {
    tracing::trace!(?patch, "apply view patch");
    match patch {
        // === Panels ===
        ViewPatch::ShowPanel(kind) => {
            for other in NodeKind::ALL {
                if let Some(panel) = by_id(document, other.panel_id()) {
                    set_display(&panel, other == kind);
                }
            }
        }
        ViewPatch::HidePanel(kind) => {
            if let Some(panel) = by_id(document, kind.panel_id()) {
                set_display(&panel, false);
            }
        }
        ViewPatch::SetField { field, value } => {
            if let Some(el) = query_doc(document, field.selector()) {
                set_value(&el, &value);
            }
        }
        ViewPatch::SetCounter {
            counter,
            text,
            over_limit,
        } => {
            if let Some(el) = by_id(document, counter_id(counter)) {
                el.set_text_content(Some(&text));
                set_color(
                    &el,
                    if over_limit {
                        COUNTER_OVER_COLOR
                    } else {
                        COUNTER_COLOR
                    },
                );
            }
        }
        ViewPatch::SetDocumentTitle(title) => document.set_title(&title),

        // === Structure tree ===
        ViewPatch::MarkActive(node) => {
            let Some(panel) = by_id(document, STRUCTURE_PANEL_ID) else {
                return;
            };
            for li in query_all(&panel, "li.active") {
                let _ = li.class_list().remove_1("active");
            }
            if let Some(li) = query(&panel, &node_selector(node)) {
                let _ = li.class_list().add_1("active");
            }
        }
        ViewPatch::SetNodeTitle { node, title } => {
            if let Some(span) =
                structure_element(document, node).and_then(|li| query(&li, ".item-title"))
            {
                span.set_text_content(Some(&title));
            }
        }
        ViewPatch::AppendModule { html } => {
            if let Some(list) = by_id(document, MODULE_LIST_ID) {
                append_html(&list, &html);
            }
        }
        ViewPatch::AppendLesson { module_id, html } => {
            let selector = format!(".lesson-list[data-module-id=\"{module_id}\"]");
            if let Some(list) =
                by_id(document, STRUCTURE_PANEL_ID).and_then(|panel| query(&panel, &selector))
            {
                append_html(&list, &html);
            }
        }
        ViewPatch::RemoveNode(node) => {
            if let Some(li) = structure_element(document, node) {
                li.remove();
            }
        }
        ViewPatch::MoveItem {
            kind,
            id,
            direction,
        } => {
            let element = match kind {
                EntityKind::Block => block_element(document, id),
                EntityKind::Module => structure_element(document, NodeRef::module(id)),
                EntityKind::Lesson => structure_element(document, NodeRef::lesson(id)),
            };
            if let Some(element) = element {
                move_element(&element, direction);
            }
        }

        // === Content blocks ===
        ViewPatch::RenderBlocks { html } => {
            if let Some(area) = by_id(document, BLOCKS_AREA_ID) {
                area.set_inner_html(&html);
            }
        }
        ViewPatch::AppendBlock { html } => {
            if let Some(area) = by_id(document, BLOCKS_AREA_ID) {
                for placeholder in query_all(&area, ".blocks-placeholder") {
                    placeholder.remove();
                }
                append_html(&area, &html);
            }
        }
        ViewPatch::ReplaceBlock { block_id, html } => {
            if let Some(block) = block_element(document, block_id) {
                block.set_outer_html(&html);
            }
        }
        ViewPatch::RemoveBlock(block_id) => {
            if let Some(block) = block_element(document, block_id) {
                block.remove();
            }
        }
        ViewPatch::AppendQuizOption { block_id, html } => {
            if let Some(options) = block_element(document, block_id)
                .and_then(|block| query(&block, ".quiz-options-editor"))
            {
                append_html(&options, &html);
            }
        }
        ViewPatch::RemoveQuizOption { block_id, index } => {
            if let Some(row) = block_element(document, block_id)
                .and_then(|block| query_all(&block, ".quiz-option-item").into_iter().nth(index))
            {
                row.remove();
            }
        }

        // === AI ===
        ViewPatch::ShowSuggestion { target, body } => {
            let element = match target {
                SuggestionTarget::Image(block_id) => block_element(document, block_id)
                    .and_then(|block| query(&block, ".ai-image-suggestion")),
                other => other.element_id().and_then(|id| by_id(document, id)),
            };
            let Some(element) = element else {
                return;
            };
            match body {
                SuggestionBody::Text(text) => element.set_text_content(Some(&text)),
                SuggestionBody::Html(html) => element.set_inner_html(&html),
            }
            set_display(&element, true);
        }
        ViewPatch::ShowModal { html } => {
            let (Some(modal), Some(content)) =
                (by_id(document, MODAL_ID), by_id(document, MODAL_CONTENT_ID))
            else {
                return;
            };
            content.set_inner_html(&html);
            set_display(&modal, true);
        }
        ViewPatch::HideModal => {
            if let Some(modal) = by_id(document, MODAL_ID) {
                set_display(&modal, false);
            }
            if let Some(content) = by_id(document, MODAL_CONTENT_ID) {
                content.set_inner_html(MODAL_RESET_HTML);
            }
        }
    }
}
