//! HTML templates for markup the editor inserts into the page.
//!
//! Every value that comes from the backend or the user is escaped. Markup is
//! emitted without whitespace between tags so the page layout does not depend
//! on text nodes.

use std::fmt::Write as _;

use minicourse_common::{BlockContent, BlockId, QuizContent, QuizKind, StructureItem};
use pulldown_cmark_escape::{FmtWriter, escape_html};
use serde_json::Value;

use crate::blocks::{BlockEditor, BlockList};
use crate::types::NodeKind;

pub const BLOCKS_PLACEHOLDER_HTML: &str =
    "<p class=\"blocks-placeholder\">No content blocks yet. Add one below!</p>";

pub const MODAL_FETCHING_HTML: &str = "<p>Fetching AI explanation...</p>";
pub const MODAL_FAILED_HTML: &str = "<p>Sorry, couldn't fetch an explanation for this topic.</p>";
/// Modal content while hidden.
pub const MODAL_RESET_HTML: &str = "<p>Loading explanation...</p>";

/// Concept explained by the tooltip on video blocks.
pub const VIDEO_TIP_CONCEPT: &str = "bp6_media";

fn push_escaped(out: &mut String, text: &str) {
    // Writing into a String cannot fail.
    let _ = escape_html(FmtWriter(&mut *out), text);
}

fn escaped(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

// === Structure tree ===

/// `<li>` for a module or lesson added after page load.
pub fn structure_item(kind: NodeKind, item: &StructureItem) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<li data-type=\"{kind}\" data-id=\"{id}\" data-order=\"{order}\">\
         <span class=\"item-title\">{title}</span>\
         <div class=\"actions\">\
         <button type=\"button\" class=\"move-up\" title=\"Move Up\">&#9650;</button>\
         <button type=\"button\" class=\"move-down\" title=\"Move Down\">&#9660;</button>\
         <button type=\"button\" class=\"delete-item\" title=\"Delete {kind}\">&times;</button>\
         </div>",
        kind = kind.as_str(),
        id = item.id,
        order = item.order,
        title = escaped(&item.title),
    );
    if kind == NodeKind::Module {
        let _ = write!(
            out,
            "<button type=\"button\" class=\"btn btn-secondary btn-xs add-lesson-btn\" \
             data-module-id=\"{id}\">+ Add Lesson</button>\
             <ul class=\"lesson-list\" data-module-id=\"{id}\"></ul>",
            id = item.id,
        );
    }
    out.push_str("</li>");
    out
}

// === Content blocks ===

/// The block area for a lesson: one widget per block, or the placeholder.
pub fn block_list(blocks: &BlockList) -> String {
    if blocks.is_empty() {
        return BLOCKS_PLACEHOLDER_HTML.to_owned();
    }
    blocks.iter().map(block_widget).collect()
}

/// Header, type-specific editor and AI controls for one block.
///
/// Text and action blocks get an empty editor container; their HTML is
/// loaded into the rich-text editor once the widget is on the page.
pub fn block_widget(block: &BlockEditor) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"content-block\" data-block-id=\"{id}\" data-order=\"{order}\" \
         data-block-type=\"{ty}\">\
         <div class=\"content-block-header\"><span>{heading}</span><div>\
         <button type=\"button\" class=\"btn btn-secondary btn-xs move-block-up\" title=\"Move Up\">&#9650;</button>\
         <button type=\"button\" class=\"btn btn-secondary btn-xs move-block-down\" title=\"Move Down\">&#9660;</button>\
         <button type=\"button\" class=\"btn btn-primary btn-xs save-block-btn\">Save</button>\
         <button type=\"button\" class=\"btn btn-danger btn-xs delete-block-btn\">Delete</button>\
         </div></div>",
        id = block.id,
        order = block.order,
        ty = escaped(block.block_type.as_str()),
        heading = escaped(&block.block_type.heading()),
    );

    let ai_controls = match &block.draft {
        BlockContent::RichText { .. } => {
            let _ = write!(
                out,
                "<div class=\"block-editor\" id=\"block-editor-{}\"></div>",
                block.id
            );
            "<button type=\"button\" class=\"btn btn-info btn-sm ai-btn ai-generate-text-btn\" \
             title=\"Generate draft content based on lesson title\">AI Generate</button>"
        }
        BlockContent::Image { url, alt } => {
            let _ = write!(
                out,
                "<div class=\"block-editor form-group\">\
                 <label>Image URL:</label>\
                 <input type=\"text\" class=\"form-control image-url\" value=\"{}\">\
                 <label>Alt Text:</label>\
                 <input type=\"text\" class=\"form-control image-alt\" value=\"{}\">\
                 </div>",
                escaped(url),
                escaped(alt),
            );
            "<button type=\"button\" class=\"btn btn-info btn-sm ai-btn ai-suggest-image-btn\" \
             title=\"Suggest image ideas based on lesson title\">AI Suggest Image</button>\
             <div class=\"ai-suggestion ai-image-suggestion\" style=\"display: none;\"></div>"
        }
        BlockContent::Video { url } => {
            let _ = write!(
                out,
                "<div class=\"block-editor form-group\">\
                 <label>Video URL (YouTube/Vimeo):</label>\
                 <input type=\"text\" class=\"form-control video-url\" value=\"{}\">\
                 <span class=\"tooltip-container\" data-concept=\"{}\">\
                 <span class=\"tooltip-icon\">?</span>\
                 <span class=\"tooltip-text\">Keep videos short (&lt; 5 mins)!</span>\
                 </span></div>",
                escaped(url),
                VIDEO_TIP_CONCEPT,
            );
            ""
        }
        BlockContent::Quiz(quiz) => {
            push_quiz_editor(&mut out, block.id, quiz);
            "<button type=\"button\" class=\"btn btn-info btn-sm ai-btn ai-generate-quiz-btn\" \
             title=\"Generate quiz question and options based on lesson title\">AI Generate Quiz</button>"
        }
        BlockContent::Unsupported(_) => {
            let _ = write!(
                out,
                "<p>Unsupported block type: {}</p>",
                escaped(block.block_type.as_str())
            );
            ""
        }
    };

    let _ = write!(out, "<div class=\"ai-controls\">{ai_controls}</div></div>");
    out
}

fn push_quiz_editor(out: &mut String, block_id: BlockId, quiz: &QuizContent) {
    let selected = |kind: QuizKind| if quiz.kind == kind { " selected" } else { "" };
    let _ = write!(
        out,
        "<div class=\"block-editor form-group quiz-editor\">\
         <label>Question:</label>\
         <input type=\"text\" class=\"form-control quiz-question\" value=\"{question}\">\
         <label>Type:</label>\
         <select class=\"form-control quiz-type\">\
         <option value=\"mc\"{mc}>{mc_label}</option>\
         <option value=\"tf\"{tf}>{tf_label}</option>\
         </select>\
         <label>Options (Select Correct Answer):</label>\
         <div class=\"quiz-options-editor\">",
        question = escaped(&quiz.question),
        mc = selected(QuizKind::MultipleChoice),
        mc_label = QuizKind::MultipleChoice.label(),
        tf = selected(QuizKind::TrueFalse),
        tf_label = QuizKind::TrueFalse.label(),
    );
    let correct = quiz.correct_index();
    for (index, option) in quiz.options.iter().enumerate() {
        out.push_str(&quiz_option(block_id, index, option, correct == Some(index)));
    }
    out.push_str(
        "</div><button type=\"button\" class=\"btn btn-secondary btn-sm add-option-btn\">\
         + Add Option</button></div>",
    );
}

/// One quiz option row: correct-answer radio, text, remove button.
pub fn quiz_option(block_id: BlockId, index: usize, text: &str, checked: bool) -> String {
    format!(
        "<div class=\"quiz-option-item\">\
         <input type=\"radio\" name=\"correct_answer_{block_id}\" value=\"{index}\"{checked}>\
         <input type=\"text\" value=\"{text}\" class=\"form-control quiz-option-text\">\
         <button type=\"button\" class=\"btn btn-danger btn-xs remove-option-btn\">&times;</button>\
         </div>",
        checked = if checked { " checked" } else { "" },
        text = escaped(text),
    )
}

// === AI suggestions ===

/// Readable rendering of a suggested course structure.
///
/// Accepts `{modules: [...]}` or a bare module array, where each module is a
/// title string or `{title, lessons}` and each lesson a string or `{title}`.
/// Anything else is shown as pretty-printed JSON.
pub fn structure_suggestion(suggestion: &Value) -> String {
    let mut out = String::from("<strong>AI Suggested Structure:</strong>");
    let modules = match suggestion {
        Value::Array(modules) => Some(modules),
        Value::Object(map) => map.get("modules").and_then(Value::as_array),
        _ => None,
    };

    match (modules, suggestion) {
        (Some(modules), _) => {
            out.push_str("<ol class=\"suggested-structure\">");
            for module in modules {
                out.push_str("<li>");
                push_escaped(&mut out, &entry_title(module));
                let lessons = module
                    .get("lessons")
                    .and_then(Value::as_array)
                    .filter(|lessons| !lessons.is_empty());
                if let Some(lessons) = lessons {
                    out.push_str("<ul>");
                    for lesson in lessons {
                        out.push_str("<li>");
                        push_escaped(&mut out, &entry_title(lesson));
                        out.push_str("</li>");
                    }
                    out.push_str("</ul>");
                }
                out.push_str("</li>");
            }
            out.push_str("</ol>");
        }
        (None, Value::String(text)) => {
            out.push_str("<p>");
            push_escaped(&mut out, text);
            out.push_str("</p>");
        }
        (None, other) => {
            out.push_str("<pre>");
            push_escaped(
                &mut out,
                &serde_json::to_string_pretty(other).unwrap_or_default(),
            );
            out.push_str("</pre>");
        }
    }
    out
}

fn entry_title(entry: &Value) -> String {
    match entry {
        Value::String(title) => title.clone(),
        Value::Object(map) => ["title", "name"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
            .unwrap_or_else(|| entry.to_string()),
        other => other.to_string(),
    }
}
