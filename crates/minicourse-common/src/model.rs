//! Wire model for the editor API.
//!
//! Client-side mirrors of server-owned records. Field names follow the JSON
//! bodies the backend sends and accepts; anything the backend may omit is
//! defaulted rather than rejected.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};
use smol_str::SmolStr;

pub type CourseId = i64;
pub type ModuleId = i64;
pub type LessonId = i64;
pub type BlockId = i64;

/// Stored in a quiz's `correct_answer` when no option is marked correct.
pub const NO_CORRECT_ANSWER: i64 = -1;

/// Kind of a content block.
///
/// Unknown kinds coming from the backend are kept verbatim so the block can
/// still be listed (and moved or deleted) even though it cannot be edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockType {
    Text,
    Action,
    Image,
    Video,
    Quiz,
    Unsupported(SmolStr),
}

impl BlockType {
    /// Kinds the backend accepts for block creation.
    pub const CREATABLE: [BlockType; 5] = [
        BlockType::Text,
        BlockType::Action,
        BlockType::Image,
        BlockType::Video,
        BlockType::Quiz,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "text" => BlockType::Text,
            "action" => BlockType::Action,
            "image" => BlockType::Image,
            "video" => BlockType::Video,
            "quiz" => BlockType::Quiz,
            other => BlockType::Unsupported(SmolStr::new(other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Text => "text",
            BlockType::Action => "action",
            BlockType::Image => "image",
            BlockType::Video => "video",
            BlockType::Quiz => "quiz",
            BlockType::Unsupported(name) => name.as_str(),
        }
    }

    /// Text and action blocks are edited with a rich-text editor.
    pub fn is_rich_text(&self) -> bool {
        matches!(self, BlockType::Text | BlockType::Action)
    }

    /// Header label, e.g. `Quiz Block`.
    pub fn heading(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Block", first.to_uppercase(), chars.as_str()),
            None => "Block".to_owned(),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BlockType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = SmolStr::deserialize(deserializer)?;
        Ok(BlockType::parse(&s))
    }
}

/// Quiz question style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QuizKind {
    #[default]
    #[serde(rename = "mc")]
    MultipleChoice,
    #[serde(rename = "tf")]
    TrueFalse,
}

impl QuizKind {
    /// Lenient parse: the AI service answers with `MCQ`/`TF`, the block
    /// store uses `mc`/`tf`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mc" | "mcq" => Some(QuizKind::MultipleChoice),
            "tf" => Some(QuizKind::TrueFalse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuizKind::MultipleChoice => "mc",
            QuizKind::TrueFalse => "tf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizKind::MultipleChoice => "Multiple Choice",
            QuizKind::TrueFalse => "True/False",
        }
    }
}

/// Content of a quiz block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QuizContent {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuizKind,
    pub options: Vec<String>,
    /// Index into `options`, or [`NO_CORRECT_ANSWER`].
    pub correct_answer: i64,
}

impl QuizContent {
    /// The marked option, if `correct_answer` points inside `options`.
    pub fn correct_index(&self) -> Option<usize> {
        usize::try_from(self.correct_answer)
            .ok()
            .filter(|idx| *idx < self.options.len())
    }
}

/// Typed view of a block's `content` payload, keyed by block type.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    /// `{html}` for text and action blocks.
    RichText { html: String },
    /// `{url, alt}`
    Image { url: String, alt: String },
    /// `{url}`
    Video { url: String },
    Quiz(QuizContent),
    /// Payload of a block type this editor does not know, passed through untouched.
    Unsupported(Value),
}

impl BlockContent {
    /// Interpret a raw content payload for the given block type.
    ///
    /// Missing or mistyped fields fall back to empty values, the same way the
    /// editor widgets treat them.
    pub fn from_wire(block_type: &BlockType, content: &Value) -> Self {
        let text = |key: &str| {
            content
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };
        match block_type {
            BlockType::Text | BlockType::Action => BlockContent::RichText { html: text("html") },
            BlockType::Image => BlockContent::Image {
                url: text("url"),
                alt: text("alt"),
            },
            BlockType::Video => BlockContent::Video { url: text("url") },
            BlockType::Quiz => {
                let options = content
                    .get("options")
                    .and_then(Value::as_array)
                    .map(|opts| opts.iter().map(option_text).collect())
                    .unwrap_or_default();
                let kind = content
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(QuizKind::parse)
                    .unwrap_or_default();
                BlockContent::Quiz(QuizContent {
                    question: text("question"),
                    kind,
                    options,
                    correct_answer: content
                        .get("correct_answer")
                        .and_then(answer_index)
                        .unwrap_or(NO_CORRECT_ANSWER),
                })
            }
            BlockType::Unsupported(_) => BlockContent::Unsupported(content.clone()),
        }
    }

    /// Full-replace payload for `PUT /editor/block/{id}`.
    pub fn to_wire(&self) -> Value {
        match self {
            BlockContent::RichText { html } => json!({ "html": html }),
            BlockContent::Image { url, alt } => json!({ "url": url, "alt": alt }),
            BlockContent::Video { url } => json!({ "url": url }),
            BlockContent::Quiz(quiz) => json!({
                "question": quiz.question,
                "type": quiz.kind.as_str(),
                "options": quiz.options,
                "correct_answer": quiz.correct_answer,
            }),
            BlockContent::Unsupported(raw) => raw.clone(),
        }
    }
}

fn option_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accepts `2` as well as `"2"`; the original form posted radio values as strings.
fn answer_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A content block as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: BlockId,
    pub block_type: BlockType,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "empty_object")]
    pub content: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl BlockRecord {
    pub fn content(&self) -> BlockContent {
        BlockContent::from_wire(&self.block_type, &self.content)
    }
}

/// A module or lesson as returned on creation: `{id, title, order}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub order: i64,
}

/// Echo of a renamed module or lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDetails {
    #[serde(default)]
    pub id: Option<ModuleId>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonDetails {
    #[serde(default)]
    pub id: Option<LessonId>,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<BlockRecord>,
}

/// Body of `POST /editor/course/{id}/settings`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CourseSettings {
    pub title: String,
    pub description: String,
    pub outcome: String,
    pub audience: String,
}

/// Course-level HTML sections edited outside of lessons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseSection {
    Intro,
    Conclusion,
}

impl CourseSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseSection::Intro => "intro",
            CourseSection::Conclusion => "conclusion",
        }
    }
}

/// Entities that can be moved and deleted through the generic routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Module,
    Lesson,
    Block,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Module => "module",
            EntityKind::Lesson => "lesson",
            EntityKind::Block => "block",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a single-step reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quiz draft returned by `POST /ai/generate_quiz`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuizSuggestion {
    #[serde(default)]
    pub question: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<i64>,
}

impl QuizSuggestion {
    /// Convert into block content, keeping `fallback_kind` when the
    /// suggestion's type is missing or unknown.
    pub fn into_content(self, fallback_kind: QuizKind) -> QuizContent {
        let kind = self
            .kind
            .as_deref()
            .and_then(QuizKind::parse)
            .unwrap_or(fallback_kind);
        let mut quiz = QuizContent {
            question: self.question,
            kind,
            options: self.options,
            correct_answer: self.correct_answer.unwrap_or(NO_CORRECT_ANSWER),
        };
        if quiz.correct_index().is_none() {
            quiz.correct_answer = NO_CORRECT_ANSWER;
        }
        quiz
    }
}
