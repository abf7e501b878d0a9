//! AI assist triggers.
//!
//! Each trigger names one `/ai` route, where its input comes from, and where
//! the answer goes. The session runs them; this module only describes them.

use minicourse_common::BlockId;
use smol_str::SmolStr;

use crate::platform::TriggerControl;

/// Label shown on a control while its request is in flight.
pub const BUSY_LABEL: &str = "Generating...";

/// Prompt used by generate-text when the lesson title is empty.
pub const DEFAULT_TEXT_PROMPT: &str = "lesson content";
/// Context used by generate-quiz when the lesson title is empty.
pub const DEFAULT_QUIZ_CONTEXT: &str = "lesson context";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AiTrigger {
    /// Draft text for a text or action block from the lesson title.
    GenerateText { block_id: BlockId },
    /// Draft a quiz for a quiz block from the lesson title.
    GenerateQuiz { block_id: BlockId },
    AnalyzeOutcome,
    AnalyzeAudience,
    /// Outline a course from its title.
    SuggestStructure,
    /// Image idea for an image block from the lesson title.
    SuggestImage { block_id: BlockId },
    /// Explain the concept behind a tooltip.
    Explain { concept: SmolStr },
}

impl AiTrigger {
    /// Resolve an AI button by its control name (`ai-generate-text-btn`, or
    /// the bare `generate-text`). Block-level triggers need the enclosing block.
    pub fn from_control(name: &str, block_id: Option<BlockId>) -> Option<Self> {
        let name = name.strip_prefix("ai-").unwrap_or(name);
        let name = name.strip_suffix("-btn").unwrap_or(name);
        match name {
            "generate-text" => block_id.map(|block_id| AiTrigger::GenerateText { block_id }),
            "generate-quiz" => block_id.map(|block_id| AiTrigger::GenerateQuiz { block_id }),
            "suggest-image" => block_id.map(|block_id| AiTrigger::SuggestImage { block_id }),
            "analyze-outcome" => Some(AiTrigger::AnalyzeOutcome),
            "analyze-audience" => Some(AiTrigger::AnalyzeAudience),
            "suggest-structure" => Some(AiTrigger::SuggestStructure),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AiTrigger::GenerateText { .. } => "generate-text",
            AiTrigger::GenerateQuiz { .. } => "generate-quiz",
            AiTrigger::AnalyzeOutcome => "analyze-outcome",
            AiTrigger::AnalyzeAudience => "analyze-audience",
            AiTrigger::SuggestStructure => "suggest-structure",
            AiTrigger::SuggestImage { .. } => "suggest-image",
            AiTrigger::Explain { .. } => "explain-concept",
        }
    }
}

/// Keeps a control busy until dropped.
pub struct BusyGuard<C: TriggerControl> {
    control: C,
}

impl<C: TriggerControl> BusyGuard<C> {
    pub fn new(control: C) -> Self {
        control.set_busy(BUSY_LABEL);
        Self { control }
    }
}

impl<C: TriggerControl> Drop for BusyGuard<C> {
    fn drop(&mut self) {
        self.control.restore();
    }
}
