//! The open lesson's content blocks.
//!
//! `BlockList` keeps the blocks in display order. The order only changes
//! through a confirmed add, delete or move, so it always matches what the
//! backend last confirmed.

use minicourse_common::{
    BlockContent, BlockId, BlockRecord, BlockType, Direction, LessonId, NO_CORRECT_ANSWER,
    QuizContent, QuizKind,
};
use smol_str::SmolStr;

use crate::ordering;
use crate::registry::block_container_id;

/// Text of a freshly added quiz option.
pub const NEW_OPTION_TEXT: &str = "New Option";

/// What the page's form for a non-rich-text block currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockForm {
    Image {
        url: String,
        alt: String,
    },
    Video {
        url: String,
    },
    Quiz {
        question: String,
        /// Raw value of the type selector.
        kind: String,
        options: Vec<String>,
        /// Position of the checked option row, if any.
        checked: Option<usize>,
    },
}

impl BlockForm {
    pub fn into_content(self) -> BlockContent {
        match self {
            BlockForm::Image { url, alt } => BlockContent::Image { url, alt },
            BlockForm::Video { url } => BlockContent::Video { url },
            BlockForm::Quiz {
                question,
                kind,
                options,
                checked,
            } => {
                let correct_answer = checked
                    .filter(|idx| *idx < options.len())
                    .and_then(|idx| i64::try_from(idx).ok())
                    .unwrap_or(NO_CORRECT_ANSWER);
                BlockContent::Quiz(QuizContent {
                    question,
                    kind: QuizKind::parse(&kind).unwrap_or_default(),
                    options,
                    correct_answer,
                })
            }
        }
    }
}

/// One block and its working copy.
///
/// For text and action blocks the working copy is the HTML the block was
/// loaded with; the live content is in the rich-text editor.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEditor {
    pub id: BlockId,
    pub block_type: BlockType,
    pub order: i64,
    pub draft: BlockContent,
}

impl BlockEditor {
    pub fn from_record(record: BlockRecord) -> Self {
        let draft = record.content();
        Self {
            id: record.id,
            block_type: record.block_type,
            order: record.order,
            draft,
        }
    }

    /// Container of this block's rich-text editor, for text and action blocks.
    pub fn container_id(&self) -> Option<SmolStr> {
        self.block_type
            .is_rich_text()
            .then(|| block_container_id(self.id))
    }

    pub fn quiz(&self) -> Option<&QuizContent> {
        match &self.draft {
            BlockContent::Quiz(quiz) => Some(quiz),
            _ => None,
        }
    }

    fn quiz_mut(&mut self) -> Option<&mut QuizContent> {
        match &mut self.draft {
            BlockContent::Quiz(quiz) => Some(quiz),
            _ => None,
        }
    }

    /// Take in what the page form currently shows.
    pub fn sync_form(&mut self, form: BlockForm) {
        let content = form.into_content();
        // A form of the wrong shape is stale markup; keep the draft.
        if std::mem::discriminant(&content) == std::mem::discriminant(&self.draft) {
            self.draft = content;
        }
    }

    /// Append a "New Option" row. Returns its index.
    pub fn add_quiz_option(&mut self) -> Option<usize> {
        let quiz = self.quiz_mut()?;
        quiz.options.push(NEW_OPTION_TEXT.to_owned());
        Some(quiz.options.len() - 1)
    }

    /// Remove an option row, keeping the correct answer on the same option.
    pub fn remove_quiz_option(&mut self, index: usize) -> bool {
        let Some(quiz) = self.quiz_mut() else {
            return false;
        };
        if index >= quiz.options.len() {
            return false;
        }
        quiz.options.remove(index);
        quiz.correct_answer = match quiz.correct_answer {
            NO_CORRECT_ANSWER => NO_CORRECT_ANSWER,
            answer if answer == index as i64 => NO_CORRECT_ANSWER,
            answer if answer > index as i64 => answer - 1,
            answer => answer,
        };
        true
    }

    /// Replace the quiz wholesale. Returns false for non-quiz blocks.
    pub fn apply_quiz(&mut self, quiz: QuizContent) -> bool {
        match self.quiz_mut() {
            Some(slot) => {
                *slot = quiz;
                true
            }
            None => false,
        }
    }
}

/// Blocks of one lesson, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockList {
    lesson_id: Option<LessonId>,
    blocks: Vec<BlockEditor>,
}

impl BlockList {
    /// Build the list for a lesson, sorted by `order`.
    pub fn load(lesson_id: LessonId, mut records: Vec<BlockRecord>) -> Self {
        records.sort_by_key(|r| r.order);
        Self {
            lesson_id: Some(lesson_id),
            blocks: records.into_iter().map(BlockEditor::from_record).collect(),
        }
    }

    pub fn lesson_id(&self) -> Option<LessonId> {
        self.lesson_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockEditor> {
        self.blocks.iter()
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(|b| b.id).collect()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockEditor> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BlockId) -> Option<&mut BlockEditor> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn can_move(&self, id: BlockId, direction: Direction) -> bool {
        self.position(id)
            .and_then(|index| ordering::adjacent(self.blocks.len(), index, direction))
            .is_some()
    }

    /// Swap a block with its sibling, exchanging their `order` values too.
    pub fn swap(&mut self, id: BlockId, direction: Direction) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let Some(other) = ordering::adjacent(self.blocks.len(), index, direction) else {
            return false;
        };
        let (a, b) = (self.blocks[index].order, self.blocks[other].order);
        self.blocks[index].order = b;
        self.blocks[other].order = a;
        ordering::swap_adjacent(&mut self.blocks, index, direction)
    }

    pub fn push(&mut self, block: BlockEditor) {
        self.blocks.push(block);
    }

    pub fn remove(&mut self, id: BlockId) -> Option<BlockEditor> {
        let index = self.position(id)?;
        Some(self.blocks.remove(index))
    }

    fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }
}
