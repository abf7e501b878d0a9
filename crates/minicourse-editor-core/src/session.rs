//! The editor page session.
//!
//! `EditorSession` owns all page state and runs every user operation. Each
//! operation follows the same shape:
//!
//! 1. plan: read what it needs from state and the page, checking
//!    preconditions (a failed precondition alerts and stops);
//! 2. call the backend, with no state borrowed;
//! 3. on success, re-check that the target is still there, update state and
//!    emit view patches; on failure, alert and leave state as it was.
//!
//! The session is cheap to clone; clones share state, so event handlers can
//! each hold one and run concurrently on the page's single thread.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use minicourse_common::{
    AiApi, ApiError, BlockContent, BlockId, BlockType, Config, CourseApi, CourseId, CourseSection,
    Direction, EntityKind, LessonId, ModuleId,
};

use crate::actions::{Action, BlockAction, PanelAction, StructureAction};
use crate::ai::{AiTrigger, BusyGuard, DEFAULT_QUIZ_CONTEXT, DEFAULT_TEXT_PROMPT};
use crate::blocks::{BlockEditor, BlockList};
use crate::error::EditorError;
use crate::patch::{SuggestionBody, SuggestionTarget, ViewPatch};
use crate::platform::{Platform, RichTextEditor, TriggerControl};
use crate::registry::{RichTextRegistry, section_container_id};
use crate::render;
use crate::settings::{CounterKind, read_settings};
use crate::tree::StructureTree;
use crate::types::{FormField, NodeKind, NodeRef};

/// Alert shown when a rich-text editor cannot be created.
pub const RICH_TEXT_FAILED: &str = "Failed to start the text editor. Please reload the page.";

/// Page state shared by all handlers.
#[derive(Debug)]
pub struct EditorState<R> {
    pub tree: StructureTree,
    pub blocks: BlockList,
    pub rich_text: RichTextRegistry<R>,
    /// Module shown in the module panel.
    pub current_module: Option<ModuleId>,
    /// Lesson shown in the lesson panel; new blocks go here.
    pub current_lesson: Option<LessonId>,
    /// Bumped whenever `blocks` is replaced. Responses planned against an
    /// older list are not applied to the new one.
    pub block_generation: u64,
}

impl<R: RichTextEditor> EditorState<R> {
    /// Swap in a new block list, dropping the old list's rich-text editors.
    fn replace_blocks(&mut self, list: BlockList) {
        let old = std::mem::replace(&mut self.blocks, list);
        for id in old.iter().filter_map(BlockEditor::container_id) {
            self.rich_text.remove(&id);
        }
        self.block_generation += 1;
    }
}

pub struct EditorSession<A, P: Platform> {
    course_id: CourseId,
    api: Rc<A>,
    platform: Rc<P>,
    config: Rc<Config>,
    state: Rc<RefCell<EditorState<P::RichText>>>,
}

impl<A, P: Platform> Clone for EditorSession<A, P> {
    fn clone(&self) -> Self {
        Self {
            course_id: self.course_id,
            api: Rc::clone(&self.api),
            platform: Rc::clone(&self.platform),
            config: Rc::clone(&self.config),
            state: Rc::clone(&self.state),
        }
    }
}

impl<A, P> EditorSession<A, P>
where
    A: CourseApi + AiApi,
    P: Platform,
{
    pub fn new(api: A, platform: P, config: Config, tree: StructureTree) -> Self {
        Self {
            course_id: tree.course_id(),
            api: Rc::new(api),
            platform: Rc::new(platform),
            config: Rc::new(config),
            state: Rc::new(RefCell::new(EditorState {
                tree,
                blocks: BlockList::default(),
                rich_text: RichTextRegistry::new(),
                current_module: None,
                current_lesson: None,
                block_generation: 0,
            })),
        }
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Read access to the page state. Do not hold across an await.
    pub fn state(&self) -> Ref<'_, EditorState<P::RichText>> {
        self.state.borrow()
    }

    // === Plumbing ===

    fn patch(&self, patch: ViewPatch) {
        self.platform.apply(patch);
    }

    fn read(&self, field: FormField) -> Option<String> {
        self.platform.read_field(field)
    }

    /// Alert `message` and hand the error back for the caller to return.
    fn fail(&self, err: impl Into<EditorError>, message: &str) -> EditorError {
        let err = err.into();
        tracing::warn!(error = %err, "{}", message);
        self.platform.alert(message);
        err
    }

    /// Generic notification for a failed editor request.
    fn fail_request(&self, err: ApiError) -> EditorError {
        let message = format!("Error: {err}");
        self.fail(err, &message)
    }

    fn fail_ai(&self, err: ApiError) -> EditorError {
        let message = format!("AI request failed: {}", err.user_message());
        self.fail(err, &message)
    }

    /// A precondition the user can fix; the error's text is the alert.
    fn refuse(&self, err: EditorError) -> EditorError {
        let message = err.to_string();
        self.fail(err, &message)
    }

    /// A rich-text editor did not start; its content cannot be edited or saved.
    fn fail_rich_text(&self, err: EditorError) -> EditorError {
        self.fail(err, RICH_TEXT_FAILED)
    }

    fn init_rich_text(&self, container_id: &str, html: &str) -> Result<bool, EditorError> {
        let mut state = self.state.borrow_mut();
        let platform = &self.platform;
        Ok(state
            .rich_text
            .init(container_id, html, |id| platform.create_rich_text(id))?)
    }

    fn rich_text_html(&self, container_id: &str) -> Option<String> {
        self.state
            .borrow()
            .rich_text
            .get(container_id)
            .map(RichTextEditor::html)
    }

    /// Pull a block's page form into its draft. Rich-text blocks have no form.
    fn sync_block(&self, block_id: BlockId) -> Option<BlockType> {
        let block_type = self.state.borrow().blocks.get(block_id)?.block_type.clone();
        if !block_type.is_rich_text() {
            if let Some(form) = self.platform.read_block(block_id, &block_type) {
                if let Some(block) = self.state.borrow_mut().blocks.get_mut(block_id) {
                    block.sync_form(form);
                }
            }
        }
        Some(block_type)
    }

    // === Dispatch ===

    /// Run the operation a click resolved to.
    ///
    /// `control` is the clicked element; AI triggers keep it busy while their
    /// request is in flight.
    pub async fn dispatch<C: TriggerControl>(
        &self,
        action: Action,
        control: C,
    ) -> Result<(), EditorError> {
        tracing::debug!(?action, "dispatch");
        match action {
            Action::Structure(action) => match action {
                StructureAction::Select(node) => self.select(node).await,
                StructureAction::Move { node, direction } => match node.kind.entity() {
                    Some(kind) => self.move_item(kind, node.id, direction).await,
                    None => Ok(()),
                },
                StructureAction::Delete(node) => self.delete_node(node).await,
                StructureAction::AddModule => self.add_module().await,
                StructureAction::AddLesson(module_id) => self.add_lesson(module_id).await,
            },
            Action::Block(action) => match action {
                BlockAction::Save(id) => self.save_block(id).await,
                BlockAction::Delete(id) => self.delete_block(id).await,
                BlockAction::Move { id, direction } => {
                    self.move_item(EntityKind::Block, id, direction).await
                }
                BlockAction::Add => {
                    let block_type = self
                        .read(FormField::NewBlockType)
                        .map(|name| BlockType::parse(name.trim()))
                        .unwrap_or(BlockType::Text);
                    self.add_block(block_type).await
                }
                BlockAction::AddOption(id) => self.add_quiz_option(id),
                BlockAction::RemoveOption { id, index } => self.remove_quiz_option(id, index),
            },
            Action::Panel(action) => match action {
                PanelAction::SaveSettings => self.save_settings().await,
                PanelAction::SaveSection(section) => self.save_section(section).await,
                PanelAction::SaveModuleTitle => self.save_module_title().await,
                PanelAction::SaveLessonTitle => self.save_lesson_title().await,
            },
            Action::Ai(trigger) => self.run_ai(trigger, control).await,
            Action::CloseModal => {
                self.close_modal();
                Ok(())
            }
        }
    }

    // === Structure panel ===

    /// Load the panel for the node that is active at page load, or the
    /// course settings when none is.
    pub async fn start(&self) -> Result<(), EditorError> {
        let node = self
            .state
            .borrow()
            .tree
            .active()
            .unwrap_or(NodeRef::course(self.course_id));
        self.load_editor_content(node.kind, node.id).await
    }

    /// Mark `node` as the single active node and load its panel.
    pub async fn select(&self, node: NodeRef) -> Result<(), EditorError> {
        if !self.state.borrow_mut().tree.set_active(node) {
            tracing::warn!(kind = %node.kind, id = node.id, "select on a node not in the tree");
            return Err(EditorError::unknown(node.kind.as_str(), node.id));
        }
        self.patch(ViewPatch::MarkActive(node));
        self.load_editor_content(node.kind, node.id).await
    }

    /// Show the panel for `kind` and fill it from the backend.
    ///
    /// On failure the panel is hidden again.
    pub async fn load_editor_content(&self, kind: NodeKind, id: i64) -> Result<(), EditorError> {
        tracing::debug!(%kind, id, "loading editor content");
        self.patch(ViewPatch::ShowPanel(kind));

        match self.fill_panel(kind, id).await {
            Ok(()) => Ok(()),
            // Content arrived; an editor that failed to start was reported.
            Err(err @ EditorError::Platform(_)) => Err(err),
            Err(err) => {
                self.patch(ViewPatch::HidePanel(kind));
                let message = format!("Failed to load content for {kind}. Please try again.");
                Err(self.fail(err, &message))
            }
        }
    }

    async fn fill_panel(&self, kind: NodeKind, id: i64) -> Result<(), EditorError> {
        match kind {
            // The settings form is rendered with the page.
            NodeKind::Course => Ok(()),
            NodeKind::Intro | NodeKind::Conclusion => {
                let section = match kind {
                    NodeKind::Intro => CourseSection::Intro,
                    _ => CourseSection::Conclusion,
                };
                let html = self.api.section_content(self.course_id, section).await?;
                self.init_rich_text(section_container_id(section), &html)
                    .map_err(|err| self.fail_rich_text(err))?;
                Ok(())
            }
            NodeKind::Module => {
                let details = self.api.module_details(id).await?;
                self.state.borrow_mut().current_module = Some(id);
                self.patch(ViewPatch::SetField {
                    field: FormField::ModuleTitle,
                    value: details.title,
                });
                self.patch(ViewPatch::SetField {
                    field: FormField::CurrentModuleId,
                    value: id.to_string(),
                });
                Ok(())
            }
            NodeKind::Lesson => {
                let details = self.api.lesson_details(id).await?;
                self.state.borrow_mut().current_lesson = Some(id);
                self.patch(ViewPatch::SetField {
                    field: FormField::LessonTitle,
                    value: details.title,
                });
                self.patch(ViewPatch::SetField {
                    field: FormField::CurrentLessonId,
                    value: id.to_string(),
                });
                self.render_blocks(BlockList::load(id, details.blocks))
            }
        }
    }

    /// Replace the block area with `list`, dropping the previous lesson's
    /// rich-text editors.
    ///
    /// Every rich-text block gets its editor even when an earlier one fails;
    /// the first failure is reported once and returned.
    fn render_blocks(&self, list: BlockList) -> Result<(), EditorError> {
        let html = render::block_list(&list);
        let containers: Vec<(String, String)> = list
            .iter()
            .filter_map(|block| match (&block.draft, block.container_id()) {
                (BlockContent::RichText { html }, Some(id)) => Some((id.to_string(), html.clone())),
                _ => None,
            })
            .collect();

        self.state.borrow_mut().replace_blocks(list);

        self.patch(ViewPatch::RenderBlocks { html });
        let mut first_err = None;
        for (container_id, html) in containers {
            if let Err(err) = self.init_rich_text(&container_id, &html) {
                tracing::warn!(
                    container_id = %container_id,
                    error = %err,
                    "rich-text editor failed to start"
                );
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(self.fail_rich_text(err)),
            None => Ok(()),
        }
    }

    /// Swap a module, lesson or block with its sibling once the backend agrees.
    ///
    /// An item already at the edge of its list is left alone without asking
    /// the backend.
    pub async fn move_item(
        &self,
        kind: EntityKind,
        id: i64,
        direction: Direction,
    ) -> Result<(), EditorError> {
        let node = match kind {
            EntityKind::Module => Some(NodeRef::module(id)),
            EntityKind::Lesson => Some(NodeRef::lesson(id)),
            EntityKind::Block => None,
        };
        let (movable, generation) = {
            let state = self.state.borrow();
            let movable = match node {
                Some(node) => state.tree.can_move(node, direction),
                None => state.blocks.can_move(id, direction),
            };
            (movable, state.block_generation)
        };
        if !movable {
            tracing::debug!(%kind, id, %direction, "nothing to swap with");
            return Ok(());
        }

        if let Err(err) = self.api.move_item(kind, id, direction).await {
            return Err(self.fail(err, &format!("Failed to move {kind}.")));
        }

        let moved = {
            let mut state = self.state.borrow_mut();
            match node {
                Some(node) => state.tree.swap(node, direction),
                None if state.block_generation == generation => state.blocks.swap(id, direction),
                // The lesson was reloaded; the fresh list already has the
                // backend's order.
                None => false,
            }
        };
        if moved {
            self.patch(ViewPatch::MoveItem {
                kind,
                id,
                direction,
            });
        } else {
            tracing::debug!(%kind, id, "moved item left the page before the backend answered");
        }
        Ok(())
    }

    /// Delete a module or lesson after confirmation.
    ///
    /// When the active node goes with it, the course settings are selected.
    pub async fn delete_node(&self, node: NodeRef) -> Result<(), EditorError> {
        let Some(kind) = node.kind.entity() else {
            return Err(EditorError::unknown(node.kind.as_str(), node.id));
        };
        if !self.state.borrow().tree.contains(node) {
            return Err(EditorError::unknown(node.kind.as_str(), node.id));
        }
        if !self
            .platform
            .confirm(&format!("Are you sure you want to delete this {kind}?"))
        {
            return Ok(());
        }

        if let Err(err) = self.api.delete_item(kind, node.id).await {
            return Err(self.fail_request(err));
        }

        let active_removed = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            let removed = state.tree.remove(node);
            if state
                .current_lesson
                .is_some_and(|l| state.tree.module_of(l).is_none())
            {
                state.current_lesson = None;
                state.replace_blocks(BlockList::default());
            }
            if state
                .current_module
                .is_some_and(|m| state.tree.module(m).is_none())
            {
                state.current_module = None;
            }
            removed
        };
        let Some(active_removed) = active_removed else {
            return Ok(());
        };

        self.patch(ViewPatch::RemoveNode(node));
        if active_removed {
            self.select(NodeRef::course(self.course_id)).await?;
        }
        Ok(())
    }

    pub async fn add_module(&self) -> Result<(), EditorError> {
        let item = self
            .api
            .add_module(self.course_id)
            .await
            .map_err(|err| self.fail_request(err))?;

        self.state.borrow_mut().tree.push_module(&item);
        self.patch(ViewPatch::AppendModule {
            html: render::structure_item(NodeKind::Module, &item),
        });
        Ok(())
    }

    pub async fn add_lesson(&self, module_id: ModuleId) -> Result<(), EditorError> {
        let item = self
            .api
            .add_lesson(module_id)
            .await
            .map_err(|err| self.fail_request(err))?;

        if !self.state.borrow_mut().tree.push_lesson(module_id, &item) {
            tracing::debug!(module_id, "module removed before its new lesson arrived");
            return Ok(());
        }
        self.patch(ViewPatch::AppendLesson {
            module_id,
            html: render::structure_item(NodeKind::Lesson, &item),
        });
        Ok(())
    }

    // === Content blocks ===

    /// Add a block of `block_type` to the current lesson.
    pub async fn add_block(&self, block_type: BlockType) -> Result<(), EditorError> {
        let Some(lesson_id) = self.state.borrow().current_lesson else {
            return Err(self.refuse(EditorError::MissingPrerequisite(
                "Please select a lesson first.",
            )));
        };
        if !BlockType::CREATABLE.contains(&block_type) {
            tracing::debug!(%block_type, "refusing to create block");
            return Err(self.refuse(EditorError::MissingInput(
                "Please choose a valid block type.",
            )));
        }
        let generation = self.state.borrow().block_generation;

        let record = self
            .api
            .add_block(lesson_id, &block_type)
            .await
            .map_err(|err| self.fail_request(err))?;

        let block = BlockEditor::from_record(record);
        {
            let mut state = self.state.borrow_mut();
            if state.block_generation != generation || state.blocks.lesson_id() != Some(lesson_id)
            {
                tracing::debug!(lesson_id, "lesson reloaded before the new block arrived");
                return Ok(());
            }
            state.blocks.push(block.clone());
        }

        self.patch(ViewPatch::AppendBlock {
            html: render::block_widget(&block),
        });
        if let (Some(container_id), BlockContent::RichText { html }) =
            (block.container_id(), &block.draft)
        {
            self.init_rich_text(&container_id, html)
                .map_err(|err| self.fail_rich_text(err))?;
        }
        Ok(())
    }

    /// Send a block's current content to the backend.
    pub async fn save_block(&self, block_id: BlockId) -> Result<(), EditorError> {
        let Some(block_type) = self.sync_block(block_id) else {
            return Err(EditorError::unknown("block", block_id));
        };
        let content = if block_type.is_rich_text() {
            let container_id = crate::registry::block_container_id(block_id);
            BlockContent::RichText {
                html: self.rich_text_html(&container_id).unwrap_or_default(),
            }
        } else {
            match self.state.borrow().blocks.get(block_id) {
                Some(block) => block.draft.clone(),
                None => return Err(EditorError::unknown("block", block_id)),
            }
        };

        self.api
            .save_block(block_id, &content.to_wire())
            .await
            .map_err(|err| self.fail_request(err))?;

        if let Some(block) = self.state.borrow_mut().blocks.get_mut(block_id) {
            block.draft = content;
        }
        self.platform.alert("Block saved.");
        Ok(())
    }

    /// Delete a block after confirmation; it leaves the page only once the
    /// backend has deleted it.
    pub async fn delete_block(&self, block_id: BlockId) -> Result<(), EditorError> {
        if self.state.borrow().blocks.get(block_id).is_none() {
            return Err(EditorError::unknown("block", block_id));
        }
        if !self
            .platform
            .confirm("Are you sure you want to delete this content block?")
        {
            return Ok(());
        }

        self.api
            .delete_item(EntityKind::Block, block_id)
            .await
            .map_err(|err| self.fail_request(err))?;

        let now_empty = {
            let mut state = self.state.borrow_mut();
            let Some(block) = state.blocks.remove(block_id) else {
                return Ok(());
            };
            if let Some(container_id) = block.container_id() {
                state.rich_text.remove(&container_id);
            }
            state.blocks.is_empty()
        };

        self.patch(ViewPatch::RemoveBlock(block_id));
        if now_empty {
            self.patch(ViewPatch::RenderBlocks {
                html: render::BLOCKS_PLACEHOLDER_HTML.to_owned(),
            });
        }
        self.platform.alert("Block deleted.");
        Ok(())
    }

    /// Append a "New Option" row to a quiz. Saved with the block.
    pub fn add_quiz_option(&self, block_id: BlockId) -> Result<(), EditorError> {
        self.sync_block(block_id)
            .ok_or_else(|| EditorError::unknown("block", block_id))?;
        let Some(index) = self
            .state
            .borrow_mut()
            .blocks
            .get_mut(block_id)
            .and_then(BlockEditor::add_quiz_option)
        else {
            return Ok(());
        };
        self.patch(ViewPatch::AppendQuizOption {
            block_id,
            html: render::quiz_option(block_id, index, crate::blocks::NEW_OPTION_TEXT, false),
        });
        Ok(())
    }

    /// Drop a quiz option row. Saved with the block.
    pub fn remove_quiz_option(&self, block_id: BlockId, index: usize) -> Result<(), EditorError> {
        self.sync_block(block_id)
            .ok_or_else(|| EditorError::unknown("block", block_id))?;
        let removed = self
            .state
            .borrow_mut()
            .blocks
            .get_mut(block_id)
            .is_some_and(|block| block.remove_quiz_option(index));
        if removed {
            self.patch(ViewPatch::RemoveQuizOption { block_id, index });
        }
        Ok(())
    }

    // === Editor panels ===

    pub async fn save_settings(&self) -> Result<(), EditorError> {
        let settings = read_settings(&*self.platform);
        if settings.outcome.trim().is_empty() {
            return Err(self.refuse(EditorError::MissingInput(
                "Learning Outcome is mandatory.",
            )));
        }

        self.api
            .save_settings(self.course_id, &settings)
            .await
            .map_err(|err| self.fail_request(err))?;

        self.platform.alert("Course settings saved.");
        self.patch(ViewPatch::SetDocumentTitle(
            self.config.document_title(&settings.title),
        ));
        Ok(())
    }

    /// Save the intro or conclusion editor. Nothing happens until the panel
    /// has been opened once.
    pub async fn save_section(&self, section: CourseSection) -> Result<(), EditorError> {
        let Some(html) = self.rich_text_html(section_container_id(section)) else {
            tracing::debug!(section = section.as_str(), "section editor not initialised");
            return Ok(());
        };

        self.api
            .save_section(self.course_id, section, &html)
            .await
            .map_err(|err| self.fail_request(err))?;

        self.platform.alert(match section {
            CourseSection::Intro => "Introduction saved.",
            CourseSection::Conclusion => "Conclusion saved.",
        });
        Ok(())
    }

    pub async fn save_module_title(&self) -> Result<(), EditorError> {
        let module_id = self.state.borrow().current_module;
        let title = self.read(FormField::ModuleTitle).unwrap_or_default();
        let (Some(module_id), false) = (module_id, title.trim().is_empty()) else {
            return Ok(());
        };

        let stored = self
            .api
            .rename_module(module_id, &title)
            .await
            .map_err(|err| self.fail_request(err))?;

        self.rename_node(NodeRef::module(module_id), stored);
        self.platform.alert("Module title saved.");
        Ok(())
    }

    pub async fn save_lesson_title(&self) -> Result<(), EditorError> {
        let lesson_id = self.state.borrow().current_lesson;
        let title = self.read(FormField::LessonTitle).unwrap_or_default();
        let (Some(lesson_id), false) = (lesson_id, title.trim().is_empty()) else {
            return Ok(());
        };

        let stored = self
            .api
            .rename_lesson(lesson_id, &title)
            .await
            .map_err(|err| self.fail_request(err))?;

        self.rename_node(NodeRef::lesson(lesson_id), stored);
        self.platform.alert("Lesson title saved.");
        Ok(())
    }

    fn rename_node(&self, node: NodeRef, title: String) {
        if self.state.borrow_mut().tree.rename(node, &title) {
            self.patch(ViewPatch::SetNodeTitle { node, title });
        }
    }

    /// Refresh a character counter from its field.
    pub fn update_counter(&self, counter: CounterKind) {
        let value = self.read(counter.field()).unwrap_or_default();
        let (text, over_limit) = counter.counter().render(&value);
        self.patch(ViewPatch::SetCounter {
            counter,
            text,
            over_limit,
        });
    }

    // === AI assist ===

    /// Run an AI trigger. Overlapping requests are not de-duplicated.
    pub async fn run_ai<C: TriggerControl>(
        &self,
        trigger: AiTrigger,
        control: C,
    ) -> Result<(), EditorError> {
        tracing::debug!(trigger = trigger.name(), "ai request");
        match trigger {
            AiTrigger::GenerateText { block_id } => self.generate_text(block_id, control).await,
            AiTrigger::GenerateQuiz { block_id } => self.generate_quiz(block_id, control).await,
            AiTrigger::AnalyzeOutcome => self.analyze_outcome(control).await,
            AiTrigger::AnalyzeAudience => self.analyze_audience(control).await,
            AiTrigger::SuggestStructure => self.suggest_structure(control).await,
            AiTrigger::SuggestImage { block_id } => self.suggest_image(block_id, control).await,
            AiTrigger::Explain { concept } => self.explain(&concept).await,
        }
    }

    /// Lesson title as AI context: `fallback` when the field is empty, then
    /// trimmed.
    fn lesson_context(&self, fallback: &str) -> String {
        let title = self
            .read(FormField::LessonTitle)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback.to_owned());
        title.trim().to_owned()
    }

    async fn generate_text<C: TriggerControl>(
        &self,
        block_id: BlockId,
        control: C,
    ) -> Result<(), EditorError> {
        let container_id = {
            let state = self.state.borrow();
            state
                .blocks
                .get(block_id)
                .and_then(BlockEditor::container_id)
                .filter(|id| state.rich_text.contains(id))
        };
        let Some(container_id) = container_id else {
            tracing::debug!(block_id, "no rich-text editor for generated text");
            return Ok(());
        };
        let prompt = self.lesson_context(DEFAULT_TEXT_PROMPT);
        if prompt.is_empty() {
            return Err(self.refuse(EditorError::MissingInput(
                "Please provide a lesson title for context.",
            )));
        }

        let result = {
            let _busy = BusyGuard::new(control);
            self.api.generate_text(&prompt).await
        };
        let text = result.map_err(|err| self.fail_ai(err))?;

        if text.is_empty() {
            return Ok(());
        }
        if let Some(editor) = self.state.borrow().rich_text.get(&container_id) {
            editor.set_text(&text);
        }
        Ok(())
    }

    async fn generate_quiz<C: TriggerControl>(
        &self,
        block_id: BlockId,
        control: C,
    ) -> Result<(), EditorError> {
        let kind = {
            let state = self.state.borrow();
            state.blocks.get(block_id).and_then(|b| b.quiz()).map(|q| q.kind)
        };
        let Some(kind) = kind else {
            tracing::debug!(block_id, "generate-quiz on a non-quiz block");
            return Ok(());
        };
        let context = self.lesson_context(DEFAULT_QUIZ_CONTEXT);

        let result = {
            let _busy = BusyGuard::new(control);
            self.api.generate_quiz(&context).await
        };
        let suggestion = result.map_err(|err| self.fail_ai(err))?;

        let html = {
            let mut state = self.state.borrow_mut();
            let Some(block) = state.blocks.get_mut(block_id) else {
                return Ok(());
            };
            if !block.apply_quiz(suggestion.into_content(kind)) {
                return Ok(());
            }
            render::block_widget(block)
        };
        self.patch(ViewPatch::ReplaceBlock { block_id, html });
        Ok(())
    }

    async fn analyze_outcome<C: TriggerControl>(&self, control: C) -> Result<(), EditorError> {
        let outcome = self
            .read(FormField::CourseOutcome)
            .unwrap_or_default()
            .trim()
            .to_owned();
        if outcome.is_empty() {
            return Err(self.refuse(EditorError::MissingInput(
                "Please enter a learning outcome first.",
            )));
        }

        let result = {
            let _busy = BusyGuard::new(control);
            self.api.analyze_outcome(&outcome).await
        };
        let suggestion = result.map_err(|err| self.fail_ai(err))?;
        self.show_text_suggestion(SuggestionTarget::Outcome, &suggestion);
        Ok(())
    }

    async fn analyze_audience<C: TriggerControl>(&self, control: C) -> Result<(), EditorError> {
        let audience = self
            .read(FormField::CourseAudience)
            .unwrap_or_default()
            .trim()
            .to_owned();
        if audience.is_empty() {
            return Err(self.refuse(EditorError::MissingInput(
                "Please enter a target audience first.",
            )));
        }

        let result = {
            let _busy = BusyGuard::new(control);
            self.api.analyze_audience(&audience).await
        };
        let suggestion = result.map_err(|err| self.fail_ai(err))?;
        self.show_text_suggestion(SuggestionTarget::Audience, &suggestion);
        Ok(())
    }

    async fn suggest_structure<C: TriggerControl>(&self, control: C) -> Result<(), EditorError> {
        let topic = self
            .read(FormField::CourseTitle)
            .unwrap_or_default()
            .trim()
            .to_owned();
        if topic.is_empty() {
            return Err(self.refuse(EditorError::MissingInput(
                "Please enter a course title (topic) first.",
            )));
        }

        let result = {
            let _busy = BusyGuard::new(control);
            self.api.suggest_structure(&topic).await
        };
        let structure = result.map_err(|err| self.fail_ai(err))?;
        self.patch(ViewPatch::ShowSuggestion {
            target: SuggestionTarget::Structure,
            body: SuggestionBody::Html(render::structure_suggestion(&structure)),
        });
        Ok(())
    }

    async fn suggest_image<C: TriggerControl>(
        &self,
        block_id: BlockId,
        control: C,
    ) -> Result<(), EditorError> {
        let is_image = self
            .state
            .borrow()
            .blocks
            .get(block_id)
            .is_some_and(|b| b.block_type == BlockType::Image);
        if !is_image {
            tracing::debug!(block_id, "suggest-image on a block without an image panel");
            return Ok(());
        }
        let context = self.lesson_context(DEFAULT_TEXT_PROMPT);

        let result = {
            let _busy = BusyGuard::new(control);
            self.api.suggest_image(&context).await
        };
        let suggestion = result.map_err(|err| self.fail_ai(err))?;
        if self.state.borrow().blocks.get(block_id).is_none() {
            return Ok(());
        }
        self.show_text_suggestion(SuggestionTarget::Image(block_id), &suggestion);
        Ok(())
    }

    fn show_text_suggestion(&self, target: SuggestionTarget, suggestion: &str) {
        if suggestion.is_empty() {
            return;
        }
        self.patch(ViewPatch::ShowSuggestion {
            target,
            body: SuggestionBody::Text(format!("AI Suggestion: {suggestion}")),
        });
    }

    /// Explain a concept in the shared modal.
    pub async fn explain(&self, concept: &str) -> Result<(), EditorError> {
        if concept.is_empty() {
            return Ok(());
        }
        self.patch(ViewPatch::ShowModal {
            html: render::MODAL_FETCHING_HTML.to_owned(),
        });

        match self.api.explain(concept).await {
            Ok(explanation) if !explanation.is_empty() => {
                self.patch(ViewPatch::ShowModal { html: explanation });
                Ok(())
            }
            Ok(_) => {
                self.patch(ViewPatch::ShowModal {
                    html: render::MODAL_FAILED_HTML.to_owned(),
                });
                Ok(())
            }
            Err(err) => {
                let err = self.fail_ai(err);
                self.patch(ViewPatch::ShowModal {
                    html: render::MODAL_FAILED_HTML.to_owned(),
                });
                Err(err)
            }
        }
    }

    pub fn close_modal(&self) {
        self.patch(ViewPatch::HideModal);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use minicourse_common::{
        BlockRecord, CourseSettings, LessonDetails, ModuleDetails, NO_CORRECT_ANSWER,
        QuizSuggestion, StructureItem,
    };
    use minicourse_common::telemetry::{self, TelemetryConfig};
    use serde_json::{Value, json};

    use super::*;
    use crate::PlatformError;
    use crate::blocks::BlockForm;
    use crate::tree::ModuleNode;

    const COURSE: CourseId = 1;

    // === Fakes ===

    #[derive(Default)]
    struct FakeApi {
        calls: RefCell<Vec<String>>,
        failing: RefCell<Vec<&'static str>>,
        lessons: RefCell<HashMap<LessonId, LessonDetails>>,
        saved_blocks: RefCell<Vec<(BlockId, Value)>>,
        section_html: String,
        ai_text: String,
        structure: Value,
        next_id: Cell<i64>,
        /// Let other tasks run before a move is answered.
        slow_moves: Cell<bool>,
    }

    impl FakeApi {
        fn fail(&self, method: &'static str) {
            self.failing.borrow_mut().push(method);
        }

        fn call(&self, method: &'static str, detail: String) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(format!("{method} {detail}"));
            if self.failing.borrow().contains(&method) {
                return Err(ApiError::Status {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn fresh_id(&self) -> i64 {
            let id = self.next_id.get() + 100;
            self.next_id.set(self.next_id.get() + 1);
            id
        }
    }

    impl CourseApi for FakeApi {
        async fn save_settings(
            &self,
            course_id: CourseId,
            settings: &CourseSettings,
        ) -> Result<(), ApiError> {
            self.call("save_settings", format!("{course_id} {}", settings.title))
        }

        async fn section_content(
            &self,
            course_id: CourseId,
            section: CourseSection,
        ) -> Result<String, ApiError> {
            self.call("section_content", format!("{course_id} {}", section.as_str()))?;
            Ok(self.section_html.clone())
        }

        async fn save_section(
            &self,
            course_id: CourseId,
            section: CourseSection,
            html: &str,
        ) -> Result<(), ApiError> {
            self.call(
                "save_section",
                format!("{course_id} {} {html}", section.as_str()),
            )
        }

        async fn add_module(&self, course_id: CourseId) -> Result<StructureItem, ApiError> {
            self.call("add_module", course_id.to_string())?;
            Ok(StructureItem {
                id: self.fresh_id(),
                title: "New Module".into(),
                order: 9,
            })
        }

        async fn module_details(&self, module_id: ModuleId) -> Result<ModuleDetails, ApiError> {
            self.call("module_details", module_id.to_string())?;
            Ok(ModuleDetails {
                id: Some(module_id),
                title: format!("Module {module_id}"),
            })
        }

        async fn rename_module(&self, module_id: ModuleId, title: &str) -> Result<String, ApiError> {
            self.call("rename_module", format!("{module_id} {title}"))?;
            Ok(title.trim().to_owned())
        }

        async fn add_lesson(&self, module_id: ModuleId) -> Result<StructureItem, ApiError> {
            self.call("add_lesson", module_id.to_string())?;
            Ok(StructureItem {
                id: self.fresh_id(),
                title: "New Lesson".into(),
                order: 1,
            })
        }

        async fn lesson_details(&self, lesson_id: LessonId) -> Result<LessonDetails, ApiError> {
            self.call("lesson_details", lesson_id.to_string())?;
            Ok(self
                .lessons
                .borrow()
                .get(&lesson_id)
                .cloned()
                .unwrap_or(LessonDetails {
                    id: Some(lesson_id),
                    title: format!("Lesson {lesson_id}"),
                    blocks: Vec::new(),
                }))
        }

        async fn rename_lesson(&self, lesson_id: LessonId, title: &str) -> Result<String, ApiError> {
            self.call("rename_lesson", format!("{lesson_id} {title}"))?;
            Ok(title.trim().to_owned())
        }

        async fn add_block(
            &self,
            lesson_id: LessonId,
            block_type: &BlockType,
        ) -> Result<BlockRecord, ApiError> {
            self.call("add_block", format!("{lesson_id} {block_type}"))?;
            Ok(BlockRecord {
                id: self.fresh_id(),
                block_type: block_type.clone(),
                order: 99,
                content: json!({}),
            })
        }

        async fn save_block(&self, block_id: BlockId, content: &Value) -> Result<(), ApiError> {
            self.call("save_block", block_id.to_string())?;
            self.saved_blocks.borrow_mut().push((block_id, content.clone()));
            Ok(())
        }

        async fn delete_item(&self, kind: EntityKind, id: i64) -> Result<(), ApiError> {
            self.call("delete_item", format!("{kind} {id}"))
        }

        async fn move_item(
            &self,
            kind: EntityKind,
            id: i64,
            direction: Direction,
        ) -> Result<(), ApiError> {
            let result = self.call("move_item", format!("{kind} {id} {direction}"));
            if self.slow_moves.get() {
                tokio::task::yield_now().await;
            }
            result
        }
    }

    impl AiApi for FakeApi {
        async fn generate_text(&self, prompt: &str) -> Result<String, ApiError> {
            self.call("generate_text", prompt.to_owned())?;
            Ok(self.ai_text.clone())
        }

        async fn generate_quiz(&self, context: &str) -> Result<QuizSuggestion, ApiError> {
            self.call("generate_quiz", context.to_owned())?;
            Ok(QuizSuggestion {
                question: "Which grain?".into(),
                kind: Some("MCQ".into()),
                options: vec!["Rye".into(), "Wheat".into()],
                correct_answer: Some(1),
            })
        }

        async fn analyze_outcome(&self, outcome: &str) -> Result<String, ApiError> {
            self.call("analyze_outcome", outcome.to_owned())?;
            Ok(self.ai_text.clone())
        }

        async fn analyze_audience(&self, audience: &str) -> Result<String, ApiError> {
            self.call("analyze_audience", audience.to_owned())?;
            Ok(self.ai_text.clone())
        }

        async fn suggest_structure(&self, topic: &str) -> Result<Value, ApiError> {
            self.call("suggest_structure", topic.to_owned())?;
            Ok(self.structure.clone())
        }

        async fn suggest_image(&self, context: &str) -> Result<String, ApiError> {
            self.call("suggest_image", context.to_owned())?;
            Ok(self.ai_text.clone())
        }

        async fn explain(&self, concept_key: &str) -> Result<String, ApiError> {
            self.call("explain", concept_key.to_owned())?;
            Ok(self.ai_text.clone())
        }
    }

    #[derive(Default)]
    struct FakeRichText {
        html: RefCell<String>,
    }

    impl RichTextEditor for FakeRichText {
        fn html(&self) -> String {
            self.html.borrow().clone()
        }

        fn set_html(&self, html: &str) {
            *self.html.borrow_mut() = html.to_owned();
        }

        fn set_text(&self, text: &str) {
            *self.html.borrow_mut() = format!("<p>{text}</p>");
        }
    }

    struct FakePage {
        patches: RefCell<Vec<ViewPatch>>,
        alerts: RefCell<Vec<String>>,
        confirm_answer: Cell<bool>,
        fields: RefCell<HashMap<FormField, String>>,
        forms: RefCell<HashMap<BlockId, BlockForm>>,
        created: Cell<usize>,
        /// Containers whose editor fails to start.
        broken_editors: RefCell<Vec<String>>,
    }

    impl Default for FakePage {
        fn default() -> Self {
            Self {
                patches: RefCell::default(),
                alerts: RefCell::default(),
                confirm_answer: Cell::new(true),
                fields: RefCell::default(),
                forms: RefCell::default(),
                created: Cell::new(0),
                broken_editors: RefCell::default(),
            }
        }
    }

    impl FakePage {
        fn set(&self, field: FormField, value: &str) {
            self.fields.borrow_mut().insert(field, value.to_owned());
        }

        fn alerts(&self) -> Vec<String> {
            self.alerts.borrow().clone()
        }

        fn patches(&self) -> Vec<ViewPatch> {
            self.patches.borrow().clone()
        }

        fn clear(&self) {
            self.patches.borrow_mut().clear();
            self.alerts.borrow_mut().clear();
        }
    }

    impl Platform for FakePage {
        type RichText = FakeRichText;

        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_owned());
        }

        fn confirm(&self, _message: &str) -> bool {
            self.confirm_answer.get()
        }

        fn create_rich_text(
            &self,
            container_id: &str,
        ) -> Result<Option<FakeRichText>, PlatformError> {
            if self.broken_editors.borrow().iter().any(|id| id == container_id) {
                return Err(PlatformError::from("Quill failed to load"));
            }
            self.created.set(self.created.get() + 1);
            Ok(Some(FakeRichText::default()))
        }

        fn read_field(&self, field: FormField) -> Option<String> {
            self.fields.borrow().get(&field).cloned()
        }

        fn read_block(&self, block_id: BlockId, _block_type: &BlockType) -> Option<BlockForm> {
            self.forms.borrow().get(&block_id).cloned()
        }

        fn apply(&self, patch: ViewPatch) {
            self.patches.borrow_mut().push(patch);
        }
    }

    #[derive(Default)]
    struct Button {
        events: RefCell<Vec<String>>,
    }

    impl TriggerControl for Button {
        fn set_busy(&self, label: &str) {
            self.events.borrow_mut().push(format!("busy:{label}"));
        }

        fn restore(&self) {
            self.events.borrow_mut().push("restore".into());
        }
    }

    // === Fixtures ===

    fn tree() -> StructureTree {
        StructureTree::new(COURSE).with_modules(vec![
            ModuleNode::new(1, "Flour")
                .with_lesson(10, "Wheat")
                .with_lesson(11, "Rye"),
            ModuleNode::new(2, "Water"),
        ])
    }

    fn block(id: BlockId, order: i64, block_type: &str, content: Value) -> BlockRecord {
        serde_json::from_value(json!({
            "id": id,
            "order": order,
            "block_type": block_type,
            "content": content,
        }))
        .unwrap()
    }

    fn session_with(api: FakeApi) -> EditorSession<FakeApi, FakePage> {
        telemetry::init(TelemetryConfig::from_env("minicourse-editor-core-tests"));
        EditorSession::new(api, FakePage::default(), Config::default(), tree())
    }

    fn session() -> EditorSession<FakeApi, FakePage> {
        session_with(FakeApi::default())
    }

    /// Session with lesson 10 open, holding a text block (1, order 2), an
    /// image block (2, order 1) and a quiz block (3, order 3).
    async fn lesson_session(api: FakeApi) -> EditorSession<FakeApi, FakePage> {
        api.lessons.borrow_mut().insert(
            10,
            LessonDetails {
                id: Some(10),
                title: "Wheat".into(),
                blocks: vec![
                    block(1, 2, "text", json!({"html": "<p>Knead</p>"})),
                    block(2, 1, "image", json!({"url": "a.png", "alt": "loaf"})),
                    block(
                        3,
                        3,
                        "quiz",
                        json!({"question": "Q", "type": "mc", "options": ["A", "B"], "correct_answer": 0}),
                    ),
                ],
            },
        );
        let session = session_with(api);
        session.select(NodeRef::lesson(10)).await.unwrap();
        session.platform().clear();
        session.api().calls.borrow_mut().clear();
        session
    }

    fn module_order(session: &EditorSession<FakeApi, FakePage>) -> Vec<ModuleId> {
        session.state().tree.modules().iter().map(|m| m.id).collect()
    }

    // === Structure panel ===

    #[tokio::test]
    async fn test_select_lesson_renders_blocks_in_order() {
        let session = lesson_session(FakeApi::default()).await;
        let state = session.state();
        assert_eq!(state.tree.active(), Some(NodeRef::lesson(10)));
        assert_eq!(state.current_lesson, Some(10));
        assert_eq!(state.blocks.ids(), vec![2, 1, 3]);
        assert!(state.rich_text.contains("block-editor-1"));
        assert_eq!(
            state.rich_text.get("block-editor-1").unwrap().html(),
            "<p>Knead</p>"
        );
    }

    #[tokio::test]
    async fn test_render_puts_lower_order_first() {
        let api = FakeApi::default();
        api.lessons.borrow_mut().insert(
            11,
            LessonDetails {
                id: Some(11),
                title: "Rye".into(),
                blocks: vec![
                    block(1, 2, "text", json!({"html": "x"})),
                    block(2, 1, "image", json!({})),
                ],
            },
        );
        let session = session_with(api);
        session.select(NodeRef::lesson(11)).await.unwrap();

        let patches = session.platform().patches();
        assert_eq!(patches[0], ViewPatch::MarkActive(NodeRef::lesson(11)));
        assert_eq!(patches[1], ViewPatch::ShowPanel(NodeKind::Lesson));
        let html = patches
            .iter()
            .find_map(|p| match p {
                ViewPatch::RenderBlocks { html } => Some(html.clone()),
                _ => None,
            })
            .unwrap();
        let second = html.find("data-block-id=\"2\"").unwrap();
        let first = html.find("data-block-id=\"1\"").unwrap();
        assert!(second < first);
    }

    #[tokio::test]
    async fn test_selection_keeps_one_active_node() {
        let session = session();
        session.select(NodeRef::lesson(10)).await.unwrap();
        session.select(NodeRef::module(2)).await.unwrap();
        assert_eq!(session.state().tree.active(), Some(NodeRef::module(2)));
        assert_eq!(session.state().current_module, Some(2));
        assert!(session.platform().patches().contains(&ViewPatch::SetField {
            field: FormField::ModuleTitle,
            value: "Module 2".into(),
        }));

        let err = session.select(NodeRef::lesson(77)).await.unwrap_err();
        assert!(matches!(err, EditorError::UnknownItem { .. }));
        assert_eq!(session.state().tree.active(), Some(NodeRef::module(2)));
    }

    #[tokio::test]
    async fn test_failed_load_hides_panel_and_alerts() {
        let api = FakeApi::default();
        api.fail("module_details");
        let session = session_with(api);
        assert!(session.select(NodeRef::module(1)).await.is_err());
        assert_eq!(
            session.platform().alerts(),
            vec!["Failed to load content for module. Please try again."]
        );
        assert_eq!(
            session.platform().patches().last(),
            Some(&ViewPatch::HidePanel(NodeKind::Module))
        );
    }

    #[tokio::test]
    async fn test_start_loads_course_settings_without_backend_call() {
        let session = session();
        session.start().await.unwrap();
        assert!(session.api().calls().is_empty());
        assert_eq!(
            session.platform().patches(),
            vec![ViewPatch::ShowPanel(NodeKind::Course)]
        );
    }

    #[tokio::test]
    async fn test_move_first_item_up_makes_no_backend_call() {
        let session = session();
        session
            .move_item(EntityKind::Module, 1, Direction::Up)
            .await
            .unwrap();
        session
            .move_item(EntityKind::Lesson, 11, Direction::Down)
            .await
            .unwrap();
        assert!(session.api().calls().is_empty());
        assert!(session.platform().patches().is_empty());
        assert_eq!(module_order(&session), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_move_swaps_after_confirmation() {
        let session = session();
        session
            .move_item(EntityKind::Module, 2, Direction::Up)
            .await
            .unwrap();
        assert_eq!(session.api().calls(), vec!["move_item module 2 up"]);
        assert_eq!(module_order(&session), vec![2, 1]);
        assert_eq!(
            session.platform().patches(),
            vec![ViewPatch::MoveItem {
                kind: EntityKind::Module,
                id: 2,
                direction: Direction::Up,
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_move_keeps_order() {
        let api = FakeApi::default();
        api.fail("move_item");
        let session = session_with(api);
        assert!(
            session
                .move_item(EntityKind::Module, 1, Direction::Down)
                .await
                .is_err()
        );
        assert_eq!(module_order(&session), vec![1, 2]);
        assert_eq!(session.platform().alerts(), vec!["Failed to move module."]);
        assert!(session.platform().patches().is_empty());
    }

    #[tokio::test]
    async fn test_block_move_follows_backend() {
        let session = lesson_session(FakeApi::default()).await;
        session
            .move_item(EntityKind::Block, 1, Direction::Up)
            .await
            .unwrap();
        assert_eq!(session.state().blocks.ids(), vec![1, 2, 3]);

        session
            .move_item(EntityKind::Block, 3, Direction::Down)
            .await
            .unwrap();
        assert_eq!(session.api().calls(), vec!["move_item block 1 up"]);
    }

    #[tokio::test]
    async fn test_failed_block_move_keeps_order() {
        let api = FakeApi::default();
        api.fail("move_item");
        let session = lesson_session(api).await;
        assert!(
            session
                .move_item(EntityKind::Block, 1, Direction::Down)
                .await
                .is_err()
        );
        let state = session.state();
        assert_eq!(state.blocks.ids(), vec![2, 1, 3]);
        let orders: Vec<i64> = state.blocks.iter().map(|b| b.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(session.platform().alerts(), vec!["Failed to move block."]);
        assert!(session.platform().patches().is_empty());
    }

    #[tokio::test]
    async fn test_block_move_answered_after_reload_is_dropped() {
        let api = FakeApi::default();
        api.slow_moves.set(true);
        let session = lesson_session(api).await;

        let (moved, reloaded) = tokio::join!(
            session.move_item(EntityKind::Block, 1, Direction::Down),
            session.select(NodeRef::lesson(10)),
        );
        moved.unwrap();
        reloaded.unwrap();

        assert_eq!(
            session.api().calls(),
            vec!["move_item block 1 down", "lesson_details 10"]
        );
        assert_eq!(session.state().blocks.ids(), vec![2, 1, 3]);
        assert!(
            !session
                .platform()
                .patches()
                .iter()
                .any(|p| matches!(p, ViewPatch::MoveItem { .. }))
        );
    }

    #[tokio::test]
    async fn test_block_order_stays_ascending_through_edits() {
        let session = lesson_session(FakeApi::default()).await;
        session.add_block(BlockType::Video).await.unwrap();
        session
            .move_item(EntityKind::Block, 100, Direction::Up)
            .await
            .unwrap();
        session.delete_block(1).await.unwrap();
        session
            .move_item(EntityKind::Block, 2, Direction::Down)
            .await
            .unwrap();

        assert_eq!(
            session.api().calls(),
            vec![
                "add_block 10 video",
                "move_item block 100 up",
                "delete_item block 1",
                "move_item block 2 down",
            ]
        );
        let state = session.state();
        assert_eq!(state.blocks.ids(), vec![100, 2, 3]);
        let orders: Vec<i64> = state.blocks.iter().map(|b| b.order).collect();
        assert!(orders.windows(2).all(|w| w[0] < w[1]), "{orders:?}");

        // Loading the same records again, as after a server renumbering,
        // gives the same sequence.
        let records = state
            .blocks
            .iter()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|b| block(b.id, b.order, b.block_type.as_str(), json!({})))
            .collect();
        assert_eq!(BlockList::load(10, records).ids(), state.blocks.ids());
    }

    #[tokio::test]
    async fn test_deleting_active_lesson_selects_course() {
        let session = session();
        session.select(NodeRef::lesson(10)).await.unwrap();
        session.platform().clear();

        session.delete_node(NodeRef::module(1)).await.unwrap();

        let state = session.state();
        assert_eq!(state.tree.active(), Some(NodeRef::course(COURSE)));
        assert_eq!(state.current_lesson, None);
        assert!(state.tree.module(1).is_none());
        let patches = session.platform().patches();
        assert_eq!(patches[0], ViewPatch::RemoveNode(NodeRef::module(1)));
        assert!(patches.contains(&ViewPatch::ShowPanel(NodeKind::Course)));
    }

    #[tokio::test]
    async fn test_deleting_open_lesson_drops_its_blocks() {
        let session = lesson_session(FakeApi::default()).await;
        assert!(session.state().rich_text.contains("block-editor-1"));

        session.delete_node(NodeRef::lesson(10)).await.unwrap();

        let state = session.state();
        assert_eq!(state.current_lesson, None);
        assert!(state.blocks.is_empty());
        assert_eq!(state.blocks.lesson_id(), None);
        assert!(!state.rich_text.contains("block-editor-1"));
    }

    #[tokio::test]
    async fn test_declined_delete_does_nothing() {
        let session = session();
        session.platform().confirm_answer.set(false);
        session.delete_node(NodeRef::lesson(11)).await.unwrap();
        assert!(session.api().calls().is_empty());
        assert!(session.state().tree.contains(NodeRef::lesson(11)));
    }

    #[tokio::test]
    async fn test_failed_node_delete_keeps_node() {
        let api = FakeApi::default();
        api.fail("delete_item");
        let session = session_with(api);
        assert!(session.delete_node(NodeRef::lesson(11)).await.is_err());
        assert!(session.state().tree.contains(NodeRef::lesson(11)));
        assert_eq!(
            session.platform().alerts(),
            vec!["Error: HTTP error! status: 500, message: boom"]
        );
    }

    #[tokio::test]
    async fn test_add_module_and_lesson_append() {
        let session = session();
        session.add_module().await.unwrap();
        session.add_lesson(2).await.unwrap();

        let state = session.state();
        assert_eq!(state.tree.modules().len(), 3);
        assert_eq!(state.tree.module_of(101), Some(2));
        let patches = session.platform().patches();
        assert!(matches!(&patches[0], ViewPatch::AppendModule { html } if html.contains("data-id=\"100\"")));
        assert!(matches!(&patches[1], ViewPatch::AppendLesson { module_id: 2, .. }));
    }

    // === Content blocks ===

    #[tokio::test]
    async fn test_add_block_requires_lesson() {
        let session = session();
        let err = session.add_block(BlockType::Text).await.unwrap_err();
        assert!(matches!(err, EditorError::MissingPrerequisite(_)));
        assert_eq!(session.platform().alerts(), vec!["Please select a lesson first."]);
        assert!(session.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_block_appends_and_creates_editor() {
        let session = lesson_session(FakeApi::default()).await;
        session.platform().set(FormField::NewBlockType, "action");
        session
            .dispatch(Action::Block(BlockAction::Add), ())
            .await
            .unwrap();

        assert_eq!(session.api().calls(), vec!["add_block 10 action"]);
        let state = session.state();
        assert_eq!(state.blocks.len(), 4);
        assert!(state.rich_text.contains("block-editor-100"));
        assert!(matches!(
            session.platform().patches().first(),
            Some(ViewPatch::AppendBlock { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_add_block_changes_nothing() {
        let api = FakeApi::default();
        api.fail("add_block");
        let session = lesson_session(api).await;
        assert!(session.add_block(BlockType::Quiz).await.is_err());
        assert_eq!(
            session.platform().alerts(),
            vec!["Error: HTTP error! status: 500, message: boom"]
        );
        assert_eq!(session.state().blocks.ids(), vec![2, 1, 3]);
        assert!(session.platform().patches().is_empty());
    }

    #[tokio::test]
    async fn test_add_block_rejects_unknown_type() {
        let session = lesson_session(FakeApi::default()).await;
        let err = session
            .add_block(BlockType::parse("poll"))
            .await
            .unwrap_err();
        assert!(matches!(err, EditorError::MissingInput(_)));
        assert_eq!(
            session.platform().alerts(),
            vec!["Please choose a valid block type."]
        );
        assert!(session.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_broken_editor_does_not_stop_the_others() {
        let api = FakeApi::default();
        api.lessons.borrow_mut().insert(
            11,
            LessonDetails {
                id: Some(11),
                title: "Rye".into(),
                blocks: vec![
                    block(4, 1, "text", json!({"html": "<p>A</p>"})),
                    block(5, 2, "action", json!({"html": "<p>B</p>"})),
                ],
            },
        );
        let session = session_with(api);
        session
            .platform()
            .broken_editors
            .borrow_mut()
            .push("block-editor-4".into());

        let err = session.select(NodeRef::lesson(11)).await.unwrap_err();
        assert!(matches!(err, EditorError::Platform(_)));

        let state = session.state();
        assert_eq!(state.blocks.ids(), vec![4, 5]);
        assert!(!state.rich_text.contains("block-editor-4"));
        assert_eq!(
            state.rich_text.get("block-editor-5").unwrap().html(),
            "<p>B</p>"
        );
        assert_eq!(session.platform().alerts(), vec![RICH_TEXT_FAILED]);
        assert!(
            !session
                .platform()
                .patches()
                .contains(&ViewPatch::HidePanel(NodeKind::Lesson))
        );
    }

    #[tokio::test]
    async fn test_new_block_editor_failure_is_reported() {
        let session = lesson_session(FakeApi::default()).await;
        session
            .platform()
            .broken_editors
            .borrow_mut()
            .push("block-editor-100".into());

        let err = session.add_block(BlockType::Text).await.unwrap_err();
        assert!(matches!(err, EditorError::Platform(_)));
        assert_eq!(session.state().blocks.len(), 4);
        assert_eq!(session.platform().alerts(), vec![RICH_TEXT_FAILED]);
    }

    #[tokio::test]
    async fn test_failed_block_delete_keeps_count() {
        let api = FakeApi::default();
        api.fail("delete_item");
        let session = lesson_session(api).await;
        assert!(session.delete_block(1).await.is_err());
        assert_eq!(session.state().blocks.len(), 3);
        assert!(session.state().rich_text.contains("block-editor-1"));
        assert!(session.platform().patches().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_last_block_shows_placeholder() {
        let api = FakeApi::default();
        api.lessons.borrow_mut().insert(
            11,
            LessonDetails {
                id: Some(11),
                title: "Rye".into(),
                blocks: vec![block(4, 1, "text", json!({"html": "x"}))],
            },
        );
        let session = session_with(api);
        session.select(NodeRef::lesson(11)).await.unwrap();
        session.platform().clear();

        session.delete_block(4).await.unwrap();
        assert!(session.state().blocks.is_empty());
        assert!(session.state().rich_text.is_empty());
        assert_eq!(
            session.platform().patches(),
            vec![
                ViewPatch::RemoveBlock(4),
                ViewPatch::RenderBlocks {
                    html: render::BLOCKS_PLACEHOLDER_HTML.to_owned()
                },
            ]
        );
        assert_eq!(session.platform().alerts(), vec!["Block deleted."]);
    }

    #[tokio::test]
    async fn test_quiz_without_checked_option_saves_unanswered() {
        let session = lesson_session(FakeApi::default()).await;
        session.platform().forms.borrow_mut().insert(
            3,
            BlockForm::Quiz {
                question: "Which flour?".into(),
                kind: "tf".into(),
                options: vec!["True".into(), "False".into()],
                checked: None,
            },
        );
        session.save_block(3).await.unwrap();

        let saved = session.api().saved_blocks.borrow().clone();
        assert_eq!(
            saved,
            vec![(
                3,
                json!({
                    "question": "Which flour?",
                    "type": "tf",
                    "options": ["True", "False"],
                    "correct_answer": NO_CORRECT_ANSWER,
                })
            )]
        );
        assert_eq!(session.platform().alerts(), vec!["Block saved."]);
    }

    #[tokio::test]
    async fn test_text_block_saves_editor_html() {
        let session = lesson_session(FakeApi::default()).await;
        session
            .state()
            .rich_text
            .get("block-editor-1")
            .unwrap()
            .set_html("<p>Fold</p>");
        session.save_block(1).await.unwrap();
        assert_eq!(
            session.api().saved_blocks.borrow()[0],
            (1, json!({"html": "<p>Fold</p>"}))
        );
    }

    #[tokio::test]
    async fn test_quiz_option_rows() {
        let session = lesson_session(FakeApi::default()).await;
        session.add_quiz_option(3).unwrap();
        session.remove_quiz_option(3, 0).unwrap();

        let state = session.state();
        let quiz = state.blocks.get(3).unwrap().quiz().unwrap().clone();
        assert_eq!(quiz.options, vec!["B", "New Option"]);
        assert_eq!(quiz.correct_answer, NO_CORRECT_ANSWER);
        let patches = session.platform().patches();
        assert!(matches!(&patches[0], ViewPatch::AppendQuizOption { block_id: 3, html } if html.contains("value=\"2\"")));
        assert_eq!(
            patches[1],
            ViewPatch::RemoveQuizOption {
                block_id: 3,
                index: 0
            }
        );
    }

    #[tokio::test]
    async fn test_switching_lessons_drops_old_editors() {
        let session = lesson_session(FakeApi::default()).await;
        session.select(NodeRef::lesson(11)).await.unwrap();
        let state = session.state();
        assert!(state.blocks.is_empty());
        assert!(state.rich_text.is_empty());
        assert_eq!(state.blocks.lesson_id(), Some(11));
    }

    // === Editor panels ===

    #[tokio::test]
    async fn test_section_reload_reuses_editor() {
        let api = FakeApi {
            section_html: "<p>Welcome</p>".into(),
            ..Default::default()
        };
        let session = session_with(api);
        session.select(NodeRef::new(NodeKind::Intro, COURSE)).await.unwrap();
        session.select(NodeRef::course(COURSE)).await.unwrap();
        session.select(NodeRef::new(NodeKind::Intro, COURSE)).await.unwrap();

        assert_eq!(session.platform().created.get(), 1);
        let state = session.state();
        assert_eq!(state.rich_text.len(), 1);
        assert_eq!(
            state.rich_text.get("intro-content-editor").unwrap().html(),
            "<p>Welcome</p>"
        );
    }

    #[tokio::test]
    async fn test_save_section_before_load_is_silent() {
        let session = session();
        session.save_section(CourseSection::Conclusion).await.unwrap();
        assert!(session.api().calls().is_empty());
        assert!(session.platform().alerts().is_empty());
    }

    #[tokio::test]
    async fn test_save_section_sends_editor_html() {
        let session = session();
        session
            .load_editor_content(NodeKind::Conclusion, COURSE)
            .await
            .unwrap();
        session
            .state()
            .rich_text
            .get("conclusion-content-editor")
            .unwrap()
            .set_html("<p>Bye</p>");
        session.save_section(CourseSection::Conclusion).await.unwrap();
        assert_eq!(
            session.api().calls().last().unwrap(),
            "save_section 1 conclusion <p>Bye</p>"
        );
        assert_eq!(session.platform().alerts(), vec!["Conclusion saved."]);
    }

    #[tokio::test]
    async fn test_settings_require_outcome() {
        let session = session();
        session.platform().set(FormField::CourseTitle, "Bread");
        session.platform().set(FormField::CourseOutcome, "   ");
        assert!(session.save_settings().await.is_err());
        assert_eq!(session.platform().alerts(), vec!["Learning Outcome is mandatory."]);
        assert!(session.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_saved_settings_update_document_title() {
        let session = session();
        session.platform().set(FormField::CourseTitle, "Bread");
        session.platform().set(FormField::CourseOutcome, "Bake a loaf");
        session.save_settings().await.unwrap();
        assert_eq!(session.api().calls(), vec!["save_settings 1 Bread"]);
        assert_eq!(session.platform().alerts(), vec!["Course settings saved."]);
        assert_eq!(
            session.platform().patches(),
            vec![ViewPatch::SetDocumentTitle(
                "Edit Course: Bread - Mini-Course Creator".into()
            )]
        );
    }

    #[tokio::test]
    async fn test_lesson_title_save_renames_node() {
        let session = lesson_session(FakeApi::default()).await;
        session.platform().set(FormField::LessonTitle, "Spelt ");
        session.save_lesson_title().await.unwrap();

        assert_eq!(session.api().calls(), vec!["rename_lesson 10 Spelt "]);
        assert_eq!(
            session.state().tree.modules()[0].lessons[0].title,
            "Spelt"
        );
        assert_eq!(
            session.platform().patches(),
            vec![ViewPatch::SetNodeTitle {
                node: NodeRef::lesson(10),
                title: "Spelt".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_module_title_without_module_is_silent() {
        let session = session();
        session.platform().set(FormField::ModuleTitle, "Salt");
        session.save_module_title().await.unwrap();
        assert!(session.api().calls().is_empty());
    }

    #[test]
    fn test_counter_over_limit() {
        let session = session();
        session.platform().set(FormField::CourseAudience, &"a".repeat(301));
        session.update_counter(CounterKind::Audience);
        assert_eq!(
            session.platform().patches(),
            vec![ViewPatch::SetCounter {
                counter: CounterKind::Audience,
                text: "301/300 characters. Focus on their starting point and goals.".into(),
                over_limit: true,
            }]
        );
    }

    // === AI assist ===

    #[tokio::test]
    async fn test_suggest_structure_lists_titles() {
        let api = FakeApi {
            structure: json!({"modules": [{"title": "A"}, {"title": "B"}]}),
            ..Default::default()
        };
        let session = session_with(api);
        session.platform().set(FormField::CourseTitle, " Sourdough ");
        let button = Button::default();
        session
            .run_ai(AiTrigger::SuggestStructure, &button)
            .await
            .unwrap();

        assert_eq!(session.api().calls(), vec!["suggest_structure Sourdough"]);
        let patches = session.platform().patches();
        let [ViewPatch::ShowSuggestion {
            target: SuggestionTarget::Structure,
            body: SuggestionBody::Html(html),
        }] = patches.as_slice()
        else {
            panic!("unexpected patches: {patches:?}");
        };
        assert!(html.contains("<li>A</li>"));
        assert!(html.contains("<li>B</li>"));
        assert_eq!(
            *button.events.borrow(),
            vec!["busy:Generating...", "restore"]
        );
    }

    #[tokio::test]
    async fn test_ai_input_checked_before_busy() {
        let session = session();
        let button = Button::default();
        assert!(
            session
                .run_ai(AiTrigger::AnalyzeOutcome, &button)
                .await
                .is_err()
        );
        assert_eq!(
            session.platform().alerts(),
            vec!["Please enter a learning outcome first."]
        );
        assert!(button.events.borrow().is_empty());
        assert!(session.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_ai_failure_restores_control() {
        let api = FakeApi::default();
        api.fail("analyze_audience");
        let session = session_with(api);
        session.platform().set(FormField::CourseAudience, "Home bakers");
        let button = Button::default();
        assert!(
            session
                .run_ai(AiTrigger::AnalyzeAudience, &button)
                .await
                .is_err()
        );
        assert_eq!(session.platform().alerts(), vec!["AI request failed: boom"]);
        assert_eq!(
            *button.events.borrow(),
            vec!["busy:Generating...", "restore"]
        );
    }

    #[tokio::test]
    async fn test_outcome_suggestion_text() {
        let api = FakeApi {
            ai_text: "Make it measurable.".into(),
            ..Default::default()
        };
        let session = session_with(api);
        session.platform().set(FormField::CourseOutcome, "Know bread");
        session
            .run_ai(AiTrigger::AnalyzeOutcome, ())
            .await
            .unwrap();
        assert_eq!(
            session.platform().patches(),
            vec![ViewPatch::ShowSuggestion {
                target: SuggestionTarget::Outcome,
                body: SuggestionBody::Text("AI Suggestion: Make it measurable.".into()),
            }]
        );
    }

    #[tokio::test]
    async fn test_generate_text_fills_editor() {
        let api = FakeApi {
            ai_text: "Mix and rest.".into(),
            ..Default::default()
        };
        let session = lesson_session(api).await;
        session
            .run_ai(AiTrigger::GenerateText { block_id: 1 }, ())
            .await
            .unwrap();
        assert_eq!(session.api().calls(), vec!["generate_text lesson content"]);
        assert_eq!(
            session.state().rich_text.get("block-editor-1").unwrap().html(),
            "<p>Mix and rest.</p>"
        );
    }

    #[tokio::test]
    async fn test_empty_generated_text_is_ignored() {
        let session = lesson_session(FakeApi::default()).await;
        session.platform().set(FormField::LessonTitle, "Wheat");
        session
            .run_ai(AiTrigger::GenerateText { block_id: 1 }, ())
            .await
            .unwrap();
        assert_eq!(session.api().calls(), vec!["generate_text Wheat"]);
        assert_eq!(
            session.state().rich_text.get("block-editor-1").unwrap().html(),
            "<p>Knead</p>"
        );
    }

    #[tokio::test]
    async fn test_blank_lesson_title_blocks_generation() {
        let session = lesson_session(FakeApi::default()).await;
        session.platform().set(FormField::LessonTitle, "   ");
        assert!(
            session
                .run_ai(AiTrigger::GenerateText { block_id: 1 }, ())
                .await
                .is_err()
        );
        assert_eq!(
            session.platform().alerts(),
            vec!["Please provide a lesson title for context."]
        );
    }

    #[tokio::test]
    async fn test_generated_quiz_replaces_block() {
        let session = lesson_session(FakeApi::default()).await;
        session
            .run_ai(AiTrigger::GenerateQuiz { block_id: 3 }, ())
            .await
            .unwrap();
        assert_eq!(session.api().calls(), vec!["generate_quiz lesson context"]);

        let quiz = session.state().blocks.get(3).unwrap().quiz().unwrap().clone();
        assert_eq!(quiz.question, "Which grain?");
        assert_eq!(quiz.correct_answer, 1);
        assert!(matches!(
            session.platform().patches().as_slice(),
            [ViewPatch::ReplaceBlock { block_id: 3, .. }]
        ));
    }

    #[tokio::test]
    async fn test_failed_quiz_generation_keeps_quiz() {
        let api = FakeApi::default();
        api.fail("generate_quiz");
        let session = lesson_session(api).await;
        let button = Button::default();
        assert!(
            session
                .run_ai(AiTrigger::GenerateQuiz { block_id: 3 }, &button)
                .await
                .is_err()
        );
        assert_eq!(session.platform().alerts(), vec!["AI request failed: boom"]);
        let quiz = session.state().blocks.get(3).unwrap().quiz().unwrap().clone();
        assert_eq!(quiz.question, "Q");
        assert_eq!(quiz.options, vec!["A", "B"]);
        assert!(session.platform().patches().is_empty());
        assert_eq!(
            *button.events.borrow(),
            vec!["busy:Generating...", "restore"]
        );
    }

    #[tokio::test]
    async fn test_image_suggestion_targets_block() {
        let api = FakeApi {
            ai_text: "A crusty loaf".into(),
            ..Default::default()
        };
        let session = lesson_session(api).await;
        session
            .run_ai(AiTrigger::SuggestImage { block_id: 2 }, ())
            .await
            .unwrap();
        assert_eq!(
            session.platform().patches(),
            vec![ViewPatch::ShowSuggestion {
                target: SuggestionTarget::Image(2),
                body: SuggestionBody::Text("AI Suggestion: A crusty loaf".into()),
            }]
        );
    }

    #[tokio::test]
    async fn test_explain_shows_modal() {
        let api = FakeApi {
            ai_text: "<p>Short clips keep attention.</p>".into(),
            ..Default::default()
        };
        let session = session_with(api);
        session.explain("bp6_media").await.unwrap();
        session.close_modal();
        assert_eq!(
            session.platform().patches(),
            vec![
                ViewPatch::ShowModal {
                    html: render::MODAL_FETCHING_HTML.to_owned()
                },
                ViewPatch::ShowModal {
                    html: "<p>Short clips keep attention.</p>".into()
                },
                ViewPatch::HideModal,
            ]
        );
    }

    #[tokio::test]
    async fn test_explain_failure_apologises() {
        let api = FakeApi::default();
        api.fail("explain");
        let session = session_with(api);
        assert!(session.explain("bp1_outcome").await.is_err());
        assert_eq!(session.platform().alerts(), vec!["AI request failed: boom"]);
        assert_eq!(
            session.platform().patches().last(),
            Some(&ViewPatch::ShowModal {
                html: render::MODAL_FAILED_HTML.to_owned()
            })
        );
    }
}
