//! Backend surface consumed by the editor.
//!
//! Two traits split the editor routes from the AI routes so a page can be
//! wired to a different AI service, and so tests can fake either side.
//! Futures carry no `Send` bound: everything runs on the browser's single
//! thread.

use std::future::Future;

use serde_json::Value;

use crate::error::ApiError;
use crate::model::{
    BlockId, BlockRecord, BlockType, CourseId, CourseSection, CourseSettings,
    Direction, EntityKind, LessonDetails, LessonId, ModuleDetails, ModuleId, QuizSuggestion,
    StructureItem,
};

/// CRUD routes under `/editor`.
pub trait CourseApi {
    /// `POST /editor/course/{id}/settings`
    fn save_settings(
        &self,
        course_id: CourseId,
        settings: &CourseSettings,
    ) -> impl Future<Output = Result<(), ApiError>>;

    /// `GET /editor/api/course/{id}/intro|conclusion`, yielding the stored HTML.
    fn section_content(
        &self,
        course_id: CourseId,
        section: CourseSection,
    ) -> impl Future<Output = Result<String, ApiError>>;

    /// `POST /editor/course/{id}/intro|conclusion`
    fn save_section(
        &self,
        course_id: CourseId,
        section: CourseSection,
        html: &str,
    ) -> impl Future<Output = Result<(), ApiError>>;

    /// `POST /editor/course/{id}/modules`
    fn add_module(
        &self,
        course_id: CourseId,
    ) -> impl Future<Output = Result<StructureItem, ApiError>>;

    /// `GET /editor/api/module/{id}/details`
    fn module_details(
        &self,
        module_id: ModuleId,
    ) -> impl Future<Output = Result<ModuleDetails, ApiError>>;

    /// `PUT /editor/module/{id}`, yielding the title the server stored.
    fn rename_module(
        &self,
        module_id: ModuleId,
        title: &str,
    ) -> impl Future<Output = Result<String, ApiError>>;

    /// `POST /editor/module/{id}/lessons`
    fn add_lesson(
        &self,
        module_id: ModuleId,
    ) -> impl Future<Output = Result<StructureItem, ApiError>>;

    /// `GET /editor/api/lesson/{id}/details`
    fn lesson_details(
        &self,
        lesson_id: LessonId,
    ) -> impl Future<Output = Result<LessonDetails, ApiError>>;

    /// `PUT /editor/lesson/{id}`, yielding the title the server stored.
    fn rename_lesson(
        &self,
        lesson_id: LessonId,
        title: &str,
    ) -> impl Future<Output = Result<String, ApiError>>;

    /// `POST /editor/lesson/{id}/blocks`
    fn add_block(
        &self,
        lesson_id: LessonId,
        block_type: &BlockType,
    ) -> impl Future<Output = Result<BlockRecord, ApiError>>;

    /// `PUT /editor/block/{id}` with the full replacement content.
    fn save_block(
        &self,
        block_id: BlockId,
        content: &Value,
    ) -> impl Future<Output = Result<(), ApiError>>;

    /// `DELETE /editor/{kind}/{id}`
    fn delete_item(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> impl Future<Output = Result<(), ApiError>>;

    /// `POST /editor/{kind}/{id}/move`
    fn move_item(
        &self,
        kind: EntityKind,
        id: i64,
        direction: Direction,
    ) -> impl Future<Output = Result<(), ApiError>>;
}

/// Routes under `/ai`.
pub trait AiApi {
    /// `POST /ai/generate_text {prompt}`
    fn generate_text(&self, prompt: &str) -> impl Future<Output = Result<String, ApiError>>;

    /// `POST /ai/generate_quiz {context}`
    fn generate_quiz(
        &self,
        context: &str,
    ) -> impl Future<Output = Result<QuizSuggestion, ApiError>>;

    /// `POST /ai/analyze_outcome {outcome_text}`
    fn analyze_outcome(&self, outcome: &str) -> impl Future<Output = Result<String, ApiError>>;

    /// `POST /ai/analyze_audience {audience_text}`
    fn analyze_audience(&self, audience: &str)
    -> impl Future<Output = Result<String, ApiError>>;

    /// `POST /ai/suggest_structure {topic}`. The shape of the suggestion is
    /// not fixed, so it is returned raw.
    fn suggest_structure(&self, topic: &str) -> impl Future<Output = Result<Value, ApiError>>;

    /// `POST /ai/suggest_image_concept {context}`
    fn suggest_image(&self, context: &str) -> impl Future<Output = Result<String, ApiError>>;

    /// `POST /ai/explain {concept_key}`, yielding explanation HTML.
    fn explain(&self, concept_key: &str) -> impl Future<Output = Result<String, ApiError>>;
}
