//! `reqwest` implementation of [`CourseApi`] and [`AiApi`].
//!
//! Every call is a single JSON request/response pair. There is no retry and
//! no caching; a non-2xx status becomes [`ApiError::Status`] carrying the
//! backend's own message.

use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};

use crate::api::{AiApi, CourseApi};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::{
    BlockId, BlockRecord, BlockType, CourseId, CourseSection, CourseSettings,
    Direction, EntityKind, LessonDetails, LessonId, ModuleDetails, ModuleId, QuizSuggestion,
    StructureItem, TitleRecord,
};
use crate::perf::TimingGuard;

/// HTTP client bound to one backend endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Ok(Self::with_client(reqwest::Client::new(), config.endpoint_url()?))
    }

    pub fn with_client(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(|e| ApiError::InvalidUrl {
            url: format!("{}{}", self.base, path),
            reason: e.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http.get(self.url(path)?);
        self.execute(Method::GET, path, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let request = self.http.request(method.clone(), self.url(path)?).json(body);
        self.execute(method, path, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let _timing = TimingGuard::new(method_name(&method), path);
        tracing::trace!(method = %method, path, "sending request");

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text, status.canonical_reason());
            tracing::warn!(status = status.as_u16(), path, %message, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        decode_body(&text)
    }
}

fn method_name(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        _ => "OTHER",
    }
}

/// Decode a 2xx body. An empty body decodes as JSON `null`.
pub fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_str(text)?)
}

/// User-facing message for a failed response.
///
/// The AI routes report `{error}`, the editor routes `{message}`; a body with
/// neither falls back to the HTTP reason phrase.
pub fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message"].into_iter().find_map(|key| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
            })
        })
        .unwrap_or_else(|| reason.unwrap_or("Unknown error").to_owned())
}

/// Pull a required member out of a response envelope.
pub fn take_field<T: DeserializeOwned>(mut body: Value, key: &'static str) -> Result<T, ApiError> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Null) | None => Err(ApiError::MissingField(key)),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

impl CourseApi for ApiClient {
    async fn save_settings(
        &self,
        course_id: CourseId,
        settings: &CourseSettings,
    ) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send(
                Method::POST,
                &format!("editor/course/{course_id}/settings"),
                settings,
            )
            .await?;
        Ok(())
    }

    async fn section_content(
        &self,
        course_id: CourseId,
        section: CourseSection,
    ) -> Result<String, ApiError> {
        let body: Value = self
            .get(&format!("editor/api/course/{course_id}/{}", section.as_str()))
            .await?;
        // A section that was never written comes back as `null`.
        match body.get("content") {
            Some(Value::Null) => Ok(String::new()),
            _ => take_field(body, "content"),
        }
    }

    async fn save_section(
        &self,
        course_id: CourseId,
        section: CourseSection,
        html: &str,
    ) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send(
                Method::POST,
                &format!("editor/course/{course_id}/{}", section.as_str()),
                &json!({ "content": html }),
            )
            .await?;
        Ok(())
    }

    async fn add_module(&self, course_id: CourseId) -> Result<StructureItem, ApiError> {
        let body: Value = self
            .send(
                Method::POST,
                &format!("editor/course/{course_id}/modules"),
                &json!({}),
            )
            .await?;
        take_field(body, "module")
    }

    async fn module_details(&self, module_id: ModuleId) -> Result<ModuleDetails, ApiError> {
        self.get(&format!("editor/api/module/{module_id}/details"))
            .await
    }

    async fn rename_module(&self, module_id: ModuleId, title: &str) -> Result<String, ApiError> {
        let body: Value = self
            .send(
                Method::PUT,
                &format!("editor/module/{module_id}"),
                &json!({ "title": title }),
            )
            .await?;
        take_field::<TitleRecord>(body, "module").map(|record| record.title)
    }

    async fn add_lesson(&self, module_id: ModuleId) -> Result<StructureItem, ApiError> {
        let body: Value = self
            .send(
                Method::POST,
                &format!("editor/module/{module_id}/lessons"),
                &json!({}),
            )
            .await?;
        take_field(body, "lesson")
    }

    async fn lesson_details(&self, lesson_id: LessonId) -> Result<LessonDetails, ApiError> {
        self.get(&format!("editor/api/lesson/{lesson_id}/details"))
            .await
    }

    async fn rename_lesson(&self, lesson_id: LessonId, title: &str) -> Result<String, ApiError> {
        let body: Value = self
            .send(
                Method::PUT,
                &format!("editor/lesson/{lesson_id}"),
                &json!({ "title": title }),
            )
            .await?;
        take_field::<TitleRecord>(body, "lesson").map(|record| record.title)
    }

    async fn add_block(
        &self,
        lesson_id: LessonId,
        block_type: &BlockType,
    ) -> Result<BlockRecord, ApiError> {
        let body: Value = self
            .send(
                Method::POST,
                &format!("editor/lesson/{lesson_id}/blocks"),
                &json!({ "block_type": block_type }),
            )
            .await?;
        take_field(body, "block")
    }

    async fn save_block(&self, block_id: BlockId, content: &Value) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send(
                Method::PUT,
                &format!("editor/block/{block_id}"),
                &json!({ "content": content }),
            )
            .await?;
        Ok(())
    }

    async fn delete_item(&self, kind: EntityKind, id: i64) -> Result<(), ApiError> {
        let path = format!("editor/{kind}/{id}");
        let request = self.http.delete(self.url(&path)?);
        let body: Value = self.execute(Method::DELETE, &path, request).await?;
        if let Some(message) = body.get("message").and_then(Value::as_str) {
            tracing::debug!(%kind, id, message, "deleted");
        }
        Ok(())
    }

    async fn move_item(
        &self,
        kind: EntityKind,
        id: i64,
        direction: Direction,
    ) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send(
                Method::POST,
                &format!("editor/{kind}/{id}/move"),
                &json!({ "direction": direction }),
            )
            .await?;
        Ok(())
    }
}

impl AiApi for ApiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, ApiError> {
        let body: Value = self
            .send(Method::POST, "ai/generate_text", &json!({ "prompt": prompt }))
            .await?;
        take_field(body, "generated_text")
    }

    async fn generate_quiz(&self, context: &str) -> Result<QuizSuggestion, ApiError> {
        let body: Value = self
            .send(Method::POST, "ai/generate_quiz", &json!({ "context": context }))
            .await?;
        take_field(body, "generated_quiz")
    }

    async fn analyze_outcome(&self, outcome: &str) -> Result<String, ApiError> {
        let body: Value = self
            .send(
                Method::POST,
                "ai/analyze_outcome",
                &json!({ "outcome_text": outcome }),
            )
            .await?;
        take_field(body, "suggestion")
    }

    async fn analyze_audience(&self, audience: &str) -> Result<String, ApiError> {
        let body: Value = self
            .send(
                Method::POST,
                "ai/analyze_audience",
                &json!({ "audience_text": audience }),
            )
            .await?;
        take_field(body, "suggestion")
    }

    async fn suggest_structure(&self, topic: &str) -> Result<Value, ApiError> {
        let body: Value = self
            .send(Method::POST, "ai/suggest_structure", &json!({ "topic": topic }))
            .await?;
        take_field(body, "suggested_structure")
    }

    async fn suggest_image(&self, context: &str) -> Result<String, ApiError> {
        let body: Value = self
            .send(
                Method::POST,
                "ai/suggest_image_concept",
                &json!({ "context": context }),
            )
            .await?;
        take_field(body, "suggestion")
    }

    async fn explain(&self, concept_key: &str) -> Result<String, ApiError> {
        let body: Value = self
            .send(Method::POST, "ai/explain", &json!({ "concept_key": concept_key }))
            .await?;
        take_field(body, "explanation")
    }
}
