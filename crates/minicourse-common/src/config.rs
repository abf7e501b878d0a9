use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Editor runtime configuration.
///
/// Every field has a default, so a page can pass a partial object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL the API paths are resolved against.
    pub endpoint: String,
    /// Product name used in the document title.
    pub app_name: String,
}

impl Config {
    /// Environment variable read by [`Config::from_env`].
    pub const ENDPOINT_VAR: &'static str = "MINICOURSE_ENDPOINT";

    /// Native configuration: the endpoint comes from `MINICOURSE_ENDPOINT`
    /// when set.
    pub fn from_env() -> Self {
        Self::with_endpoint_override(std::env::var(Self::ENDPOINT_VAR).ok())
    }

    fn with_endpoint_override(endpoint: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_owned();
        }
        config
    }

    /// Browser configuration: the API is served by the page's own origin.
    pub fn for_origin(origin: &str) -> Self {
        Self {
            endpoint: origin.to_owned(),
            ..Self::default()
        }
    }

    /// Parsed endpoint with a trailing slash, so relative paths join under it
    /// instead of replacing its last segment.
    pub fn endpoint_url(&self) -> Result<Url, ApiError> {
        let mut endpoint = self.endpoint.trim().to_owned();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        Url::parse(&endpoint).map_err(|e| ApiError::InvalidUrl {
            url: self.endpoint.clone(),
            reason: e.to_string(),
        })
    }

    /// Document title for the course editor page.
    pub fn document_title(&self, course_title: &str) -> String {
        let title = course_title.trim();
        let title = if title.is_empty() { "New Course" } else { title };
        format!("Edit Course: {} - {}", title, self.app_name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/".to_owned(),
            app_name: "Mini-Course Creator".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_gets_trailing_slash() {
        let config = Config::for_origin("https://courses.example.com/app");
        let url = config.endpoint_url().unwrap();
        assert_eq!(url.as_str(), "https://courses.example.com/app/");
        assert_eq!(
            url.join("editor/block/3").unwrap().as_str(),
            "https://courses.example.com/app/editor/block/3"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_reported() {
        let config = Config::for_origin("not a url");
        assert!(matches!(
            config.endpoint_url(),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_document_title_defaults_to_new_course() {
        let config = Config::default();
        assert_eq!(
            config.document_title("  "),
            "Edit Course: New Course - Mini-Course Creator"
        );
        assert_eq!(
            config.document_title("Baking 101"),
            "Edit Course: Baking 101 - Mini-Course Creator"
        );
    }

    #[test]
    fn test_endpoint_override_ignores_blank_values() {
        assert_eq!(
            Config::with_endpoint_override(Some(" http://10.0.0.2:5000 ".into())).endpoint,
            "http://10.0.0.2:5000"
        );
        assert_eq!(
            Config::with_endpoint_override(Some("   ".into())),
            Config::default()
        );
        assert_eq!(Config::with_endpoint_override(None), Config::default());
    }

    #[test]
    fn test_from_env_reads_endpoint_var() {
        let expected = Config::with_endpoint_override(std::env::var(Config::ENDPOINT_VAR).ok());
        assert_eq!(Config::from_env(), expected);
        assert_eq!(Config::from_env().app_name, "Mini-Course Creator");
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: Config =
            serde_json::from_str(r#"{"endpoint": "http://127.0.0.1:8080"}"#).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:8080");
        assert_eq!(config.app_name, "Mini-Course Creator");
    }
}
