//! `mount()`: build the editor session for the current page.

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use minicourse_common::{ApiClient, Config};
use minicourse_editor_browser::{
    BrowserPlatform, EditorSession, EventBindings, bind_events, read_structure,
};

/// Options accepted by `mount()`. Everything is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MountOptions {
    /// API base URL; defaults to the page's origin.
    endpoint: Option<String>,
    app_name: Option<String>,
}

impl MountOptions {
    fn from_js(value: JsValue) -> Result<Self, JsError> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| JsError::new(&format!("invalid mount options: {e}")))
    }

    fn into_config(self, origin: &str) -> Config {
        let mut config = Config::for_origin(origin);
        if let Some(endpoint) = self.endpoint.filter(|e| !e.trim().is_empty()) {
            config.endpoint = endpoint;
        }
        if let Some(app_name) = self.app_name {
            config.app_name = app_name;
        }
        config
    }
}

/// A mounted editor. Dropping it detaches the page listeners.
#[wasm_bindgen]
pub struct MountedEditor {
    session: EditorSession<ApiClient, BrowserPlatform>,
    events: EventBindings,
}

#[wasm_bindgen]
impl MountedEditor {
    /// Id of the course being edited.
    #[wasm_bindgen(getter, js_name = courseId)]
    pub fn course_id(&self) -> f64 {
        self.session.course_id() as f64
    }

    /// Number of attached page listeners.
    #[wasm_bindgen(getter, js_name = listenerCount)]
    pub fn listener_count(&self) -> usize {
        self.events.len()
    }
}

/// Wire the editor to the current page and load the initially active panel.
#[wasm_bindgen]
pub fn mount(options: JsValue) -> Result<MountedEditor, JsError> {
    let options = MountOptions::from_js(options)?;
    let window = web_sys::window().ok_or_else(|| JsError::new("No window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| JsError::new(&format!("Failed to read origin: {:?}", e)))?;
    let config = options.into_config(&origin);

    let platform = BrowserPlatform::new().map_err(|e| JsError::new(&e.to_string()))?;
    let tree = read_structure(platform.document())
        .ok_or_else(|| JsError::new("course outline not found in #structure-panel"))?;
    let api = ApiClient::new(&config).map_err(|e| JsError::new(&e.to_string()))?;

    tracing::info!(
        course_id = tree.course_id(),
        endpoint = %config.endpoint,
        "mounting course editor"
    );
    let session = EditorSession::new(api, platform, config, tree);
    let events = bind_events(&session);

    let start = session.clone();
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = start.start().await {
            tracing::debug!(error = %err, "initial panel did not load");
        }
    });

    Ok(MountedEditor { session, events })
}
