//! Quill bindings.
//!
//! Quill is loaded by the page as a global; nothing here bundles it.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

use minicourse_editor_core::{PlatformError, RichTextEditor};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Quill)]
    pub type Quill;

    #[wasm_bindgen(constructor, catch)]
    fn new(container: &Element, options: &JsValue) -> Result<Quill, JsValue>;

    /// The editable `.ql-editor` element.
    #[wasm_bindgen(method, getter)]
    fn root(this: &Quill) -> HtmlElement;

    #[wasm_bindgen(method, js_name = setText)]
    fn set_text(this: &Quill, text: &str);
}

fn array(items: &[JsValue]) -> Array {
    items.iter().collect()
}

fn object(entries: &[(&str, JsValue)]) -> Result<Object, JsValue> {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value)?;
    }
    Ok(obj)
}

/// Snow theme with a header/emphasis/list/link toolbar.
fn options() -> Result<JsValue, JsValue> {
    let s = |v: &str| JsValue::from_str(v);
    let n = JsValue::from_f64;
    let headers = array(&[n(1.0), n(2.0), n(3.0), JsValue::FALSE]);
    let toolbar = array(&[
        array(&[object(&[("header", headers.into())])?.into()]).into(),
        array(&[s("bold"), s("italic"), s("underline")]).into(),
        array(&[
            object(&[("list", s("ordered"))])?.into(),
            object(&[("list", s("bullet"))])?.into(),
        ])
        .into(),
        array(&[s("link")]).into(),
        array(&[s("clean")]).into(),
    ]);
    let modules = object(&[("toolbar", toolbar.into())])?;
    Ok(object(&[("modules", modules.into()), ("theme", s("snow"))])?.into())
}

/// One Quill instance bound to its container.
pub struct QuillEditor {
    quill: Quill,
}

impl QuillEditor {
    pub fn attach(container: &Element) -> Result<Self, PlatformError> {
        let quill = options()
            .and_then(|options| Quill::new(container, &options))
            .map_err(|e| PlatformError(format!("failed to create Quill editor: {:?}", e)))?;
        Ok(Self { quill })
    }
}

impl RichTextEditor for QuillEditor {
    fn html(&self) -> String {
        self.quill.root().inner_html()
    }

    fn set_html(&self, html: &str) {
        self.quill.root().set_inner_html(html);
    }

    fn set_text(&self, text: &str) {
        self.quill.set_text(text);
    }
}
