//! WASM entry point for the Mini-Course Creator editor page.
//!
//! The page loads Quill and this module, then calls `mount()` once the
//! server-rendered editor markup is in place:
//!
//! ```js
//! import init, { mount } from "./minicourse_editor_js.js";
//! await init();
//! const editor = mount({ appName: "Mini-Course Creator" });
//! ```

mod mount;

pub use mount::*;

use wasm_bindgen::prelude::*;

/// Initialize panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    init_tracing();
}

fn init_tracing() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}
