mod api;
mod app;
mod config;
mod cropper;
mod editor;
mod generation;
mod images;
mod inbox;
mod models;
mod pdf;
mod platform;
mod progress;
mod storage;
mod ui;
mod upload;
mod zones;

pub use app::StyleSelectApp;

// ── Web entry-point ──
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Redirect `log` macros & panic messages to the browser console
    console_log::init_with_level(log::Level::Debug).ok();
    console_error_panic_hook::set_once();

    let web_options = eframe::WebOptions::default();

    // The element id must match the <canvas> in index.html
    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("styleselect_canvas"))
        .ok_or_else(|| JsValue::from_str("no canvas element 'styleselect_canvas'"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()?;

    eframe::WebRunner::new()
        .start(
            canvas,
            web_options,
            Box::new(|cc| Ok(Box::new(StyleSelectApp::new(cc)))),
        )
        .await?;

    Ok(())
}

// ── Native entry-point (development only; production is the wasm build) ──
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native() -> eframe::Result<()> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "StyleSelect",
        options,
        Box::new(|cc| Ok(Box::new(StyleSelectApp::new(cc)))),
    )
}
