//! Thin seam over the two build targets.
//!
//! The app is a wasm32 build in production; the native build exists for
//! development and for running the unit tests. Everything browser-specific
//! funnels through here so the rest of the crate stays target-agnostic.

use std::future::Future;

use rfd::AsyncFileDialog;

// ── task spawning ────────────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
pub fn execute<F: Future<Output = ()> + 'static>(f: F) {
    wasm_bindgen_futures::spawn_local(f);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn execute<F: Future<Output = ()> + Send + 'static>(f: F) {
    std::thread::spawn(move || pollster::block_on(f));
}

// ── timers ───────────────────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u32) {
    gloo_timers::future::TimeoutFuture::new(ms).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u32) {
    // Off-web tasks run on their own thread; blocking is fine there.
    std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
}

// ── request cancellation ─────────────────────────────────────────

/// Handle for aborting an in-flight fetch. Clones share the same underlying
/// browser `AbortController`; off the web the handle is inert.
#[derive(Clone, Default)]
pub struct AbortHandle {
    #[cfg(target_arch = "wasm32")]
    inner: Option<web_sys::AbortController>,
}

impl AbortHandle {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {
            inner: web_sys::AbortController::new().ok(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {}
    }

    pub fn abort(&self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(controller) = &self.inner {
            controller.abort();
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn signal(&self) -> Option<web_sys::AbortSignal> {
        self.inner.as_ref().map(|c| c.signal())
    }
}

// ── file picking ─────────────────────────────────────────────────

/// Name and raw bytes of a picked file.
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Open the image file picker and hand the result to `deliver`.
/// Nothing is delivered if the user dismisses the dialog.
pub fn pick_image_file(deliver: impl FnOnce(PickedFile) + Send + 'static) {
    execute(async move {
        if let Some(handle) = AsyncFileDialog::new()
            .add_filter("Photos (jpg, png, webp)", &["jpg", "jpeg", "png", "webp"])
            .pick_file()
            .await
        {
            let name = handle.file_name();
            let bytes = handle.read().await;
            deliver(PickedFile { name, bytes });
        }
    });
}

// ── navigation & downloads ───────────────────────────────────────

/// Navigate the current tab (used for the payment checkout redirect).
#[cfg(target_arch = "wasm32")]
pub fn open_url(url: &str) {
    if let Some(window) = web_sys::window() {
        if window.location().set_href(url).is_err() {
            log::error!("could not navigate to {url}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_url(url: &str) {
    log::info!("would navigate to {url}");
}

/// Offer `bytes` as a browser download via a temporary object URL.
#[cfg(target_arch = "wasm32")]
pub fn download_bytes(file_name: &str, mime: &str, bytes: &[u8]) {
    use wasm_bindgen::JsCast;

    let result = (|| -> Result<(), wasm_bindgen::JsValue> {
        let array = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes).into());
        let props = web_sys::BlobPropertyBag::new();
        props.set_type(mime);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&array, &props)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| wasm_bindgen::JsValue::from_str("no document"))?;
        let anchor: web_sys::HtmlAnchorElement =
            document.create_element("a")?.unchecked_into();
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();
        web_sys::Url::revoke_object_url(&url)?;
        Ok(())
    })();

    if result.is_err() {
        log::error!("download of {file_name} failed");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn download_bytes(file_name: &str, _mime: &str, bytes: &[u8]) {
    log::info!("would download {file_name} ({} bytes)", bytes.len());
}
