//! Texture store for catalog thumbnails, uploads and generation results.
//!
//! Images are addressed by URL (http(s) or data URL). The first `get` kicks
//! off a fetch; decoded pixels become an egui texture and the raw bytes are
//! kept around for re-encoding (lookbook PDF export).

use std::collections::{HashMap, HashSet};

use base64::Engine as _;
use egui::{ColorImage, TextureHandle, TextureOptions};

use crate::api;
use crate::inbox::Inbox;
use crate::platform;

pub struct ImageStore {
    textures: HashMap<String, TextureHandle>,
    bytes: HashMap<String, Vec<u8>>,
    pending: HashSet<String>,
    failed: HashSet<String>,
    inbox: Inbox<(String, Result<Vec<u8>, String>)>,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageStore {
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            bytes: HashMap::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
            inbox: Inbox::new(),
        }
    }

    /// Texture for `url`, fetching it first if necessary. Returns `None`
    /// while the fetch is in flight (or after it failed).
    pub fn get(&mut self, ctx: &egui::Context, url: &str) -> Option<&TextureHandle> {
        self.pump(ctx);

        if !self.textures.contains_key(url)
            && !self.pending.contains(url)
            && !self.failed.contains(url)
        {
            self.request(ctx, url);
        }
        self.textures.get(url)
    }

    /// Raw bytes for `url`, if already loaded.
    pub fn raw_bytes(&self, url: &str) -> Option<&[u8]> {
        self.bytes.get(url).map(Vec::as_slice)
    }

    /// Register bytes that did not come over the network (fresh uploads).
    pub fn insert_bytes(&mut self, ctx: &egui::Context, key: &str, bytes: Vec<u8>) {
        match decode_texture(ctx, key, &bytes) {
            Ok(texture) => {
                self.textures.insert(key.to_string(), texture);
                self.bytes.insert(key.to_string(), bytes);
            }
            Err(e) => {
                log::error!("could not decode {key}: {e}");
                self.failed.insert(key.to_string());
            }
        }
    }

    fn request(&mut self, ctx: &egui::Context, url: &str) {
        self.pending.insert(url.to_string());

        // Data URLs decode locally; everything else goes over the network.
        if let Some(bytes) = decode_data_url(url) {
            let _ = self.inbox.sender().unbounded_send((url.to_string(), bytes));
            return;
        }

        let tx = self.inbox.sender();
        let ctx = ctx.clone();
        let url = url.to_string();
        platform::execute(async move {
            let result = api::fetch_bytes(&url).await.map_err(|e| e.to_string());
            let _ = tx.unbounded_send((url, result));
            ctx.request_repaint();
        });
    }

    fn pump(&mut self, ctx: &egui::Context) {
        for (url, result) in self.inbox.drain() {
            self.pending.remove(&url);
            match result {
                Ok(bytes) => self.insert_bytes(ctx, &url, bytes),
                Err(e) => {
                    log::warn!("image fetch failed for {url}: {e}");
                    self.failed.insert(url);
                }
            }
        }
    }
}

fn decode_texture(
    ctx: &egui::Context,
    name: &str,
    bytes: &[u8],
) -> Result<TextureHandle, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let size = [img.width() as usize, img.height() as usize];
    let rgba = img.to_rgba8();
    let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice());
    Ok(ctx.load_texture(name, color, TextureOptions::LINEAR))
}

/// Extract the payload of a base64 `data:` URL.
fn decode_data_url(url: &str) -> Option<Result<Vec<u8>, String>> {
    let rest = url.strip_prefix("data:")?;
    let (_, payload) = rest.split_once("base64,")?;
    Some(
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| e.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_payload_is_decoded() {
        let url = "data:image/jpeg;base64,AQID";
        assert_eq!(decode_data_url(url), Some(Ok(vec![1, 2, 3])));
    }

    #[test]
    fn plain_urls_are_not_data_urls() {
        assert!(decode_data_url("https://cdn.example/a.jpg").is_none());
    }

    #[test]
    fn garbage_payload_reports_an_error() {
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Some(Err(_))
        ));
    }
}
