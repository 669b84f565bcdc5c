//! Emoji bitmap resolution with a write-once disk cache.
//!
//! Cache entries are content-addressed by codepoint key
//! (`<cache_dir>/<key>.png`). Once a file exists it is used as-is forever:
//! no eviction, no refresh, no integrity check against the CDN. Fetches
//! happen only on a cache miss, and a miss that cannot be fetched is not
//! retried for the rest of the process.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clipframe_common::config::EmojiConfig;
use clipframe_common::error::{ClipframeError, ClipframeResult};
use clipframe_layout_core::codepoint_key;
use image::imageops::FilterType;
use image::RgbaImage;

/// Something that can look up an emoji bitmap at a target height.
pub trait EmojiLookup {
    /// Bitmap for `emoji` scaled to `size` pixels tall, or `None` when the
    /// asset is not available.
    fn lookup(&self, emoji: char, size: u32) -> Option<RgbaImage>;
}

/// Remote source of raw emoji PNG bytes.
pub trait EmojiSource {
    /// Fetch the asset for `key`. `Ok(None)` means the source answered but
    /// has no such asset.
    fn fetch(&self, key: &str) -> ClipframeResult<Option<Vec<u8>>>;
}

/// Twemoji assets served from a CDN.
#[derive(Debug, Clone)]
pub struct CdnEmojiSource {
    base: String,
    version: String,
}

impl CdnEmojiSource {
    pub fn new(config: &EmojiConfig) -> Self {
        Self {
            base: config.cdn_base.trim_end_matches('/').to_string(),
            version: config.version.clone(),
        }
    }

    /// Asset URL for a codepoint key.
    pub fn url(&self, key: &str) -> String {
        format!("{}@{}/assets/72x72/{key}.png", self.base, self.version)
    }
}

impl EmojiSource for CdnEmojiSource {
    fn fetch(&self, key: &str) -> ClipframeResult<Option<Vec<u8>>> {
        let url = self.url(key);
        tracing::debug!(%url, "Fetching emoji asset");

        let mut response = match ureq::get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(status)) => {
                tracing::debug!(%url, status, "Emoji asset unavailable");
                return Ok(None);
            }
            Err(e) => {
                return Err(ClipframeError::emoji(format!("GET {url} failed: {e}")));
            }
        };

        if response.status().as_u16() != 200 {
            tracing::debug!(%url, status = response.status().as_u16(), "Emoji asset unavailable");
            return Ok(None);
        }

        let bytes = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ClipframeError::emoji(format!("Reading {url} failed: {e}")))?;
        Ok(Some(bytes))
    }
}

/// Resolves emoji characters to scaled bitmaps through the disk cache.
pub struct EmojiResolver<S: EmojiSource> {
    cache_dir: PathBuf,
    source: S,
    /// Scaled results for this process, keyed by (codepoint key, size).
    memo: RefCell<HashMap<(String, u32), Option<RgbaImage>>>,
}

impl<S: EmojiSource> EmojiResolver<S> {
    pub fn new(cache_dir: impl Into<PathBuf>, source: S) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            source,
            memo: RefCell::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cache file for a codepoint key.
    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.png"))
    }

    /// Resolve `emoji` (one or more scalar values) to a bitmap `size` pixels
    /// tall. Failures of any kind yield `None`.
    pub fn resolve(&self, emoji: &str, size: u32) -> Option<RgbaImage> {
        if size == 0 || emoji.is_empty() {
            return None;
        }

        let key = codepoint_key(emoji);
        let memo_key = (key, size);
        if let Some(hit) = self.memo.borrow().get(&memo_key) {
            return hit.clone();
        }

        let resolved = self.load_source(&memo_key.0).map(|img| scale_to_height(&img, size));
        self.memo.borrow_mut().insert(memo_key, resolved.clone());
        resolved
    }

    fn load_source(&self, key: &str) -> Option<RgbaImage> {
        let path = self.cache_path(key);
        if path.exists() {
            return match std::fs::read(&path) {
                Ok(bytes) => decode(&path, &bytes),
                Err(e) => {
                    tracing::warn!(key, path = %path.display(), error = %e, "Unreadable cached emoji");
                    None
                }
            };
        }

        let bytes = match self.source.fetch(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Emoji fetch failed; rendering as text");
                return None;
            }
        };

        // Persisted before decoding: an undecodable download still occupies
        // its cache slot.
        if let Err(e) = self.persist(&path, &bytes) {
            tracing::warn!(key, error = %e, path = %path.display(), "Failed to cache emoji");
        } else {
            tracing::debug!(key, path = %path.display(), "Cached emoji asset");
        }

        decode(&path, &bytes)
    }

    fn persist(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.cache_dir)?;
        let partial = path.with_extension("png.part");
        std::fs::write(&partial, bytes)?;
        std::fs::rename(&partial, path)
    }
}

impl<S: EmojiSource> EmojiLookup for EmojiResolver<S> {
    fn lookup(&self, emoji: char, size: u32) -> Option<RgbaImage> {
        let mut buf = [0u8; 4];
        self.resolve(emoji.encode_utf8(&mut buf), size)
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Option<RgbaImage> {
    match image::load_from_memory(bytes) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Undecodable emoji asset");
            None
        }
    }
}

/// Resize so the height equals `size`; width follows, rounded down.
fn scale_to_height(img: &RgbaImage, size: u32) -> RgbaImage {
    let ratio = size as f64 / img.height().max(1) as f64;
    let width = ((img.width() as f64 * ratio).floor() as u32).max(1);
    image::imageops::resize(img, width, size, FilterType::Lanczos3)
}
