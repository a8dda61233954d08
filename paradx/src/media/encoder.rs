//! Image normalisation and snippet truncation.
//!
//! Images go through decode → RGB8 → proportional downscale → JPEG → base64 → truncate.
//! Audio skips straight to base64 → truncate.
//!
//! Truncation is a plain character cut on the base64 text. The result is not guaranteed to
//! decode to a complete file; it only bounds prompt size.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageResult};
use serde::Serialize;

use crate::config::MediaConfig;

/// Declared category of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
}

/// Bounded base64 text derived from an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedSnippet {
    pub kind: MediaKind,
    /// At most `max_snippet_len` base64 characters
    pub text: String,
    /// Post-resize `(width, height)`; only present for images
    pub dimensions: Option<(u32, u32)>,
}

impl EncodedSnippet {
    pub fn width(&self) -> Option<u32> {
        self.dimensions.map(|(w, _)| w)
    }

    pub fn height(&self) -> Option<u32> {
        self.dimensions.map(|(_, h)| h)
    }
}

/// Converts uploads into prompt-sized snippets.
#[derive(Debug, Clone)]
pub struct MediaEncoder {
    max_dimension: u32,
    jpeg_quality: u8,
    max_snippet_len: usize,
}

impl Default for MediaEncoder {
    fn default() -> Self {
        Self::new(&MediaConfig::default())
    }
}

impl MediaEncoder {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            max_dimension: config.max_dimension.max(1),
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
            max_snippet_len: config.max_snippet_len,
        }
    }

    pub fn max_snippet_len(&self) -> usize {
        self.max_snippet_len
    }

    /// Encode an image upload. Returns `None` for anything the image codecs cannot handle;
    /// the cause is logged, never returned.
    ///
    /// CPU-bound: call from `spawn_blocking` inside async handlers.
    pub fn encode_image(&self, bytes: &[u8]) -> Option<EncodedSnippet> {
        match self.try_encode_image(bytes) {
            Ok(snippet) => Some(snippet),
            Err(e) => {
                tracing::warn!(error = %e, size = bytes.len(), "Image error");
                None
            }
        }
    }

    /// Encode an audio upload. No format validation: the raw bytes are base64-encoded and
    /// truncated.
    pub fn encode_audio(&self, bytes: &[u8]) -> EncodedSnippet {
        EncodedSnippet {
            kind: MediaKind::Audio,
            text: self.truncate(BASE64.encode(bytes)),
            dimensions: None,
        }
    }

    fn try_encode_image(&self, bytes: &[u8]) -> ImageResult<EncodedSnippet> {
        let decoded = image::load_from_memory(bytes)?;
        // Drop alpha and palette semantics before anything else
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

        let (width, height) = (rgb.width(), rgb.height());
        let image = match scaled_dimensions(width, height, self.max_dimension) {
            Some((new_width, new_height)) => {
                tracing::debug!(width, height, new_width, new_height, "Downscaling image");
                rgb.resize_exact(new_width, new_height, FilterType::Triangle)
            }
            None => rgb,
        };

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality).encode_image(&image)?;

        Ok(EncodedSnippet {
            kind: MediaKind::Image,
            text: self.truncate(BASE64.encode(&jpeg)),
            dimensions: Some((image.width(), image.height())),
        })
    }

    fn truncate(&self, mut encoded: String) -> String {
        // base64 output is ASCII, so any byte index is a char boundary
        encoded.truncate(self.max_snippet_len);
        encoded
    }
}

/// Target size when the longer side exceeds `max_dimension`, `None` when no resize is needed.
///
/// The longer side becomes exactly `max_dimension`; the shorter side is scaled by the same
/// ratio, truncated, and kept at least 1px.
fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_dimension {
        return None;
    }

    let ratio = f64::from(max_dimension) / f64::from(longest);
    let scale = |side: u32| ((f64::from(side) * ratio) as u32).max(1);

    if width >= height {
        Some((max_dimension, scale(height)))
    } else {
        Some((scale(width), max_dimension))
    }
}
