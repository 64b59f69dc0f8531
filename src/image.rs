//! Atlas images and filename lookup.

use macroquad::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// RGB color treated as transparent in an atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorKey(pub [u8; 3]);

impl ColorKey {
    /// Parses `#rrggbb` or `rrggbb` (Tiled's `transparentcolor`).
    /// A leading alpha byte (`#aarrggbb`) is ignored.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let hex = match hex.len() {
            6 => hex,
            8 => &hex[2..],
            _ => return None,
        };
        let v = u32::from_str_radix(hex, 16).ok()?;
        Some(ColorKey([(v >> 16) as u8, (v >> 8) as u8, v as u8]))
    }
}

/// CPU-side pixels of one atlas, shared read-only between tilesets.
#[derive(Clone)]
pub struct AtlasImage {
    name: String,
    pixels: Image,
}

impl fmt::Debug for AtlasImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlasImage")
            .field("name", &self.name)
            .field("width", &self.pixels.width)
            .field("height", &self.pixels.height)
            .finish()
    }
}

impl AtlasImage {
    /// Wraps decoded pixels under `name`.
    pub fn new(name: impl Into<String>, pixels: Image) -> Self {
        Self {
            name: name.into(),
            pixels,
        }
    }

    /// Unique name; surfaces key their GPU textures on it.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded RGBA pixels.
    pub fn pixels(&self) -> &Image {
        &self.pixels
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width as u32
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height as u32
    }

    /// Copy of this image where every pixel matching `key` is fully transparent.
    pub fn color_keyed(&self, key: ColorKey) -> AtlasImage {
        let mut pixels = self.pixels.clone();
        let [r, g, b] = key.0;
        for px in pixels.bytes.chunks_exact_mut(4) {
            if px[0] == r && px[1] == g && px[2] == b {
                px[3] = 0;
            }
        }
        AtlasImage {
            name: format!("{}#{:02x}{:02x}{:02x}", self.name, r, g, b),
            pixels,
        }
    }
}

/// Images addressed by file name, independent of directory and extension.
#[derive(Debug, Default)]
pub struct ImageStore {
    images: HashMap<String, Arc<AtlasImage>>,
}

fn file_key(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source)
        .to_owned()
}

impl ImageStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers decoded pixels for `source`, replacing any previous entry.
    pub fn insert(&mut self, source: &str, pixels: Image) -> Arc<AtlasImage> {
        let key = file_key(source);
        let image = Arc::new(AtlasImage::new(key.clone(), pixels));
        self.images.insert(key, Arc::clone(&image));
        image
    }

    /// Looks an image up by any path ending in the same file name.
    pub fn get(&self, source: &str) -> Option<Arc<AtlasImage>> {
        self.images.get(&file_key(source)).cloned()
    }

    /// Whether an image is registered for `source`.
    pub fn contains(&self, source: &str) -> bool {
        self.images.contains_key(&file_key(source))
    }

    /// Number of stored images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
