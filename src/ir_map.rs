// src/ir_map.rs
use macroquad::prelude::*;
use std::collections::HashMap;

/// Canonical, format-agnostic map.
pub struct IrMap {
    pub tile_w: u32,
    pub tile_h: u32,
    pub properties: Properties,
    pub tilesets: Vec<IrTileset>, // declaration order, never re-sorted
    pub layers: Vec<IrLayer>,     // draw order: array order
}

/// One atlas declaration, as written in the document.
pub struct IrTileset {
    pub first_gid: u32,
    pub name: String,
    pub tile_w: u32,
    pub tile_h: u32,
    pub spacing: u32, // 0 if not used
    pub margin: u32,  // 0 if not used
    pub image: Option<IrImage>,
    pub tile_offset: Option<(i32, i32)>,
    pub properties: Properties,
    pub tiles: Vec<IrTileMetadata>,
}

pub struct IrImage {
    pub source: String,
    pub transparent_color: Option<String>,
}

/// Per-tile declaration inside a tileset.
pub struct IrTileMetadata {
    pub id: u32,
    /// Free-form type label (`type`, or `class` in newer Tiled).
    pub kind: Option<String>,
    pub properties: Properties,
}

pub struct IrLayer {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
    pub offset: Vec2, // world offset for this layer
    pub properties: Properties,
    pub width: usize,
    pub height: usize,
    pub data: Vec<u32>, // raw GIDs, flip flags included
}

/// A decoded custom property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool`
    Bool(bool),
    /// `int` and `object` references
    I64(i64),
    /// `float`
    F32(f32),
    /// `string`, `file`, `color`, `class`
    String(String),
}

/// Custom key/value properties carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(HashMap<String, PropertyValue>);

impl Properties {
    /// Empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.0.insert(name.into(), value);
    }

    /// Raw value of `name`.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// `name` as a bool.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// `name` as an i64.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// `name` as an i32, `None` when it does not fit.
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    /// `name` as an f32.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// `name` as a string slice.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Iterates over all properties in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when there are no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
