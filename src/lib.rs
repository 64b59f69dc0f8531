#![warn(missing_docs)]

//! Tiled tileset atlases for Macroquad: gid resolution, tile properties and
//! flipped tile blits.

mod atlas;
mod error;
mod gid;
mod image;
#[allow(missing_docs)]
mod ir_map;
mod loader {
    pub mod json_loader;
}
#[allow(missing_docs)]
mod map;
#[allow(missing_docs)]
mod properties;
mod registry;
#[allow(missing_docs)]
pub mod render;
mod tileset;

pub use atlas::{TileAtlas, TileGeometry};
pub use error::MapError;
pub use gid::{TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use image::{AtlasImage, ColorKey, ImageStore};
pub use ir_map::{IrImage, IrLayer, IrMap, IrTileMetadata, IrTileset, Properties, PropertyValue};
pub use loader::json_loader::{decode_map_file_to_ir, decode_tileset_str};
pub use map::{Map, TileLayer};
pub use properties::{TileKind, TileProperties, UnknownTileKind};
pub use registry::TilesetGroup;
pub use render::{PixelSurface, ScreenSurface, Surface, TileFlip, TileTransform};
pub use tileset::Tileset;
