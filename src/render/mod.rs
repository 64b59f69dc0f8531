//! Tile blits: flip transforms and drawing surfaces.

mod surface;
mod transform;

pub use surface::{PixelSurface, ScreenSurface, Surface};
pub use transform::{TileFlip, TileTransform};
