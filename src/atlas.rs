//! One atlas image sliced into a regular grid of tiles.

use crate::error::MapError;
use crate::image::AtlasImage;
use crate::render::{PixelSurface, Surface, TileFlip, TileTransform};
use macroquad::prelude::*;
use std::sync::{Arc, OnceLock};

/// Slicing geometry of an atlas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    /// Tile width, > 0.
    pub tile_w: u32,
    /// Tile height, > 0.
    pub tile_h: u32,
    /// Gap between neighbouring tiles.
    pub spacing: u32,
    /// Border before the first row and column.
    pub margin: u32,
}

impl TileGeometry {
    /// Geometry with no spacing and no margin.
    pub fn new(tile_w: u32, tile_h: u32) -> Self {
        Self {
            tile_w,
            tile_h,
            spacing: 0,
            margin: 0,
        }
    }

    /// Sets the gap between tiles.
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Sets the border around the grid.
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }

    /// Tiles fitting in a `image_w x image_h` image: `(columns, rows)`.
    pub fn tile_counts(&self, image_w: u32, image_h: u32) -> (u32, u32) {
        let fit = |extent: u32, tile: u32| {
            extent
                .saturating_sub(self.margin)
                .checked_div(tile + self.spacing)
                .unwrap_or(0)
        };
        (fit(image_w, self.tile_w), fit(image_h, self.tile_h))
    }
}

/// An atlas image plus its grid, with per-tile source offsets cached on
/// first use.
#[derive(Debug)]
pub struct TileAtlas {
    name: String,
    geometry: TileGeometry,
    image: Option<Arc<AtlasImage>>,
    h_tiles: u32,
    v_tiles: u32,
    offset_x: Vec<OnceLock<u32>>,
    offset_y: Vec<OnceLock<u32>>,
}

impl TileAtlas {
    /// Builds an atlas. Without an image the atlas holds no tiles and every
    /// offset or blit on it fails with [`MapError::MissingResource`].
    pub fn new(name: impl Into<String>, geometry: TileGeometry, image: Option<Arc<AtlasImage>>) -> Self {
        let name = name.into();
        let (h_tiles, v_tiles) = match &image {
            Some(img) => geometry.tile_counts(img.width(), img.height()),
            None => {
                log::warn!("tileset '{}' has no image, it will not render", name);
                (0, 0)
            }
        };
        let count = (h_tiles * v_tiles) as usize;

        Self {
            name,
            geometry,
            image,
            h_tiles,
            v_tiles,
            offset_x: (0..count).map(|_| OnceLock::new()).collect(),
            offset_y: (0..count).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Atlas name as declared by the map.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slicing geometry.
    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }

    /// Tiles per row.
    pub fn h_tile_count(&self) -> u32 {
        self.h_tiles
    }

    /// Tiles per column.
    pub fn v_tile_count(&self) -> u32 {
        self.v_tiles
    }

    /// Total number of tiles the image holds.
    pub fn tile_count(&self) -> u32 {
        self.h_tiles * self.v_tiles
    }

    /// Backing image, if it was found.
    pub fn image(&self) -> Option<&Arc<AtlasImage>> {
        self.image.as_ref()
    }

    fn require_image(&self) -> Result<&AtlasImage, MapError> {
        self.image.as_deref().ok_or_else(|| MapError::MissingResource {
            atlas: self.name.clone(),
        })
    }

    fn slot<'a>(&self, cache: &'a [OnceLock<u32>], local: u32) -> Result<&'a OnceLock<u32>, MapError> {
        self.require_image()?;
        cache
            .get(local as usize)
            .ok_or_else(|| MapError::TileOutOfRange {
                atlas: self.name.clone(),
                index: local,
                count: self.tile_count(),
            })
    }

    /// X pixel of tile `local` inside the atlas image.
    pub fn tile_offset_x(&self, local: u32) -> Result<u32, MapError> {
        let g = &self.geometry;
        let slot = self.slot(&self.offset_x, local)?;
        Ok(*slot.get_or_init(|| g.margin + (g.spacing + g.tile_w) * (local % self.h_tiles)))
    }

    /// Y pixel of tile `local` inside the atlas image.
    pub fn tile_offset_y(&self, local: u32) -> Result<u32, MapError> {
        let g = &self.geometry;
        let slot = self.slot(&self.offset_y, local)?;
        Ok(*slot.get_or_init(|| g.margin + (g.spacing + g.tile_h) * (local / self.h_tiles)))
    }

    /// Number of local indices whose X and Y offsets are both cached.
    pub fn cached_offset_count(&self) -> usize {
        self.offset_x
            .iter()
            .zip(&self.offset_y)
            .filter(|(x, y)| x.get().is_some() && y.get().is_some())
            .count()
    }

    /// Fills every offset slot up front, so later lookups never write.
    pub fn precompute_offsets(&self) -> Result<(), MapError> {
        for local in 0..self.tile_count() {
            self.tile_offset_x(local)?;
            self.tile_offset_y(local)?;
        }
        Ok(())
    }

    /// Source rectangle of tile `local` inside the atlas image.
    pub fn tile_rect(&self, local: u32) -> Result<Rect, MapError> {
        Ok(Rect::new(
            self.tile_offset_x(local)? as f32,
            self.tile_offset_y(local)? as f32,
            self.geometry.tile_w as f32,
            self.geometry.tile_h as f32,
        ))
    }

    /// Blits tile `local` onto `surface` with its top-left corner at
    /// `(dest_x, dest_y)`.
    ///
    /// Flipped tiles go through [`TileTransform::for_flip`] and are drawn at
    /// the local origin; the surface is reset to identity afterwards.
    /// Unflipped tiles never touch the surface transform.
    pub fn render_tile<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        dest_x: f32,
        dest_y: f32,
        local: u32,
        flip: TileFlip,
    ) -> Result<(), MapError> {
        let image = self.require_image()?;
        let src = self.tile_rect(local)?;
        let (w, h) = (src.w, src.h);

        if flip.any() {
            surface.set_transform(TileTransform::for_flip(&self.geometry, dest_x, dest_y, flip));
            surface.draw_image(image, src, Rect::new(0.0, 0.0, w, h));
            surface.set_transform(TileTransform::IDENTITY);
        } else {
            surface.draw_image(image, src, Rect::new(dest_x, dest_y, w, h));
        }
        Ok(())
    }

    /// Standalone copy of tile `local`.
    pub fn tile_image(&self, local: u32) -> Result<Image, MapError> {
        let mut surface = PixelSurface::new(self.geometry.tile_w, self.geometry.tile_h);
        self.render_tile(&mut surface, 0.0, 0.0, local, TileFlip::NONE)?;
        Ok(surface.into_image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlas(geometry: TileGeometry, w: u16, h: u16) -> TileAtlas {
        let image = AtlasImage::new("test", Image::gen_image_color(w, h, WHITE));
        TileAtlas::new("test", geometry, Some(Arc::new(image)))
    }

    #[test]
    fn counts_tiles_with_spacing_and_margin() {
        let g = TileGeometry::new(16, 16).with_spacing(1).with_margin(2);
        // (70 - 2) / 17 = 4, (40 - 2) / 17 = 2
        assert_eq!(g.tile_counts(70, 40), (4, 2));
        assert_eq!(g.tile_counts(1, 1), (0, 0));
    }

    #[test]
    fn zero_sized_tiles_hold_nothing() {
        assert_eq!(TileGeometry::new(0, 0).tile_counts(64, 64), (0, 0));
    }

    #[test]
    fn offsets_follow_the_grid() {
        let a = atlas(TileGeometry::new(32, 32).with_spacing(2), 136, 68);
        assert_eq!(a.h_tile_count(), 4);
        assert_eq!(a.v_tile_count(), 2);
        assert_eq!(a.tile_offset_x(5).unwrap(), 34);
        assert_eq!(a.tile_offset_y(5).unwrap(), 34);
        assert_eq!(a.tile_offset_x(3).unwrap(), 102);
        assert_eq!(a.tile_offset_y(3).unwrap(), 0);
    }

    #[test]
    fn margin_shifts_every_offset() {
        let a = atlas(TileGeometry::new(8, 8).with_margin(3), 19, 19);
        assert_eq!(a.tile_count(), 4);
        assert_eq!(a.tile_rect(3).unwrap(), Rect::new(11.0, 11.0, 8.0, 8.0));
    }

    #[test]
    fn offsets_are_cached_once() {
        let a = atlas(TileGeometry::new(16, 16), 64, 64);
        assert_eq!(a.cached_offset_count(), 0);
        let first = a.tile_offset_x(6).unwrap();
        a.tile_offset_y(6).unwrap();
        assert_eq!(a.tile_offset_x(6).unwrap(), first);
        assert_eq!(a.cached_offset_count(), 1);

        a.precompute_offsets().unwrap();
        assert_eq!(a.cached_offset_count(), 16);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let a = atlas(TileGeometry::new(16, 16), 32, 32);
        assert!(matches!(
            a.tile_offset_x(4),
            Err(MapError::TileOutOfRange { index: 4, count: 4, .. })
        ));
    }

    #[test]
    fn missing_image_fails_on_use() {
        let a = TileAtlas::new("ghost", TileGeometry::new(16, 16), None);
        assert_eq!(a.tile_count(), 0);
        assert!(matches!(
            a.tile_offset_y(0),
            Err(MapError::MissingResource { ref atlas }) if atlas == "ghost"
        ));
        let mut surface = PixelSurface::new(16, 16);
        assert!(matches!(
            a.render_tile(&mut surface, 0.0, 0.0, 0, TileFlip::NONE),
            Err(MapError::MissingResource { .. })
        ));
    }

    #[test]
    fn tile_image_copies_one_tile() {
        let mut img = Image::gen_image_color(8, 4, BLACK);
        img.set_pixel(4, 0, WHITE);
        let a = TileAtlas::new(
            "pair",
            TileGeometry::new(4, 4),
            Some(Arc::new(AtlasImage::new("pair", img))),
        );
        let tile = a.tile_image(1).unwrap();
        assert_eq!(tile.width(), 4);
        assert_eq!(tile.get_pixel(0, 0), WHITE);
        assert_eq!(tile.get_pixel(1, 0), BLACK);
    }
}
