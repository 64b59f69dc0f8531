use crate::atlas::{TileAtlas, TileGeometry};
use crate::error::MapError;
use crate::image::{ColorKey, ImageStore};
use crate::ir_map::{IrTileset, Properties};
use crate::properties::TileProperties;
use crate::render::{Surface, TileFlip};
use macroquad::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// An atlas owning the gid range `[first_gid, last_gid]`.
#[derive(Debug)]
pub struct Tileset {
    atlas: TileAtlas,
    first_gid: u32,
    last_gid: u32,
    tile_offset: Vec2,
    color_key: Option<ColorKey>,
    properties: Properties,
    tiles: HashMap<u32, TileProperties>,
}

impl Tileset {
    /// Wraps an atlas starting at `first_gid`. The range covers every tile
    /// of the atlas, or just `first_gid` when the atlas holds none.
    pub fn new(atlas: TileAtlas, first_gid: u32) -> Self {
        let last_gid = first_gid.saturating_add(atlas.tile_count().saturating_sub(1));
        Self {
            atlas,
            first_gid,
            last_gid,
            tile_offset: Vec2::ZERO,
            color_key: None,
            properties: Properties::new(),
            tiles: HashMap::new(),
        }
    }

    /// Builds a tileset from its declaration, looking its image up in
    /// `images`.
    ///
    /// A missing image or an unreadable color key is logged and the tileset
    /// is still built; the missing image surfaces later as
    /// [`MapError::MissingResource`].
    pub fn from_ir(ir: IrTileset, images: &ImageStore) -> Self {
        let geometry = TileGeometry::new(ir.tile_w, ir.tile_h)
            .with_spacing(ir.spacing)
            .with_margin(ir.margin);

        let mut color_key = None;
        let image = match &ir.image {
            Some(decl) => {
                let found = images.get(&decl.source);
                if found.is_none() {
                    log::warn!("'{}' file for tileset '{}' not found", decl.source, ir.name);
                }
                match (found, decl.transparent_color.as_deref()) {
                    (Some(img), Some(trans)) => match ColorKey::parse(trans) {
                        Some(key) => {
                            color_key = Some(key);
                            Some(Arc::new(img.color_keyed(key)))
                        }
                        None => {
                            log::warn!(
                                "tileset '{}': ignoring unreadable transparent color '{}'",
                                ir.name,
                                trans
                            );
                            Some(img)
                        }
                    },
                    (found, _) => found,
                }
            }
            None => None,
        };

        let atlas = TileAtlas::new(ir.name, geometry, image);
        let mut tileset = Tileset::new(atlas, ir.first_gid);
        tileset.color_key = color_key;
        tileset.properties = ir.properties;
        if let Some((x, y)) = ir.tile_offset {
            tileset.tile_offset = vec2(x as f32, y as f32);
        }

        for tile in ir.tiles {
            let props = TileProperties::derive(tile.kind.as_deref(), tile.properties);
            tileset.tiles.insert(tile.id, props);
        }

        log::debug!(
            "tileset '{}' covers gids {}..={} ({} declared tiles)",
            tileset.name(),
            tileset.first_gid,
            tileset.last_gid,
            tileset.tiles.len()
        );
        tileset
    }

    /// Attaches derived properties to local tile `id`, replacing any earlier
    /// record for it.
    pub fn with_tile(mut self, id: u32, props: TileProperties) -> Self {
        self.tiles.insert(id, props);
        self
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        self.atlas.name()
    }

    /// The underlying atlas.
    pub fn atlas(&self) -> &TileAtlas {
        &self.atlas
    }

    /// First gid owned by this tileset.
    pub fn first_gid(&self) -> u32 {
        self.first_gid
    }

    /// Last gid owned by this tileset, inclusive.
    pub fn last_gid(&self) -> u32 {
        self.last_gid
    }

    /// `true` when the range collapses to a single gid, as for an image-less
    /// placeholder reserving a gid block.
    pub fn is_degenerate(&self) -> bool {
        self.first_gid == self.last_gid
    }

    /// `first_gid <= gid <= last_gid`
    #[inline]
    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid <= self.last_gid
    }

    /// Index of `gid` inside the atlas.
    #[inline]
    pub fn local_id(&self, gid: u32) -> u32 {
        gid.wrapping_sub(self.first_gid)
    }

    /// Render-time nudge applied to every tile.
    pub fn tile_offset(&self) -> Vec2 {
        self.tile_offset
    }

    /// Replaces the render-time nudge. Cached atlas offsets are unaffected.
    pub fn set_tile_offset(&mut self, offset: Vec2) {
        self.tile_offset = offset;
    }

    /// Color treated as transparent, when one was declared and understood.
    pub fn color_key(&self) -> Option<ColorKey> {
        self.color_key
    }

    /// Tileset-level custom properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Derived properties of `gid`, if its tile was declared.
    pub fn tile_properties(&self, gid: u32) -> Option<&TileProperties> {
        self.tiles.get(&self.local_id(gid))
    }

    /// Undeclared tiles are not collidable.
    pub fn is_tile_collidable(&self, gid: u32) -> bool {
        self.tile_properties(gid).is_some_and(|p| p.collidable)
    }

    /// Number of tiles carrying a declaration.
    pub fn declared_tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Blits `gid` at `(x, y)` shifted by the tile offset.
    pub fn render_tile<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        x: f32,
        y: f32,
        gid: u32,
        flip: TileFlip,
    ) -> Result<(), MapError> {
        self.atlas.render_tile(
            surface,
            x + self.tile_offset.x,
            y + self.tile_offset.y,
            self.local_id(gid),
            flip,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::AtlasImage;
    use crate::ir_map::{IrImage, IrTileMetadata, PropertyValue};
    use crate::render::PixelSurface;

    fn atlas_with_tiles(name: &str, columns: u16, rows: u16) -> TileAtlas {
        let img = Image::gen_image_color(columns * 16, rows * 16, WHITE);
        TileAtlas::new(
            name,
            TileGeometry::new(16, 16),
            Some(Arc::new(AtlasImage::new(name, img))),
        )
    }

    fn declaration(first_gid: u32, source: Option<&str>) -> IrTileset {
        IrTileset {
            first_gid,
            name: "terrain".into(),
            tile_w: 16,
            tile_h: 16,
            spacing: 0,
            margin: 0,
            image: source.map(|s| IrImage {
                source: s.into(),
                transparent_color: None,
            }),
            tile_offset: None,
            properties: Properties::new(),
            tiles: Vec::new(),
        }
    }

    #[test]
    fn range_covers_every_tile() {
        let ts = Tileset::new(atlas_with_tiles("a", 5, 4), 1);
        assert_eq!(ts.last_gid(), 20);
        assert!(ts.contains(1));
        assert!(ts.contains(20));
        assert!(!ts.contains(21));
        assert!(!ts.contains(0));
        assert!(!ts.is_degenerate());
    }

    #[test]
    fn empty_atlas_is_degenerate() {
        let ts = Tileset::new(TileAtlas::new("collision", TileGeometry::new(16, 16), None), 21);
        assert_eq!(ts.last_gid(), 21);
        assert!(ts.is_degenerate());
        assert!(ts.contains(21));
    }

    #[test]
    fn range_saturates_at_the_top_of_the_gid_space() {
        let ts = Tileset::new(atlas_with_tiles("a", 4, 1), u32::MAX - 1);
        assert_eq!(ts.last_gid(), u32::MAX);
        assert!(ts.contains(u32::MAX));
    }

    #[test]
    fn declared_tiles_are_keyed_by_gid() {
        let mut images = ImageStore::new();
        images.insert("terrain.png", Image::gen_image_color(64, 16, WHITE));

        let mut ir = declaration(10, Some("gfx/terrain.png"));
        let mut custom = Properties::new();
        custom.insert("damage", PropertyValue::I64(2));
        ir.tiles = vec![
            IrTileMetadata {
                id: 0,
                kind: Some("Ladder".into()),
                properties: Properties::new(),
            },
            IrTileMetadata {
                id: 3,
                kind: None,
                properties: custom,
            },
        ];
        ir.tile_offset = Some((2, -4));

        let ts = Tileset::from_ir(ir, &images);
        assert_eq!(ts.last_gid(), 13);
        assert!(ts.tile_properties(10).is_some_and(|p| p.ladder));
        assert!(ts.is_tile_collidable(10));
        assert!(!ts.is_tile_collidable(13));
        assert_eq!(ts.tile_properties(13).and_then(|p| p.custom.get_i64("damage")), Some(2));
        assert!(ts.tile_properties(11).is_none());
        assert!(!ts.is_tile_collidable(11));
        assert_eq!(ts.tile_offset(), vec2(2.0, -4.0));
    }

    #[test]
    fn missing_image_still_builds() {
        let ts = Tileset::from_ir(declaration(1, Some("nowhere.png")), &ImageStore::new());
        assert!(ts.is_degenerate());
        assert!(ts.atlas().image().is_none());
        let mut surface = PixelSurface::new(16, 16);
        assert!(matches!(
            ts.render_tile(&mut surface, 0.0, 0.0, 1, TileFlip::NONE),
            Err(MapError::MissingResource { .. })
        ));
    }

    #[test]
    fn transparent_color_swaps_in_keyed_image() {
        let mut images = ImageStore::new();
        images.insert(
            "terrain.png",
            Image::gen_image_color(16, 16, Color::from_rgba(255, 0, 255, 255)),
        );
        let mut ir = declaration(1, Some("terrain.png"));
        if let Some(img) = ir.image.as_mut() {
            img.transparent_color = Some("#FF00FF".into());
        }

        let ts = Tileset::from_ir(ir, &images);
        assert_eq!(ts.color_key(), Some(ColorKey([255, 0, 255])));
        let image = ts.atlas().image().expect("image");
        assert_eq!(image.pixels().bytes[3], 0);
        // the shared original is left alone
        assert_eq!(images.get("terrain").expect("stored").pixels().bytes[3], 255);
    }

    #[test]
    fn offsets_stay_cached_after_unrelated_changes() {
        let mut ts = Tileset::new(atlas_with_tiles("a", 4, 4), 1);
        let x = ts.atlas().tile_offset_x(5).unwrap();
        assert_eq!(ts.atlas().tile_offset_x(5).unwrap(), x);
        ts.set_tile_offset(vec2(8.0, 8.0));
        assert_eq!(ts.atlas().tile_offset_x(5).unwrap(), x);
    }

    #[test]
    fn render_applies_tile_offset() {
        let mut img = Image::gen_image_color(2, 2, BLANK);
        img.set_pixel(0, 0, WHITE);
        let atlas = TileAtlas::new(
            "dot",
            TileGeometry::new(2, 2),
            Some(Arc::new(AtlasImage::new("dot", img))),
        );
        let mut ts = Tileset::new(atlas, 1);
        ts.set_tile_offset(vec2(1.0, 2.0));

        let mut surface = PixelSurface::new(4, 4);
        ts.render_tile(&mut surface, 0.0, 0.0, 1, TileFlip::NONE).unwrap();
        assert_eq!(surface.rgba(1, 2), [255, 255, 255, 255]);
        assert_eq!(surface.rgba(0, 0)[3], 0);
    }
}
