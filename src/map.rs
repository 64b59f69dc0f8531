use crate::error::MapError;
use crate::gid::TileId;
use crate::image::ImageStore;
use crate::ir_map::*;
use crate::loader::json_loader::*;
use crate::properties::TileProperties;
use crate::registry::TilesetGroup;
use crate::render::Surface;
use crate::tileset::Tileset;
use anyhow::Context;
use macroquad::prelude::*;

/// A grid of raw gids.
pub struct TileLayer {
    pub name: String,
    pub visible: bool,
    pub opacity: f32,
    pub offset: Vec2,
    pub properties: Properties,
    pub width: usize,
    pub height: usize,
    data: Vec<TileId>,
}

impl TileLayer {
    fn from_ir(layer: IrLayer) -> Self {
        let cells = layer.width * layer.height;
        let mut data: Vec<TileId> = layer.data.into_iter().map(TileId).collect();
        if data.len() != cells {
            log::warn!(
                "layer '{}' has {} cells, expected {}x{}; resizing",
                layer.name,
                data.len(),
                layer.width,
                layer.height
            );
            data.resize(cells, TileId(0));
        }
        Self {
            name: layer.name,
            visible: layer.visible,
            opacity: layer.opacity,
            offset: layer.offset,
            properties: layer.properties,
            width: layer.width,
            height: layer.height,
            data,
        }
    }

    /// Raw gid at `(col, row)`; `None` outside the layer.
    pub fn tile_at(&self, col: usize, row: usize) -> Option<TileId> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Non-empty cells as `(col, row, tile)`.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_empty())
            .map(move |(idx, t)| (idx % self.width, idx / self.width, *t))
    }
}

/// A loaded map: its tilesets and tile layers.
pub struct Map {
    pub tilesets: TilesetGroup,
    pub layers: Vec<TileLayer>,
    pub properties: Properties,
    pub tile_w: u32,
    pub tile_h: u32,
}

impl Map {
    /// Loads a Tiled JSON map and every tileset image it references.
    ///
    /// Images that fail to load are logged and leave their tileset without
    /// graphics.
    pub async fn load(path: &str) -> anyhow::Result<Self> {
        let (ir, base) =
            decode_map_file_to_ir(path).with_context(|| format!("Decoding map {}", path))?;

        let mut images = ImageStore::new();
        for ts in &ir.tilesets {
            let Some(decl) = &ts.image else { continue };
            if images.contains(&decl.source) {
                continue;
            }
            let img_path = base.join(&decl.source);
            let img_str = img_path
                .to_str()
                .with_context(|| format!("Non UTF-8 image path {}", img_path.display()))?;
            match load_image(img_str).await {
                Ok(img) => {
                    images.insert(&decl.source, img);
                }
                Err(e) => log::warn!("failed to load image {}: {}", img_str, e),
            }
        }

        let map = Self::from_ir(ir, &images);
        log::info!(
            "loaded {} ({} tilesets, {} layers)",
            path,
            map.tilesets.len(),
            map.layers.len()
        );
        Ok(map)
    }

    /// Builds the map from decoded data and already loaded images.
    pub fn from_ir(ir: IrMap, images: &ImageStore) -> Self {
        let mut tilesets = TilesetGroup::new();
        for ts in ir.tilesets {
            tilesets.add(Tileset::from_ir(ts, images));
        }

        Self {
            tilesets,
            layers: ir.layers.into_iter().map(TileLayer::from_ir).collect(),
            properties: ir.properties,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
        }
    }

    /// Layer by name.
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    fn gid_at(&self, layer: usize, col: usize, row: usize) -> Option<TileId> {
        self.layers
            .get(layer)?
            .tile_at(col, row)
            .filter(|t| !t.is_empty())
    }

    /// Derived properties of the tile in `layer` at `(col, row)`.
    pub fn tile_properties_at(
        &self,
        layer: usize,
        col: usize,
        row: usize,
    ) -> Result<Option<&TileProperties>, MapError> {
        match self.gid_at(layer, col, row) {
            Some(tile) => self.tilesets.tile_properties(tile.clean()),
            None => Ok(None),
        }
    }

    /// Whether the tile in `layer` at `(col, row)` blocks movement in any way.
    /// Empty cells and cells outside the layer never collide.
    pub fn is_collidable_at(&self, layer: usize, col: usize, row: usize) -> Result<bool, MapError> {
        match self.gid_at(layer, col, row) {
            Some(tile) => self.tilesets.is_tile_collidable(tile.clean()),
            None => Ok(false),
        }
    }

    /// Draws every visible layer with its top-left corner at `origin`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, origin: Vec2) -> Result<(), MapError> {
        let tw = self.tile_w as f32;
        let th = self.tile_h as f32;

        for layer in self.layers.iter().filter(|l| l.visible) {
            let base = origin + layer.offset;
            for (col, row, tile) in layer.tiles() {
                self.tilesets.render_tile(
                    surface,
                    base.x + col as f32 * tw,
                    base.y + row as f32 * th,
                    tile,
                )?;
            }
        }
        Ok(())
    }
}
