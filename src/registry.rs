use crate::error::MapError;
use crate::gid::TileId;
use crate::properties::TileProperties;
use crate::render::Surface;
use crate::tileset::Tileset;
use std::ops::Index;

/// Tilesets of one map, in declaration order.
#[derive(Debug, Default)]
pub struct TilesetGroup {
    tilesets: Vec<Tileset>,
}

impl TilesetGroup {
    /// Empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tileset`. Ranges are neither sorted nor checked for overlap.
    pub fn add(&mut self, tileset: Tileset) {
        self.tilesets.push(tileset);
    }

    /// Tileset at position `i` in declaration order.
    pub fn get_by_index(&self, i: usize) -> Option<&Tileset> {
        self.tilesets.get(i)
    }

    /// Number of tilesets.
    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    /// `true` when no tileset was added.
    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    /// Tilesets in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tileset> {
        self.tilesets.iter()
    }

    /// Tileset owning `gid` (flip bits already stripped).
    ///
    /// The first tileset in declaration order whose range contains `gid`
    /// wins. Failing that, the last degenerate tileset seen with
    /// `first_gid <= gid` is returned; these are placeholders reserving a
    /// gid block, typically for collision layers without graphics.
    pub fn resolve(&self, gid: u32) -> Result<&Tileset, MapError> {
        let mut fallback = None;
        for tileset in &self.tilesets {
            if tileset.contains(gid) {
                return Ok(tileset);
            }
            if tileset.is_degenerate() && gid >= tileset.first_gid() {
                fallback = Some(tileset);
            }
        }
        match fallback {
            Some(tileset) => {
                log::trace!("gid {} falls back to placeholder '{}'", gid, tileset.name());
                Ok(tileset)
            }
            None => Err(MapError::NoMatchingAtlas { gid }),
        }
    }

    /// Derived properties of `gid` from the tileset it resolves to.
    pub fn tile_properties(&self, gid: u32) -> Result<Option<&TileProperties>, MapError> {
        Ok(self.resolve(gid)?.tile_properties(gid))
    }

    /// Collidability of `gid` from the tileset it resolves to. Fails like
    /// [`TilesetGroup::resolve`].
    pub fn is_tile_collidable(&self, gid: u32) -> Result<bool, MapError> {
        Ok(self.resolve(gid)?.is_tile_collidable(gid))
    }

    /// Resolves a raw layer gid and blits it with its flip flags.
    pub fn render_tile<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        x: f32,
        y: f32,
        tile: TileId,
    ) -> Result<(), MapError> {
        let gid = tile.clean();
        self.resolve(gid)?
            .render_tile(surface, x, y, gid, tile.flip())
    }
}

impl Index<usize> for TilesetGroup {
    type Output = Tileset;

    fn index(&self, i: usize) -> &Tileset {
        &self.tilesets[i]
    }
}

impl<'a> IntoIterator for &'a TilesetGroup {
    type Item = &'a Tileset;
    type IntoIter = std::slice::Iter<'a, Tileset>;

    fn into_iter(self) -> Self::IntoIter {
        self.tilesets.iter()
    }
}
