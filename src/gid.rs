use crate::render::TileFlip;

/// Horizontal flip flag, bit 31.
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip flag, bit 30.
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal flip (axis swap) flag, bit 29.
pub const FLIP_D: u32 = 0x2000_0000;
/// Keeps the lower 29 bits (bit 28 is free).
pub const GID_MASK: u32 = 0x1FFF_FFFF;

/// A raw gid as stored in a tile layer, flip flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// The gid as stored, flags included.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
    /// The gid with flip flags stripped.
    #[inline]
    pub fn clean(self) -> u32 {
        self.0 & GID_MASK
    }
    /// Horizontal flip flag.
    #[inline]
    pub fn flip_h(self) -> bool {
        (self.0 & FLIP_H) != 0
    }
    /// Vertical flip flag.
    #[inline]
    pub fn flip_v(self) -> bool {
        (self.0 & FLIP_V) != 0
    }
    /// Diagonal flip flag.
    #[inline]
    pub fn flip_d(self) -> bool {
        (self.0 & FLIP_D) != 0
    }
    /// `true` for the empty cell.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.clean() == 0
    }

    /// All three flags as a [`TileFlip`].
    pub fn flip(self) -> TileFlip {
        TileFlip {
            horizontal: self.flip_h(),
            vertical: self.flip_v(),
            diagonal: self.flip_d(),
        }
    }
}
