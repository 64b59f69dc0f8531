use crate::atlas::TileGeometry;

/// Flip flags for a single tile blit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileFlip {
    pub horizontal: bool,
    pub vertical: bool,
    /// Swap X and Y axes. Applied before the other two.
    pub diagonal: bool,
}

impl TileFlip {
    pub const NONE: TileFlip = TileFlip {
        horizontal: false,
        vertical: false,
        diagonal: false,
    };

    #[inline]
    pub fn any(self) -> bool {
        self.horizontal || self.vertical || self.diagonal
    }
}

/// 2D affine transform in canvas `setTransform` layout:
///
/// ```text
/// x' = m11 * x + m21 * y + mx
/// y' = m12 * x + m22 * y + my
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTransform {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub mx: f32,
    pub my: f32,
}

impl Default for TileTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TileTransform {
    pub const IDENTITY: TileTransform = TileTransform {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        mx: 0.0,
        my: 0.0,
    };

    /// Transform that blits a tile of `geometry` at `(dest_x, dest_y)` with
    /// `flip` applied. The tile itself must then be drawn at `(0, 0)`.
    ///
    /// Diagonal is applied first, then horizontal, then vertical; the
    /// horizontal and vertical compensation uses the already swapped
    /// dimensions when the diagonal flag is set.
    pub fn for_flip(geometry: &TileGeometry, dest_x: f32, dest_y: f32, flip: TileFlip) -> Self {
        let tw = geometry.tile_w as f32;
        let th = geometry.tile_h as f32;

        let mut t = TileTransform {
            mx: dest_x,
            my: dest_y,
            ..Self::IDENTITY
        };

        if flip.diagonal {
            t.m11 = 0.0;
            t.m12 = 1.0;
            t.m21 = 1.0;
            t.m22 = 0.0;
            t.my += th - tw;
        }
        if flip.horizontal {
            t.m11 = -t.m11;
            t.m21 = -t.m21;
            t.mx += if flip.diagonal { th } else { tw };
        }
        if flip.vertical {
            t.m12 = -t.m12;
            t.m22 = -t.m22;
            t.my += if flip.diagonal { tw } else { th };
        }
        t
    }

    #[inline]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.m11 * x + self.m21 * y + self.mx,
            self.m12 * x + self.m22 * y + self.my,
        )
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.m11 * self.m22 - self.m21 * self.m12
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom(w: u32, h: u32) -> TileGeometry {
        TileGeometry::new(w, h)
    }

    #[test]
    fn no_flip_is_a_translation() {
        let t = TileTransform::for_flip(&geom(16, 16), 5.0, 7.0, TileFlip::NONE);
        assert_eq!(t.apply(0.0, 0.0), (5.0, 7.0));
        assert_eq!(t.apply(16.0, 16.0), (21.0, 23.0));
    }

    #[test]
    fn horizontal_mirrors_inside_the_tile() {
        let flip = TileFlip {
            horizontal: true,
            ..TileFlip::NONE
        };
        let t = TileTransform::for_flip(&geom(16, 8), 0.0, 0.0, flip);
        assert_eq!(t.apply(0.0, 0.0), (16.0, 0.0));
        assert_eq!(t.apply(16.0, 8.0), (0.0, 8.0));
    }

    #[test]
    fn diagonal_compensates_for_non_square_tiles() {
        let flip = TileFlip {
            diagonal: true,
            ..TileFlip::NONE
        };
        let t = TileTransform::for_flip(&geom(32, 16), 0.0, 0.0, flip);
        assert_eq!(t.m11, 0.0);
        assert_eq!(t.m12, 1.0);
        assert_eq!(t.m21, 1.0);
        assert_eq!(t.m22, 0.0);
        assert_eq!(t.my, -16.0);
    }

    #[test]
    fn combined_flips_use_swapped_dimensions() {
        let flip = TileFlip {
            horizontal: true,
            vertical: true,
            diagonal: true,
        };
        let t = TileTransform::for_flip(&geom(32, 16), 100.0, 200.0, flip);
        // diagonal: my += 16 - 32; horizontal: mx += 16; vertical: my += 32
        assert_eq!(t.mx, 116.0);
        assert_eq!(t.my, 216.0);
        assert_eq!(t.m11, 0.0);
        assert_eq!(t.m21, -1.0);
        assert_eq!(t.m12, -1.0);
        assert_eq!(t.m22, 0.0);
    }

    #[test]
    fn every_flip_combination_keeps_the_tile_in_place() {
        for bits in 0..8u8 {
            let flip = TileFlip {
                horizontal: bits & 1 != 0,
                vertical: bits & 2 != 0,
                diagonal: bits & 4 != 0,
            };
            let t = TileTransform::for_flip(&geom(24, 24), 10.0, 20.0, flip);
            let corners = [
                t.apply(0.0, 0.0),
                t.apply(24.0, 0.0),
                t.apply(0.0, 24.0),
                t.apply(24.0, 24.0),
            ];
            let min_x = corners.iter().map(|c| c.0).fold(f32::MAX, f32::min);
            let min_y = corners.iter().map(|c| c.1).fold(f32::MAX, f32::min);
            assert_eq!((min_x, min_y), (10.0, 20.0), "flip {:?}", flip);
            assert_eq!(t.determinant().abs(), 1.0);
        }
    }
}
