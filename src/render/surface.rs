use crate::image::AtlasImage;
use crate::render::TileTransform;
use macroquad::prelude::*;
use std::collections::HashMap;

/// Drawing target for tile blits.
pub trait Surface {
    /// Replaces the current transform. Identity resets it.
    fn set_transform(&mut self, transform: TileTransform);

    /// Copies `src` from `source` into `dest`, mapped by the current transform.
    fn draw_image(&mut self, source: &AtlasImage, src: Rect, dest: Rect);
}

/// CPU surface backed by a macroquad [`Image`]. Needs no GL context.
///
/// Each destination pixel is sampled at its centre, so axis-aligned flips
/// and swaps land on exact pixels. Fully transparent source pixels are
/// skipped.
pub struct PixelSurface {
    image: Image,
    transform: TileTransform,
}

impl PixelSurface {
    /// Transparent surface of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: Image::gen_image_color(width as u16, height as u16, BLANK),
            transform: TileTransform::IDENTITY,
        }
    }

    /// Current transform.
    pub fn transform(&self) -> TileTransform {
        self.transform
    }

    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.image.get_pixel(x, y)
    }

    /// Raw RGBA of the pixel at `(x, y)`.
    pub fn rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.image.width() + x as usize) * 4;
        let b = &self.image.bytes[i..i + 4];
        [b[0], b[1], b[2], b[3]]
    }

    /// Drawn pixels.
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Consumes the surface, returning its pixels.
    pub fn into_image(self) -> Image {
        self.image
    }
}

impl Surface for PixelSurface {
    fn set_transform(&mut self, transform: TileTransform) {
        self.transform = transform;
    }

    fn draw_image(&mut self, source: &AtlasImage, src: Rect, dest: Rect) {
        let pixels = source.pixels();
        let (src_w, src_h) = (src.w as usize, src.h as usize);
        if src_w == 0 || src_h == 0 {
            return;
        }
        let (out_w, out_h) = (self.image.width() as f32, self.image.height() as f32);
        let scale_x = dest.w / src.w;
        let scale_y = dest.h / src.h;

        for j in 0..src_h {
            for i in 0..src_w {
                let sx = src.x as usize + i;
                let sy = src.y as usize + j;
                if sx >= pixels.width() || sy >= pixels.height() {
                    continue;
                }
                let si = (sy * pixels.width() + sx) * 4;
                let rgba = &pixels.bytes[si..si + 4];
                if rgba[3] == 0 {
                    continue;
                }

                let px = dest.x + (i as f32 + 0.5) * scale_x;
                let py = dest.y + (j as f32 + 0.5) * scale_y;
                let (x, y) = self.transform.apply(px, py);
                let (x, y) = (x.floor(), y.floor());
                if x < 0.0 || y < 0.0 || x >= out_w || y >= out_h {
                    continue;
                }

                let di = (y as usize * self.image.width() + x as usize) * 4;
                self.image.bytes[di..di + 4].copy_from_slice(rgba);
            }
        }
    }
}

/// Surface drawing to macroquad's current render target.
///
/// Atlas images are uploaded once per name with nearest filtering. The
/// transform is decomposed into a rotation plus an optional mirror, which
/// covers every flip combination a tile can carry.
#[derive(Default)]
pub struct ScreenSurface {
    transform: TileTransform,
    textures: HashMap<String, Texture2D>,
}

impl ScreenSurface {
    /// Surface with an empty texture cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn texture(&mut self, source: &AtlasImage) -> Texture2D {
        self.textures
            .entry(source.name().to_owned())
            .or_insert_with(|| {
                let tex = Texture2D::from_image(source.pixels());
                tex.set_filter(FilterMode::Nearest);
                tex
            })
            .clone()
    }
}

/// `(rotation, mirror_x)` such that `rotate(rotation) * mirror_x` equals the
/// linear part of `t`.
fn decompose(t: &TileTransform) -> (f32, bool) {
    let mirror = t.determinant() < 0.0;
    let (cos, sin) = if mirror { (-t.m11, -t.m12) } else { (t.m11, t.m12) };
    (sin.atan2(cos), mirror)
}

impl Surface for ScreenSurface {
    fn set_transform(&mut self, transform: TileTransform) {
        self.transform = transform;
    }

    fn draw_image(&mut self, source: &AtlasImage, src: Rect, dest: Rect) {
        let tex = self.texture(source);
        let (cx, cy) = self
            .transform
            .apply(dest.x + dest.w / 2.0, dest.y + dest.h / 2.0);
        let (rotation, flip_x) = decompose(&self.transform);

        draw_texture_ex(
            &tex,
            cx - dest.w / 2.0,
            cy - dest.h / 2.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                source: Some(src),
                rotation,
                flip_x,
                ..Default::default()
            },
        );
    }
}
