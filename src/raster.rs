use crate::color::{LinearGradient, Pixel, Rgba};
use crate::error::FieldError;
use crate::surface::Surface;
use image::{Rgba as ImgRgba, RgbaImage};
use std::path::Path;

/// In-memory RGBA canvas with anti-aliased lines and circles and a soft shadow.
///
/// Pixels are kept premultiplied and transparent after `clear`, the background
/// is only applied when the image is exported.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
    line_width: f32,
    shadow: Option<(Rgba, f32)>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::TRANSPARENT; width as usize * height as usize],
            line_width: 1.0,
            shadow: None,
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel index range covering `[lo, hi]` on an axis of length `len`
    fn span(lo: f32, hi: f32, len: u32) -> std::ops::Range<u32> {
        let start = lo.floor().max(0.0) as u32;
        let end = (hi.ceil().max(0.0) as u32).min(len);
        start..end.max(start)
    }

    /// Blend `color` over pixels of a ring/disc, coverage given by `shade(distance)`
    fn shade_disc(&mut self, center: (f32, f32), outer: f32, color: Rgba, shade: impl Fn(f32) -> f32) {
        let (cx, cy) = center;
        for y in Self::span(cy - outer - 1.0, cy + outer + 1.0, self.height) {
            for x in Self::span(cx - outer - 1.0, cx + outer + 1.0, self.width) {
                let dist = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
                let coverage = shade(dist);
                if coverage > 0.0 {
                    let idx = self.index(x, y);
                    self.pixels[idx].blend(color, coverage.min(1.0));
                }
            }
        }
    }

    /// Flatten onto an opaque background
    pub fn to_image(&self, background: Rgba) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        for (i, px) in self.pixels.iter().enumerate() {
            let (r, g, b) = px.over(background);
            let x = i as u32 % self.width;
            let y = i as u32 / self.width;
            image.put_pixel(x, y, ImgRgba([r, g, b, 255]));
        }
        image
    }

    /// Flattened RGBA bytes, row-major
    pub fn to_rgba_bytes(&self, background: Rgba) -> Vec<u8> {
        self.to_image(background).into_raw()
    }

    /// Write a PNG of the current contents on `background`
    pub fn save_png(&self, path: &Path, background: Rgba) -> Result<(), FieldError> {
        if self.width == 0 || self.height == 0 {
            return Err(FieldError::InvalidSize(format!("{}x{}", self.width, self.height)));
        }
        self.to_image(background)
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Pixel::TRANSPARENT; width as usize * height as usize];
    }

    fn clear(&mut self) {
        self.pixels.fill(Pixel::TRANSPARENT);
    }

    fn set_stroke(&mut self, _color: Rgba, line_width: f32) {
        self.line_width = line_width;
    }

    fn stroke_gradient_line(&mut self, from: (f32, f32), to: (f32, f32), gradient: &LinearGradient) {
        let half = self.line_width * 0.5;
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len_sq = dx * dx + dy * dy;

        let xs = Self::span(from.0.min(to.0) - half - 1.0, from.0.max(to.0) + half + 1.0, self.width);
        let ys = Self::span(from.1.min(to.1) - half - 1.0, from.1.max(to.1) + half + 1.0, self.height);

        for y in ys {
            for x in xs.clone() {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                // Projection onto the segment gives both the gradient position and the distance
                let t = if len_sq > 0.0 {
                    (((px - from.0) * dx + (py - from.1) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (nx, ny) = (from.0 + dx * t, from.1 + dy * t);
                let dist = ((px - nx).powi(2) + (py - ny).powi(2)).sqrt();
                let coverage = (half + 0.5 - dist).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let idx = self.index(x, y);
                    self.pixels[idx].blend(gradient.at(t), coverage);
                }
            }
        }
    }

    fn set_shadow(&mut self, color: Rgba, blur: f32) {
        self.shadow = if blur > 0.0 { Some((color, blur)) } else { None };
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        if let Some((shadow, blur)) = self.shadow {
            // Quadratic falloff from the circle edge out to `blur`
            self.shade_disc(center, radius + blur, shadow, |dist| {
                if dist <= radius {
                    1.0
                } else {
                    let t = 1.0 - (dist - radius) / blur;
                    t * t
                }
            });
        }
        self.shade_disc(center, radius, color, |dist| radius + 0.5 - dist);
    }
}
