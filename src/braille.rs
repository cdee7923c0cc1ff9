use crate::color::{LinearGradient, Pixel, Rgba};
use crate::surface::Surface;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Pixel size assumed for one terminal cell
pub const CELL_WIDTH_PX: u32 = 8;
pub const CELL_HEIGHT_PX: u32 = 16;

/// Pixel size of one Braille dot
const DOT_WIDTH_PX: f32 = CELL_WIDTH_PX as f32 / 2.0;
const DOT_HEIGHT_PX: f32 = CELL_HEIGHT_PX as f32 / 4.0;

/// Dots fainter than this stay unlit
const LIT_ALPHA: f32 = 0.02;

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Terminal drawing surface: pixel commands land on a grid of Braille dots.
///
/// Every dot accumulates premultiplied color, so overlapping lines and glows
/// blend like they would on a real canvas before being collapsed to one color
/// per terminal cell.
pub struct BrailleCanvas {
    cols: u16,
    rows: u16,
    dots: Vec<Pixel>,
    line_width: f32,
    shadow: Option<(Rgba, f32)>,
}

impl BrailleCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let mut canvas = Self {
            cols: 0,
            rows: 0,
            dots: Vec::new(),
            line_width: 1.0,
            shadow: None,
        };
        canvas.set_cells(cols, rows);
        canvas
    }

    fn set_cells(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.dots = vec![Pixel::TRANSPARENT; self.dot_width() * self.dot_height()];
    }

    fn dot_width(&self) -> usize {
        self.cols as usize * 2
    }

    fn dot_height(&self) -> usize {
        self.rows as usize * 4
    }

    #[cfg(test)]
    pub fn cells_size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Blend a color into the dot covering pixel `(px, py)`
    fn plot(&mut self, px: f32, py: f32, color: Rgba, coverage: f32) {
        if px < 0.0 || py < 0.0 {
            return;
        }
        let dx = (px / DOT_WIDTH_PX) as usize;
        let dy = (py / DOT_HEIGHT_PX) as usize;
        if dx < self.dot_width() && dy < self.dot_height() {
            let idx = dy * self.dot_width() + dx;
            self.dots[idx].blend(color, coverage);
        }
    }

    /// Blend `color` into every dot whose centre lies within `radius` px of `center`
    fn disc(&mut self, center: (f32, f32), radius: f32, color: Rgba, falloff: Option<f32>) {
        if self.dots.is_empty() {
            return;
        }
        let (cx, cy) = center;
        let mut touched = false;
        let min_dx = ((cx - radius) / DOT_WIDTH_PX).floor().max(0.0) as usize;
        let min_dy = ((cy - radius) / DOT_HEIGHT_PX).floor().max(0.0) as usize;
        let max_dx = ((cx + radius) / DOT_WIDTH_PX).ceil().max(0.0) as usize;
        let max_dy = ((cy + radius) / DOT_HEIGHT_PX).ceil().max(0.0) as usize;

        for dy in min_dy..=max_dy.min(self.dot_height().saturating_sub(1)) {
            for dx in min_dx..=max_dx.min(self.dot_width().saturating_sub(1)) {
                let px = (dx as f32 + 0.5) * DOT_WIDTH_PX;
                let py = (dy as f32 + 0.5) * DOT_HEIGHT_PX;
                let dist = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                if dist > radius {
                    continue;
                }
                let coverage = match falloff {
                    Some(inner) if dist > inner => 1.0 - (dist - inner) / (radius - inner).max(f32::EPSILON),
                    _ => 1.0,
                };
                let idx = dy * self.dot_width() + dx;
                self.dots[idx].blend(color, coverage);
                touched = true;
            }
        }

        // Circles smaller than a dot still light the dot they sit on
        if !touched && falloff.is_none() {
            self.plot(cx, cy, color, 1.0);
        }
    }

    /// Collapse dots into Braille cells composited on `background`.
    ///
    /// Only cells with at least one lit dot are emitted; their color is the
    /// average of the lit dots.
    pub fn cells(&self, background: Rgba) -> Vec<BrailleCell> {
        let mut cells = Vec::new();
        let width = self.dot_width();

        for cy in 0..self.rows {
            for cx in 0..self.cols {
                let mut pattern: u8 = 0;
                let mut sum = [0u32; 3];
                let mut lit = 0u32;

                for (dx, column) in BRAILLE_DOTS.iter().enumerate() {
                    for (dy, bit) in column.iter().enumerate() {
                        let x = cx as usize * 2 + dx;
                        let y = cy as usize * 4 + dy;
                        let dot = &self.dots[y * width + x];
                        if dot.alpha() > LIT_ALPHA {
                            pattern |= bit;
                            let (r, g, b) = dot.over(background);
                            sum[0] += r as u32;
                            sum[1] += g as u32;
                            sum[2] += b as u32;
                            lit += 1;
                        }
                    }
                }

                if pattern != 0 {
                    let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                    cells.push(BrailleCell {
                        x: cx,
                        y: cy,
                        char: braille_char,
                        color: Color::Rgb(
                            (sum[0] / lit) as u8,
                            (sum[1] / lit) as u8,
                            (sum[2] / lit) as u8,
                        ),
                    });
                }
            }
        }

        cells
    }
}

/// Pixel viewport covered by a canvas of `cols` x `rows` terminal cells
pub fn viewport_for_cells(cols: u16, rows: u16) -> (u32, u32) {
    (cols as u32 * CELL_WIDTH_PX, rows as u32 * CELL_HEIGHT_PX)
}

impl Surface for BrailleCanvas {
    fn size(&self) -> (u32, u32) {
        viewport_for_cells(self.cols, self.rows)
    }

    fn resize(&mut self, width: u32, height: u32) {
        let cols = (width / CELL_WIDTH_PX).min(u16::MAX as u32) as u16;
        let rows = (height / CELL_HEIGHT_PX).min(u16::MAX as u32) as u16;
        self.set_cells(cols, rows);
    }

    fn clear(&mut self) {
        self.dots.fill(Pixel::TRANSPARENT);
    }

    fn set_stroke(&mut self, _color: Rgba, line_width: f32) {
        self.line_width = line_width;
    }

    fn stroke_gradient_line(&mut self, from: (f32, f32), to: (f32, f32), gradient: &LinearGradient) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let length = (dx * dx + dy * dy).sqrt();
        // Sample at least twice per dot so no dot along the line is skipped
        let samples = ((length / (DOT_WIDTH_PX.min(DOT_HEIGHT_PX) * 0.5)).ceil() as usize).max(1);
        let coverage = self.line_width.min(1.0);

        let mut last_dot = None;
        for step in 0..=samples {
            let t = step as f32 / samples as f32;
            let px = from.0 + dx * t;
            let py = from.1 + dy * t;
            let dot = ((px / DOT_WIDTH_PX) as i64, (py / DOT_HEIGHT_PX) as i64);
            // Blend each dot once per line
            if last_dot == Some(dot) {
                continue;
            }
            last_dot = Some(dot);
            self.plot(px, py, gradient.at(t), coverage);
        }
    }

    fn set_shadow(&mut self, color: Rgba, blur: f32) {
        self.shadow = if blur > 0.0 { Some((color, blur)) } else { None };
    }

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba) {
        if let Some((shadow, blur)) = self.shadow {
            // Only half the blur survives at dot resolution
            self.disc(center, radius + blur * 0.5, shadow.with_alpha(shadow.a * 0.5), Some(radius));
        }
        self.disc(center, radius, color, None);
    }
}
