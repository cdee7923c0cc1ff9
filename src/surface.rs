use crate::color::{LinearGradient, Rgba};

/// A 2D drawing target the network field renders into.
///
/// Coordinates are in surface pixels with the origin at the top-left corner.
/// Implementations only need to honour these commands; they never report
/// errors back to the simulation.
pub trait Surface {
    /// Current size in pixels
    fn size(&self) -> (u32, u32);

    /// Match the surface to a new viewport size, discarding its contents
    fn resize(&mut self, width: u32, height: u32);

    /// Erase everything to transparent
    fn clear(&mut self);

    /// Base stroke style used before any per-line gradient is applied
    fn set_stroke(&mut self, color: Rgba, line_width: f32);

    /// Stroke a line from `from` to `to`, colored by `gradient` along its length
    fn stroke_gradient_line(&mut self, from: (f32, f32), to: (f32, f32), gradient: &LinearGradient);

    /// Shadow drawn under subsequent fills; `blur == 0` turns it off
    fn set_shadow(&mut self, color: Rgba, blur: f32);

    /// Fill a circle, with the current shadow underneath
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba);
}
