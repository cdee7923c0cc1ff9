use crate::animation::Animator;
use crate::color::Theme;
use crate::error::FieldError;
use crate::raster::RasterSurface;
use crate::settings::FieldSettings;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// GIF frame delay in hundredths of a second (close to the 16ms terminal tick)
const GIF_FRAME_DELAY: u16 = 2;
/// NeuQuant sampling speed for GIF palette quantization (1 = best, 30 = fastest)
const GIF_QUANTIZE_SPEED: i32 = 10;

/// Largest export area in pixels
const MAX_EXPORT_PIXELS: u64 = 16384 * 16384;

/// Everything needed to run a field headless
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub settings: FieldSettings,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    /// Frames simulated (and recorded, for GIFs)
    pub frames: usize,
    pub theme: Theme,
    pub reduced_motion: bool,
    /// Fixed pointer position for the whole run
    pub pointer: Option<(f32, f32)>,
}

impl ExportOptions {
    fn animator(&self) -> Result<Animator<RasterSurface>, FieldError> {
        if self.width == 0 || self.height == 0 {
            return Err(FieldError::InvalidSize(format!("{}x{}", self.width, self.height)));
        }
        let mut animator = Animator::new(self.settings.clone(), self.seed);
        animator.set_reduced_motion(self.reduced_motion);
        animator.start(Some(RasterSurface::new(self.width, self.height)), (self.width, self.height));
        if let Some((x, y)) = self.pointer {
            animator.on_pointer_move(x, y);
        }
        Ok(animator)
    }
}

/// Parse a `WIDTHxHEIGHT` size such as `1280x720`
pub fn parse_size(s: &str) -> Result<(u32, u32), FieldError> {
    let invalid = || FieldError::InvalidSize(s.to_string());
    let lower = s.to_lowercase();
    let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
    let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
    if width == 0 || height == 0 || width as u64 * height as u64 > MAX_EXPORT_PIXELS {
        return Err(invalid());
    }
    Ok((width, height))
}

/// Run `frames` frames and save the last one as a PNG
pub fn snapshot_png(options: &ExportOptions, path: &Path) -> Result<(), FieldError> {
    let mut animator = options.animator()?;
    for _ in 0..options.frames.max(1) {
        animator.frame(options.theme);
    }
    let surface = animator
        .surface()
        .ok_or_else(|| FieldError::InvalidSize(format!("{}x{}", options.width, options.height)))?;
    surface.save_png(path, options.theme.palette().background)?;
    animator.stop();
    log::info!("wrote PNG snapshot to {}", path.display());
    Ok(())
}

/// Record `frames` frames into a looping GIF
pub fn record_gif(options: &ExportOptions, path: &Path) -> Result<(), FieldError> {
    let (Ok(width), Ok(height)) = (u16::try_from(options.width), u16::try_from(options.height)) else {
        return Err(FieldError::InvalidSize(format!(
            "{}x{} exceeds the GIF limit of 65535",
            options.width, options.height
        )));
    };

    let mut animator = options.animator()?;
    let background = options.theme.palette().background;

    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = gif::Encoder::new(writer, width, height, &[])?;
    encoder.set_repeat(gif::Repeat::Infinite)?;

    for _ in 0..options.frames.max(1) {
        animator.frame(options.theme);
        let Some(surface) = animator.surface() else {
            break;
        };
        let mut rgba = surface.to_rgba_bytes(background);
        let mut frame = gif::Frame::from_rgba_speed(width, height, &mut rgba, GIF_QUANTIZE_SPEED);
        frame.delay = GIF_FRAME_DELAY;
        encoder.write_frame(&frame)?;
    }

    animator.stop();
    log::info!("wrote {} GIF frames to {}", options.frames.max(1), path.display());
    Ok(())
}
