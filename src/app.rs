use crate::animation::Animator;
use crate::braille::{self, BrailleCanvas, CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::color::Theme;
use crate::presets::PresetManager;
use crate::raster::RasterSurface;
use crate::settings::FieldSettings;
use crate::surface::Surface;
use ratatui::layout::Rect;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Focus state for parameter editing in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Preset,
    Points,
    Distance,
    Speed,
    RadiusBase,
    RadiusVariance,
    Opacity,
    Theme,
    Motion,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters top to bottom
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Preset,
            Focus::Preset => Focus::Points,
            Focus::Points => Focus::Distance,
            Focus::Distance => Focus::Speed,
            Focus::Speed => Focus::RadiusBase,
            Focus::RadiusBase => Focus::RadiusVariance,
            Focus::RadiusVariance => Focus::Opacity,
            Focus::Opacity => Focus::Theme,
            Focus::Theme => Focus::Motion,
            Focus::Motion => Focus::Controls,
        }
    }

    /// Shift+Tab goes back
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Motion,
            Focus::Preset => Focus::Controls,
            Focus::Points => Focus::Preset,
            Focus::Distance => Focus::Points,
            Focus::Speed => Focus::Distance,
            Focus::RadiusBase => Focus::Speed,
            Focus::RadiusVariance => Focus::RadiusBase,
            Focus::Opacity => Focus::RadiusVariance,
            Focus::Theme => Focus::Opacity,
            Focus::Motion => Focus::Theme,
        }
    }

    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }

    /// Line of this parameter in the params box
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls | Focus::Preset => 0,
            Focus::Points => 1,
            Focus::Distance => 2,
            Focus::Speed => 3,
            Focus::RadiusBase => 4,
            Focus::RadiusVariance => 5,
            Focus::Opacity => 6,
            Focus::Theme => 7,
            Focus::Motion => 8,
        }
    }
}

/// Paces frames at a fixed period regardless of how much input arrives
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    period: Duration,
    last_frame: Instant,
}

impl FrameClock {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            last_frame: now,
        }
    }

    /// Time left until the next frame is due
    pub fn remaining(&self, now: Instant) -> Duration {
        self.period.saturating_sub(now.duration_since(self.last_frame))
    }

    /// Claim the next frame if its time has come
    pub fn take_frame(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_frame) < self.period {
            return false;
        }
        self.last_frame = now;
        true
    }
}

pub struct App {
    pub animator: Animator<BrailleCanvas>,
    pub settings: FieldSettings,
    pub presets: PresetManager,
    /// Index into `presets.all_presets()`; `None` once settings are edited by hand
    pub preset_index: Option<usize>,
    pub theme: Theme,
    pub reduced_motion: bool,
    pub seed: u64,
    pub paused: bool,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    /// Inner canvas rectangle in terminal cells
    pub canvas_area: Rect,
    /// One-line feedback shown in the status box
    pub status: Option<String>,
}

impl App {
    pub fn new(
        canvas_area: Rect,
        settings: FieldSettings,
        presets: PresetManager,
        seed: u64,
        theme: Theme,
        reduced_motion: bool,
    ) -> Self {
        let preset_index = presets.all_presets().position(|p| p.settings == settings);
        let mut app = Self {
            animator: Animator::new(settings.clone(), seed),
            settings,
            presets,
            preset_index,
            theme,
            reduced_motion,
            seed,
            paused: false,
            focus: Focus::Controls,
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            canvas_area,
            status: None,
        };
        app.restart();
        app
    }

    fn viewport(&self) -> (u32, u32) {
        braille::viewport_for_cells(self.canvas_area.width, self.canvas_area.height)
    }

    /// Tear down the running animation and start a fresh one with the current settings
    pub fn restart(&mut self) {
        self.animator.stop();
        let mut animator = Animator::new(self.settings.clone(), self.seed);
        animator.set_reduced_motion(self.reduced_motion);
        let surface = BrailleCanvas::new(self.canvas_area.width, self.canvas_area.height);
        animator.start(Some(surface), self.viewport());
        self.animator = animator;
    }

    /// Render the next frame unless paused
    pub fn tick(&mut self) {
        if !self.paused && self.animator.is_frame_pending() {
            self.animator.frame(self.theme);
        }
    }

    /// Canvas moved or changed size
    pub fn set_canvas_area(&mut self, area: Rect) {
        let resized = area.width != self.canvas_area.width || area.height != self.canvas_area.height;
        self.canvas_area = area;
        if resized {
            let (width, height) = self.viewport();
            self.animator.on_resize(width, height);
        }
    }

    /// Mouse moved to terminal cell `(column, row)`
    pub fn pointer_moved(&mut self, column: u16, row: u16) {
        if !self.animator.is_listening() {
            return;
        }
        let area = self.canvas_area;
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if inside {
            let x = (column - area.x) as f32 * CELL_WIDTH_PX as f32 + CELL_WIDTH_PX as f32 / 2.0;
            let y = (row - area.y) as f32 * CELL_HEIGHT_PX as f32 + CELL_HEIGHT_PX as f32 / 2.0;
            self.animator.on_pointer_move(x, y);
        } else {
            self.animator.on_pointer_leave();
        }
    }

    pub fn pointer_left(&mut self) {
        self.animator.on_pointer_leave();
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        self.adjust_focused(1);
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        self.adjust_focused(-1);
    }

    fn adjust_focused(&mut self, dir: i32) {
        let sign = dir as f32;
        match self.focus {
            Focus::None | Focus::Controls => return,
            Focus::Preset => {
                self.cycle_preset(dir);
                return;
            }
            Focus::Theme => {
                self.toggle_theme();
                return;
            }
            Focus::Motion => {
                self.toggle_reduced_motion();
                return;
            }
            Focus::Points => self.settings.adjust_point_count(5 * dir),
            Focus::Distance => self.settings.adjust_connection_distance(10.0 * sign),
            Focus::Speed => self.settings.adjust_speed(0.05 * sign),
            Focus::RadiusBase => self.settings.adjust_radius_base(0.5 * sign),
            Focus::RadiusVariance => self.settings.adjust_radius_variance(0.5 * sign),
            Focus::Opacity => self.settings.adjust_connection_opacity_scale(0.05 * sign),
        }
        self.settings_edited();
    }

    /// Settings changed by hand: drop the preset label and restart the field
    fn settings_edited(&mut self) {
        self.preset_index = self.presets.all_presets().position(|p| p.settings == self.settings);
        self.restart();
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Restart with a new random seed
    pub fn reseed(&mut self) {
        self.seed = rand::random();
        self.restart();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
    }

    /// Flip the reduced-motion preference without restarting the field
    pub fn toggle_reduced_motion(&mut self) {
        self.reduced_motion = !self.reduced_motion;
        self.animator.set_reduced_motion(self.reduced_motion);
    }

    /// Apply preset `index` from the combined builtin + user list
    pub fn apply_preset(&mut self, index: usize) {
        let Some(preset) = self.presets.all_presets().nth(index) else {
            return;
        };
        self.settings = preset.settings.clone();
        self.preset_index = Some(index);
        self.restart();
    }

    fn cycle_preset(&mut self, dir: i32) {
        let count = self.presets.all_presets().count();
        if count == 0 {
            return;
        }
        let next = match self.preset_index {
            Some(i) => (i as i32 + dir).rem_euclid(count as i32) as usize,
            None => 0,
        };
        self.apply_preset(next);
    }

    pub fn preset_name(&self) -> &str {
        self.preset_index
            .and_then(|i| self.presets.all_presets().nth(i))
            .map(|p| p.name.as_str())
            .unwrap_or("Custom")
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Save the current frame as a PNG in the working directory
    pub fn save_snapshot(&mut self) {
        let (width, height) = self
            .animator
            .surface()
            .map(|canvas| canvas.size())
            .unwrap_or_else(|| self.viewport());
        let mut raster = RasterSurface::new(width, height);
        self.animator.field().render(&mut raster, self.theme);

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let path = PathBuf::from(format!("network-field-{}.png", stamp));

        self.status = Some(match raster.save_png(&path, self.theme.palette().background) {
            Ok(()) => {
                log::info!("snapshot saved to {}", path.display());
                format!("Saved {}", path.display())
            }
            Err(e) => {
                log::warn!("snapshot failed: {}", e);
                format!("Snapshot failed: {}", e)
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationState;
    use crate::settings::POINTER_SENTINEL;

    fn app() -> App {
        App::new(
            Rect::new(22, 1, 40, 20),
            FieldSettings::default(),
            PresetManager::with_dir(None),
            5,
            Theme::Dark,
            false,
        )
    }

    #[test]
    fn test_starts_running_with_matching_viewport() {
        let app = app();
        assert_eq!(app.animator.state(), AnimationState::Running);
        assert_eq!(app.animator.field().width, 320.0);
        assert_eq!(app.animator.field().height, 320.0);
        // Default settings match the About preset
        assert_eq!(app.preset_name(), "About");
    }

    #[test]
    fn test_pointer_maps_cells_to_pixels() {
        let mut app = app();
        app.pointer_moved(22, 1);
        assert_eq!(app.animator.field().pointer(), (4.0, 8.0));
        app.pointer_moved(25, 3);
        assert_eq!(app.animator.field().pointer(), (28.0, 40.0));
        app.pointer_moved(0, 0);
        assert_eq!(app.animator.field().pointer(), POINTER_SENTINEL);
    }

    #[test]
    fn test_editing_restarts_with_new_count() {
        let mut app = app();
        app.focus = Focus::Points;
        app.adjust_focused_up();
        assert_eq!(app.settings.point_count, 25);
        assert_eq!(app.animator.field().particles().len(), 25);
        assert_eq!(app.animator.state(), AnimationState::Running);
        assert_eq!(app.preset_name(), "Custom");
    }

    #[test]
    fn test_preset_cycle_wraps() {
        let mut app = app();
        app.apply_preset(0);
        assert_eq!(app.preset_name(), "Hero");
        app.focus = Focus::Preset;
        app.adjust_focused_down();
        assert_eq!(app.preset_name(), "Footer");
        assert_eq!(app.animator.field().particles().len(), 12);
    }

    #[test]
    fn test_resize_regenerates_field() {
        let mut app = app();
        app.set_canvas_area(Rect::new(0, 1, 10, 5));
        assert_eq!(app.animator.field().width, 80.0);
        assert_eq!(app.animator.field().height, 80.0);
        assert!(app.animator.field().particles().iter().all(|p| p.x <= 80.0));
    }

    #[test]
    fn test_pause_stops_frames() {
        let mut app = app();
        app.settings.speed = 1.0;
        app.restart();
        app.toggle_pause();
        let before = app.animator.field().particles().to_vec();
        app.tick();
        assert_eq!(app.animator.field().particles(), &before[..]);
    }

    #[test]
    fn test_reduced_motion_toggle_keeps_field() {
        let mut app = app();
        let before = app.animator.field().particles().to_vec();
        app.toggle_reduced_motion();
        assert!(app.animator.motion_suppressed());
        app.tick();
        assert_eq!(app.animator.field().particles(), &before[..]);
    }

    #[test]
    fn test_frame_clock_ignores_input_rate() {
        let start = Instant::now();
        let period = Duration::from_millis(16);
        let mut clock = FrameClock::new(period, start);

        // A burst of mouse events inside one frame yields no extra frames
        let frames = (0..15)
            .filter(|ms| clock.take_frame(start + Duration::from_millis(*ms)))
            .count();
        assert_eq!(frames, 0);
        assert_eq!(clock.remaining(start + Duration::from_millis(10)), Duration::from_millis(6));

        assert!(clock.take_frame(start + period));
        assert!(!clock.take_frame(start + period + Duration::from_millis(1)));
        assert_eq!(clock.remaining(start + period), period);
        assert_eq!(clock.remaining(start + period * 3), Duration::ZERO);
    }

    #[test]
    fn test_pointer_left_restores_sentinel() {
        let mut app = app();
        app.pointer_moved(30, 5);
        assert_ne!(app.animator.field().pointer(), POINTER_SENTINEL);
        app.pointer_left();
        assert_eq!(app.animator.field().pointer(), POINTER_SENTINEL);
    }

    #[test]
    fn test_focus_cycle_round_trip() {
        let mut focus = Focus::Controls;
        for _ in 0..10 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Controls);
        assert_eq!(Focus::Preset.prev(), Focus::Controls);
        assert!(Focus::Speed.is_param());
        assert!(!Focus::Controls.is_param());
    }
}
