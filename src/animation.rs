use crate::color::Theme;
use crate::settings::FieldSettings;
use crate::simulation::{FrameStats, NetworkField};
use crate::surface::Surface;

/// Lifecycle of one animated field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    /// No surface attached yet
    Uninitialized,
    /// Rendering a frame every time the host asks
    Running,
    /// Torn down; a new animator is needed to run again
    Stopped,
}

impl AnimationState {
    pub fn name(&self) -> &'static str {
        match self {
            AnimationState::Uninitialized => "IDLE",
            AnimationState::Running => "RUNNING",
            AnimationState::Stopped => "STOPPED",
        }
    }
}

/// Binds a [`NetworkField`] to a drawable surface and drives it frame by frame.
///
/// The host owns the frame clock: it calls [`Animator::frame`] once per display
/// tick and forwards resize and pointer events. Only `start`, `stop` and the
/// event handlers mutate the animator.
pub struct Animator<S: Surface> {
    state: AnimationState,
    field: NetworkField,
    surface: Option<S>,
    frame_pending: bool,
    listening: bool,
    reduced_motion: bool,
    last_stats: FrameStats,
}

impl<S: Surface> Animator<S> {
    pub fn new(settings: FieldSettings, seed: u64) -> Self {
        Self {
            state: AnimationState::Uninitialized,
            field: NetworkField::new(settings, seed),
            surface: None,
            frame_pending: false,
            listening: false,
            reduced_motion: false,
            last_stats: FrameStats::default(),
        }
    }

    /// Attach a surface and begin animating.
    ///
    /// Without a surface this does nothing and the animator stays idle. Calling
    /// it on a running or stopped animator is also ignored.
    pub fn start(&mut self, surface: Option<S>, viewport: (u32, u32)) {
        if self.state != AnimationState::Uninitialized {
            log::debug!("start ignored in state {:?}", self.state);
            return;
        }
        let Some(mut surface) = surface else {
            log::debug!("no drawable surface, animation not started");
            return;
        };

        surface.resize(viewport.0, viewport.1);
        self.field.resize(viewport.0 as f32, viewport.1 as f32);
        self.surface = Some(surface);
        self.listening = true;
        self.frame_pending = true;
        self.state = AnimationState::Running;
        log::debug!(
            "animation started: {} particles on {}x{}",
            self.field.particles().len(),
            viewport.0,
            viewport.1
        );
    }

    /// Cancel the pending frame and detach listeners. Safe to call any number of times.
    pub fn stop(&mut self) {
        self.frame_pending = false;
        self.listening = false;
        self.field.clear_pointer();
        if self.state != AnimationState::Stopped {
            log::debug!("animation stopped from {:?}", self.state);
            self.state = AnimationState::Stopped;
        }
    }

    /// Viewport changed: resize the surface and regenerate every particle
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if !self.listening {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
        self.field.resize(width as f32, height as f32);
        log::debug!("field resized to {}x{}", width, height);
    }

    /// Pointer moved, in surface coordinates
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.listening {
            self.field.set_pointer(x, y);
        }
    }

    /// Pointer left the surface
    pub fn on_pointer_leave(&mut self) {
        if self.listening {
            self.field.clear_pointer();
        }
    }

    /// Reduced-motion preference changed; accepted in any state
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    /// Whether kinematics are currently skipped
    pub fn motion_suppressed(&self) -> bool {
        self.reduced_motion && self.field.settings.respect_reduced_motion
    }

    /// Run one frame: clear, update, draw connections, draw particles.
    ///
    /// Returns `true` when a frame was drawn and the next one is scheduled.
    pub fn frame(&mut self, theme: Theme) -> bool {
        if self.state != AnimationState::Running || !self.frame_pending {
            return false;
        }
        let frozen = self.motion_suppressed();
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };

        surface.clear();
        self.field.step(frozen);
        self.last_stats = self.field.render(surface, theme);
        true
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Whether the host should call [`Animator::frame`] again
    pub fn is_frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn field(&self) -> &NetworkField {
        &self.field
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }
}

impl<S: Surface> Drop for Animator<S> {
    fn drop(&mut self) {
        self.stop();
    }
}
