use crate::color::{Rgba, Theme};
use serde::{Deserialize, Serialize};

/// Radius around the pointer (px) inside which particles are pushed away
pub const INTERACTION_RADIUS: f32 = 100.0;
/// Push distance per frame at zero distance from the pointer
pub const REPULSION_STRENGTH: f32 = 0.5;
/// Radius multiplier while a particle is within the interaction radius
pub const HOVER_RADIUS_SCALE: f32 = 1.5;
/// Shadow blur under every particle
pub const GLOW_BLUR: f32 = 8.0;
/// Particles larger than this also get a bright inner core
pub const CORE_GLOW_THRESHOLD: f32 = 3.0;
/// Core radius relative to the particle radius
pub const CORE_RADIUS_SCALE: f32 = 0.4;
/// Width of connection strokes
pub const LINE_WIDTH: f32 = 1.0;
/// Pointer position used when no pointer has been seen; far from any surface
pub const POINTER_SENTINEL: (f32, f32) = (-1000.0, -1000.0);

/// Configuration record for one network field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Number of particles created at initialization (2-200)
    pub point_count: usize,
    /// Max pair distance in px that draws a connection (20-400)
    pub connection_distance: f32,
    /// Scales per-axis random velocity at creation (0.0-3.0)
    pub speed: f32,
    /// Smallest particle radius (0.5-6.0)
    pub radius_base: f32,
    /// Random radius added on top of the base (0.0-6.0)
    pub radius_variance: f32,
    /// Multiplies the distance-based connection opacity (0.0-1.0)
    pub connection_opacity_scale: f32,
    /// Base stroke style for connections on a dark theme
    pub stroke_color_dark: Rgba,
    /// Base stroke style for connections on a light theme
    pub stroke_color_light: Rgba,
    /// Freeze particle motion when the reduced-motion preference is on
    pub respect_reduced_motion: bool,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            point_count: 20,
            connection_distance: 150.0,
            speed: 0.2,
            radius_base: 1.5,
            radius_variance: 2.5,
            connection_opacity_scale: 0.6,
            stroke_color_dark: Rgba::new(255, 255, 255, 0.1),
            stroke_color_light: Rgba::new(0, 0, 0, 0.08),
            respect_reduced_motion: true,
        }
    }
}

impl FieldSettings {
    /// Base stroke color for the given theme
    pub fn stroke_color(&self, theme: Theme) -> Rgba {
        match theme {
            Theme::Dark => self.stroke_color_dark,
            Theme::Light => self.stroke_color_light,
        }
    }

    /// Connection opacity for a pair `distance` apart; zero at or beyond the threshold
    pub fn connection_opacity(&self, distance: f32) -> f32 {
        if self.connection_distance <= 0.0 || distance >= self.connection_distance {
            return 0.0;
        }
        (1.0 - distance / self.connection_distance) * self.connection_opacity_scale
    }

    /// Clamp every numeric field into its supported range
    pub fn clamped(mut self) -> Self {
        self.point_count = self.point_count.clamp(2, 200);
        self.connection_distance = self.connection_distance.clamp(20.0, 400.0);
        self.speed = self.speed.clamp(0.0, 3.0);
        self.radius_base = self.radius_base.clamp(0.5, 6.0);
        self.radius_variance = self.radius_variance.clamp(0.0, 6.0);
        self.connection_opacity_scale = self.connection_opacity_scale.clamp(0.0, 1.0);
        self
    }

    /// Adjust point count within bounds
    pub fn adjust_point_count(&mut self, delta: i32) {
        self.point_count = (self.point_count as i32 + delta).clamp(2, 200) as usize;
    }

    /// Adjust connection distance within bounds
    pub fn adjust_connection_distance(&mut self, delta: f32) {
        self.connection_distance = (self.connection_distance + delta).clamp(20.0, 400.0);
    }

    /// Adjust speed within bounds
    pub fn adjust_speed(&mut self, delta: f32) {
        self.speed = (self.speed + delta).clamp(0.0, 3.0);
    }

    /// Adjust base radius within bounds
    pub fn adjust_radius_base(&mut self, delta: f32) {
        self.radius_base = (self.radius_base + delta).clamp(0.5, 6.0);
    }

    /// Adjust radius variance within bounds
    pub fn adjust_radius_variance(&mut self, delta: f32) {
        self.radius_variance = (self.radius_variance + delta).clamp(0.0, 6.0);
    }

    /// Adjust connection opacity scale within bounds
    pub fn adjust_connection_opacity_scale(&mut self, delta: f32) {
        self.connection_opacity_scale = (self.connection_opacity_scale + delta).clamp(0.0, 1.0);
    }
}
