use crate::color::Theme;
use crate::settings::{
    FieldSettings, CORE_GLOW_THRESHOLD, CORE_RADIUS_SCALE, GLOW_BLUR, HOVER_RADIUS_SCALE,
    INTERACTION_RADIUS, LINE_WIDTH, POINTER_SENTINEL, REPULSION_STRENGTH,
};
use crate::surface::Surface;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A single moving point. Identity is just its index in the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Rendered radius, inflated while the pointer is close
    pub radius: f32,
    /// Radius assigned at creation
    pub base_radius: f32,
}

impl Particle {
    /// Advance one frame inside a `width` x `height` box, reacting to `pointer`
    pub fn advance(&mut self, width: f32, height: f32, pointer: (f32, f32)) {
        self.x += self.vx;
        self.y += self.vy;

        // Bounce: flip the offending axis and pull the position back onto the edge
        if self.x < 0.0 || self.x > width {
            self.vx = -self.vx;
            self.x = self.x.clamp(0.0, width);
        }
        if self.y < 0.0 || self.y > height {
            self.vy = -self.vy;
            self.y = self.y.clamp(0.0, height);
        }

        let dx = pointer.0 - self.x;
        let dy = pointer.1 - self.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance < INTERACTION_RADIUS {
            // Coincident with the pointer there is no direction to push along
            if distance > 0.0 {
                let angle = dy.atan2(dx);
                let force = (INTERACTION_RADIUS - distance) / INTERACTION_RADIUS * REPULSION_STRENGTH;
                self.x = (self.x - angle.cos() * force).clamp(0.0, width);
                self.y = (self.y - angle.sin() * force).clamp(0.0, height);
            }
            self.radius = self.base_radius * HOVER_RADIUS_SCALE;
        } else {
            self.radius = self.base_radius;
        }
    }

    /// Refresh only the hover radius; used while motion is suppressed
    pub fn hover(&mut self, pointer: (f32, f32)) {
        let dx = pointer.0 - self.x;
        let dy = pointer.1 - self.y;
        self.radius = if (dx * dx + dy * dy).sqrt() < INTERACTION_RADIUS {
            self.base_radius * HOVER_RADIUS_SCALE
        } else {
            self.base_radius
        };
    }

    pub fn distance_to(&self, other: &Particle) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A line between two particles close enough to link. Lives for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Lower particle index
    pub i: usize,
    /// Higher particle index
    pub j: usize,
    pub distance: f32,
    pub opacity: f32,
}

impl Connection {
    /// Connection between particles `a` and `b` in either order, if they are in range
    pub fn between(particles: &[Particle], a: usize, b: usize, settings: &FieldSettings) -> Option<Connection> {
        if a == b {
            return None;
        }
        let (i, j) = if a < b { (a, b) } else { (b, a) };
        let distance = particles.get(i)?.distance_to(particles.get(j)?);
        if distance < settings.connection_distance {
            Some(Connection {
                i,
                j,
                distance,
                opacity: settings.connection_opacity(distance),
            })
        } else {
            None
        }
    }
}

/// What the last render drew
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub particles: usize,
    pub connections: usize,
}

/// Particle network state: the particle set, its bounds and the last pointer position
pub struct NetworkField {
    pub width: f32,
    pub height: f32,
    particles: Vec<Particle>,
    pointer: (f32, f32),
    pub settings: FieldSettings,
    rng: StdRng,
}

impl NetworkField {
    /// Empty field; particles are created on the first [`NetworkField::resize`]
    pub fn new(settings: FieldSettings, seed: u64) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            particles: Vec::new(),
            pointer: POINTER_SENTINEL,
            settings,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Adopt new bounds and regenerate every particle.
    ///
    /// Old positions were sampled against the old bounds, so nothing is kept.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.regenerate();
    }

    /// Replace the particle set with `point_count` fresh particles
    pub fn regenerate(&mut self) {
        let s = &self.settings;
        let mut particles = Vec::with_capacity(s.point_count);
        for _ in 0..s.point_count {
            let base_radius = s.radius_base + self.rng.gen::<f32>() * s.radius_variance;
            particles.push(Particle {
                x: self.rng.gen::<f32>() * self.width,
                y: self.rng.gen::<f32>() * self.height,
                vx: (self.rng.gen::<f32>() - 0.5) * s.speed,
                vy: (self.rng.gen::<f32>() - 0.5) * s.speed,
                radius: base_radius,
                base_radius,
            });
        }
        self.particles = particles;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    #[cfg(test)]
    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    /// Last known pointer position in surface coordinates
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = (x, y);
    }

    /// Pointer left (or was never seen): move it out of everyone's reach
    pub fn clear_pointer(&mut self) {
        self.pointer = POINTER_SENTINEL;
    }

    /// Per-frame update. With `frozen` set, positions and velocities stay put.
    pub fn step(&mut self, frozen: bool) {
        let (width, height, pointer) = (self.width, self.height, self.pointer);
        for particle in &mut self.particles {
            if frozen {
                // Kinematics are skipped but the hover radius keeps tracking the pointer
                particle.hover(pointer);
            } else {
                particle.advance(width, height, pointer);
            }
        }
    }

    /// Every linked pair `(i, j)` with `i < j`
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        let n = self.particles.len();
        (0..n).flat_map(move |i| {
            ((i + 1)..n).filter_map(move |j| Connection::between(&self.particles, i, j, &self.settings))
        })
    }

    /// Draw connections, then particles, into `surface`
    pub fn render<S: Surface>(&self, surface: &mut S, theme: Theme) -> FrameStats {
        let palette = theme.palette();
        let mut stats = FrameStats {
            particles: self.particles.len(),
            connections: 0,
        };

        surface.set_stroke(self.settings.stroke_color(theme), LINE_WIDTH);
        for connection in self.connections() {
            let a = &self.particles[connection.i];
            let b = &self.particles[connection.j];
            let gradient = palette.connection_gradient(connection.opacity);
            surface.stroke_gradient_line((a.x, a.y), (b.x, b.y), &gradient);
            stats.connections += 1;
        }

        for particle in &self.particles {
            let center = (particle.x, particle.y);

            surface.set_shadow(palette.glow, GLOW_BLUR);
            surface.fill_circle(center, particle.radius, palette.fill);
            surface.set_shadow(palette.glow, 0.0);

            if particle.radius > CORE_GLOW_THRESHOLD {
                surface.fill_circle(center, particle.radius * CORE_RADIUS_SCALE, palette.core);
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Rgba, ThemePalette};
    use crate::surface::recording::{DrawCommand, RecordingSurface};

    fn particle(x: f32, y: f32, vx: f32, vy: f32, base_radius: f32) -> Particle {
        Particle {
            x,
            y,
            vx,
            vy,
            radius: base_radius,
            base_radius,
        }
    }

    fn field(settings: FieldSettings, width: f32, height: f32) -> NetworkField {
        let mut field = NetworkField::new(settings, 7);
        field.resize(width, height);
        field
    }

    #[test]
    fn test_bounce_clamps_to_edge() {
        let mut p = particle(99.0, 50.0, 2.0, 0.0, 2.0);
        p.advance(100.0, 100.0, POINTER_SENTINEL);
        assert_eq!(p.x, 100.0);
        assert_eq!(p.vx, -2.0);
        assert_eq!(p.y, 50.0);

        // Next frame moves back inside without a second flip
        p.advance(100.0, 100.0, POINTER_SENTINEL);
        assert_eq!(p.x, 98.0);
        assert_eq!(p.vx, -2.0);
    }

    #[test]
    fn test_bounce_axes_are_independent() {
        let mut p = particle(0.5, 50.0, -1.0, 0.25, 2.0);
        p.advance(100.0, 100.0, POINTER_SENTINEL);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.vx, 1.0);
        assert_eq!(p.vy, 0.25);
        assert_eq!(p.y, 50.25);
    }

    #[test]
    fn test_hover_inflates_radius() {
        let mut p = particle(50.0, 51.0, 0.0, 0.0, 2.0);
        p.advance(100.0, 100.0, (50.0, 50.0));
        assert!((p.radius - 3.0).abs() < 1e-6);
        // Pushed straight down, away from the pointer
        assert!(p.y > 51.0);
        assert!((p.x - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_radius_resets_outside_interaction_radius() {
        let mut p = particle(50.0, 50.0, 0.0, 0.0, 2.0);
        p.radius = 3.0;
        p.advance(400.0, 400.0, (50.0, 150.0));
        assert_eq!(p.radius, p.base_radius);
    }

    #[test]
    fn test_zero_distance_means_no_push() {
        let mut p = particle(50.0, 50.0, 0.0, 0.0, 2.0);
        p.advance(100.0, 100.0, (50.0, 50.0));
        assert_eq!((p.x, p.y), (50.0, 50.0));
        assert!(p.x.is_finite() && p.y.is_finite());
        assert_eq!(p.radius, 3.0);
    }

    #[test]
    fn test_repulsion_never_leaves_bounds() {
        let mut p = particle(0.0, 0.0, 0.0, 0.0, 2.0);
        p.advance(100.0, 100.0, (10.0, 10.0));
        assert_eq!((p.x, p.y), (0.0, 0.0));
    }

    #[test]
    fn test_containment_over_many_frames() {
        let settings = FieldSettings {
            point_count: 60,
            speed: 3.0,
            ..Default::default()
        };
        let mut f = field(settings, 120.0, 80.0);
        for frame in 0..2000 {
            f.set_pointer((frame % 120) as f32, (frame % 80) as f32);
            f.step(false);
            for p in f.particles() {
                assert!((0.0..=120.0).contains(&p.x), "x out of bounds: {}", p.x);
                assert!((0.0..=80.0).contains(&p.y), "y out of bounds: {}", p.y);
                assert!(p.radius >= p.base_radius);
            }
        }
    }

    #[test]
    fn test_initial_particles_respect_settings() {
        let settings = FieldSettings {
            point_count: 50,
            speed: 0.4,
            radius_base: 1.5,
            radius_variance: 2.5,
            ..Default::default()
        };
        let f = field(settings, 300.0, 200.0);
        assert_eq!(f.particles().len(), 50);
        for p in f.particles() {
            assert!((0.0..=300.0).contains(&p.x));
            assert!((0.0..=200.0).contains(&p.y));
            assert!(p.vx.abs() <= 0.2 && p.vy.abs() <= 0.2);
            assert!(p.base_radius >= 1.5 && p.base_radius < 4.0);
            assert_eq!(p.radius, p.base_radius);
        }
    }

    #[test]
    fn test_same_seed_same_particles() {
        let a = field(FieldSettings::default(), 640.0, 480.0);
        let b = field(FieldSettings::default(), 640.0, 480.0);
        assert_eq!(a.particles(), b.particles());

        let mut c = NetworkField::new(FieldSettings::default(), 8);
        c.resize(640.0, 480.0);
        assert_ne!(a.particles(), c.particles());
    }

    #[test]
    fn test_resize_regenerates_within_new_bounds() {
        let mut f = field(FieldSettings::default(), 1000.0, 1000.0);
        let before = f.particles().to_vec();
        f.resize(50.0, 40.0);
        assert_eq!(f.particles().len(), before.len());
        assert_ne!(f.particles(), &before[..]);
        assert!(f.particles().iter().all(|p| p.x <= 50.0 && p.y <= 40.0));
    }

    #[test]
    fn test_zero_size_surface_is_tolerated() {
        let mut f = field(FieldSettings::default(), 0.0, 0.0);
        for _ in 0..10 {
            f.step(false);
        }
        assert!(f.particles().iter().all(|p| p.x == 0.0 && p.y == 0.0));
        let mut surface = RecordingSurface::default();
        let stats = f.render(&mut surface, Theme::Dark);
        // All particles coincide, so every pair is linked at full opacity
        assert_eq!(stats.connections, 20 * 19 / 2);
    }

    #[test]
    fn test_small_box_always_fully_connected() {
        let settings = FieldSettings {
            point_count: 3,
            connection_distance: 150.0,
            speed: 2.0,
            ..Default::default()
        };
        let mut f = field(settings, 100.0, 100.0);
        for _ in 0..500 {
            f.step(false);
            assert_eq!(f.connections().count(), 3);
        }
    }

    #[test]
    fn test_connection_is_undirected() {
        let settings = FieldSettings::default();
        let particles = vec![
            particle(10.0, 10.0, 0.0, 0.0, 2.0),
            particle(40.0, 50.0, 0.0, 0.0, 2.0),
        ];
        let forward = Connection::between(&particles, 0, 1, &settings).unwrap();
        let backward = Connection::between(&particles, 1, 0, &settings).unwrap();
        assert_eq!(forward, backward);
        assert_eq!((forward.i, forward.j), (0, 1));
        assert!((forward.distance - 50.0).abs() < 1e-5);
        assert!(Connection::between(&particles, 1, 1, &settings).is_none());
    }

    #[test]
    fn test_pair_at_threshold_is_not_linked() {
        let settings = FieldSettings::default();
        let particles = vec![
            particle(0.0, 0.0, 0.0, 0.0, 2.0),
            particle(150.0, 0.0, 0.0, 0.0, 2.0),
        ];
        assert!(Connection::between(&particles, 0, 1, &settings).is_none());
    }

    #[test]
    fn test_frozen_step_keeps_positions_but_tracks_hover() {
        let mut f = field(FieldSettings::default(), 400.0, 300.0);
        let before: Vec<(f32, f32)> = f.particles().iter().map(|p| (p.x, p.y)).collect();
        let target = f.particles()[0];
        f.set_pointer(target.x, target.y + 1.0);
        for _ in 0..30 {
            f.step(true);
        }
        let after: Vec<(f32, f32)> = f.particles().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(before, after);
        assert_eq!(f.particles()[0].radius, target.base_radius * HOVER_RADIUS_SCALE);

        f.clear_pointer();
        f.step(true);
        assert!(f.particles().iter().all(|p| p.radius == p.base_radius));
    }

    #[test]
    fn test_render_order_and_colors() {
        let settings = FieldSettings {
            point_count: 2,
            ..Default::default()
        };
        let mut f = field(settings, 100.0, 100.0);
        {
            let ps = f.particles_mut();
            ps[0] = particle(10.0, 10.0, 0.0, 0.0, 4.0);
            ps[1] = particle(20.0, 10.0, 0.0, 0.0, 1.0);
        }

        let mut surface = RecordingSurface::default();
        surface.clear();
        let stats = f.render(&mut surface, Theme::Light);
        assert_eq!(stats, FrameStats { particles: 2, connections: 1 });

        assert_eq!(surface.commands[0], DrawCommand::Clear);
        assert_eq!(surface.commands[1], DrawCommand::SetStroke(Rgba::new(0, 0, 0, 0.08), 1.0));
        match &surface.commands[2] {
            DrawCommand::Line { from, to, gradient } => {
                assert_eq!(*from, (10.0, 10.0));
                assert_eq!(*to, (20.0, 10.0));
                let opacity = (1.0 - 10.0 / 150.0) * 0.6;
                assert_eq!(*gradient, ThemePalette::LIGHT.connection_gradient(opacity));
            }
            other => panic!("expected a line, got {:?}", other),
        }

        // Large particle gets fill + core, small one only fill
        let circles = surface.circles();
        assert_eq!(circles.len(), 3);
        assert_eq!(
            circles[1],
            &DrawCommand::Circle {
                center: (10.0, 10.0),
                radius: 4.0 * CORE_RADIUS_SCALE,
                color: ThemePalette::LIGHT.core,
            }
        );
        assert!(surface
            .commands
            .contains(&DrawCommand::SetShadow(ThemePalette::LIGHT.glow, GLOW_BLUR)));
    }

    #[test]
    fn test_theme_switches_palette() {
        let f = field(FieldSettings::default(), 200.0, 200.0);
        let mut dark = RecordingSurface::default();
        let mut light = RecordingSurface::default();
        f.render(&mut dark, Theme::Dark);
        f.render(&mut light, Theme::Light);
        assert_eq!(dark.commands.len(), light.commands.len());
        assert_eq!(dark.commands[0], DrawCommand::SetStroke(Rgba::new(255, 255, 255, 0.1), 1.0));
        assert!(dark
            .circles()
            .iter()
            .all(|c| matches!(c, DrawCommand::Circle { color, .. } if color.r == 255)));
        assert!(light
            .circles()
            .iter()
            .all(|c| matches!(c, DrawCommand::Circle { color, .. } if color.r == 0)));
    }

    #[test]
    fn test_fields_are_independent() {
        let mut a = field(FieldSettings::default(), 300.0, 300.0);
        let b = field(FieldSettings::default(), 300.0, 300.0);
        let snapshot = b.particles().to_vec();
        a.set_pointer(150.0, 150.0);
        for _ in 0..100 {
            a.step(false);
        }
        assert_eq!(b.particles(), &snapshot[..]);
        assert_eq!(b.pointer(), POINTER_SENTINEL);
    }
}
