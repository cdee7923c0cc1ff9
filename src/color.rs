use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// CSS-style color: 8-bit channels with a fractional alpha.
///
/// Serialized as `rgba(r, g, b, a)` so config files read like the stylesheets
/// these colors usually come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Linear interpolation of all four channels, `t` clamped to 0..1
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Parse `rgba(r, g, b, a)`, `rgb(r, g, b)` or `#rrggbb`
    pub fn parse(s: &str) -> Option<Rgba> {
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            return Some(Rgba::opaque(channel(0)?, channel(2)?, channel(4)?));
        }

        let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }

        let r = parts[0].parse::<u8>().ok()?;
        let g = parts[1].parse::<u8>().ok()?;
        let b = parts[2].parse::<u8>().ok()?;
        let a = if has_alpha {
            let a = parts[3].parse::<f32>().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            a
        } else {
            1.0
        };

        Some(Rgba::new(r, g, b, a))
    }

    /// Channels as 0..1 floats, premultiplied by alpha and an extra coverage factor
    fn premultiplied(self, coverage: f32) -> [f32; 4] {
        let a = (self.a * coverage).clamp(0.0, 1.0);
        [
            self.r as f32 / 255.0 * a,
            self.g as f32 / 255.0 * a,
            self.b as f32 / 255.0 * a,
            a,
        ]
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color '{}'", s)))
    }
}

/// Premultiplied RGBA accumulator for one pixel (or Braille dot).
///
/// Starts fully transparent, like a freshly cleared canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pixel(pub [f32; 4]);

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel([0.0; 4]);

    /// Source-over blend of `color` scaled by `coverage` (0..1)
    pub fn blend(&mut self, color: Rgba, coverage: f32) {
        if coverage <= 0.0 || color.a <= 0.0 {
            return;
        }
        let src = color.premultiplied(coverage);
        let inv = 1.0 - src[3];
        for (dst, s) in self.0.iter_mut().zip(src) {
            *dst = s + *dst * inv;
        }
    }

    pub fn alpha(&self) -> f32 {
        self.0[3]
    }

    /// Composite over an opaque background and return 8-bit RGB
    pub fn over(&self, background: Rgba) -> (u8, u8, u8) {
        let bg = background.premultiplied(1.0);
        let inv = 1.0 - self.0[3];
        let channel = |i: usize| ((self.0[i] + bg[i] * inv).clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(0), channel(1), channel(2))
    }
}

/// Two-stop linear gradient along a line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub start: Rgba,
    pub end: Rgba,
}

impl LinearGradient {
    pub fn new(start: Rgba, end: Rgba) -> Self {
        Self { start, end }
    }

    /// Color at parameter `t` along the segment (0 = start, 1 = end)
    pub fn at(&self, t: f32) -> Rgba {
        self.start.lerp(self.end, t)
    }
}

/// Light/dark flag read by the render step every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn name(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }

    pub fn toggle(&self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(&self) -> ThemePalette {
        match self {
            Theme::Dark => ThemePalette::DARK,
            Theme::Light => ThemePalette::LIGHT,
        }
    }
}

/// Colors for one theme. Connection stops carry no alpha of their own; the
/// per-connection opacity is applied with [`ThemePalette::connection_gradient`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    pub background: Rgba,
    pub connection_start: Rgba,
    pub connection_end: Rgba,
    pub glow: Rgba,
    pub fill: Rgba,
    pub core: Rgba,
}

impl ThemePalette {
    pub const DARK: ThemePalette = ThemePalette {
        background: Rgba::opaque(0, 0, 0),
        connection_start: Rgba::opaque(255, 255, 255),
        connection_end: Rgba::opaque(200, 200, 255),
        glow: Rgba::new(255, 255, 255, 0.5),
        fill: Rgba::new(255, 255, 255, 0.7),
        core: Rgba::new(255, 255, 255, 0.9),
    };

    pub const LIGHT: ThemePalette = ThemePalette {
        background: Rgba::opaque(255, 255, 255),
        connection_start: Rgba::opaque(0, 0, 0),
        connection_end: Rgba::opaque(100, 100, 100),
        glow: Rgba::new(0, 0, 0, 0.3),
        fill: Rgba::new(0, 0, 0, 0.6),
        core: Rgba::new(0, 0, 0, 0.9),
    };

    pub fn connection_gradient(&self, opacity: f32) -> LinearGradient {
        LinearGradient::new(
            self.connection_start.with_alpha(opacity),
            self.connection_end.with_alpha(opacity),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_css_forms() {
        assert_eq!(
            Rgba::parse("rgba(255, 255, 255, 0.1)"),
            Some(Rgba::new(255, 255, 255, 0.1))
        );
        assert_eq!(Rgba::parse("rgb(1,2,3)"), Some(Rgba::opaque(1, 2, 3)));
        assert_eq!(Rgba::parse("#c8c8ff"), Some(Rgba::opaque(200, 200, 255)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Rgba::parse("blue"), None);
        assert_eq!(Rgba::parse("rgba(1, 2, 3)"), None);
        assert_eq!(Rgba::parse("rgba(1, 2, 3, 1.5)"), None);
        assert_eq!(Rgba::parse("rgb(300, 0, 0)"), None);
        assert_eq!(Rgba::parse("#12345"), None);
        // Six bytes but not six hex digits
        assert_eq!(Rgba::parse("#€ab0"), None);
        assert_eq!(Rgba::parse("#ab€0"), None);
    }

    #[test]
    fn test_serde_uses_css_string() {
        let color = Rgba::new(0, 0, 0, 0.08);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"rgba(0, 0, 0, 0.08)\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }

    #[test]
    fn test_gradient_endpoints() {
        let g = ThemePalette::DARK.connection_gradient(0.4);
        assert_eq!(g.at(0.0), Rgba::new(255, 255, 255, 0.4));
        assert_eq!(g.at(1.0), Rgba::new(200, 200, 255, 0.4));
        assert_eq!(g.at(0.5).r, 228);
    }

    #[test]
    fn test_blend_over_background() {
        let mut px = Pixel::TRANSPARENT;
        assert_eq!(px.over(Rgba::opaque(10, 20, 30)), (10, 20, 30));

        px.blend(Rgba::opaque(255, 255, 255), 1.0);
        assert_eq!(px.over(Rgba::opaque(0, 0, 0)), (255, 255, 255));

        let mut half = Pixel::TRANSPARENT;
        half.blend(Rgba::new(255, 255, 255, 0.5), 1.0);
        assert!((half.alpha() - 0.5).abs() < 1e-6);
        assert_eq!(half.over(Rgba::opaque(0, 0, 0)), (128, 128, 128));
    }

    #[test]
    fn test_zero_coverage_is_noop() {
        let mut px = Pixel::TRANSPARENT;
        px.blend(Rgba::opaque(255, 0, 0), 0.0);
        assert_eq!(px, Pixel::TRANSPARENT);
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle().palette(), ThemePalette::DARK);
    }
}
