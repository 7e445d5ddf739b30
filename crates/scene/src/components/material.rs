/// Linear-ish RGB in `[0, 1]`, as authored (no gamma handling).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(
            f32::from(channel(0)?) / 255.0,
            f32::from(channel(2)?) / 255.0,
            f32::from(channel(4)?) / 255.0,
        ))
    }

    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
}

/// Which faces are rasterized.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub blending: Blending,
    pub side: Side,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            blending: Blending::Normal,
            side: Side::Front,
        }
    }
}

impl Material {
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn translucent(color: Color, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            transparent: true,
            ..Self::default()
        }
    }

    /// Additive, back-face-only glow shell.
    pub fn glow() -> Self {
        Self {
            blending: Blending::Additive,
            side: Side::Back,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Blending, Color, Material, Side};

    #[test]
    fn parses_marker_cyan() {
        let c = Color::from_hex("#3BF7FF").expect("color");
        assert_eq!(c, Color::rgb(59.0 / 255.0, 247.0 / 255.0, 1.0));
        assert_eq!(Color::from_hex("3bf7ff"), Some(c));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Color::from_hex("#3BF7F"), None);
        assert_eq!(Color::from_hex("#GGGGGG"), None);
        assert_eq!(Color::from_hex("#3BF7FF00"), None);
    }

    #[test]
    fn glow_is_additive_back_faces() {
        let m = Material::glow();
        assert_eq!(m.blending, Blending::Additive);
        assert_eq!(m.side, Side::Back);
    }
}
