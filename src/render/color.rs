/// Straight (non-premultiplied) RGBA, each channel 0.0-1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS-style `hsl()`: hue in degrees (wrapped), saturation and lightness 0.0-1.0.
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let m = lightness - chroma / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        Self::rgba(r + m, g + m, b + m, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    #[test]
    fn test_primary_hues() {
        assert!(close(Color::hsl(0.0, 1.0, 0.5), Color::rgba(1.0, 0.0, 0.0, 1.0)));
        assert!(close(Color::hsl(120.0, 1.0, 0.5), Color::rgba(0.0, 1.0, 0.0, 1.0)));
        assert!(close(Color::hsl(240.0, 1.0, 0.5), Color::rgba(0.0, 0.0, 1.0, 1.0)));
        assert!(close(Color::hsl(60.0, 1.0, 0.5), Color::rgba(1.0, 1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_hue_wraps() {
        assert!(close(Color::hsl(360.0, 1.0, 0.5), Color::hsl(0.0, 1.0, 0.5)));
        assert!(close(Color::hsl(-120.0, 1.0, 0.5), Color::hsl(240.0, 1.0, 0.5)));
    }

    #[test]
    fn test_grey_when_unsaturated() {
        assert!(close(Color::hsl(200.0, 0.0, 0.25), Color::rgba(0.25, 0.25, 0.25, 1.0)));
    }
}
