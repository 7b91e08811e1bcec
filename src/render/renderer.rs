use super::canvas::Canvas;
use super::color::Color;
use crate::mapping::map;
use crate::particles::ParticleField;

/// Radius multiplier applied to every disc.
pub const TUNING_VALUE: f32 = 1.1 * 1.1 * 1.1;

const PASS_ALPHA: f32 = 0.8;
const TRAIL: Color = Color::rgba(0.0, 0.0, 0.0, 0.9);

/// Placement of one particle, in the frame centered on the canvas and rotated by
/// `angle` degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disc {
    pub hue: f32,
    pub x: f32,
    pub radius: f32,
    pub angle: f32,
}

/// Where and how the `index`-th of `count` particles is drawn.
pub fn disc_params(
    index: usize,
    value: f32,
    count: usize,
    amplitude: f32,
    angle: f32,
    width: u32,
    height: u32,
) -> Disc {
    let i = index as f32;
    let n = count as f32;
    let max_x = width.max(height) as f32 / 8.0;
    Disc {
        hue: map(i, 0.0, n, 0.0, 360.0),
        x: map(i, 0.0, n, 0.0, max_x + map(amplitude, 0.0, 255.0, 0.0, 200.0)),
        radius: map(value, 0.0, 255.0, 0.0, 25.0) * TUNING_VALUE,
        angle,
    }
}

/// Fade the previous frame and draw one disc per spectrum entry.
pub fn draw_frame<C: Canvas>(canvas: &mut C, spectrum: &[f32], amplitude: f32, field: &ParticleField) {
    let (width, height) = (canvas.width(), canvas.height());

    // The pass alpha is already set when the trail is drawn, so the fade lands at
    // 0.9 * 0.8 = 0.72 per frame.
    canvas.set_global_alpha(PASS_ALPHA);
    canvas.fill_rect(0.0, 0.0, width as f32, height as f32, TRAIL);

    let count = spectrum.len().min(field.capacity());
    for (index, &value) in spectrum.iter().take(count).enumerate() {
        // wrap in f64 so the narrowed angle keeps its fraction
        let angle = (field.angle(index) % 360.0) as f32;
        let disc = disc_params(index, value, count, amplitude, angle, width, height);

        canvas.save();
        canvas.translate(width as f32 / 2.0, height as f32 / 2.0);
        canvas.rotate(disc.angle.to_radians());
        canvas.fill_circle(disc.x, 0.0, disc.radius, Color::hsl(disc.hue, 1.0, 0.5));
        canvas.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::RasterCanvas;

    #[derive(Debug, PartialEq)]
    enum Op {
        Alpha(f32),
        Rect(f32, f32, f32, f32, Color),
        Save,
        Restore,
        Translate(f32, f32),
        Rotate(f32),
        Circle(f32, f32, f32, Color),
    }

    struct RecordingCanvas {
        width: u32,
        height: u32,
        ops: Vec<Op>,
    }

    impl RecordingCanvas {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                ops: Vec::new(),
            }
        }
    }

    impl Canvas for RecordingCanvas {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn set_global_alpha(&mut self, alpha: f32) {
            self.ops.push(Op::Alpha(alpha));
        }
        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
            self.ops.push(Op::Rect(x, y, w, h, color));
        }
        fn save(&mut self) {
            self.ops.push(Op::Save);
        }
        fn restore(&mut self) {
            self.ops.push(Op::Restore);
        }
        fn translate(&mut self, dx: f32, dy: f32) {
            self.ops.push(Op::Translate(dx, dy));
        }
        fn rotate(&mut self, radians: f32) {
            self.ops.push(Op::Rotate(radians));
        }
        fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
            self.ops.push(Op::Circle(cx, cy, radius, color));
        }
    }

    #[test]
    fn test_empty_spectrum_only_fades() {
        let mut canvas = RecordingCanvas::new(640, 480);
        draw_frame(&mut canvas, &[], 300.0, &ParticleField::new(8));

        assert_eq!(
            canvas.ops,
            vec![Op::Alpha(0.8), Op::Rect(0.0, 0.0, 640.0, 480.0, TRAIL)]
        );
    }

    #[test]
    fn test_trail_fades_under_pass_alpha() {
        let mut canvas = RasterCanvas::new(16, 16).unwrap();
        canvas.fill_rect(0.0, 0.0, 16.0, 16.0, Color::rgba(1.0, 1.0, 1.0, 1.0));

        draw_frame(&mut canvas, &[], 0.0, &ParticleField::new(0));

        // 255 * (1 - 0.72) ~ 71; a fade at the full 0.9 would leave ~26
        let [r, g, b, a] = canvas.pixel(8, 8);
        assert!(r.abs_diff(71) <= 1, "faded to {}", r);
        assert_eq!((r, g, b, a), (r, r, r, 255));
    }

    #[test]
    fn test_large_angles_rotate_by_their_remainder() {
        let mut field = ParticleField::new(1);
        for _ in 0..3000 {
            field.update(&[255.0]);
        }
        let angle = field.angle(0);
        assert!(angle > 360.0);

        let mut canvas = RecordingCanvas::new(100, 100);
        draw_frame(&mut canvas, &[10.0], 0.0, &field);
        let expected = ((angle % 360.0) as f32).to_radians();
        assert_eq!(canvas.ops[4], Op::Rotate(expected));
    }

    #[test]
    fn test_disc_params() {
        // max_x = 800 / 8 = 100, amplitude 255 adds 200
        let first = disc_params(0, 255.0, 4, 255.0, 12.0, 800, 600);
        assert_eq!(first.hue, 0.0);
        assert_eq!(first.x, 0.0);
        assert!((first.radius - 25.0 * 1.331).abs() < 1e-4);
        assert_eq!(first.angle, 12.0);

        let third = disc_params(2, 0.0, 4, 255.0, 0.0, 600, 800);
        assert_eq!(third.hue, 180.0);
        assert_eq!(third.x, 150.0);
        assert_eq!(third.radius, 0.0);
    }

    #[test]
    fn test_each_value_draws_a_rotated_disc() {
        let mut field = ParticleField::new(8);
        field.update(&[255.0, 255.0]);
        let mut canvas = RecordingCanvas::new(800, 400);

        draw_frame(&mut canvas, &[100.0, 50.0], 0.0, &field);

        let circles: Vec<&Op> = canvas.ops.iter().filter(|op| matches!(op, Op::Circle(..))).collect();
        assert_eq!(circles.len(), 2);
        assert_eq!(canvas.ops.iter().filter(|op| **op == Op::Save).count(), 2);
        assert_eq!(canvas.ops.iter().filter(|op| **op == Op::Restore).count(), 2);
        assert_eq!(canvas.ops[2], Op::Save);
        assert_eq!(canvas.ops[3], Op::Translate(400.0, 200.0));
        assert_eq!(canvas.ops[4], Op::Rotate(0.03f32.to_radians()));

        match circles[1] {
            Op::Circle(x, y, radius, color) => {
                assert_eq!(*x, 50.0);
                assert_eq!(*y, 0.0);
                assert!((radius - 50.0 / 255.0 * 25.0 * TUNING_VALUE).abs() < 1e-4);
                assert_eq!(*color, Color::hsl(180.0, 1.0, 0.5));
            }
            _ => unreachable!(),
        }
    }
}
