use anyhow::{Context, Result};
use glam::{Affine2, Vec2};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect};

use super::color::Color;

/// Immediate-mode 2D drawing surface with an HTML-canvas-like state stack.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Multiplied into the alpha of everything drawn afterwards.
    fn set_global_alpha(&mut self, alpha: f32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    /// Push transform and global alpha.
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, radians: f32);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);
}

/// Opaque RGBA8 raster backed by a tiny-skia pixmap, initially black.
///
/// Every fill is source-over onto an opaque surface, so the premultiplied pixmap
/// bytes equal straight RGBA and go to the encoder as-is.
pub struct RasterCanvas {
    pixmap: Pixmap,
    transform: Affine2,
    global_alpha: f32,
    stack: Vec<(Affine2, f32)>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let mut pixmap = Pixmap::new(width, height)
            .with_context(|| format!("Cannot allocate a {}x{} canvas", width, height))?;
        pixmap.fill(tiny_skia::Color::BLACK);
        Ok(Self {
            pixmap,
            transform: Affine2::IDENTITY,
            global_alpha: 1.0,
            stack: Vec::new(),
        })
    }

    /// RGBA bytes, `width * height * 4` long.
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.pixmap.width() as usize + x as usize) * 4;
        let px = &self.pixmap.data()[idx..idx + 4];
        [px[0], px[1], px[2], px[3]]
    }

    fn device_transform(&self) -> tiny_skia::Transform {
        let m = self.transform;
        tiny_skia::Transform::from_row(
            m.matrix2.x_axis.x,
            m.matrix2.x_axis.y,
            m.matrix2.y_axis.x,
            m.matrix2.y_axis.y,
            m.translation.x,
            m.translation.y,
        )
    }

    fn paint(&self, color: Color) -> Option<Paint<'static>> {
        let alpha = (color.a * self.global_alpha).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return None;
        }
        let color = tiny_skia::Color::from_rgba(
            color.r.clamp(0.0, 1.0),
            color.g.clamp(0.0, 1.0),
            color.b.clamp(0.0, 1.0),
            alpha,
        )?;
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        Some(paint)
    }
}

impl Canvas for RasterCanvas {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let Some(paint) = self.paint(color) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let transform = self.device_transform();
        self.pixmap.fill_rect(rect, &paint, transform, None);
    }

    fn save(&mut self) {
        self.stack.push((self.transform, self.global_alpha));
    }

    fn restore(&mut self) {
        if let Some((transform, alpha)) = self.stack.pop() {
            self.transform = transform;
            self.global_alpha = alpha;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform * Affine2::from_translation(Vec2::new(dx, dy));
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if !(radius > 0.0 && radius.is_finite()) {
            return;
        }
        let Some(paint) = self.paint(color) else {
            return;
        };
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };
        let transform = self.device_transform();
        self.pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }
}
