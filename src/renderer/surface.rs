//! 2D drawing surface abstraction
//!
//! Scenes draw through [`Surface`]. [`GuardedSurface`] sits in front of the
//! real backend and drops any call carrying a non-finite number.

use glam::Vec2;

/// RGBA color, alpha in 0-1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::hex(0xffffff);
    pub const BLACK: Color = Color::hex(0x000000);

    /// From 0xRRGGBB
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear blend toward `other`
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// CSS `rgba()` string
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Primitive raster operations. Coordinates are surface pixels.
pub trait Surface {
    /// Pixel width and height
    fn size(&self) -> (f32, f32);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Color);
    fn fill_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, rotation: f32, color: Color);
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    fn stroke_circle(&mut self, x: f32, y: f32, r: f32, width: f32, color: Color);
    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color);

    /// Transform stack
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, angle: f32);
}

#[inline]
fn finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Wraps a surface and skips draw calls with NaN/Infinity inputs
pub struct GuardedSurface<'a, S: Surface + ?Sized> {
    inner: &'a mut S,
    skipped: u32,
}

impl<'a, S: Surface + ?Sized> GuardedSurface<'a, S> {
    pub fn new(inner: &'a mut S) -> Self {
        Self { inner, skipped: 0 }
    }

    /// Calls dropped so far
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    fn pass(&mut self, values: &[f32]) -> bool {
        if finite(values) {
            true
        } else {
            self.skipped += 1;
            false
        }
    }
}

impl<S: Surface + ?Sized> Surface for GuardedSurface<'_, S> {
    fn size(&self) -> (f32, f32) {
        self.inner.size()
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        if self.pass(&[x, y, w, h, color.a]) {
            self.inner.fill_rect(x, y, w, h, color);
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Color) {
        if self.pass(&[x, y, r, color.a]) && r > 0.0 {
            self.inner.fill_circle(x, y, r, color);
        }
    }

    fn fill_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, rotation: f32, color: Color) {
        if self.pass(&[x, y, rx, ry, rotation, color.a]) && rx > 0.0 && ry > 0.0 {
            self.inner.fill_ellipse(x, y, rx, ry, rotation, color);
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        let ok = points.iter().all(|p| p.is_finite()) && color.a.is_finite();
        if !ok {
            self.skipped += 1;
            return;
        }
        if points.len() >= 3 {
            self.inner.fill_polygon(points, color);
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        if self.pass(&[from.x, from.y, to.x, to.y, width, color.a]) {
            self.inner.stroke_line(from, to, width, color);
        }
    }

    fn stroke_circle(&mut self, x: f32, y: f32, r: f32, width: f32, color: Color) {
        if self.pass(&[x, y, r, width, color.a]) && r > 0.0 {
            self.inner.stroke_circle(x, y, r, width, color);
        }
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color) {
        if self.pass(&[x, y, size, color.a]) {
            self.inner.text(text, x, y, size, align, color);
        }
    }

    fn save(&mut self) {
        self.inner.save();
    }

    fn restore(&mut self) {
        self.inner.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        // Skipping keeps the transform stack balanced; only the offset is lost
        if self.pass(&[x, y]) {
            self.inner.translate(x, y);
        }
    }

    fn rotate(&mut self, angle: f32) {
        if self.pass(&[angle]) {
            self.inner.rotate(angle);
        }
    }
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Rect { x: f32, y: f32, w: f32, h: f32, color: Color },
    Circle { x: f32, y: f32, r: f32, color: Color },
    Ellipse { x: f32, y: f32, rx: f32, ry: f32, color: Color },
    Polygon { points: Vec<Vec2>, color: Color },
    Line { from: Vec2, to: Vec2, width: f32 },
    Ring { x: f32, y: f32, r: f32 },
    Text { text: String, x: f32, y: f32 },
    Save,
    Restore,
    Translate { x: f32, y: f32 },
    Rotate { angle: f32 },
}

impl DrawCall {
    /// Every number carried by the call
    pub fn numbers(&self) -> Vec<f32> {
        match self {
            DrawCall::Rect { x, y, w, h, color } => vec![*x, *y, *w, *h, color.a],
            DrawCall::Circle { x, y, r, color } => vec![*x, *y, *r, color.a],
            DrawCall::Ellipse { x, y, rx, ry, color } => vec![*x, *y, *rx, *ry, color.a],
            DrawCall::Polygon { points, color } => points
                .iter()
                .flat_map(|p| [p.x, p.y])
                .chain(std::iter::once(color.a))
                .collect(),
            DrawCall::Line { from, to, width } => vec![from.x, from.y, to.x, to.y, *width],
            DrawCall::Ring { x, y, r } => vec![*x, *y, *r],
            DrawCall::Text { x, y, .. } => vec![*x, *y],
            DrawCall::Save | DrawCall::Restore => Vec::new(),
            DrawCall::Translate { x, y } => vec![*x, *y],
            DrawCall::Rotate { angle } => vec![*angle],
        }
    }
}

/// In-memory surface that records calls (tests, headless)
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// All text drawn so far
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.calls.push(DrawCall::Rect { x, y, w, h, color });
    }

    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Color) {
        self.calls.push(DrawCall::Circle { x, y, r, color });
    }

    fn fill_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, _rotation: f32, color: Color) {
        self.calls.push(DrawCall::Ellipse { x, y, rx, ry, color });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.calls.push(DrawCall::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, _color: Color) {
        self.calls.push(DrawCall::Line { from, to, width });
    }

    fn stroke_circle(&mut self, x: f32, y: f32, r: f32, _width: f32, _color: Color) {
        self.calls.push(DrawCall::Ring { x, y, r });
    }

    fn text(&mut self, text: &str, x: f32, y: f32, _size: f32, _align: TextAlign, _color: Color) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn save(&mut self) {
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.calls.push(DrawCall::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.calls.push(DrawCall::Translate { x, y });
    }

    fn rotate(&mut self, angle: f32) {
        self.calls.push(DrawCall::Rotate { angle });
    }
}
