//! `CanvasRenderingContext2d` backend

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::{Color, Surface, TextAlign};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// None if the canvas has no 2d context
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    /// Match the backing store to the displayed size
    pub fn fit_to_display(&self, device_pixel_ratio: f64) -> (u32, u32) {
        let w = (self.canvas.client_width() as f64 * device_pixel_ratio).round().max(1.0) as u32;
        let h = (self.canvas.client_height() as f64 * device_pixel_ratio).round().max(1.0) as u32;
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
        (w, h)
    }

    fn fill(&self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn stroke(&self, color: Color, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f32, f32) {
        (self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.fill(color);
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Color) {
        self.fill(color);
        self.ctx.begin_path();
        self.ctx.arc(x as f64, y as f64, r as f64, 0.0, TAU).ok();
        self.ctx.fill();
    }

    fn fill_ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32, rotation: f32, color: Color) {
        self.fill(color);
        self.ctx.begin_path();
        self.ctx
            .ellipse(x as f64, y as f64, rx as f64, ry as f64, rotation as f64, 0.0, TAU)
            .ok();
        self.ctx.fill();
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.fill(color);
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.stroke(color, width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn stroke_circle(&mut self, x: f32, y: f32, r: f32, width: f32, color: Color) {
        self.stroke(color, width);
        self.ctx.begin_path();
        self.ctx.arc(x as f64, y as f64, r as f64, 0.0, TAU).ok();
        self.ctx.stroke();
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color) {
        self.fill(color);
        self.ctx.set_font(&format!("bold {}px sans-serif", size.round()));
        self.ctx.set_text_align(align.as_str());
        self.ctx.fill_text(text, x as f64, y as f64).ok();
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.ctx.translate(x as f64, y as f64).ok();
    }

    fn rotate(&mut self, angle: f32) {
        self.ctx.rotate(angle as f64).ok();
    }
}
