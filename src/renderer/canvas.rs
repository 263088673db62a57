//! 2D canvas backend
//!
//! Paints a draw list onto a `CanvasRenderingContext2d`, scaling the logical
//! screen to fit the canvas with letterboxing.

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::scene::{Align, DrawCmd, css};

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Logical screen size the draw list is expressed in
    logical: Vec2,
    scale: f32,
    offset: Vec2,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement, logical: Vec2) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("get_context failed: {e:?}"))?
            .ok_or("canvas has no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "context is not 2d".to_string())?;
        let mut renderer = Self {
            canvas,
            ctx,
            logical,
            scale: 1.0,
            offset: Vec2::ZERO,
        };
        renderer.resize();
        Ok(renderer)
    }

    /// Recompute the fit after the canvas changed size
    pub fn resize(&mut self) {
        let size = Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32);
        self.scale = (size.x / self.logical.x).min(size.y / self.logical.y);
        self.offset = (size - self.logical * self.scale) / 2.0;
    }

    /// Canvas pixel → logical screen point
    pub fn to_logical(&self, canvas_px: Vec2) -> Vec2 {
        (canvas_px - self.offset) / self.scale
    }

    pub fn paint(&self, cmds: &[DrawCmd]) {
        let ctx = &self.ctx;
        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        for cmd in cmds {
            match cmd {
                DrawCmd::Clear(color) => {
                    ctx.set_fill_style_str("black");
                    let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
                    ctx.fill_rect(0.0, 0.0, w, h);
                    let _ = ctx.set_transform(
                        self.scale as f64,
                        0.0,
                        0.0,
                        self.scale as f64,
                        self.offset.x as f64,
                        self.offset.y as f64,
                    );
                    ctx.set_fill_style_str(&css(*color));
                    ctx.fill_rect(0.0, 0.0, self.logical.x as f64, self.logical.y as f64);
                }
                DrawCmd::Rect { rect, fill, stroke } => {
                    let (x, y) = (rect.min.x as f64, rect.min.y as f64);
                    let (w, h) = (rect.size.x as f64, rect.size.y as f64);
                    ctx.set_fill_style_str(&css(*fill));
                    ctx.fill_rect(x, y, w, h);
                    if let Some((color, width)) = stroke {
                        ctx.set_stroke_style_str(&css(*color));
                        ctx.set_line_width(*width as f64);
                        ctx.stroke_rect(x, y, w, h);
                    }
                }
                DrawCmd::Circle {
                    center,
                    radius,
                    fill,
                } => {
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.set_fill_style_str(&css(*fill));
                    ctx.fill();
                }
                DrawCmd::Text {
                    text,
                    pos,
                    size,
                    color,
                    align,
                } => {
                    ctx.set_font(&format!("bold {}px sans-serif", size.round()));
                    ctx.set_text_align(match align {
                        Align::Left => "left",
                        Align::Center => "center",
                    });
                    ctx.set_fill_style_str(&css(*color));
                    let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                }
            }
        }
    }
}
