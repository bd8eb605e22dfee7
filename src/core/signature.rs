//! Freehand signature capture.
//!
//! The pad is a fixed-size RGBA surface driven by pointer events. Each move
//! while drawing rasterizes one straight segment from the previous point; no
//! smoothing is applied.

use crate::domain::model::SignatureImage;
use crate::utils::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub const DEFAULT_WIDTH: u32 = 500;
pub const DEFAULT_HEIGHT: u32 = 200;
pub const DEFAULT_STROKE_WIDTH: f32 = 2.5;
/// Largest accepted surface side, in pixels.
pub const MAX_PAD_SIDE: u32 = 4096;
/// Indigo-950, `#1e1b4b`.
pub const DEFAULT_STROKE_COLOR: [u8; 4] = [0x1e, 0x1b, 0x4b, 0xff];

const SAMPLE_SPACING: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Down(Point),
    Move(Point),
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub source: PointerSource,
    pub action: PointerAction,
}

/// Whether the host should run its default handling (scrolling, dragging)
/// for an event the pad received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Default,
    PreventDefault,
}

/// What the pad tells its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadEvent {
    Saved(SignatureImage),
    /// The surface was wiped; any signature saved from it is no longer valid.
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PadState {
    Idle,
    Drawing { last: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: [u8; 4],
    pub width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_STROKE_COLOR,
            width: DEFAULT_STROKE_WIDTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignaturePad {
    canvas: RgbaImage,
    state: PadState,
    has_content: bool,
    style: StrokeStyle,
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_style(width, height, StrokeStyle::default())
    }

    /// Sides larger than [`MAX_PAD_SIDE`] are clamped.
    pub fn with_style(width: u32, height: u32, style: StrokeStyle) -> Self {
        Self {
            canvas: RgbaImage::new(width.min(MAX_PAD_SIDE), height.min(MAX_PAD_SIDE)),
            state: PadState::Idle,
            has_content: false,
            style,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, PadState::Drawing { .. })
    }

    pub fn has_content(&self) -> bool {
        self.has_content
    }

    /// "Confirm" is only offered once something was drawn.
    pub fn can_confirm(&self) -> bool {
        self.has_content
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Routes a raw pointer event. Touch input that starts or continues a
    /// stroke is swallowed so the page does not scroll under the finger.
    pub fn handle(&mut self, event: PointerEvent) -> Disposition {
        match event.action {
            PointerAction::Down(p) => self.pointer_down(p),
            PointerAction::Move(p) => self.pointer_move(p),
            PointerAction::Up => self.pointer_up(),
            PointerAction::Leave => self.pointer_leave(),
        }

        match (event.source, event.action) {
            (PointerSource::Touch, PointerAction::Down(_) | PointerAction::Move(_)) => {
                Disposition::PreventDefault
            }
            _ => Disposition::Default,
        }
    }

    pub fn pointer_down(&mut self, at: Point) {
        self.state = PadState::Drawing { last: at };
    }

    pub fn pointer_move(&mut self, to: Point) {
        let PadState::Drawing { last } = self.state else {
            return;
        };
        self.draw_segment(last, to);
        self.state = PadState::Drawing { last: to };
        self.has_content = true;
    }

    pub fn pointer_up(&mut self) {
        self.state = PadState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.state = PadState::Idle;
    }

    pub fn clear(&mut self) -> PadEvent {
        let (w, h) = self.canvas.dimensions();
        self.canvas = RgbaImage::new(w, h);
        self.state = PadState::Idle;
        self.has_content = false;
        PadEvent::Cleared
    }

    /// Exports the surface. Returns `None` while the pad is blank.
    pub fn confirm(&self) -> Result<Option<PadEvent>> {
        if !self.can_confirm() {
            return Ok(None);
        }
        Ok(Some(PadEvent::Saved(self.to_signature_image()?)))
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.canvas
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn to_signature_image(&self) -> Result<SignatureImage> {
        let png = self.to_png()?;
        Ok(SignatureImage(format!(
            "{}{}",
            SignatureImage::PNG_PREFIX,
            STANDARD.encode(png)
        )))
    }

    fn draw_segment(&mut self, from: Point, to: Point) {
        let Some((from, to)) = self.clip_to_surface(from, to) else {
            return;
        };
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let length = (dx * dx + dy * dy).sqrt();
        let steps = ((length / SAMPLE_SPACING).ceil() as u32).max(1);

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(from.x + dx * t, from.y + dy * t);
        }
    }

    /// Cuts the segment down to the part that can touch the surface (the
    /// canvas widened by the brush radius), Liang-Barsky style. `None` when
    /// nothing of it is visible or a coordinate is not finite.
    fn clip_to_surface(&self, from: Point, to: Point) -> Option<(Point, Point)> {
        if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
            return None;
        }
        let radius = self.style.width / 2.0;
        let (w, h) = self.canvas.dimensions();
        let (min_x, min_y) = (-radius, -radius);
        let (max_x, max_y) = (w as f32 + radius, h as f32 + radius);

        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let mut t0 = 0.0_f32;
        let mut t1 = 1.0_f32;
        for (p, q) in [
            (-dx, from.x - min_x),
            (dx, max_x - from.x),
            (-dy, from.y - min_y),
            (dy, max_y - from.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return None;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return None;
                }
                t1 = t1.min(t);
            }
        }

        Some((
            Point::new(from.x + dx * t0, from.y + dy * t0),
            Point::new(from.x + dx * t1, from.y + dy * t1),
        ))
    }

    /// Paints a round brush centred on (cx, cy), clipped to the surface.
    fn stamp(&mut self, cx: f32, cy: f32) {
        let radius = self.style.width / 2.0;
        let (w, h) = self.canvas.dimensions();
        let min_x = (cx - radius).floor().max(0.0) as u32;
        let min_y = (cy - radius).floor().max(0.0) as u32;
        let max_x = (cx + radius).ceil().min(w as f32 - 1.0);
        let max_y = (cy + radius).ceil().min(h as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }

        let color = Rgba(self.style.color);
        for py in min_y..=max_y as u32 {
            for px in min_x..=max_x as u32 {
                let ox = px as f32 + 0.5 - cx;
                let oy = py as f32 + 0.5 - cy;
                if ox * ox + oy * oy <= radius * radius {
                    self.canvas.put_pixel(px, py, color);
                }
            }
        }
    }
}
