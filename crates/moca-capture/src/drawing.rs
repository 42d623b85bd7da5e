//! Freehand drawing surface.
//!
//! Pointer coordinates arrive in display pixels and are scaled to the
//! canvas-native resolution before stroking. Every stroke segment re-encodes
//! the canvas so the latest snapshot is always available.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use moca_core::models::answer::RasterSnapshot;

use crate::error::CaptureError;

pub const CANVAS_WIDTH: u32 = 350;
pub const CANVAS_HEIGHT: u32 = 350;
pub const STROKE_WIDTH: i64 = 2;

const INK: Rgba<u8> = Rgba([0x22, 0x22, 0x22, 0xff]);
const PAPER: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Mouse button pressed or touch started.
    Down,
    Move,
    /// Mouse button released or touch ended.
    Up,
    /// Pointer left the surface or the touch was cancelled.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub source: PointerSource,
    pub phase: PointerPhase,
    /// Position relative to the surface's top-left corner, in display pixels.
    pub x: f32,
    pub y: f32,
}

pub struct DrawingSurface {
    canvas: RgbaImage,
    display_width: f32,
    display_height: f32,
    pen: Option<(i64, i64)>,
    snapshot: Option<RasterSnapshot>,
}

impl DrawingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(width, height, PAPER),
            display_width: width as f32,
            display_height: height as f32,
            pen: None,
            snapshot: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Size the surface is currently rendered at. Non-positive sizes fall
    /// back to the canvas resolution.
    pub fn set_display_size(&mut self, width: f32, height: f32) {
        self.display_width = if width > 0.0 { width } else { self.width() as f32 };
        self.display_height = if height > 0.0 { height } else { self.height() as f32 };
    }

    /// Map a display-pixel position onto canvas pixels. Points off the
    /// surface are pinned to within one nib of its edge.
    pub fn to_canvas(&self, x: f32, y: f32) -> (i64, i64) {
        let sx = self.width() as f32 / self.display_width;
        let sy = self.height() as f32 / self.display_height;
        let max_x = i64::from(self.width()) + STROKE_WIDTH;
        let max_y = i64::from(self.height()) + STROKE_WIDTH;
        (
            ((x * sx).round() as i64).clamp(-STROKE_WIDTH, max_x),
            ((y * sy).round() as i64).clamp(-STROKE_WIDTH, max_y),
        )
    }

    /// Apply a pointer event. Returns the fresh snapshot when the event drew
    /// a segment.
    pub fn handle(&mut self, event: PointerEvent) -> Result<Option<&RasterSnapshot>, CaptureError> {
        if !event.x.is_finite() || !event.y.is_finite() {
            return Err(CaptureError::InvalidPoint {
                x: event.x,
                y: event.y,
            });
        }
        let point = self.to_canvas(event.x, event.y);
        match event.phase {
            PointerPhase::Down => {
                self.pen = Some(point);
                Ok(None)
            }
            PointerPhase::Move => {
                let Some(from) = self.pen else {
                    return Ok(None);
                };
                self.stroke(from, point);
                self.pen = Some(point);
                self.snapshot = Some(self.encode()?);
                Ok(self.snapshot.as_ref())
            }
            PointerPhase::Up | PointerPhase::Leave => {
                self.pen = None;
                Ok(None)
            }
        }
    }

    /// Wipe the canvas. The surface counts as untouched afterwards.
    pub fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = PAPER;
        }
        self.pen = None;
        self.snapshot = None;
    }

    pub fn snapshot(&self) -> Option<&RasterSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.pen.is_some()
    }

    /// Bresenham line, stamping a square nib at every step.
    fn stroke(&mut self, (x0, y0): (i64, i64), (x1, y1): (i64, i64)) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.stamp(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn stamp(&mut self, cx: i64, cy: i64) {
        let half = STROKE_WIDTH / 2;
        for y in (cy - half)..(cy - half + STROKE_WIDTH) {
            for x in (cx - half)..(cx - half + STROKE_WIDTH) {
                if x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height()) {
                    self.canvas.put_pixel(x as u32, y as u32, INK);
                }
            }
        }
    }

    fn encode(&self) -> Result<RasterSnapshot, CaptureError> {
        let mut cursor = Cursor::new(Vec::new());
        self.canvas
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        Ok(RasterSnapshot {
            width: self.width(),
            height: self.height(),
            png: cursor.into_inner(),
        })
    }
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}
