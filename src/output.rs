use crate::types::LandmarkPoint;
use crate::view::{ScreenView, Viewport};
use anyhow::Result;
use image::RgbImage;
use std::time::Duration;

const BACKGROUND: u32 = 0x000F0F0F;

fn pack(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

fn dim(color: u32, factor: f32) -> u32 {
    let scale = |shift: u32| ((((color >> shift) & 0xFF) as f32 * factor) as u32).min(255) << shift;
    scale(16) | scale(8) | scale(0)
}

/// 0RGB pixel buffer the viewport is drawn into.
pub struct Canvas {
    pub buffer: Vec<u32>,
    pub width: usize,
    pub height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffer: vec![BACKGROUND; width * height],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.buffer.resize(width * height, BACKGROUND);
        }
    }

    pub fn fill(&mut self, color: u32) {
        self.buffer.iter_mut().for_each(|px| *px = color);
    }

    /// Copies an RGB frame, resizing the canvas to match.
    pub fn blit(&mut self, frame: &RgbImage) {
        self.resize(frame.width() as usize, frame.height() as usize);
        for (px, pixel) in self.buffer.iter_mut().zip(frame.pixels()) {
            *px = pack(pixel[0], pixel[1], pixel[2]);
        }
    }

    pub fn put(&mut self, x: i64, y: i64, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buffer[y * self.width + x])
    }

    fn square(&mut self, cx: i64, cy: i64, size: usize, color: u32) {
        let half = (size / 2) as i64;
        for dy in 0..size as i64 {
            for dx in 0..size as i64 {
                self.put(cx - half + dx, cy - half + dy, color);
            }
        }
    }

    fn hline(&mut self, x: i64, y: i64, len: i64, color: u32) {
        for i in 0..len {
            self.put(x + i, y, color);
        }
    }

    fn vline(&mut self, x: i64, y: i64, len: i64, color: u32) {
        for i in 0..len {
            self.put(x, y + i, color);
        }
    }

    /// Ellipse outline centred in the canvas, radii as fractions of the size.
    pub fn oval(&mut self, rx: f32, ry: f32, color: u32) {
        let cx = self.width as f32 / 2.0;
        let cy = self.height as f32 / 2.0;
        let rx = rx * self.width as f32;
        let ry = ry * self.height as f32;
        let steps = ((rx + ry) * 4.0).max(64.0) as usize;
        for i in 0..steps {
            let t = i as f32 / steps as f32 * std::f32::consts::TAU;
            self.put((cx + rx * t.cos()) as i64, (cy + ry * t.sin()) as i64, color);
        }
    }

    /// L-shaped corner marks inset from the edges.
    pub fn brackets(&mut self, color: u32) {
        let w = self.width as i64;
        let h = self.height as i64;
        let inset = (w.min(h) / 10).max(2);
        let arm = (w.min(h) / 8).max(3);
        for (x, y, sx, sy) in [(inset, inset, 1, 1), (w - inset - 1, inset, -1, 1), (inset, h - inset - 1, 1, -1), (w - inset - 1, h - inset - 1, -1, -1)] {
            let hx = if sx > 0 { x } else { x - arm + 1 };
            let vy = if sy > 0 { y } else { y - arm + 1 };
            self.hline(hx, y, arm, color);
            self.vline(x, vy, arm, color);
        }
    }

    /// Draws the dots whose stagger delay has elapsed.
    pub fn landmarks(&mut self, points: &[LandmarkPoint], since_reveal: Duration, size: usize, color: u32) {
        let elapsed = since_reveal.as_secs_f32();
        for p in points.iter().filter(|p| p.reveal_delay <= elapsed) {
            let x = (p.x / 100.0 * self.width as f32) as i64;
            let y = (p.y / 100.0 * self.height as f32) as i64;
            self.square(x, y, size.max(1), color);
        }
    }

    /// Paints the viewport for `view`. `frame` is the (already mirrored)
    /// camera image, if any.
    pub fn paint(&mut self, view: &ScreenView, frame: Option<&RgbImage>, since_reveal: Duration, dot_size: usize) {
        let (r, g, b) = view.accent;
        let accent = pack(r, g, b);

        match (view.viewport, frame) {
            (Viewport::Live { .. }, Some(frame)) => self.blit(frame),
            _ => {
                self.fill(BACKGROUND);
                // Pulsing placeholder while the camera connects.
                let pulse = 0.35 + 0.15 * (since_reveal.as_secs_f32() * 3.0).sin().abs();
                self.oval(0.06, 0.045, dim(accent, pulse));
            }
        }

        if view.overlay.face_guide {
            self.oval(0.3, 0.3, dim(accent, 0.4));
        }
        if view.overlay.hud_brackets {
            self.brackets(accent);
        }
        self.landmarks(&view.overlay.points, since_reveal, dot_size, accent);
    }
}

pub struct WindowOutput {
    window: minifb::Window,
    canvas: Canvas,
}

impl WindowOutput {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = minifb::Window::new(
            title,
            width,
            height,
            minifb::WindowOptions {
                resize: true,
                ..minifb::WindowOptions::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to create window: {}", e))?;

        window.limit_update_rate(Some(Duration::from_micros(16600))); // ~60 FPS

        Ok(Self {
            window,
            canvas: Canvas::new(width, height),
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn is_key_down(&self, key: minifb::Key) -> bool {
        self.window.is_key_down(key)
    }

    pub fn render(&mut self, view: &ScreenView, frame: Option<&RgbImage>, since_reveal: Duration, dot_size: usize) -> Result<()> {
        self.canvas.paint(view, frame, since_reveal, dot_size);
        self.window
            .update_with_buffer(&self.canvas.buffer, self.canvas.width, self.canvas.height)
            .map_err(|e| anyhow::anyhow!("Window update failed: {}", e))
    }
}
