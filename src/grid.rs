use std::fmt;

use crate::error::{Error, Result};

/// An RGBA color. Two colors are the same only if all four channels match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// A width x height grid of colors stored row by row.
///
/// The grid is assumed to already be in the target orientation; see
/// [`PixelGrid::flip_vertical`] for bringing a top-down image into the
/// bottom-up convention of the logic display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl PixelGrid {
    /// A grid filled with a single color.
    pub fn new(width: usize, height: usize, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    /// Builds a grid from packed RGBA bytes in row-major order.
    pub fn from_rgba(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        let expected = width * height * 4;
        if bytes.len() != expected {
            return Err(Error::GridSize {
                width,
                height,
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| Color::new(p[0], p[1], p[2], p[3]))
            .collect();
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Color at (x, y). Panics if the point is outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Color {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside {}x{} grid", self.width, self.height);
        self.pixels[y * self.width + x]
    }

    /// Mirrors the grid top to bottom in place.
    pub fn flip_vertical(&mut self) {
        let (w, h) = (self.width, self.height);
        for y in 0..h / 2 {
            let (top, bottom) = self.pixels.split_at_mut((h - 1 - y) * w);
            top[y * w..(y + 1) * w].swap_with_slice(&mut bottom[..w]);
        }
    }
}
