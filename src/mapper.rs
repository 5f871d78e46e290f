//! Source grid to display coordinate mapping.

use std::fmt;

use crate::error::{Error, Result};
use crate::scanner::Rect;

/// How the source grid is fitted onto the square display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Stretch each axis to fill the display.
    #[default]
    Scale,
    /// Scale both axes by the same factor so the longer side fills the display.
    Letterbox,
    /// No scaling. Anything past the display edge is passed through unclipped.
    Crop,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Scale => "scale",
            Mode::Letterbox => "letterbox",
            Mode::Crop => "crop",
        })
    }
}

/// A rectangle in display coordinates, as origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl TargetRect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// True when the rectangle lies entirely on a `resolution` sized display.
    pub fn fits(&self, resolution: u32) -> bool {
        u64::from(self.x) + u64::from(self.w) <= u64::from(resolution)
            && u64::from(self.y) + u64::from(self.h) <= u64::from(resolution)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapper {
    mode: Mode,
    resolution: u32,
    x_scale: f64,
    y_scale: f64,
}

impl Mapper {
    /// Computes the per-axis scale factors for a `width` x `height` grid.
    ///
    /// An empty grid gets a scale of 1 on both axes; it never has rectangles
    /// to map.
    pub fn new(mode: Mode, width: usize, height: usize, resolution: u32) -> Result<Self> {
        if resolution == 0 {
            return Err(Error::InvalidResolution);
        }
        let res = f64::from(resolution);
        let (x_scale, y_scale) = if width == 0 || height == 0 {
            (1.0, 1.0)
        } else {
            match mode {
                Mode::Scale => (res / width as f64, res / height as f64),
                Mode::Letterbox => {
                    let scale = res / width.max(height) as f64;
                    (scale, scale)
                }
                Mode::Crop => (1.0, 1.0),
            }
        };
        Ok(Self {
            mode,
            resolution,
            x_scale,
            y_scale,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn x_scale(&self) -> f64 {
        self.x_scale
    }

    pub fn y_scale(&self) -> f64 {
        self.y_scale
    }

    /// Maps a grid rectangle to display origin and size.
    ///
    /// Each value is rounded half away from zero.
    pub fn map(&self, rect: &Rect) -> TargetRect {
        TargetRect {
            x: scale(rect.x1, self.x_scale),
            y: scale(rect.y1, self.y_scale),
            w: scale(rect.width(), self.x_scale),
            h: scale(rect.height(), self.y_scale),
        }
    }
}

fn scale(value: usize, factor: f64) -> u32 {
    // `as` saturates, which is fine for coordinates this far off the display
    (value as f64 * factor).round() as u32
}
