//! Image file loading.

use std::fs::File;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::grid::PixelGrid;

/// Decodes `path` into an RGBA grid, top row first.
///
/// GIF files are read with the `gif` decoder and only their first frame is
/// used. Every other format goes through `image`.
pub fn load(path: &Path) -> Result<PixelGrid> {
    let is_gif = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"));
    let grid = if is_gif { load_gif(path)? } else { load_image(path)? };
    debug!("Decoded {} as {}x{}.", path.display(), grid.width(), grid.height());
    Ok(grid)
}

fn load_gif(path: &Path) -> Result<PixelGrid> {
    let file = File::open(path)?;
    // Expand palette indices so every pixel carries its own RGBA value.
    let mut decoder = gif::DecodeOptions::new();
    decoder.set_color_output(gif::ColorOutput::RGBA);
    let mut reader = decoder.read_info(file)?;
    let frame = reader.read_next_frame()?.ok_or(Error::NoFrames)?;
    PixelGrid::from_rgba(frame.width as usize, frame.height as usize, &frame.buffer)
}

fn load_image(path: &Path) -> Result<PixelGrid> {
    let img = image::open(path)?.to_rgba8();
    let (width, height) = img.dimensions();
    PixelGrid::from_rgba(width as usize, height as usize, img.as_raw())
}
