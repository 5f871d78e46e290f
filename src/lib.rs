//! Converts images into logic processor draw scripts.
//!
//! The pipeline is [`scan`] (grid to color rectangles), [`Mapper`] (grid to
//! display coordinates) and [`pack`] (rectangles to size-limited programs).

pub mod decode;
pub mod error;
pub mod grid;
pub mod mapper;
pub mod output;
pub mod packer;
pub mod scanner;

pub use error::{Error, Result};
pub use grid::{Color, PixelGrid};
pub use mapper::{Mapper, Mode, TargetRect};
pub use packer::{pack, Instruction, PackerConfig, Program, ScriptPacker, DEFAULT_BUDGET, DEFAULT_DISPLAY, FLUSH_INTERVAL};
pub use scanner::{scan, ColorGroups, Rect};
