//! Error type shared by the library modules.

/// Errors raised while loading an image or configuring the packer.
///
/// An empty image is not an error: it scans to zero rectangles and packs to a
/// single program holding only the final flush.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The instructions-per-program budget was zero.
    #[error("instruction budget must be at least 1")]
    InvalidBudget,

    /// The display resolution was zero.
    #[error("display resolution must be at least 1")]
    InvalidResolution,

    #[error("invalid display name: {0:?}")]
    InvalidDisplay(String),

    /// A raw RGBA buffer did not match the grid dimensions.
    #[error("pixel buffer is {actual} bytes, expected {expected} for a {width}x{height} grid")]
    GridSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("no frames in file")]
    NoFrames,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("gif decode error: {0}")]
    Gif(#[from] gif::DecodingError),
}

pub type Result<T> = std::result::Result<T, Error>;
