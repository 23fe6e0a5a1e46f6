//! This crate provides [`Plane`], a row-major sample buffer, and
//! [`BlockLayout`], the grid of non-overlapping coefficient blocks the
//! watermark codec iterates over.
mod block;
mod plane;

pub use block::*;
pub use plane::*;

#[derive(Debug)]
pub enum Error {
    GridTooSmall {
        width: usize,
        height: usize,
        block: BlockShape,
    },
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GridTooSmall {
                width,
                height,
                block,
            } => write!(
                f,
                "plane of {width}x{height} sample(s) cannot hold a single {}x{} block",
                block.height, block.width,
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
