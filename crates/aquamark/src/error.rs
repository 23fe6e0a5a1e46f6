#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The cover image cannot hold even a single coefficient block.
    ImageTooSmall(aquamark_grid::Error),
    /// The payload needs more blocks than the cover provides; the payload
    /// must be strictly smaller than the block count.
    WatermarkTooLarge { required: usize, capacity: usize },
    /// A declared payload shape does not match the payload length.
    InvalidShape { expected: usize, actual: usize },
    InvalidParameter(&'static str),
}

impl From<aquamark_grid::Error> for Error {
    fn from(err: aquamark_grid::Error) -> Self {
        Self::ImageTooSmall(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ImageTooSmall(err) => write!(f, "image too small: {err}"),
            Self::WatermarkTooLarge { required, capacity } => write!(
                f,
                "watermark of {required} bit(s) does not fit; the cover holds {capacity} block(s) \
                 and the payload must be strictly smaller"
            ),
            Self::InvalidShape { expected, actual } => write!(
                f,
                "payload shape mismatch: shape describes {expected} bit(s), payload has {actual}"
            ),
            Self::InvalidParameter(what) => write!(f, "invalid parameter: {what}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageTooSmall(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
