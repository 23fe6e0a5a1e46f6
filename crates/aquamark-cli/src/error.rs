#[derive(Debug)]
pub enum Error {
    /// Decode or encode failure at the image I/O boundary.
    Image(image::ImageError),
    Io(std::io::Error),
    Codec(aquamark::Error),
    Recover(aquamark_recover::Error),
    InvalidArgs(&'static str),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<aquamark::Error> for Error {
    fn from(err: aquamark::Error) -> Self {
        Self::Codec(err)
    }
}

impl From<aquamark_recover::Error> for Error {
    fn from(err: aquamark_recover::Error) -> Self {
        Self::Recover(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image(err) => write!(f, "cannot read or write image: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Recover(err) => write!(f, "{err}"),
            Self::InvalidArgs(what) => write!(f, "{what}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Recover(err) => Some(err),
            Self::InvalidArgs(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
