//! Undoing geometric attacks before extraction: template matching against
//! the original image estimates the crop box and scale of an attacked copy,
//! and [`recover_crop`] paints it back into place. The [`attack`] module
//! provides the pixel-space distortions used to exercise the codec's
//! robustness.
pub mod attack;
mod recover;

pub use recover::*;

#[derive(Debug)]
pub enum Error {
    /// The attacked image does not fit inside the original anywhere in the
    /// requested scale range.
    TemplateTooLarge {
        original: (usize, usize),
        template: (usize, usize),
    },
    EmptyImage,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TemplateTooLarge { original, template } => write!(
                f,
                "template of {}x{} cannot fit inside original of {}x{} in the requested scale range",
                template.0, template.1, original.0, original.1,
            ),
            Self::EmptyImage => write!(f, "image has no pixels"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
