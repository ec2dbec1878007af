use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Model error: {0}")]
    Model(#[from] ort::Error),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error(
        "Dimension mismatch: expected {}x{}, got {}x{}",
        expected.0,
        expected.1,
        actual.0,
        actual.1
    )]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Invalid landmarks: need at least {required} points, got {actual}")]
    InvalidLandmarks { required: usize, actual: usize },

    #[error("Unknown segmentation category: {0}")]
    UnknownCategory(u8),
}

impl Error {
    pub(crate) fn check_dimensions(expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::DimensionMismatch { expected, actual })
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
