//! Export boundary.
//!
//! The engine never writes files itself; callers hand a finished image to an
//! [`ImageSink`] of their choosing.

use crate::raster::Image;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No filtered image to save")]
    NothingToSave,

    #[error("save rejected: {cause}")]
    Rejected { cause: String },

    #[error("save failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn rejected(cause: impl Into<String>) -> Self {
        Self::Rejected {
            cause: cause.into(),
        }
    }
}

/// Destination for a finished image, such as a photo library.
pub trait ImageSink {
    fn save(&self, image: &Image) -> Result<(), ExportError>;
}

impl<F> ImageSink for F
where
    F: Fn(&Image) -> Result<(), ExportError>,
{
    fn save(&self, image: &Image) -> Result<(), ExportError> {
        self(image)
    }
}
