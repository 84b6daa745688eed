use crate::pipeline::PipelineStage;
use color_eyre::eyre;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Source and destination containers are the same: {container}")]
    SameLocation { container: String },

    #[error("Could not determine the file type of '{key}'")]
    UnrecognizedType { key: String },

    #[error("Unsupported file type: {extension}")]
    UnsupportedType { extension: String },

    #[error("Failed to fetch source object: {0}")]
    FetchFailed(#[source] eyre::Report),

    #[error("Failed to write temporary file: {0}")]
    WriteTempFailed(#[source] std::io::Error),

    #[error("Failed to rasterize document: {0}")]
    RasterizeFailed(#[source] eyre::Report),

    #[error("Failed to read rasterized page: {0}")]
    ReadTempFailed(#[source] std::io::Error),

    #[error("Failed to measure image: {0}")]
    MeasureFailed(#[source] eyre::Report),

    #[error("Invalid dimensions {width}x{height} (bounding box {max_width}x{max_height})")]
    InvalidDimensions {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[error("Failed to transform image: {0}")]
    TransformFailed(#[source] eyre::Report),

    #[error("Failed to upload thumbnail: {0}")]
    UploadFailed(#[source] eyre::Report),
}

impl ThumbnailError {
    /// The last stage the pipeline completed before this error aborted it.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::MalformedEvent(_)
            | Self::UnrecognizedType { .. }
            | Self::UnsupportedType { .. } => PipelineStage::Start,
            Self::SameLocation { .. } | Self::FetchFailed(_) => PipelineStage::Classified,
            Self::WriteTempFailed(_) | Self::RasterizeFailed(_) | Self::ReadTempFailed(_) => {
                PipelineStage::Fetched
            }
            Self::MeasureFailed(_) | Self::InvalidDimensions { .. } => PipelineStage::Normalized,
            Self::TransformFailed(_) => PipelineStage::Scaled,
            Self::UploadFailed(_) => PipelineStage::Encoded,
        }
    }
}

pub type ThumbnailResult<T> = Result<T, ThumbnailError>;
