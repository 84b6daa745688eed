use crate::error::{ThumbnailError, ThumbnailResult};
use image::ImageFormat;
use std::fmt;

/// The file types the thumbnailer accepts, keyed by their literal extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Png,
    Jpg,
    Jpeg,
    Pdf,
}

impl FileType {
    pub const ALLOWED: [Self; 4] = [Self::Png, Self::Jpg, Self::Jpeg, Self::Pdf];

    /// Parses an extension exactly as it appears in the key. `JPG` is not `jpg`.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALLOWED
            .into_iter()
            .find(|file_type| file_type.extension() == extension)
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Pdf => "pdf",
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }

    /// PDF never reaches the encoder as-is; it is rasterized to PNG first.
    #[must_use]
    pub const fn raster_format(self) -> ImageFormat {
        match self {
            Self::Png | Self::Pdf => ImageFormat::Png,
            Self::Jpg | Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    #[must_use]
    pub const fn is_document(self) -> bool {
        matches!(self, Self::Pdf)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Infers the file type from the text after the last `.` in the key.
///
/// # Errors
///
/// * `UnrecognizedType` if the key contains no `.` at all.
/// * `UnsupportedType` if the extension is not in the allow-list.
pub fn classify(key: &str) -> ThumbnailResult<FileType> {
    let Some((_, extension)) = key.rsplit_once('.') else {
        return Err(ThumbnailError::UnrecognizedType {
            key: key.to_string(),
        });
    };

    FileType::from_extension(extension).ok_or_else(|| ThumbnailError::UnsupportedType {
        extension: extension.to_string(),
    })
}
