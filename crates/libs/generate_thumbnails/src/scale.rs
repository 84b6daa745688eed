use crate::error::{ThumbnailError, ThumbnailResult};

pub const MAX_WIDTH: u32 = 296;
pub const MAX_HEIGHT: u32 = 296;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleResult {
    pub factor: f64,
    pub width: f64,
    pub height: f64,
}

impl ScaleResult {
    /// Target size in whole pixels, rounded to nearest and never below one pixel.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        (to_pixels(self.width), to_pixels(self.height))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(value: f64) -> u32 {
    value.round().max(1.0) as u32
}

/// Computes the largest size that fits in the bounding box without distortion.
///
/// The factor is `min(max_width / width, max_height / height)` and is not capped at 1, so
/// images smaller than the box are scaled up.
///
/// # Errors
///
/// Returns `InvalidDimensions` if any of the four inputs is zero.
pub fn compute_scale(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> ThumbnailResult<ScaleResult> {
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return Err(ThumbnailError::InvalidDimensions {
            width,
            height,
            max_width,
            max_height,
        });
    }

    let (width, height) = (f64::from(width), f64::from(height));
    let factor = (f64::from(max_width) / width).min(f64::from(max_height) / height);

    Ok(ScaleResult {
        factor,
        width: factor * width,
        height: factor * height,
    })
}
