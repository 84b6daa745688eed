use crate::capabilities::{Decoder, Encoder, Resizer};
use color_eyre::eyre::{Result, bail, eyre};
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer as FastResizer};
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Rgba};
use std::io::Cursor;
use std::num::NonZeroU32;

/// Decodes, resizes and encodes in-process with `image` and `fast_image_resize`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeImageEngine;

impl Decoder for NativeImageEngine {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()?;
        if img.width() == 0 || img.height() == 0 {
            bail!("decoded image is empty ({}x{})", img.width(), img.height());
        }
        Ok(img)
    }
}

impl Resizer for NativeImageEngine {
    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
        let src_img = image.to_rgba8();
        let (orig_w, orig_h) = src_img.dimensions();

        let src_image = Image::from_vec_u8(
            NonZeroU32::new(orig_w)
                .ok_or_else(|| eyre!("source image width is zero"))?
                .into(),
            NonZeroU32::new(orig_h)
                .ok_or_else(|| eyre!("source image height is zero"))?
                .into(),
            src_img.into_raw(),
            PixelType::U8x4,
        )?;

        let mut dst_img = Image::new(
            NonZeroU32::new(width)
                .ok_or_else(|| eyre!("target width is zero"))?
                .into(),
            NonZeroU32::new(height)
                .ok_or_else(|| eyre!("target height is zero"))?
                .into(),
            PixelType::U8x4,
        );

        FastResizer::new().resize(&src_image, &mut dst_img, None)?;

        let resized = ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, dst_img.into_vec())
            .ok_or_else(|| eyre!("Failed to construct resized image"))?;
        Ok(DynamicImage::ImageRgba8(resized))
    }
}

impl Encoder for NativeImageEngine {
    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            // JPEG has no alpha channel.
            ImageFormat::Jpeg => {
                DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, format)?;
            }
            ImageFormat::Png => {
                image.write_to(&mut buffer, format)?;
            }
            other => bail!("unsupported thumbnail format: {other:?}"),
        }
        Ok(buffer.into_inner())
    }
}
