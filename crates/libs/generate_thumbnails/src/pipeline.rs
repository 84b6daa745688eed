use crate::capabilities::{Decoder, Encoder, ObjectStore, PageRasterizer, Resizer};
use crate::engine::NativeImageEngine;
use crate::error::{ThumbnailError, ThumbnailResult};
use crate::event::NotificationEvent;
use crate::file_type::{FileType, classify};
use crate::locator::{DESTINATION_SUFFIX, DestinationLocator, SourceLocator, resolve_with_suffix};
use crate::raster::{RasterAsset, normalize};
use crate::scale::{MAX_HEIGHT, MAX_WIDTH, compute_scale};
use bon::bon;
use color_eyre::eyre::eyre;
use std::fmt;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, error, info};

/// Where a run of the pipeline got to. Runs only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Start,
    Classified,
    Fetched,
    Normalized,
    Scaled,
    Encoded,
    Stored,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailOutcome {
    pub source: SourceLocator,
    pub destination: DestinationLocator,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    pub byte_count: usize,
}

impl fmt::Display for ThumbnailOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully resized {} and uploaded to {}",
            self.source, self.destination
        )
    }
}

/// Turns one stored object into one thumbnail.
///
/// The pipeline holds only read-only collaborators, so a single instance can serve concurrent
/// events. Decoding, resizing and encoding run on the blocking pool. Nothing is written to the
/// destination until the thumbnail is fully encoded.
pub struct ThumbnailPipeline {
    store: Arc<dyn ObjectStore>,
    rasterizer: Arc<dyn PageRasterizer>,
    decoder: Arc<dyn Decoder>,
    resizer: Arc<dyn Resizer>,
    encoder: Arc<dyn Encoder>,
    max_width: u32,
    max_height: u32,
    destination_suffix: String,
}

/// An encoded thumbnail, ready to upload.
struct Thumbnail {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

#[bon]
impl ThumbnailPipeline {
    #[builder]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        rasterizer: Arc<dyn PageRasterizer>,
        decoder: Option<Arc<dyn Decoder>>,
        resizer: Option<Arc<dyn Resizer>>,
        encoder: Option<Arc<dyn Encoder>>,
    ) -> Self {
        let engine = Arc::new(NativeImageEngine);
        Self {
            store,
            rasterizer,
            decoder: decoder.unwrap_or_else(|| engine.clone() as Arc<dyn Decoder>),
            resizer: resizer.unwrap_or_else(|| engine.clone() as Arc<dyn Resizer>),
            encoder: encoder.unwrap_or_else(|| engine as Arc<dyn Encoder>),
            max_width: MAX_WIDTH,
            max_height: MAX_HEIGHT,
            destination_suffix: DESTINATION_SUFFIX.to_string(),
        }
    }

    #[cfg(test)]
    fn with_destination_suffix(mut self, suffix: &str) -> Self {
        self.destination_suffix = suffix.to_string();
        self
    }

    fn resolve(&self, source: &SourceLocator) -> ThumbnailResult<DestinationLocator> {
        let file_type = classify(&source.key)?;
        resolve_with_suffix(source, file_type, &self.destination_suffix)
    }

    /// Handles a raw store notification: parses the first record and runs the pipeline on it.
    ///
    /// # Errors
    ///
    /// `MalformedEvent` if the payload has no usable record, otherwise any error of
    /// [`Self::process_source`].
    pub async fn process_event(
        &self,
        event: serde_json::Value,
    ) -> ThumbnailResult<ThumbnailOutcome> {
        debug!("Reading options from event: {event}");
        let source = NotificationEvent::from_value(event)
            .and_then(|event| event.source_locator())
            .inspect_err(|e| error!("Unable to read event: {e}"))?;
        self.process_source(source).await
    }

    /// Runs the pipeline for an already decoded source locator and logs the result.
    ///
    /// # Errors
    ///
    /// The first error of any stage. The destination is untouched unless the upload itself was
    /// attempted.
    pub async fn process_source(&self, source: SourceLocator) -> ThumbnailResult<ThumbnailOutcome> {
        let result = self.run(&source).await;
        match &result {
            Ok(outcome) => info!(
                stage = %PipelineStage::Done,
                source = %outcome.source,
                destination = %outcome.destination,
                width = outcome.width,
                height = outcome.height,
                "{outcome}"
            ),
            Err(e) => {
                let destination = self
                    .resolve(&source)
                    .map_or_else(|_| "-".to_string(), |d| d.to_string());
                error!(
                    source = %source,
                    destination = %destination,
                    stage = %e.stage(),
                    "Unable to resize {source} and upload to {destination} due to an error: {e}"
                );
            }
        }
        result
    }

    async fn run(&self, source: &SourceLocator) -> ThumbnailResult<ThumbnailOutcome> {
        let file_type = classify(&source.key)?;
        let destination = resolve_with_suffix(source, file_type, &self.destination_suffix)?;
        debug!(
            stage = %PipelineStage::Classified,
            %destination,
            "Classified {source} as {file_type}"
        );

        let object = self
            .store
            .get(&source.container, &source.key)
            .await
            .map_err(|e| ThumbnailError::FetchFailed(e.wrap_err(format!("fetching {source}"))))?;
        debug!(stage = %PipelineStage::Fetched, bytes = object.bytes.len(), "Fetched {source}");

        let RasterAsset {
            bytes,
            content_type,
            file_type: raster_type,
        } = normalize(
            object.bytes,
            file_type,
            object.content_type.as_deref(),
            self.rasterizer.as_ref(),
        )
        .await?;
        debug!(stage = %PipelineStage::Normalized, %content_type, "Normalized {source}");

        let thumbnail = self.render(bytes, raster_type).await?;
        debug!(
            stage = %PipelineStage::Encoded,
            bytes = thumbnail.bytes.len(),
            "Encoded thumbnail"
        );

        let Thumbnail {
            bytes,
            width,
            height,
        } = thumbnail;
        let byte_count = bytes.len();
        self.store
            .put(
                &destination.container,
                &destination.key,
                bytes,
                &content_type,
            )
            .await
            .map_err(|e| {
                ThumbnailError::UploadFailed(e.wrap_err(format!("uploading to {destination}")))
            })?;
        debug!(stage = %PipelineStage::Stored, "Stored {destination}");

        Ok(ThumbnailOutcome {
            source: source.clone(),
            destination,
            content_type,
            width,
            height,
            byte_count,
        })
    }

    /// Decodes, scales and encodes raster bytes on the blocking pool.
    async fn render(&self, raster: Vec<u8>, raster_type: FileType) -> ThumbnailResult<Thumbnail> {
        let decoder = Arc::clone(&self.decoder);
        let resizer = Arc::clone(&self.resizer);
        let encoder = Arc::clone(&self.encoder);
        let (max_width, max_height) = (self.max_width, self.max_height);

        let handle = task::spawn_blocking(move || -> ThumbnailResult<Thumbnail> {
            let image = decoder
                .decode(&raster)
                .map_err(ThumbnailError::MeasureFailed)?;
            let scale = compute_scale(image.width(), image.height(), max_width, max_height)?;
            let (width, height) = scale.pixel_size();
            debug!(
                stage = %PipelineStage::Scaled,
                factor = scale.factor,
                "Scaling {}x{} to {width}x{height}",
                image.width(),
                image.height()
            );

            let resized = resizer
                .resize(&image, width, height)
                .map_err(ThumbnailError::TransformFailed)?;
            let bytes = encoder
                .encode(&resized, raster_type.raster_format())
                .map_err(ThumbnailError::TransformFailed)?;
            Ok(Thumbnail {
                bytes,
                width,
                height,
            })
        });

        handle
            .await
            .map_err(|e| ThumbnailError::TransformFailed(eyre!(e).wrap_err("image task failed")))?
    }
}
