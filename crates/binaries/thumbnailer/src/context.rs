use crate::s3_store::S3ObjectStore;
use app_state::{RasterizerSettings, ThumbnailerSettings};
use generate_thumbnails::{GhostscriptRasterizer, ThumbnailPipeline};
use std::sync::Arc;

/// Process-wide state, built once before the first event is served.
pub struct AppContext {
    pub pipeline: ThumbnailPipeline,
}

impl AppContext {
    pub async fn new(settings: &ThumbnailerSettings) -> Self {
        let store = S3ObjectStore::from_settings(&settings.aws).await;
        let pipeline = ThumbnailPipeline::builder()
            .store(Arc::new(store))
            .rasterizer(Arc::new(rasterizer_from_settings(&settings.rasterizer)))
            .build();
        Self { pipeline }
    }
}

#[must_use]
pub fn rasterizer_from_settings(settings: &RasterizerSettings) -> GhostscriptRasterizer {
    GhostscriptRasterizer {
        executable: settings.executable.clone(),
        device: settings.device.clone(),
        resolution: settings.resolution,
        fail_on_stderr: settings.fail_on_stderr,
    }
}
