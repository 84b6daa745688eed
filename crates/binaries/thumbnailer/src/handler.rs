use crate::context::AppContext;
use generate_thumbnails::{ThumbnailError, ThumbnailOutcome, ThumbnailPipeline};
use lambda_runtime::{Error, LambdaEvent};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

/// What the function returns to the Lambda host on success.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HandlerResponse {
    pub message: String,
    pub source: String,
    pub destination: String,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
}

impl From<ThumbnailOutcome> for HandlerResponse {
    fn from(outcome: ThumbnailOutcome) -> Self {
        Self {
            message: outcome.to_string(),
            source: outcome.source.to_string(),
            destination: outcome.destination.to_string(),
            content_type: outcome.content_type,
            width: outcome.width,
            height: outcome.height,
        }
    }
}

pub async fn handle_event(
    pipeline: &ThumbnailPipeline,
    payload: Value,
) -> Result<HandlerResponse, ThumbnailError> {
    pipeline.process_event(payload).await.map(Into::into)
}

/// Lambda entry point. Failures are returned to the host so the invocation is recorded as
/// failed; whether it is redelivered is up to the host.
#[instrument(skip_all, fields(request_id = %event.context.request_id))]
pub async fn function_handler(
    event: LambdaEvent<Value>,
    context: &AppContext,
) -> Result<HandlerResponse, Error> {
    Ok(handle_event(&context.pipeline, event.payload).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use color_eyre::eyre::{Result, bail};
    use generate_thumbnails::{ObjectStore, PageRasterizer, StoredObject};
    use serde_json::json;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct EmptyStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for EmptyStore {
        async fn get(&self, container: &str, key: &str) -> Result<StoredObject> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            bail!("NoSuchKey: {container}/{key}")
        }

        async fn put(
            &self,
            _container: &str,
            _key: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct NoRasterizer;

    #[async_trait]
    impl PageRasterizer for NoRasterizer {
        async fn rasterize_page(&self, _input: &Path, _output: &Path) -> Result<PathBuf> {
            bail!("not available in tests")
        }
    }

    fn pipeline(store: &Arc<EmptyStore>) -> ThumbnailPipeline {
        ThumbnailPipeline::builder()
            .store(store.clone())
            .rasterizer(Arc::new(NoRasterizer))
            .build()
    }

    fn event(key: &str) -> Value {
        json!({
            "Records": [{ "s3": { "bucket": { "name": "uploads" }, "object": { "key": key } } }]
        })
    }

    #[tokio::test]
    async fn missing_object_is_reported() {
        let store = Arc::new(EmptyStore::default());
        let result = handle_event(&pipeline(&store), event("photo.jpg")).await;
        assert!(matches!(result, Err(ThumbnailError::FetchFailed(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsupported_type_never_touches_store() {
        let store = Arc::new(EmptyStore::default());
        let result = handle_event(&pipeline(&store), event("notes.txt")).await;
        assert!(matches!(result, Err(ThumbnailError::UnsupportedType { .. })));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }
}
