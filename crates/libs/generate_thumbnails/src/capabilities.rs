//! The collaborators the pipeline drives but does not implement itself.
//!
//! Each trait is deliberately narrow so the pipeline can be exercised with stubs. The
//! production implementations are [`NativeImageEngine`](crate::engine::NativeImageEngine)
//! for decode/resize/encode, [`GhostscriptRasterizer`](crate::ghostscript::GhostscriptRasterizer)
//! for documents, and an S3 client in the `thumbnailer` binary.

use async_trait::async_trait;
use color_eyre::Result;
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};

/// An object as returned by [`ObjectStore::get`].
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, container: &str, key: &str) -> Result<StoredObject>;

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<()>;
}

#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Renders the first page of the document at `input` to a PNG at `output`, returning the
    /// path that was written.
    async fn rasterize_page(&self, input: &Path, output: &Path) -> Result<PathBuf>;
}

pub trait Decoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;
}

pub trait Resizer: Send + Sync {
    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage>;
}

pub trait Encoder: Send + Sync {
    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>>;
}
