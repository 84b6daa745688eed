use crate::capabilities::PageRasterizer;
use crate::error::{ThumbnailError, ThumbnailResult};
use crate::file_type::FileType;
use temp_dir::TempDir;
use tokio::fs;
use tracing::debug;

const DOCUMENT_FILE_NAME: &str = "source.pdf";
const PAGE_FILE_NAME: &str = "page-1.png";

/// Raster bytes ready for decoding, with the content type they will be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterAsset {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_type: FileType,
}

/// Turns fetched bytes into a raster asset. Raster input passes through untouched; documents
/// have their first page rendered to PNG.
///
/// Document rendering happens inside a fresh temporary directory owned by this call, which is
/// removed when the call returns, whether it succeeded or not.
///
/// # Errors
///
/// `WriteTempFailed`, `RasterizeFailed` or `ReadTempFailed` for documents. Raster input
/// cannot fail here.
pub async fn normalize(
    bytes: Vec<u8>,
    file_type: FileType,
    declared_content_type: Option<&str>,
    rasterizer: &dyn PageRasterizer,
) -> ThumbnailResult<RasterAsset> {
    if !file_type.is_document() {
        let content_type = declared_content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(file_type.mime_type())
            .to_string();
        return Ok(RasterAsset {
            bytes,
            content_type,
            file_type,
        });
    }

    let temp_dir = TempDir::new().map_err(ThumbnailError::WriteTempFailed)?;
    let input = temp_dir.child(DOCUMENT_FILE_NAME);
    let output = temp_dir.child(PAGE_FILE_NAME);

    fs::write(&input, &bytes)
        .await
        .map_err(ThumbnailError::WriteTempFailed)?;

    let rendered = rasterizer
        .rasterize_page(&input, &output)
        .await
        .map_err(ThumbnailError::RasterizeFailed)?;

    let png = fs::read(&rendered)
        .await
        .map_err(ThumbnailError::ReadTempFailed)?;
    debug!(
        "Rasterized {} byte document to {} byte page",
        bytes.len(),
        png.len()
    );

    Ok(RasterAsset {
        bytes: png,
        content_type: FileType::Png.mime_type().to_string(),
        file_type: FileType::Png,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use color_eyre::eyre::{Result, bail};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Writes fixed bytes as the "rendered" page and remembers where it worked.
    struct FakeRasterizer {
        page: Option<Vec<u8>>,
        seen_dirs: Mutex<Vec<PathBuf>>,
    }

    impl FakeRasterizer {
        fn new(page: Option<&[u8]>) -> Self {
            Self {
                page: page.map(<[u8]>::to_vec),
                seen_dirs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageRasterizer for FakeRasterizer {
        async fn rasterize_page(&self, input: &Path, output: &Path) -> Result<PathBuf> {
            assert_eq!(std::fs::read(input)?, b"%PDF-1.4 fake");
            if let Some(dir) = input.parent() {
                self.seen_dirs.lock().unwrap().push(dir.to_path_buf());
            }
            let Some(page) = &self.page else {
                bail!("renderer exploded");
            };
            std::fs::write(output, page)?;
            Ok(output.to_path_buf())
        }
    }

    #[tokio::test]
    async fn raster_input_is_passed_through() -> Result<()> {
        let rasterizer = FakeRasterizer::new(None);
        let asset = normalize(vec![1, 2, 3], FileType::Jpg, Some("image/jpeg"), &rasterizer).await?;
        assert_eq!(asset.bytes, vec![1, 2, 3]);
        assert_eq!(asset.content_type, "image/jpeg");
        assert_eq!(asset.file_type, FileType::Jpg);
        assert!(rasterizer.seen_dirs.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn missing_content_type_falls_back_to_extension() -> Result<()> {
        let rasterizer = FakeRasterizer::new(None);
        let asset = normalize(vec![0], FileType::Png, None, &rasterizer).await?;
        assert_eq!(asset.content_type, "image/png");
        Ok(())
    }

    #[tokio::test]
    async fn documents_become_png_and_temp_dir_is_removed() -> Result<()> {
        let rasterizer = FakeRasterizer::new(Some(b"png bytes"));
        let asset = normalize(
            b"%PDF-1.4 fake".to_vec(),
            FileType::Pdf,
            Some("application/pdf"),
            &rasterizer,
        )
        .await?;
        assert_eq!(asset.bytes, b"png bytes");
        assert_eq!(asset.content_type, "image/png");
        assert_eq!(asset.file_type, FileType::Png);

        let dirs = rasterizer.seen_dirs.lock().unwrap().clone();
        assert_eq!(dirs.len(), 1);
        assert!(!dirs[0].exists());
        Ok(())
    }

    #[tokio::test]
    async fn renderer_failure_cleans_up() -> Result<()> {
        let rasterizer = FakeRasterizer::new(None);
        let result = normalize(b"%PDF-1.4 fake".to_vec(), FileType::Pdf, None, &rasterizer).await;
        assert!(matches!(result, Err(ThumbnailError::RasterizeFailed(_))));

        let dirs = rasterizer.seen_dirs.lock().unwrap().clone();
        assert_eq!(dirs.len(), 1);
        assert!(!dirs[0].exists());
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_documents_use_separate_dirs() -> Result<()> {
        let rasterizer = FakeRasterizer::new(Some(b"png"));
        let (a, b) = tokio::join!(
            normalize(b"%PDF-1.4 fake".to_vec(), FileType::Pdf, None, &rasterizer),
            normalize(b"%PDF-1.4 fake".to_vec(), FileType::Pdf, None, &rasterizer),
        );
        a?;
        b?;
        let dirs = rasterizer.seen_dirs.lock().unwrap().clone();
        assert_eq!(dirs.len(), 2);
        assert_ne!(dirs[0], dirs[1]);
        Ok(())
    }
}
