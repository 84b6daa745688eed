#![allow(clippy::missing_errors_doc)]

//! # Thumbnail Generation Crate
//!
//! Turns an object that just landed in a store container into a bounded-size thumbnail in a
//! sibling container.
//!
//! ## Pipeline
//!
//! Every event runs the same strictly ordered stages:
//!
//! 1. **Classify** the object key against the allow-list (`png`, `jpg`, `jpeg`, `pdf`).
//! 2. **Resolve** the destination: `<container>-thumbnail`, same key, `.png` appended for PDFs.
//! 3. **Fetch** the object from the [`ObjectStore`].
//! 4. **Normalize** it to raster bytes. PDFs have their first page rendered by a
//!    [`PageRasterizer`] inside a per-call temporary directory.
//! 5. **Measure** and **scale** to fit 296×296 without distortion.
//! 6. **Encode** to the resolved format and **upload**.
//!
//! The first failing stage aborts the run with a [`ThumbnailError`]. No destination write
//! happens before the last stage, so a failed run can simply be redelivered.
//!
//! ## Entry Points
//!
//! - [`ThumbnailPipeline::process_event`]: handle a raw store notification.
//! - [`ThumbnailPipeline::process_source`]: handle an already decoded [`SourceLocator`].

mod capabilities;
mod engine;
mod error;
mod event;
mod file_type;
mod ghostscript;
mod locator;
mod pipeline;
mod raster;
mod scale;

pub use capabilities::{Decoder, Encoder, ObjectStore, PageRasterizer, Resizer, StoredObject};
pub use engine::NativeImageEngine;
pub use error::{ThumbnailError, ThumbnailResult};
pub use event::NotificationEvent;
pub use file_type::{FileType, classify};
pub use ghostscript::{GhostscriptCommand, GhostscriptRasterizer};
pub use locator::{DESTINATION_SUFFIX, DestinationLocator, SourceLocator, decode_key, resolve};
pub use pipeline::{PipelineStage, ThumbnailOutcome, ThumbnailPipeline};
pub use raster::{RasterAsset, normalize};
pub use scale::{MAX_HEIGHT, MAX_WIDTH, ScaleResult, compute_scale};
