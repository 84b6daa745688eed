#![allow(clippy::missing_errors_doc)]

pub mod context;
pub mod handler;
pub mod logging;
pub mod s3_store;
