use crate::error::{ThumbnailError, ThumbnailResult};
use crate::file_type::FileType;
use std::fmt;

/// Appended to the source container to get the thumbnail container.
pub const DESTINATION_SUFFIX: &str = "-thumbnail";

/// Appended to the key of documents, which are always stored as PNG thumbnails.
const RASTERIZED_KEY_SUFFIX: &str = ".png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocator {
    pub container: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationLocator {
    pub container: String,
    pub key: String,
}

impl SourceLocator {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    /// Builds a locator from a key as delivered in a store notification, where spaces are
    /// sent as `+` and everything else non-ASCII is percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns `MalformedEvent` when the key is not a valid percent-encoding of UTF-8.
    pub fn from_encoded(container: &str, encoded_key: &str) -> ThumbnailResult<Self> {
        let key = decode_key(encoded_key)?;
        Ok(Self::new(container, key))
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

impl fmt::Display for DestinationLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Decodes a notification object key: `+` becomes a space, then percent-escapes are resolved.
///
/// # Errors
///
/// Returns `MalformedEvent` when a `%` is not followed by two hex digits, or when the decoded
/// bytes are not valid UTF-8.
pub fn decode_key(encoded_key: &str) -> ThumbnailResult<String> {
    let bytes = encoded_key.as_bytes();
    for (i, _) in encoded_key.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(ThumbnailError::MalformedEvent(format!(
                "object key has an invalid percent-escape at byte {i}: {encoded_key}"
            )));
        }
    }

    let spaced = encoded_key.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| {
            ThumbnailError::MalformedEvent(format!("object key is not valid UTF-8: {e}"))
        })
}

/// Derives where the thumbnail for `source` is written.
///
/// # Errors
///
/// Returns `SameLocation` if the destination container would be the source container.
pub fn resolve(
    source: &SourceLocator,
    source_type: FileType,
) -> ThumbnailResult<DestinationLocator> {
    resolve_with_suffix(source, source_type, DESTINATION_SUFFIX)
}

pub(crate) fn resolve_with_suffix(
    source: &SourceLocator,
    source_type: FileType,
    suffix: &str,
) -> ThumbnailResult<DestinationLocator> {
    let container = format!("{}{suffix}", source.container);
    if container == source.container {
        return Err(ThumbnailError::SameLocation { container });
    }

    let key = if source_type.is_document() {
        format!("{}{RASTERIZED_KEY_SUFFIX}", source.key)
    } else {
        source.key.clone()
    };

    Ok(DestinationLocator { container, key })
}
