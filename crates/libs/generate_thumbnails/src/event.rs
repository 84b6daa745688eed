use crate::error::{ThumbnailError, ThumbnailResult};
use crate::locator::SourceLocator;
use serde::Deserialize;
use tracing::warn;

/// The subset of an object-created notification the pipeline reads.
#[derive(Debug, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationRecord {
    pub s3: Option<StoreEntity>,
}

#[derive(Debug, Deserialize)]
pub struct StoreEntity {
    pub bucket: Option<Container>,
    pub object: Option<Object>,
}

#[derive(Debug, Deserialize)]
pub struct Container {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Object {
    pub key: Option<String>,
}

impl NotificationEvent {
    /// # Errors
    ///
    /// Returns `MalformedEvent` if the payload does not have the notification shape.
    pub fn from_value(value: serde_json::Value) -> ThumbnailResult<Self> {
        serde_json::from_value(value).map_err(|e| ThumbnailError::MalformedEvent(e.to_string()))
    }

    /// Extracts and decodes the source locator of the first record.
    ///
    /// # Errors
    ///
    /// Returns `MalformedEvent` when there is no record, the container name or object key is
    /// missing or empty, or the key does not decode to UTF-8.
    pub fn source_locator(&self) -> ThumbnailResult<SourceLocator> {
        let Some(record) = self.records.first() else {
            return Err(malformed("event has no records"));
        };
        if self.records.len() > 1 {
            warn!(
                "Event carries {} records, only the first is processed",
                self.records.len()
            );
        }

        let entity = record.s3.as_ref().ok_or_else(|| malformed("record has no s3 entity"))?;
        let container = entity
            .bucket
            .as_ref()
            .and_then(|b| b.name.as_deref())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| malformed("record has no bucket name"))?;
        let key = entity
            .object
            .as_ref()
            .and_then(|o| o.key.as_deref())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| malformed("record has no object key"))?;

        SourceLocator::from_encoded(container, key)
    }
}

fn malformed(reason: &str) -> ThumbnailError {
    ThumbnailError::MalformedEvent(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(bucket: &str, key: &str) -> serde_json::Value {
        json!({
            "Records": [{
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": bucket, "arn": format!("arn:aws:s3:::{bucket}") },
                    "object": { "key": key, "size": 1024 }
                }
            }]
        })
    }

    #[test]
    fn parses_first_record() -> color_eyre::Result<()> {
        let parsed = NotificationEvent::from_value(event("uploads", "holiday/my+photo%C3%A9.jpg"))?;
        let source = parsed.source_locator()?;
        assert_eq!(source.container, "uploads");
        assert_eq!(source.key, "holiday/my photoé.jpg");
        Ok(())
    }

    #[test]
    fn missing_fields_are_malformed() {
        let cases = [
            json!({}),
            json!({ "Records": [] }),
            json!({ "Records": [{}] }),
            json!({ "Records": [{ "s3": { "object": { "key": "a.jpg" } } }] }),
            json!({ "Records": [{ "s3": { "bucket": { "name": "b" } } }] }),
            json!({
                "Records": [{ "s3": { "bucket": { "name": "" }, "object": { "key": "a.jpg" } } }]
            }),
        ];
        for case in cases {
            let result =
                NotificationEvent::from_value(case.clone()).and_then(|e| e.source_locator());
            assert!(
                matches!(result, Err(ThumbnailError::MalformedEvent(_))),
                "{case} should be malformed"
            );
        }
    }

    #[test]
    fn wrong_types_are_malformed() {
        let result = NotificationEvent::from_value(json!({ "Records": "nope" }));
        assert!(matches!(result, Err(ThumbnailError::MalformedEvent(_))));
    }
}
