//! Selection of the JSON section of a multipart body.
//!
//! [`extract_metadata`] walks the parts in order and parses the first one
//! declared as `application/json`. Parts without a content type, or with
//! any other content type, are skipped without reading their bodies.

use axum::http::header::CONTENT_TYPE;
use serde_json::Value;

use super::multipart::PartStream;
use crate::error::ExtractError;

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Returns `Ok(None)` when the body has no JSON part at all.
pub async fn extract_metadata(
    parts: &mut PartStream,
    correlation_id: &str,
) -> Result<Option<Value>, ExtractError> {
    while let Some(part) = parts.next_part().await? {
        let Some(content_type) = part.headers().get(CONTENT_TYPE) else {
            tracing::warn!(
                correlation_id = %correlation_id,
                part = part.name().unwrap_or_default(),
                "parsed part did not contain a content type header"
            );
            continue;
        };

        if content_type.as_bytes() != JSON_MEDIA_TYPE.as_bytes() {
            tracing::warn!(
                correlation_id = %correlation_id,
                part = part.name().unwrap_or_default(),
                content_type = %String::from_utf8_lossy(content_type.as_bytes()),
                "parsed part not of type JSON"
            );
            continue;
        }

        let body = part.bytes().await?;
        let metadata = serde_json::from_slice(&body).map_err(ExtractError::MalformedJsonPart)?;
        tracing::info!(
            correlation_id = %correlation_id,
            bytes = body.len(),
            "parsed part of type JSON, stop parsing"
        );
        return Ok(Some(metadata));
    }

    Ok(None)
}
