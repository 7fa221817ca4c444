//! Lazy multipart decoding of the inbound request body.
//!
//! [`decode`] checks the declared content type and wraps the streaming body
//! in a [`PartStream`]. Parts are pulled one at a time; the bytes of a part
//! are only read when its consumer asks for them, and nothing after the last
//! requested part is ever buffered. The body is capped at the configured
//! size; a declared `Content-Length` over the cap is refused up front and an
//! undeclared overflow surfaces as a stream error while reading parts.

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::HeaderMap;
use http_body_util::Limited;
use multer::{Field, Multipart};

use crate::error::ExtractError;

pub struct PartStream {
    inner: Multipart<'static>,
}

impl PartStream {
    /// Next part in body order, or `None` once the closing boundary is reached.
    pub async fn next_part(&mut self) -> Result<Option<Field<'static>>, ExtractError> {
        Ok(self.inner.next_field().await?)
    }
}

/// Extract the boundary of any `multipart/*` media type.
pub fn parse_boundary(content_type: &str) -> Option<String> {
    let parsed: mime::Mime = content_type.parse().ok()?;
    if parsed.type_() != mime::MULTIPART {
        return None;
    }
    parsed
        .get_param(mime::BOUNDARY)
        .map(|b| b.as_str().trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

pub fn decode(headers: &HeaderMap, body: Body, max_body: usize) -> Result<PartStream, ExtractError> {
    let declared = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let Some(boundary) = parse_boundary(declared) else {
        return Err(ExtractError::NotMultipart {
            content_type: if declared.is_empty() {
                "none".into()
            } else {
                declared.to_string()
            },
        });
    };

    let declared_len = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    if let Some(length) = declared_len.filter(|len| *len > max_body as u64) {
        return Err(ExtractError::BodyTooLarge {
            length,
            limit: max_body,
        });
    }

    let limited = Body::new(Limited::new(body, max_body));
    Ok(PartStream {
        inner: Multipart::new(limited.into_data_stream(), boundary),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1_048_576;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn boundary_from_form_data() {
        assert_eq!(
            parse_boundary("multipart/form-data; boundary=abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn boundary_from_other_multipart_subtypes() {
        assert_eq!(
            parse_boundary("multipart/mixed; boundary=xyz").as_deref(),
            Some("xyz")
        );
    }

    #[test]
    fn missing_boundary_is_rejected() {
        assert!(parse_boundary("multipart/form-data").is_none());
    }

    #[test]
    fn non_multipart_is_rejected() {
        let err = decode(&headers("text/plain"), Body::empty(), LIMIT).err().unwrap();
        assert!(matches!(err, ExtractError::NotMultipart { ref content_type } if content_type == "text/plain"));
    }

    #[test]
    fn missing_content_type_is_rejected() {
        let err = decode(&HeaderMap::new(), Body::empty(), LIMIT).err().unwrap();
        assert!(matches!(err, ExtractError::NotMultipart { ref content_type } if content_type == "none"));
    }

    #[tokio::test]
    async fn yields_parts_in_body_order() {
        let body = "--b\r\n\
                    Content-Disposition: form-data; name=\"first\"\r\n\r\n\
                    one\r\n\
                    --b\r\n\
                    Content-Disposition: form-data; name=\"second\"\r\n\r\n\
                    two\r\n\
                    --b--\r\n";
        let mut parts = decode(
            &headers("multipart/form-data; boundary=b"),
            Body::from(body),
            LIMIT,
        )
        .unwrap();

        let first = parts.next_part().await.unwrap().unwrap();
        assert_eq!(first.name(), Some("first"));
        assert_eq!(first.bytes().await.unwrap(), "one");

        let second = parts.next_part().await.unwrap().unwrap();
        assert_eq!(second.name(), Some("second"));
        drop(second);

        assert!(parts.next_part().await.unwrap().is_none());
    }

    #[test]
    fn declared_length_over_limit_is_rejected() {
        let mut headers = headers("multipart/form-data; boundary=b");
        headers.insert(CONTENT_LENGTH, "2048".parse().unwrap());
        let err = decode(&headers, Body::empty(), 1024).err().unwrap();
        assert!(matches!(
            err,
            ExtractError::BodyTooLarge {
                length: 2048,
                limit: 1024
            }
        ));
    }

    #[tokio::test]
    async fn undeclared_overflow_fails_while_reading() {
        let body = format!(
            "--b\r\n\
             Content-Disposition: form-data; name=\"big\"\r\n\r\n\
             {}\r\n\
             --b--\r\n",
            "x".repeat(4096)
        );
        let mut parts = decode(
            &headers("multipart/form-data; boundary=b"),
            Body::from(body),
            1024,
        )
        .unwrap();

        let result = match parts.next_part().await {
            Ok(Some(field)) => field.bytes().await.map(|_| ()).map_err(ExtractError::from),
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        assert!(matches!(result, Err(ExtractError::Multipart(_))));
    }
}
