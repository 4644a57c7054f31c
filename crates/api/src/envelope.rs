//! Response envelope decoding.
//!
//! Every backend response is wrapped:
//!
//! ```json
//! { "status": "success", "data": { ... }, "message": "optional" }
//! { "status": "success", "data": [ ... ], "meta": { "current_page": 1, "last_page": 3, "per_page": 15, "total": 42 } }
//! { "status": "error", "message": "Vendor already approved" }
//! ```
//!
//! Decoding works on raw bytes so it can be exercised without a server.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use souk_core::{PageMeta, Paginated};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    meta: Option<PageMeta>,
    #[serde(default)]
    errors: Option<BTreeMap<String, FieldErrors>>,
}

/// Laravel-style validators send a list per field; some endpoints send one string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldErrors {
    Many(Vec<String>),
    One(String),
}

impl FieldErrors {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Many(v) => v,
            Self::One(s) => vec![s],
        }
    }
}

/// Acknowledgement of a mutation that returns nothing worth keeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    /// Server confirmation text, when provided.
    pub message: Option<String>,
}

/// Turn an error response into an [`ApiError`].
pub(crate) fn error_from(status: u16, body: &[u8]) -> ApiError {
    let raw: Option<RawEnvelope> = serde_json::from_slice(body).ok();
    let (message, errors) = raw.map_or((None, None), |r| (r.message, r.errors));
    let message = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| ApiError::generic_message(status));

    match status {
        401 => ApiError::Unauthorized(message),
        404 => ApiError::NotFound(message),
        422 => ApiError::Validation {
            message,
            fields: errors
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v.into_vec()))
                .collect(),
        },
        _ => ApiError::Api { status, message },
    }
}

fn parse(status: u16, body: &[u8]) -> Result<RawEnvelope, ApiError> {
    if !(200..300).contains(&status) {
        return Err(error_from(status, body));
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RawEnvelope {
            status: None,
            message: None,
            data: None,
            meta: None,
            errors: None,
        });
    }

    let raw: RawEnvelope =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;

    if raw.status.as_deref() == Some("error") {
        let message = raw
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| ApiError::generic_message(status));
        return Err(ApiError::Api { status, message });
    }
    Ok(raw)
}

fn decode_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decode `{status, data, message?}` into `data`.
pub(crate) fn decode_data<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ApiError> {
    let raw = parse(status, body)?;
    let data = raw
        .data
        .ok_or_else(|| ApiError::Decode("response has no `data` field".to_string()))?;
    decode_value(data)
}

/// Decode `{status, data: [...], meta}` into a normalised page.
///
/// A response without `meta` is treated as a single complete page. Envelopes
/// that break the page invariants are corrected and logged.
pub(crate) fn decode_page<T: DeserializeOwned>(
    status: u16,
    body: &[u8],
) -> Result<Paginated<T>, ApiError> {
    let raw = parse(status, body)?;
    let items: Vec<T> = match raw.data {
        Some(value) => decode_value(value)?,
        None => Vec::new(),
    };

    let Some(meta) = raw.meta else {
        return Ok(Paginated::single_page(items));
    };

    let received = items.len();
    let (page, corrected) = Paginated::normalized(items, meta);
    if corrected {
        tracing::warn!(
            current_page = meta.current_page,
            last_page = meta.last_page,
            per_page = meta.per_page,
            received,
            "Paginated envelope violated its bounds, normalised"
        );
    }
    Ok(page)
}

/// Decode a mutation response, keeping only the message.
pub(crate) fn decode_ack(status: u16, body: &[u8]) -> Result<Ack, ApiError> {
    let raw = parse(status, body)?;
    Ok(Ack {
        message: raw.message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn test_error_uses_server_message() {
        let err = error_from(409, br#"{"status":"error","message":"Vendor already approved"}"#);
        assert!(matches!(
            err,
            ApiError::Api { status: 409, ref message } if message == "Vendor already approved"
        ));
    }

    #[test]
    fn test_error_falls_back_to_generic_message() {
        let err = error_from(500, b"<html>Internal Server Error</html>");
        assert_eq!(err.to_string(), "Request failed with status 500");

        let err = error_from(502, br#"{"message":"   "}"#);
        assert_eq!(err.to_string(), "Request failed with status 502");
    }

    #[test]
    fn test_status_specific_errors() {
        assert!(error_from(401, b"{}").is_unauthorized());
        assert!(matches!(error_from(404, b""), ApiError::NotFound(_)));

        let err = error_from(
            422,
            br#"{"message":"Invalid","errors":{"name":["required"],"code":"unknown"}}"#,
        );
        assert_eq!(err.field_error("name"), Some("required"));
        assert_eq!(err.field_error("code"), Some("unknown"));
    }

    #[test]
    fn test_error_status_inside_success_response() {
        let err = decode_data::<Item>(200, br#"{"status":"error","message":"Code expired"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Code expired");
    }

    #[test]
    fn test_decode_data() {
        let item: Item = decode_data(200, br#"{"status":"success","data":{"id":7}}"#).unwrap();
        assert_eq!(item, Item { id: 7 });

        let err = decode_data::<Item>(200, br#"{"status":"success"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_decode_page_normalises() {
        let body = br#"{"status":"success","data":[{"id":1},{"id":2},{"id":3}],
            "meta":{"current_page":4,"last_page":2,"per_page":2,"total":3}}"#;
        let page: Paginated<Item> = decode_page(200, body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.meta.current_page, 2);
    }

    #[test]
    fn test_decode_page_without_meta_is_single_page() {
        let page: Paginated<Item> =
            decode_page(200, br#"{"status":"success","data":[{"id":1}]}"#).unwrap();
        assert_eq!(page.meta.last_page, 1);
        assert_eq!(page.meta.total, 1);
    }

    #[test]
    fn test_decode_ack_accepts_empty_body() {
        assert_eq!(decode_ack(204, b"").unwrap(), Ack::default());
        let ack = decode_ack(200, br#"{"status":"success","message":"Vendor approved"}"#).unwrap();
        assert_eq!(ack.message.as_deref(), Some("Vendor approved"));
    }
}
