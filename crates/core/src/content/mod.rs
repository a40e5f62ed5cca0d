//! Content decoding for loaded payloads
//!
//! Adapters hand back raw text plus a reported content kind; this module
//! turns that into a [`Document`]. The native format is JSON (including
//! octet-stream payloads that are JSON underneath); the legacy FreeMind XML
//! format is converted on the fly. Anything else is a fatal decode error.

pub mod freemind;

use mapvault_domain::{AdapterPayload, Document, MapVaultError, MimeKind, Result};

/// Decode a loaded payload into a document.
///
/// # Errors
/// Returns `Decode` for malformed JSON, malformed FreeMind XML, or an
/// unrecognised content kind.
pub fn decode_payload(payload: &AdapterPayload) -> Result<Document> {
    match &payload.mime {
        MimeKind::Json | MimeKind::OctetStream => serde_json::from_str(&payload.content)
            .map(Document::from_value)
            .map_err(|e| MapVaultError::Decode(format!("malformed document JSON: {e}"))),
        MimeKind::Freemind => freemind::import(&payload.content),
        MimeKind::Other(kind) => {
            Err(MapVaultError::Decode(format!("unrecognised content kind: {kind}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use mapvault_domain::FailureKind;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_native_json() {
        let payload = AdapterPayload::json(r#"{"id": 1, "title": "plan"}"#);
        let document = decode_payload(&payload).unwrap();
        assert_eq!(document.title(), Some("plan"));
    }

    #[test]
    fn octet_stream_is_parsed_as_json() {
        let payload =
            AdapterPayload::new(r#"{"id": 1, "title": "raw"}"#, MimeKind::OctetStream);
        let document = decode_payload(&payload).unwrap();
        assert_eq!(document.as_value(), &json!({"id": 1, "title": "raw"}));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let payload = AdapterPayload::json("{not json");
        let err = decode_payload(&payload).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DecodeError);
    }

    #[test]
    fn unknown_content_kind_is_a_decode_error() {
        let payload = AdapterPayload::new("<html/>", MimeKind::Other("text/html".to_string()));
        let err = decode_payload(&payload).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DecodeError);
        assert!(err.to_string().contains("text/html"));
    }
}
