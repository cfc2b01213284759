//! Data-URL decoding for upload bodies

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use bytes::Bytes;

// Browsers and viem both emit unpadded base64 in data URLs, so padding is
// accepted either way.
const DATA_URL_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// MIME type and raw bytes split out of a data URL
#[derive(Debug, Clone)]
pub struct DecodedDataUrl {
    pub mime: String,
    pub bytes: Bytes,
}

/// Split a `data:<mime>;base64,<payload>` URL into its MIME type and bytes.
/// Returns `None` for anything malformed.
pub fn data_url_to_bytes(data_url: &str) -> Option<DecodedDataUrl> {
    let rest = data_url.strip_prefix("data:")?;
    let (head, payload) = rest.split_once(',')?;

    let mime = head.split(';').next()?;
    if mime.is_empty() {
        return None;
    }

    let bytes = DATA_URL_BASE64.decode(payload).ok()?;

    Some(DecodedDataUrl {
        mime: mime.to_string(),
        bytes: Bytes::from(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mime_and_payload() {
        let decoded = data_url_to_bytes("data:image/jpeg;base64,aGVsbG8=").unwrap();
        assert_eq!(decoded.mime, "image/jpeg");
        assert_eq!(decoded.bytes.as_ref(), b"hello");
    }

    #[test]
    fn accepts_unpadded_payloads() {
        let decoded = data_url_to_bytes("data:image/png;base64,aGVsbG8").unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.bytes.as_ref(), b"hello");
    }

    #[test]
    fn rejects_malformed_urls() {
        assert!(data_url_to_bytes("image/jpeg;base64,aGVsbG8=").is_none());
        assert!(data_url_to_bytes("data:image/jpeg;base64").is_none());
        assert!(data_url_to_bytes("data:;base64,aGVsbG8=").is_none());
        assert!(data_url_to_bytes("data:image/jpeg;base64,!!!").is_none());
    }
}
