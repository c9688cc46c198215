//! Compact configuration blobs
//!
//! A configuration document is serialised to JSON, zlib-compressed and
//! base64-encoded so it fits in a single environment variable.

use crate::error::{MopsError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use serde::{de::DeserializeOwned, Serialize};
use std::io::{Read, Write};

/// Encode a serialisable value into a blob
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    Ok(STANDARD.encode(compressed))
}

/// Decode a blob produced by [`encode`]
pub fn decode<T: DeserializeOwned>(blob: &str) -> Result<T> {
    let compressed = STANDARD
        .decode(blob.trim())
        .map_err(|e| MopsError::config_blob(format!("not base64: {}", e)))?;

    let mut json = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| MopsError::config_blob(format!("not zlib data: {}", e)))?;

    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blob_restores_document() {
        let config = json!({
            "status_manager": {
                "type": "chicane",
                "url": "http://chicane.local/status",
                "body": {"id": "transcoder", "type": "transcode"}
            }
        });

        let blob = encode(&config).unwrap();
        assert!(!blob.contains('{'));

        let decoded: serde_json::Value = decode(&blob).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode::<serde_json::Value>("%%%not-base64%%%").unwrap_err();
        assert!(matches!(err, MopsError::ConfigBlob(_)));

        // valid base64, not zlib
        let err = decode::<serde_json::Value>("aGVsbG8=").unwrap_err();
        assert!(matches!(err, MopsError::ConfigBlob(_)));
    }
}
