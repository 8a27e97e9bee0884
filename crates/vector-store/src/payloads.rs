use crate::error::{Result, VectorStoreError};
use serde::{Deserialize, Serialize};

pub const PAYLOADS_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct PayloadsRef<'a> {
    schema_version: u32,
    generation: u64,
    payloads: &'a [String],
}

#[derive(Deserialize)]
struct PersistedPayloads {
    schema_version: u32,
    generation: u64,
    payloads: Vec<String>,
}

#[derive(Deserialize)]
struct GenerationOnly {
    generation: u64,
}

pub fn encode_payloads(generation: u64, payloads: &[String]) -> Result<Vec<u8>> {
    let persisted = PayloadsRef {
        schema_version: PAYLOADS_SCHEMA_VERSION,
        generation,
        payloads,
    };
    Ok(serde_json::to_vec_pretty(&persisted)?)
}

/// Returns `(generation, payloads)`.
pub fn decode_payloads(bytes: &[u8]) -> Result<(u64, Vec<String>)> {
    let persisted: PersistedPayloads = serde_json::from_slice(bytes)
        .map_err(|e| VectorStoreError::corrupt(format!("payload artifact: {e}")))?;
    if persisted.schema_version != PAYLOADS_SCHEMA_VERSION {
        return Err(VectorStoreError::corrupt(format!(
            "unsupported payload schema_version {} (expected {PAYLOADS_SCHEMA_VERSION})",
            persisted.schema_version
        )));
    }
    Ok((persisted.generation, persisted.payloads))
}

/// Generation of a payload artifact whose other fields may not decode.
pub fn peek_payloads_generation(bytes: &[u8]) -> Option<u64> {
    serde_json::from_slice::<GenerationOnly>(bytes)
        .ok()
        .map(|p| p.generation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_keep_order() {
        let payloads = vec!["alpha".to_string(), "beta \"quoted\"".to_string()];
        let bytes = encode_payloads(3, &payloads).unwrap();
        let (generation, loaded) = decode_payloads(&bytes).unwrap();
        assert_eq!(generation, 3);
        assert_eq!(loaded, payloads);
    }

    #[test]
    fn rejects_unknown_schema_and_garbage() {
        let future = br#"{"schema_version": 9, "generation": 1, "payloads": []}"#;
        assert!(matches!(
            decode_payloads(future),
            Err(VectorStoreError::StoreCorrupt(_))
        ));
        assert!(decode_payloads(b"[\"bare\", \"array\"]").is_err());
        assert!(decode_payloads(b"not json").is_err());
    }

    #[test]
    fn generation_survives_an_unsupported_schema() {
        let future = br#"{"schema_version": 9, "generation": 12, "payloads": {}}"#;
        assert_eq!(peek_payloads_generation(future), Some(12));
        assert_eq!(peek_payloads_generation(b"not json"), None);
    }
}
