//! Binary layout of the vector artifact.
//!
//! ```text
//! magic "DQV1" | dim: u32 LE | count: u64 LE | generation: u64 LE | count*dim f32 LE
//! ```

use crate::error::{Result, VectorStoreError};

const VECTORS_MAGIC: &[u8; 4] = b"DQV1";
const HEADER_LEN: usize = 4 + 4 + 8 + 8;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedVectors {
    pub dimension: usize,
    pub count: usize,
    pub generation: u64,
    /// Row-major, `count * dimension` values
    pub values: Vec<f32>,
}

pub fn encode_vectors(
    dimension: usize,
    count: usize,
    generation: u64,
    values: impl Iterator<Item = f32>,
) -> Result<Vec<u8>> {
    let dim = u32::try_from(dimension).map_err(|_| {
        VectorStoreError::InvalidConfig(format!("dimension {dimension} does not fit in u32"))
    })?;
    let mut out = Vec::with_capacity(HEADER_LEN + count * dimension * 4);
    out.extend_from_slice(VECTORS_MAGIC);
    out.extend_from_slice(&dim.to_le_bytes());
    out.extend_from_slice(&(count as u64).to_le_bytes());
    out.extend_from_slice(&generation.to_le_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    let expected = HEADER_LEN + count * dimension * 4;
    if out.len() != expected {
        return Err(VectorStoreError::InvalidConfig(format!(
            "encoded {} bytes, expected {expected}",
            out.len()
        )));
    }
    Ok(out)
}

pub fn decode_vectors(bytes: &[u8]) -> Result<DecodedVectors> {
    if bytes.len() < HEADER_LEN || &bytes[0..4] != VECTORS_MAGIC {
        return Err(VectorStoreError::corrupt("vector artifact has no valid header"));
    }
    let dimension = u32::from_le_bytes(read_array(bytes, 4)?) as usize;
    let count = usize::try_from(u64::from_le_bytes(read_array(bytes, 8)?))
        .map_err(|_| VectorStoreError::corrupt("vector count overflows usize"))?;
    let generation = u64::from_le_bytes(read_array(bytes, 16)?);

    let expected_len = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .and_then(|n| n.checked_add(HEADER_LEN))
        .ok_or_else(|| VectorStoreError::corrupt("vector artifact size overflows"))?;
    if bytes.len() != expected_len {
        return Err(VectorStoreError::corrupt(format!(
            "vector artifact is {} bytes, header implies {expected_len}",
            bytes.len()
        )));
    }

    let values = bytes[HEADER_LEN..]
        .chunks_exact(4)
        .map(|raw| f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
        .collect();

    Ok(DecodedVectors {
        dimension,
        count,
        generation,
        values,
    })
}

/// Generation stamped in a vector artifact header, ignoring the body.
pub fn peek_vectors_generation(bytes: &[u8]) -> Option<u64> {
    if bytes.len() < HEADER_LEN || &bytes[0..4] != VECTORS_MAGIC {
        return None;
    }
    read_array(bytes, 16).ok().map(u64::from_le_bytes)
}

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    bytes
        .get(offset..offset + N)
        .and_then(|raw| raw.try_into().ok())
        .ok_or_else(|| VectorStoreError::corrupt("truncated vector artifact header"))
}
