//! Gzip-compressed JSON codec.
//!
//! Encoding serializes a value to UTF-8 JSON, emitting every non-ASCII code
//! point literally (no `\uXXXX` escapes), then compresses the stream with
//! gzip. Decoding reverses both steps. The same codec is used for thread
//! objects and for the header object.

use std::io::Write;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};

/// Serialize `value` as JSON and gzip it.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let json = serde_json::to_vec(value).map_err(|e| CodecError::Serialize(e.to_string()))?;
    let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| CodecError::Compress(e.to_string()))?;
    encoder.finish().map_err(|e| CodecError::Compress(e.to_string()))
}

/// Gunzip `bytes` and parse the JSON inside.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    serde_json::from_reader(GzDecoder::new(bytes)).map_err(|e| {
        if e.is_io() {
            CodecError::Decompress(e.to_string())
        } else {
            CodecError::Malformed(e.to_string())
        }
    })
}
