//! Encoding.

use crate::document::{ExportDocument, StoreImage};
use crate::error::{CodecError, CodecResult};
use serde::Serialize;

/// Encodes an export document as pretty-printed JSON.
pub fn encode_document<E: Serialize>(document: &ExportDocument<E>) -> CodecResult<Vec<u8>> {
    serde_json::to_vec_pretty(document).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Encodes a store image as compact JSON.
pub fn encode_image<E: Serialize>(image: &StoreImage<E>) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(image).map_err(|e| CodecError::encoding_failed(e.to_string()))
}
