use lorem_core::ChunkPlan;

use crate::error::ApiError;

/// Validate streaming parameters and turn them into a chunk plan.
///
/// Negative lengths, chunk sizes below one and lengths above `max_length`
/// are rejected instead of producing a degenerate stream.
pub fn validate_stream_request(
    length: i64,
    chunk_size: i64,
    max_length: usize,
) -> Result<ChunkPlan, ApiError> {
    if length < 0 {
        return Err(ApiError::InvalidInput(format!(
            "length must not be negative (got {})",
            length
        )));
    }
    if chunk_size < 1 {
        return Err(ApiError::InvalidInput(format!(
            "chunkSize must be at least 1 (got {})",
            chunk_size
        )));
    }

    let length = usize::try_from(length)
        .map_err(|_| ApiError::InvalidInput(format!("length {} is out of range", length)))?;
    if length > max_length {
        return Err(ApiError::InvalidInput(format!(
            "length too large (max {} characters)",
            max_length
        )));
    }
    let chunk_size = usize::try_from(chunk_size).map_err(|_| {
        ApiError::InvalidInput(format!("chunkSize {} is out of range", chunk_size))
    })?;

    ChunkPlan::new(length, chunk_size).map_err(|e| ApiError::InvalidInput(e.to_string()))
}
