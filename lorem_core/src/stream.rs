//! Delayed chunk emission.
//!
//! Chunks are yielded strictly in order. After each chunk the stream
//! suspends for the configured delay before the next one is produced, so a
//! consumer sees the payload arrive incrementally. Dropping the stream stops
//! emission at the next suspension point.

use std::time::Duration;

use futures_core::Stream;

use crate::{split_chunks, ChunkPlan};

/// Pause between two emitted chunks.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(50);

impl ChunkPlan {
    /// Stream this plan's chunks as UTF-8 bytes, sleeping `delay` after each one.
    ///
    /// The payload is generated once when the stream is first polled; each
    /// chunk is copied out only when it is emitted.
    pub fn stream(&self, delay: Duration) -> impl Stream<Item = Vec<u8>> {
        let plan = *self;
        async_stream::stream! {
            let payload = plan.payload();
            for chunk in split_chunks(&payload, plan.chunk_size) {
                yield chunk.as_bytes().to_vec();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use std::time::Instant;

    #[tokio::test]
    async fn test_stream_preserves_order() {
        let plan = ChunkPlan::new(7, 3).unwrap();
        let emitted: Vec<Vec<u8>> = plan.stream(Duration::ZERO).collect().await;
        assert_eq!(
            emitted,
            vec![b"\nLo".to_vec(), b"rem".to_vec(), b" ".to_vec()]
        );
    }

    #[tokio::test]
    async fn test_stream_empty() {
        let plan = ChunkPlan::new(0, 10).unwrap();
        let emitted: Vec<Vec<u8>> = plan.stream(DEFAULT_CHUNK_DELAY).collect().await;
        assert!(emitted.is_empty());
    }

    #[tokio::test]
    async fn test_stream_waits_between_chunks() {
        let plan = ChunkPlan::new(30, 10).unwrap();
        let delay = Duration::from_millis(20);
        let start = Instant::now();
        let emitted: Vec<Vec<u8>> = plan.stream(delay).collect().await;
        assert_eq!(emitted.len(), 3);
        assert!(start.elapsed() >= delay * 3);
    }

    #[tokio::test]
    async fn test_stream_first_chunk_is_immediate() {
        let plan = ChunkPlan::new(20, 10).unwrap();
        let mut stream = Box::pin(plan.stream(Duration::from_secs(30)));
        let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("first chunk should not wait for the delay");
        assert_eq!(first.map(|b| b.len()), Some(10));
    }

    #[tokio::test]
    async fn test_large_plan_emits_first_chunks_without_draining() {
        let plan = ChunkPlan::new(1_000_000, 1).unwrap();
        let mut stream = Box::pin(plan.stream(Duration::ZERO));
        assert_eq!(stream.next().await, Some(b"\n".to_vec()));
        assert_eq!(stream.next().await, Some(b"L".to_vec()));
        assert_eq!(stream.next().await, Some(b"o".to_vec()));
    }

    #[tokio::test]
    async fn test_stream_reassembles_payload() {
        let plan = ChunkPlan::new(2500, 333).unwrap();
        let emitted: Vec<Vec<u8>> = plan.stream(Duration::ZERO).collect().await;
        assert_eq!(emitted.len(), plan.chunk_count());
        let joined = String::from_utf8(emitted.concat()).unwrap();
        assert_eq!(joined, plan.payload());
    }
}
