//! Placeholder text generation for the chunked streaming endpoint.
//!
//! A request asks for `length` characters delivered in runs of
//! `chunk_size`. The payload is the embedded [`SOURCE_TEXT`] repeated until
//! it covers `length` and then cut to exactly that many characters. The
//! payload is split lazily by [`split_chunks`] and a [`ChunkPlan`] emits its
//! chunks one by one through [`ChunkPlan::stream`].

pub mod stream;

use std::num::NonZeroUsize;

use thiserror::Error;

pub use stream::DEFAULT_CHUNK_DELAY;

/// Default number of characters in a generated payload.
pub const DEFAULT_LENGTH: usize = 1000;
/// Default number of characters per emitted chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Filler text every payload is cut from.
pub const SOURCE_TEXT: &str = "
Lorem ipsum dolor sit amet, consectetur adipiscing elit. Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est laborum.

Sed ut perspiciatis unde omnis iste natus error sit voluptatem accusantium doloremque laudantium, totam rem aperiam, eaque ipsa quae ab illo inventore veritatis et quasi architecto beatae vitae dicta sunt explicabo. Nemo enim ipsam voluptatem quia voluptas sit aspernatur aut odit aut fugit, sed quia consequuntur magni dolores eos qui ratione voluptatem sequi nesciunt. Neque porro quisquam est, qui dolorem ipsum quia dolor sit amet, consectetur, adipisci velit, sed quia non numquam eius modi tempora incidunt ut labore et dolore magnam aliquam quaerat voluptatem. Ut enim ad minima veniam, quis nostrum exercitationem ullam corporis suscipit laboriosam, nisi ut aliquid ex ea commodi consequatur? Quis autem vel eum iure reprehenderit qui in ea voluptate velit esse quam nihil molestiae consequatur, vel illum qui dolorem eum fugiat quo voluptas nulla pariatur?

At vero eos et accusamus et iusto odio dignissimos ducimus qui blanditiis praesentium voluptatum deleniti atque corrupti quos dolores et quas molestias excepturi sint occaecati cupiditate non provident, similique sunt in culpa qui officia deserunt mollit anim id est laborum et dolorum fuga. Et harum quidem rerum facilis est et expedita distinctio. Nam libero tempore, cum soluta nobis est eligendi optio cumque nihil impedit quo minus id quod maxime placeat facere possimus, omnis voluptas assumenda est, omnis dolor repellendus. Temporibus autem quibusdam et aut officiis debitis aut rerum necessitatibus saepe eveniet ut et voluptates repudiandae sint et molestiae non recusandae. Itaque earum rerum hic tenetur a sapiente delectus, ut aut reiciendis voluptatibus maiores alias consequatur aut perferendis doloribus asperiores repellat.
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk size must be at least 1")]
    ZeroChunkSize,
}

/// Number of characters in [`SOURCE_TEXT`].
pub fn source_len() -> usize {
    SOURCE_TEXT.chars().count()
}

/// How many copies of the source text are needed to cover `length` characters.
pub fn repetitions_for(length: usize) -> usize {
    length.div_ceil(source_len())
}

/// Build a payload of exactly `length` characters from the source text.
pub fn generate_payload(length: usize) -> String {
    let mut payload = SOURCE_TEXT.repeat(repetitions_for(length));
    if let Some((cut, _)) = payload.char_indices().nth(length) {
        payload.truncate(cut);
    }
    payload
}

/// Split `payload` into successive runs of `chunk_size` characters.
///
/// The last chunk may be shorter. An empty payload yields no chunks. Chunks
/// borrow from `payload`, nothing is copied until a caller asks for it.
pub fn split_chunks(payload: &str, chunk_size: NonZeroUsize) -> Chunks<'_> {
    Chunks {
        rest: payload,
        chunk_size: chunk_size.get(),
    }
}

/// Iterator over the chunks of a payload, see [`split_chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    chunk_size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let cut = self
            .rest
            .char_indices()
            .nth(self.chunk_size)
            .map_or(self.rest.len(), |(idx, _)| idx);
        let (chunk, rest) = self.rest.split_at(cut);
        self.rest = rest;
        Some(chunk)
    }
}

/// Validated parameters of one streaming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    length: usize,
    chunk_size: NonZeroUsize,
}

impl Default for ChunkPlan {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            chunk_size: NonZeroUsize::new(DEFAULT_CHUNK_SIZE).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl ChunkPlan {
    pub fn new(length: usize, chunk_size: usize) -> Result<Self, ChunkError> {
        let chunk_size = NonZeroUsize::new(chunk_size).ok_or(ChunkError::ZeroChunkSize)?;
        Ok(Self { length, chunk_size })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.get()
    }

    /// Number of chunks the plan produces, zero for an empty payload.
    pub fn chunk_count(&self) -> usize {
        self.length.div_ceil(self.chunk_size.get())
    }

    pub fn payload(&self) -> String {
        generate_payload(self.length)
    }
}
