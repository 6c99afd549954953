//! Streaming chunk contracts and in-memory stream utilities.
//!
//! ```rust
//! use gcontent::StreamChunk;
//! use gtransport::{BoxedChunkStream, VecChunkStream};
//!
//! let stream = VecChunkStream::new(vec![Ok(StreamChunk::text_delta(0, "hello"))]);
//! let _boxed: BoxedChunkStream<'static> = Box::pin(stream);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use gcontent::StreamChunk;

use crate::TransportError;

/// Transport stream contract.
///
/// Invariants for consumers:
/// - Chunks arrive in source order; the sequence is single-pass and
///   non-restartable.
/// - An `Err` item terminates the sequence; no chunk follows it.
/// - Once the stream yields `None`, it must not yield additional items.
pub trait ChunkStream: Stream<Item = Result<StreamChunk, TransportError>> + Send {}

impl<T> ChunkStream for T where T: Stream<Item = Result<StreamChunk, TransportError>> + Send {}

pub type BoxedChunkStream<'a> = Pin<Box<dyn ChunkStream + 'a>>;

#[derive(Debug)]
pub struct VecChunkStream {
    chunks: VecDeque<Result<StreamChunk, TransportError>>,
}

impl VecChunkStream {
    pub fn new(chunks: Vec<Result<StreamChunk, TransportError>>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }
}

impl Stream for VecChunkStream {
    type Item = Result<StreamChunk, TransportError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<StreamChunk, TransportError>>> {
        Poll::Ready(self.chunks.pop_front())
    }
}
