use std::path::PathBuf;

use thiserror::Error;

use crate::tag::Tag;

/// The error type for buffer and codec operations.
///
/// Every variant is fatal for the operation that produced it: nothing is retried
/// and a destination buffer touched by a failed codec holds no meaningful data.
#[derive(Debug, Error)]
pub enum Error {
    /// A read went past the end of the buffer.
    #[error("buffer empty: {requested} bytes requested at offset {offset}, {available} available")]
    BufferEmpty {
        offset: u32,
        requested: u32,
        available: u32,
    },
    /// A write went past the end of the buffer.
    #[error("buffer full: {requested} bytes requested at offset {offset}, {available} available")]
    BufferFull {
        offset: u32,
        requested: u32,
        available: u32,
    },
    /// A seek, skip or sub-buffer fell outside `[0, size]`.
    #[error("position {target} out of range for a buffer of {size} bytes")]
    OutOfRange { target: i64, size: u32 },
    /// Storage larger than a `u32` can address.
    #[error("{size} bytes don't fit in a buffer")]
    TooLarge { size: u64 },
    /// [Buffer::get_bits] or [Buffer::put_bits] asked for more than 32 bits.
    ///
    /// [Buffer::get_bits]: crate::Buffer::get_bits
    /// [Buffer::put_bits]: crate::Buffer::put_bits
    #[error("{0} bits don't fit in a code")]
    BitWidth(u8),
    /// [crate::Buffer::find] did not find the tag.
    #[error("tag {0} not found")]
    TagNotFound(Tag),
    /// A compressed stream or its header is not what the codec expects.
    #[error("data corruption: {0}")]
    DataCorruption(&'static str),
    /// The container asked for a compression method we don't know.
    #[error("unknown compression method {0}")]
    UnknownMethod(u32),
    /// A file could not be opened.
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An I/O error happened when loading or saving a buffer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
