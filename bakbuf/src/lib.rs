//! Byte buffers and decompressors for the resource files of Betrayal at Krondor.
//!
//! The game's data files are sequences of tagged sections, and many resources inside
//! them are compressed with one of three schemes: LZW, LZSS or RLE. This crate provides
//! the [Buffer] those resources are read from and written to, the [Tag] lookups to find
//! sections, and a [Codec] for each compression scheme.
//!
//! Everything works on [Buffer]s, either owning their bytes ([FileBuffer]) or borrowing
//! them ([BufferView], [BufferViewMut]). Codecs read from a source cursor and write at a
//! destination cursor, and never allocate the destination themselves.
//!
//! # Examples
//!
//! ```
//! use bakbuf::{BufferView, CompressionMethod, FileBuffer, Tag};
//!
//! fn main() -> Result<(), bakbuf::Error> {
//!     // A RES: section holding "hello" run-length encoded.
//!     let file = [
//!         b'R', b'E', b'S', b':', 6, 0, 0, 0, 5, b'h', b'e', b'l', b'l', b'o',
//!     ];
//!     let buffer = BufferView::from_slice(&file)?;
//!
//!     let mut resource = buffer.find(Tag::RES)?;
//!     let mut data = FileBuffer::new(5);
//!     resource.decompress(&mut data, CompressionMethod::Rle)?;
//!
//!     assert_eq!(data.get_fixed_string(5)?, "hello");
//!     Ok(())
//! }
//! ```

pub mod buffer;
pub mod codec;
pub mod error;
mod io;
pub mod lzss;
pub mod lzw;
pub mod rle;
pub mod tag;

pub use buffer::{Buffer, BufferView, BufferViewMut, FileBuffer};
pub use byteorder::{BigEndian, ByteOrder, LittleEndian};
pub use codec::{compress, decompress, Codec, CompressionMethod, LZW_HEADER_MARKER};
pub use error::{Error, Result};
pub use tag::{Section, Sections, Tag};
