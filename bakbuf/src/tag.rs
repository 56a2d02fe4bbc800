//! Tagged sections of resource containers.
//!
//! A section is a four byte ASCII tag such as `RES:`, a little endian `u32` length whose
//! top bit flags a section that itself holds more sections, and then the payload.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::{
    buffer::{Buffer, BufferView},
    error::{Error, Result},
};

/// Set in a section's length when its payload is made of further sections.
pub const NESTED_FLAG: u32 = 0x8000_0000;

const HEADER_SIZE: usize = 8;

/// A section tag, stored as the little endian reading of its four ASCII bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u32);

impl Tag {
    pub const ADS: Tag = Tag::new(*b"ADS:");
    pub const APP: Tag = Tag::new(*b"APP:");
    pub const BIN: Tag = Tag::new(*b"BIN:");
    pub const BMP: Tag = Tag::new(*b"BMP:");
    pub const DAT: Tag = Tag::new(*b"DAT:");
    pub const FNT: Tag = Tag::new(*b"FNT:");
    pub const GID: Tag = Tag::new(*b"GID:");
    pub const INF: Tag = Tag::new(*b"INF:");
    pub const MAP: Tag = Tag::new(*b"MAP:");
    pub const PAG: Tag = Tag::new(*b"PAG:");
    pub const PAL: Tag = Tag::new(*b"PAL:");
    pub const RES: Tag = Tag::new(*b"RES:");
    pub const SCR: Tag = Tag::new(*b"SCR:");
    pub const SND: Tag = Tag::new(*b"SND:");
    pub const TAG: Tag = Tag::new(*b"TAG:");
    pub const TT3: Tag = Tag::new(*b"TT3:");
    pub const TTI: Tag = Tag::new(*b"TTI:");
    pub const VER: Tag = Tag::new(*b"VER:");
    pub const VGA: Tag = Tag::new(*b"VGA:");

    pub const fn new(ascii: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(ascii))
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// The tag as it appears in a file.
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl From<u32> for Tag {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Tag> for u32 {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        if bytes.iter().all(u8::is_ascii_graphic) {
            bytes.iter().try_for_each(|&byte| write!(f, "{}", byte as char))
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

/// One section found by [Buffer::sections].
#[derive(Debug, Clone)]
pub struct Section<'a> {
    pub tag: Tag,
    /// The payload is a sequence of sections, see [Buffer::sections].
    pub nested: bool,
    pub data: BufferView<'a>,
}

impl<S> Buffer<S>
where
    S: AsRef<[u8]>,
{
    /// Looks for the first occurrence of `tag` anywhere in the buffer and returns a view
    /// over its payload. The cursor doesn't move.
    ///
    /// The search is a plain byte scan: it doesn't walk the section structure, so a tag
    /// nested inside another section is found too.
    pub fn find(&self, tag: Tag) -> Result<BufferView<'_>> {
        let data = self.as_slice();
        let needle = tag.to_bytes();
        // A tag in the last four bytes has no room for its length and doesn't count.
        let position = data
            .windows(needle.len())
            .take(data.len().saturating_sub(needle.len()))
            .position(|window| window == needle)
            .ok_or(Error::TagNotFound(tag))?;

        let header = position + needle.len();
        if data.len() - header < 4 {
            return Err(Error::BufferEmpty {
                offset: header as u32,
                requested: 4,
                available: (data.len() - header) as u32,
            });
        }
        let length = (LittleEndian::read_u32(&data[header..]) & !NESTED_FLAG) as usize;

        let start = header + 4;
        if data.len() - start < length {
            return Err(Error::BufferEmpty {
                offset: start as u32,
                requested: length as u32,
                available: (data.len() - start) as u32,
            });
        }
        log::trace!("found {tag} at {position}, {length} bytes");
        Ok(BufferView::with_storage(&data[start..start + length]))
    }

    /// Walks the sections laid out back to back from the cursor onwards. The cursor
    /// doesn't move.
    pub fn sections(&self) -> Sections<'_> {
        Sections {
            data: self.remaining(),
            position: 0,
            failed: false,
        }
    }
}

/// Iterator over consecutive sections, see [Buffer::sections].
///
/// A truncated section yields one error and ends the iteration.
#[derive(Debug, Clone)]
pub struct Sections<'a> {
    data: &'a [u8],
    position: usize,
    failed: bool,
}

impl<'a> Sections<'a> {
    fn truncated(&mut self, requested: usize) -> Error {
        self.failed = true;
        Error::BufferEmpty {
            offset: self.position as u32,
            requested: requested as u32,
            available: (self.data.len() - self.position) as u32,
        }
    }
}

impl<'a> Iterator for Sections<'a> {
    type Item = Result<Section<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.data.len() {
            return None;
        }

        let rest = &self.data[self.position..];
        if rest.len() < HEADER_SIZE {
            return Some(Err(self.truncated(HEADER_SIZE)));
        }
        let tag = Tag(LittleEndian::read_u32(&rest[..4]));
        let raw_length = LittleEndian::read_u32(&rest[4..HEADER_SIZE]);
        let length = (raw_length & !NESTED_FLAG) as usize;
        if rest.len() - HEADER_SIZE < length {
            return Some(Err(self.truncated(HEADER_SIZE + length)));
        }

        let data = BufferView::with_storage(&rest[HEADER_SIZE..HEADER_SIZE + length]);
        self.position += HEADER_SIZE + length;
        Some(Ok(Section {
            tag,
            nested: raw_length & NESTED_FLAG != 0,
            data,
        }))
    }
}
