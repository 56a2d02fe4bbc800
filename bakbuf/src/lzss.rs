//! LZSS with absolute back-references.
//!
//! Output comes in groups of up to eight units behind a control byte, whose bits, least
//! significant first, tell each unit apart: a set bit is one literal byte, a clear bit
//! a match of three bytes, `position` as a little endian `u16` and `length - MIN_MATCH`.
//! `position` counts from the start of the decompressed data, not back from the cursor.

use std::collections::HashMap;

use log::debug;

use crate::{
    buffer::Buffer,
    codec::{finish, Codec},
    error::{Error, Result},
};

/// Shorter repeats are cheaper as literals.
pub const MIN_MATCH: usize = 5;
/// Longest length a match can encode.
pub const MAX_MATCH: usize = MIN_MATCH + u8::MAX as usize;
/// Matches have to start within the first 64 KiB of the data.
pub const MAX_POSITION: usize = u16::MAX as usize;

/// The LZSS codec. See the [module documentation](self).
///
/// # Examples
///
/// ```
/// use bakbuf::{lzss::Lzss, Codec};
///
/// let compressed = Lzss::encode_to_vec(b"abcdeXabcde").unwrap();
/// assert_eq!(compressed, [0x3f, b'a', b'b', b'c', b'd', b'e', b'X', 0, 0, 0]);
///
/// let decompressed = Lzss::decode_to_vec(&compressed, 11).unwrap();
/// assert_eq!(decompressed, b"abcdeXabcde");
/// ```
pub struct Lzss;

const NO_POSITION: usize = usize::MAX;

/// Finds earlier occurrences through hash chains keyed on their first three bytes.
/// Only positions a match can refer to, up to [MAX_POSITION], are indexed.
struct MatchFinder<'a> {
    window: &'a [u8],
    head: HashMap<[u8; 3], usize>,
    previous: Vec<usize>,
    indexed: usize,
}

impl<'a> MatchFinder<'a> {
    fn new(window: &'a [u8]) -> Self {
        Self {
            window,
            head: HashMap::new(),
            previous: vec![NO_POSITION; window.len().min(MAX_POSITION + 1)],
            indexed: 0,
        }
    }

    fn key(&self, position: usize) -> Option<[u8; 3]> {
        self.window
            .get(position..position + 3)
            .map(|bytes| [bytes[0], bytes[1], bytes[2]])
    }

    fn index_up_to(&mut self, current: usize) {
        while self.indexed < current.min(MAX_POSITION + 1) {
            if let Some(key) = self.key(self.indexed) {
                if let Some(previous) = self.head.insert(key, self.indexed) {
                    self.previous[self.indexed] = previous;
                }
            }
            self.indexed += 1;
        }
    }

    /// Longest earlier occurrence of the bytes at `current`, the closest one on ties.
    fn longest_match(&mut self, current: usize) -> Option<(usize, usize)> {
        self.index_up_to(current);
        let key = self.key(current)?;
        let limit = self.window.len().min(current + MAX_MATCH);
        let lookahead = &self.window[current..limit];

        let mut best: Option<(usize, usize)> = None;
        let mut candidate = self.head.get(&key).copied();
        while let Some(position) = candidate {
            let length = self.window[position..]
                .iter()
                .zip(lookahead)
                .take_while(|(a, b)| a == b)
                .count();
            if best.map_or(true, |(_, best_length)| length > best_length) {
                best = Some((position, length));
                if length == lookahead.len() {
                    break;
                }
            }
            candidate = match self.previous[position] {
                NO_POSITION => None,
                previous => Some(previous),
            };
        }
        best
    }
}

impl Codec for Lzss {
    fn encode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
    where
        S: AsRef<[u8]>,
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        let window = src.remaining();
        let mut finder = MatchFinder::new(window);
        let mut current = 0;
        let mut control = 0u8;
        let mut mask = 0u8;
        let mut control_position = None;

        while current < window.len() {
            if mask == 0 {
                if let Some(position) = control_position {
                    dst.patch_u8(position, control)?;
                }
                control_position = Some(dst.tell());
                dst.put_u8(0)?;
                control = 0;
                mask = 1;
            }

            match finder.longest_match(current) {
                Some((position, length)) if length >= MIN_MATCH => {
                    dst.put_u16_le(position as u16)?;
                    dst.put_u8((length - MIN_MATCH) as u8)?;
                    current += length;
                }
                _ => {
                    control |= mask;
                    dst.put_u8(window[current])?;
                    current += 1;
                }
            }
            mask <<= 1;
        }

        if let Some(position) = control_position {
            dst.patch_u8(position, control)?;
        }
        debug!("lzss: {current} bytes in, {} bytes out", dst.tell());

        src.seek(src.size())?;
        Ok(finish(dst))
    }

    fn decode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
    where
        S: AsRef<[u8]>,
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        let start = dst.tell();
        let mut control = 0u8;
        let mut mask = 0u8;

        while !src.at_end() && !dst.at_end() {
            if mask == 0 {
                control = src.get_u8()?;
                mask = 1;
            }

            if control & mask != 0 {
                dst.put_u8(src.get_u8()?)?;
            } else {
                let position = start + src.get_u16_le()? as u32;
                let length = src.get_u8()? as u32 + MIN_MATCH as u32;
                if position >= dst.tell() {
                    return Err(Error::DataCorruption(
                        "LZSS match starts past the decompressed data",
                    ));
                }
                dst.repeat_from(position, length)?;
            }
            mask <<= 1;
        }

        Ok(finish(dst))
    }

    fn max_encoded_len(len: usize) -> usize {
        len + len / 8 + 1
    }
}
