//! Variable width LZW, as found in the game's resource files.
//!
//! Codes are packed least significant bit first, starting 9 bits wide and growing up
//! to 12. Codes 0 to 255 are literals and 256 clears the dictionary. A clear code is
//! followed by padding up to the end of the current group of eight codes, counted from
//! the last width change.

use crate::{buffer::Buffer, codec::Codec, error::Result};

mod decoder;
mod encoder;

/// Width of the first codes, and of the codes following a clear.
pub const INITIAL_CODE_SIZE: u8 = 9;
/// Codes never get wider than this.
pub const MAX_CODE_SIZE: u8 = 12;
/// Resets the dictionary.
pub const CLEAR_CODE: u16 = 256;

const FIRST_FREE_CODE: u16 = 257;
const TABLE_SIZE: usize = 1 << MAX_CODE_SIZE;

/// The LZW codec. See the [module documentation](self).
///
/// # Examples
///
/// ```
/// use bakbuf::{lzw::Lzw, Codec};
///
/// let compressed = Lzw::encode_to_vec(b"ABAB").unwrap();
/// assert_eq!(compressed, [0x41, 0x84, 0x04, 0x04]);
///
/// let decompressed = Lzw::decode_to_vec(&compressed, 4).unwrap();
/// assert_eq!(decompressed, b"ABAB");
/// ```
pub struct Lzw;

impl Codec for Lzw {
    fn encode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
    where
        S: AsRef<[u8]>,
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        encoder::encode(src, dst)
    }

    fn decode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
    where
        S: AsRef<[u8]>,
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        decoder::decode(src, dst)
    }

    fn max_encoded_len(len: usize) -> usize {
        // At worst one 12 bit code per byte, plus the padding after each clear.
        len * 3 / 2 + (len / 1024 + 1) * 2 * MAX_CODE_SIZE as usize + 4
    }
}

/// Bytes of padding after a clear code, once the bit cursor has been moved to the next
/// byte boundary. `bit_count` counts the bits written at the current width, clear
/// code included.
pub(crate) fn clear_padding(bit_count: u32, code_size: u8) -> u32 {
    let group = code_size as u32 * 8;
    (bit_count.div_ceil(group) * group - bit_count) >> 3
}
