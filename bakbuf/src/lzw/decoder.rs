use log::trace;

use super::{clear_padding, CLEAR_CODE, FIRST_FREE_CODE, INITIAL_CODE_SIZE, MAX_CODE_SIZE, TABLE_SIZE};
use crate::{
    buffer::Buffer,
    codec::finish,
    error::{Error, Result},
};

#[derive(Debug, Clone, Copy, Default)]
struct Word {
    prefix: u16,
    k: u8,
}

/// Dictionary words as (prefix code, last byte) pairs. Expanding a word walks the
/// prefixes, so its bytes come out backwards and go through `stack` first.
struct CodeTable {
    words: Vec<Word>,
    stack: Vec<u8>,
}

impl CodeTable {
    fn new() -> Self {
        Self {
            words: vec![Word::default(); TABLE_SIZE],
            stack: Vec::with_capacity(TABLE_SIZE),
        }
    }

    #[inline]
    fn insert(&mut self, code: u16, prefix: u16, k: u8) {
        self.words[code as usize] = Word { prefix, k };
    }

    /// Writes the word for `code` and returns its first byte.
    ///
    /// `code` may be the one about to be defined, in which case it stands for the
    /// previous word followed by its own first byte.
    fn push_to_stream<D>(
        &mut self,
        code: u16,
        previous: u16,
        last_byte: u8,
        next_code: u16,
        into: &mut Buffer<D>,
    ) -> Result<u8>
    where
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.stack.clear();
        let mut code = code;
        if code >= next_code {
            if code > next_code {
                return Err(Error::DataCorruption("LZW code not yet in the dictionary"));
            }
            self.stack.push(last_byte);
            code = previous;
        }

        while code >= CLEAR_CODE {
            if self.stack.len() >= TABLE_SIZE {
                return Err(Error::DataCorruption("LZW word loops on itself"));
            }
            let word = self.words[code as usize];
            self.stack.push(word.k);
            code = word.prefix;
        }
        let first = code as u8;
        self.stack.push(first);

        while let Some(k) = self.stack.pop() {
            into.put_u8(k)?;
        }
        Ok(first)
    }
}

pub(super) fn decode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
where
    S: AsRef<[u8]>,
    D: AsRef<[u8]> + AsMut<[u8]>,
{
    if dst.at_end() {
        return Ok(finish(dst));
    }

    let mut table = CodeTable::new();
    let mut code_size = INITIAL_CODE_SIZE;
    let mut next_code = FIRST_FREE_CODE;
    let mut bit_count = 0u32;

    let first = src.get_bits(code_size)? as u16;
    if first >= CLEAR_CODE {
        return Err(Error::DataCorruption("LZW stream doesn't start with a literal"));
    }
    let mut previous = first;
    let mut last_byte = first as u8;
    dst.put_u8(last_byte)?;

    while !src.at_end() && !dst.at_end() && src.bits_left() >= code_size as u64 {
        let code = src.get_bits(code_size)? as u16;
        bit_count += code_size as u32;

        if code == CLEAR_CODE {
            src.skip_bits();
            let padding = clear_padding(bit_count, code_size);
            trace!("lzw: clear code, skipping {padding} bytes at {}", src.tell());
            if padding > src.bytes_left() {
                break;
            }
            src.skip(padding as i32)?;

            code_size = INITIAL_CODE_SIZE;
            next_code = CLEAR_CODE;
            bit_count = 0;
        } else {
            last_byte = table.push_to_stream(code, previous, last_byte, next_code, dst)?;

            if (next_code as usize) < TABLE_SIZE {
                table.insert(next_code, previous, last_byte);
                next_code += 1;
                if next_code >= 1 << code_size && code_size < MAX_CODE_SIZE {
                    code_size += 1;
                    bit_count = 0;
                }
            }
            previous = code;
        }
    }

    Ok(finish(dst))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::super::Lzw;
    use super::*;
    use crate::{codec::Codec, BufferView, FileBuffer};

    #[test]
    fn decode_few_bytes() -> Result<()> {
        assert_eq!(Lzw::decode_to_vec(&[0x41, 0x84, 0x04, 0x04], 4)?, b"ABAB");
        assert_eq!(Lzw::decode_to_vec(&[0x41, 0x02, 0x06, 0x01], 4)?, b"AAAA");

        Ok(())
    }

    #[test]
    fn stops_when_destination_is_full() -> Result<()> {
        let mut dst = FileBuffer::new(2);

        let written = decode(&mut BufferView::from_slice(&[0x41, 0x84, 0x04, 0x04])?, &mut dst)?;

        assert_eq!(written, 2);
        assert_eq!(dst.as_slice(), b"AB");

        Ok(())
    }

    #[test]
    fn word_overflowing_the_destination() {
        let mut dst = FileBuffer::new(3);

        let error = decode(&mut BufferView::from_slice(&[0x41, 0x84, 0x04, 0x04]).unwrap(), &mut dst).unwrap_err();

        assert!(matches!(error, Error::BufferFull { .. }));
    }

    #[test]
    fn stops_when_source_runs_out() -> Result<()> {
        let mut dst = FileBuffer::new(16);

        let written = decode(&mut BufferView::from_slice(&[0x41, 0x84, 0x04, 0x04])?, &mut dst)?;

        assert_eq!(written, 4);
        assert_eq!(&dst.as_slice()[..4], b"ABAB");

        Ok(())
    }

    #[test]
    fn empty_destination() -> Result<()> {
        let mut dst = FileBuffer::new(0);

        assert_eq!(decode(&mut BufferView::from_slice(&[])?, &mut dst)?, 0);

        Ok(())
    }

    #[test]
    fn first_code_must_be_a_literal() -> Result<()> {
        let mut src = FileBuffer::new(2);
        src.put_bits(CLEAR_CODE as u32, 9)?;
        src.rewind();

        let error = decode(&mut src, &mut FileBuffer::new(4)).unwrap_err();

        assert!(matches!(error, Error::DataCorruption(_)));

        Ok(())
    }

    #[test]
    fn unknown_code() -> Result<()> {
        let mut src = FileBuffer::new(3);
        src.put_bits(0x41, 9)?;
        src.put_bits(300, 9)?;
        src.rewind();

        let error = decode(&mut src, &mut FileBuffer::new(4)).unwrap_err();

        assert!(matches!(error, Error::DataCorruption(_)));

        Ok(())
    }

    #[test]
    fn truncated_source() {
        let error = decode(&mut BufferView::from_slice(&[0x41]).unwrap(), &mut FileBuffer::new(4)).unwrap_err();

        assert!(matches!(error, Error::BufferEmpty { .. }));
    }

    #[test]
    fn clear_code_skips_to_the_end_of_the_group() -> Result<()> {
        // 'A', clear, then 'B' once the group of eight 9 bit codes is over.
        let mut src = FileBuffer::new(12);
        src.put_bits(0x41, 9)?;
        src.put_bits(CLEAR_CODE as u32, 9)?;
        src.seek(10)?;
        src.put_bits(0x42, 9)?;
        src.rewind();
        let mut dst = FileBuffer::new(2);

        let written = decode(&mut src, &mut dst)?;

        assert_eq!(written, 2);
        assert_eq!(dst.as_slice(), b"AB");

        Ok(())
    }

    #[test]
    fn clear_code_at_the_end_of_the_source() -> Result<()> {
        let mut src = FileBuffer::new(3);
        src.put_bits(0x41, 9)?;
        src.put_bits(CLEAR_CODE as u32, 9)?;
        src.rewind();
        let mut dst = FileBuffer::new(4);

        let written = decode(&mut src, &mut dst)?;

        assert_eq!(written, 1);

        Ok(())
    }

    #[test]
    fn decode_across_several_clears() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42);
        let data: Vec<u8> = (0..40_000).map(|_| rng.gen_range(0..16)).collect();

        let compressed = Lzw::encode_to_vec(&data)?;
        let decompressed = Lzw::decode_to_vec(&compressed, data.len() as u32)?;

        assert_eq!(decompressed, data);

        Ok(())
    }
}
