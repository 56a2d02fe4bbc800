//! Run-length encoding.
//!
//! Each chunk starts with a control byte. With the top bit set, the low seven bits are
//! a repeat count for the single byte that follows. Otherwise the control byte is the
//! number of literal bytes that follow.

use crate::{
    buffer::Buffer,
    codec::{finish, Codec},
    error::{Error, Result},
};

/// Longest chunk a control byte can describe.
pub const MAX_RUN: usize = 0x7f;
/// Runs shorter than this are kept as literals.
pub const MIN_RUN: usize = 4;

const RUN_FLAG: u8 = 0x80;

/// The RLE codec. See the [module documentation](self).
pub struct Rle;

fn put_literals<D>(dst: &mut Buffer<D>, literals: &[u8]) -> Result<()>
where
    D: AsRef<[u8]> + AsMut<[u8]>,
{
    for chunk in literals.chunks(MAX_RUN) {
        dst.put_u8(chunk.len() as u8)?;
        dst.put_data(chunk)?;
    }
    Ok(())
}

fn put_run<D>(dst: &mut Buffer<D>, k: u8, length: usize) -> Result<()>
where
    D: AsRef<[u8]> + AsMut<[u8]>,
{
    let mut left = length;
    while left > 0 {
        let chunk = left.min(MAX_RUN);
        dst.put_u8(RUN_FLAG | chunk as u8)?;
        dst.put_u8(k)?;
        left -= chunk;
    }
    Ok(())
}

impl Codec for Rle {
    fn encode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
    where
        S: AsRef<[u8]>,
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        let data = src.remaining();
        let mut literal_start = 0;
        let mut current = 0;

        while current < data.len() {
            let k = data[current];
            let length = data[current..].iter().take_while(|&&byte| byte == k).count();
            if length >= MIN_RUN {
                put_literals(dst, &data[literal_start..current])?;
                put_run(dst, k, length)?;
                literal_start = current + length;
            }
            current += length;
        }
        put_literals(dst, &data[literal_start..])?;

        src.seek(src.size())?;
        Ok(finish(dst))
    }

    fn decode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
    where
        S: AsRef<[u8]>,
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        while !src.at_end() && !dst.at_end() {
            let control = src.get_u8()?;
            if control & !RUN_FLAG == 0 {
                return Err(Error::DataCorruption("RLE chunk of zero bytes"));
            }
            if control & RUN_FLAG != 0 {
                let k = src.get_u8()?;
                dst.put_repeated(k, (control & !RUN_FLAG) as u32)?;
            } else {
                dst.copy_from(src, control as u32)?;
            }
        }

        Ok(finish(dst))
    }

    fn max_encoded_len(len: usize) -> usize {
        len + len / 4 + 2
    }
}
