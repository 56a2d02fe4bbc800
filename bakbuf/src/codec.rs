//! The [Codec] trait shared by the three compression schemes, and the dispatch from a
//! container's method number to the right one.

use log::{debug, error};

use crate::{
    buffer::{Buffer, BufferView, FileBuffer},
    error::{Error, Result},
    lzss::Lzss,
    lzw::Lzw,
    rle::Rle,
};

/// First byte of an LZW compressed resource, followed by the little endian `u32`
/// decompressed size.
pub const LZW_HEADER_MARKER: u8 = 0x02;

/// A compression scheme working from one [Buffer] into another.
///
/// Both directions read from the source cursor onwards and write from the destination
/// cursor onwards. On success the destination is rewound, and the returned count is the
/// position the destination cursor had reached, counting a partly written last byte.
pub trait Codec {
    /// Compresses everything left in `src` into `dst`.
    ///
    /// # Errors
    ///
    /// [Error::BufferFull] when `dst` is too small.
    fn encode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
    where
        S: AsRef<[u8]>,
        D: AsRef<[u8]> + AsMut<[u8]>;

    /// Decompresses `src` into `dst`, stopping when either runs out.
    ///
    /// # Errors
    ///
    /// [Error::DataCorruption] on a malformed stream, [Error::BufferEmpty] when
    /// `src` ends in the middle of a unit.
    fn decode<S, D>(src: &mut Buffer<S>, dst: &mut Buffer<D>) -> Result<u32>
    where
        S: AsRef<[u8]>,
        D: AsRef<[u8]> + AsMut<[u8]>;

    /// An upper bound on the size [Codec::encode] needs for `len` bytes of input.
    fn max_encoded_len(len: usize) -> usize;

    /// Compresses `data` into a new vector.
    fn encode_to_vec(data: &[u8]) -> Result<Vec<u8>> {
        let mut src = BufferView::from_slice(data)?;
        let mut dst = FileBuffer::new(Self::max_encoded_len(data.len()) as u32);
        let written = Self::encode(&mut src, &mut dst)?;
        let mut output = dst.into_inner();
        output.truncate(written as usize);
        Ok(output)
    }

    /// Decompresses `data` into a new vector of at most `size` bytes.
    fn decode_to_vec(data: &[u8], size: u32) -> Result<Vec<u8>> {
        let mut src = BufferView::from_slice(data)?;
        let mut dst = FileBuffer::new(size);
        let written = Self::decode(&mut src, &mut dst)?;
        let mut output = dst.into_inner();
        output.truncate(written as usize);
        Ok(output)
    }
}

/// Rewinds a codec's destination and reports how far it got.
pub(crate) fn finish<D>(dst: &mut Buffer<D>) -> u32
where
    D: AsRef<[u8]>,
{
    let written = dst.tell() + u32::from(dst.next_bit() > 0);
    dst.rewind();
    written
}

/// The compression method number stored in resource containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CompressionMethod {
    Lzw = 0,
    Lzss = 1,
    Rle = 2,
}

impl TryFrom<u32> for CompressionMethod {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(CompressionMethod::Lzw),
            1 => Ok(CompressionMethod::Lzss),
            2 => Ok(CompressionMethod::Rle),
            unknown => Err(Error::UnknownMethod(unknown)),
        }
    }
}

impl From<CompressionMethod> for u32 {
    fn from(method: CompressionMethod) -> Self {
        method as u32
    }
}

/// Compresses `src` into `dst` with `method`. No header is written, even for LZW.
pub fn compress<S, D>(
    src: &mut Buffer<S>,
    dst: &mut Buffer<D>,
    method: CompressionMethod,
) -> Result<u32>
where
    S: AsRef<[u8]>,
    D: AsRef<[u8]> + AsMut<[u8]>,
{
    let start = src.tell();
    let result = match method {
        CompressionMethod::Lzw => Lzw::encode(src, dst),
        CompressionMethod::Lzss => Lzss::encode(src, dst),
        CompressionMethod::Rle => Rle::encode(src, dst),
    };

    match result {
        Ok(written) => {
            debug!(
                "{method:?}: compressed {} bytes into {written}",
                src.tell() - start
            );
            Ok(written)
        }
        Err(err) => {
            error!("{method:?}: compression failed: {err}");
            Err(err)
        }
    }
}

/// Decompresses `src` into `dst` with `method`.
///
/// LZW data must start with [LZW_HEADER_MARKER] and the decompressed size, which has to
/// match the size of `dst`.
pub fn decompress<S, D>(
    src: &mut Buffer<S>,
    dst: &mut Buffer<D>,
    method: CompressionMethod,
) -> Result<u32>
where
    S: AsRef<[u8]>,
    D: AsRef<[u8]> + AsMut<[u8]>,
{
    let start = src.tell();
    let result = match method {
        CompressionMethod::Lzw => {
            check_lzw_header(src, dst.size()).and_then(|()| Lzw::decode(src, dst))
        }
        CompressionMethod::Lzss => Lzss::decode(src, dst),
        CompressionMethod::Rle => Rle::decode(src, dst),
    };

    match result {
        Ok(written) => {
            debug!(
                "{method:?}: decompressed {} bytes into {written}",
                src.tell() - start
            );
            Ok(written)
        }
        Err(err) => {
            error!("{method:?}: decompression failed: {err}");
            Err(err)
        }
    }
}

fn check_lzw_header<S>(src: &mut Buffer<S>, expected_size: u32) -> Result<()>
where
    S: AsRef<[u8]>,
{
    if src.get_u8()? != LZW_HEADER_MARKER {
        return Err(Error::DataCorruption("missing LZW header marker"));
    }
    if src.get_u32_le()? != expected_size {
        return Err(Error::DataCorruption(
            "LZW header size doesn't match the destination",
        ));
    }
    Ok(())
}

impl<S> Buffer<S>
where
    S: AsRef<[u8]>,
{
    /// See [compress].
    pub fn compress<D>(&mut self, into: &mut Buffer<D>, method: CompressionMethod) -> Result<u32>
    where
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        compress(self, into, method)
    }

    /// See [decompress].
    pub fn decompress<D>(&mut self, into: &mut Buffer<D>, method: CompressionMethod) -> Result<u32>
    where
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        decompress(self, into, method)
    }
}
