//! Cursor-addressed byte buffers.
//!
//! A [Buffer] is generic over its storage: [FileBuffer] owns a `Vec<u8>`,
//! [BufferView] and [BufferViewMut] borrow a slice of some other buffer.
//! Reading requires `S: AsRef<[u8]>`, writing additionally `S: AsMut<[u8]>`.

use std::{
    io::{Read, Write},
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// A byte region with a read/write cursor and a sub-byte bit cursor.
///
/// The bit cursor only matters between [Buffer::get_bits] / [Buffer::put_bits] calls;
/// any byte-aligned operation resets it to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer<S> {
    pub(crate) data: S,
    pub(crate) cursor: usize,
    pub(crate) bit: u8,
}

/// A buffer owning its bytes.
pub type FileBuffer = Buffer<Vec<u8>>;

/// A read-only view into another buffer's bytes.
pub type BufferView<'a> = Buffer<&'a [u8]>;

/// A writable view into another buffer's bytes.
pub type BufferViewMut<'a> = Buffer<&'a mut [u8]>;

/// Positions and sizes are `u32`, so no buffer may hold more than `u32::MAX` bytes.
pub(crate) fn check_size(len: usize) -> Result<()> {
    if len > u32::MAX as usize {
        return Err(Error::TooLarge { size: len as u64 });
    }
    Ok(())
}

impl<S> Buffer<S> {
    /// Wraps storage already known to fit, such as a slice of another buffer.
    pub(crate) fn with_storage(data: S) -> Self {
        Self {
            data,
            cursor: 0,
            bit: 0,
        }
    }

    /// Gives back the underlying storage.
    pub fn into_inner(self) -> S {
        self.data
    }
}

impl FileBuffer {
    /// Creates a zero filled buffer of `size` bytes.
    pub fn new(size: u32) -> Self {
        Self::with_storage(vec![0; size as usize])
    }

    /// # Errors
    ///
    /// [Error::TooLarge] when `data` holds more than `u32::MAX` bytes.
    pub fn from_vec(data: Vec<u8>) -> Result<Self> {
        check_size(data.len())?;
        Ok(Self::with_storage(data))
    }

    /// Reads everything `read` has to offer into a new buffer.
    pub fn from_reader<R: Read>(mut read: R) -> Result<Self> {
        let mut data = vec![];
        read.read_to_end(&mut data)?;
        Self::from_vec(data)
    }

    /// Loads a whole file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_vec(data)
    }
}

impl<'a> BufferView<'a> {
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        check_size(data.len())?;
        Ok(Self::with_storage(data))
    }
}

impl<'a> BufferViewMut<'a> {
    pub fn from_mut_slice(data: &'a mut [u8]) -> Result<Self> {
        check_size(data.len())?;
        Ok(Self::with_storage(data))
    }
}

impl<S> Buffer<S>
where
    S: AsRef<[u8]>,
{
    #[inline]
    fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// The bytes between the cursor and the end of the buffer.
    pub fn remaining(&self) -> &[u8] {
        &self.data.as_ref()[self.cursor..]
    }

    pub fn size(&self) -> u32 {
        self.len() as u32
    }

    pub fn tell(&self) -> u32 {
        self.cursor as u32
    }

    pub fn next_bit(&self) -> u8 {
        self.bit
    }

    pub fn bytes_left(&self) -> u32 {
        (self.len() - self.cursor) as u32
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.len()
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.bit = 0;
    }

    /// Moves the cursor to `position`, which may be the end of the buffer but not past it.
    pub fn seek(&mut self, position: u32) -> Result<()> {
        if position as usize > self.len() {
            return Err(Error::OutOfRange {
                target: position as i64,
                size: self.size(),
            });
        }
        self.cursor = position as usize;
        self.bit = 0;
        Ok(())
    }

    /// Moves the cursor by `offset` bytes, backwards if negative.
    pub fn skip(&mut self, offset: i32) -> Result<()> {
        let target = self.cursor as i64 + offset as i64;
        if target < 0 || target > self.len() as i64 {
            return Err(Error::OutOfRange {
                target,
                size: self.size(),
            });
        }
        self.cursor = target as usize;
        self.bit = 0;
        Ok(())
    }

    /// A view over the whole buffer, with its own cursor at the start.
    pub fn view(&self) -> BufferView<'_> {
        BufferView::with_storage(self.as_slice())
    }

    /// A view over `length` bytes starting at `offset`.
    pub fn make_sub_buffer(&self, offset: u32, length: u32) -> Result<BufferView<'_>> {
        let range = self.range(offset, length)?;
        Ok(BufferView::with_storage(&self.as_slice()[range]))
    }

    pub(crate) fn range(&self, offset: u32, length: u32) -> Result<std::ops::Range<usize>> {
        let end = offset as u64 + length as u64;
        if end > self.len() as u64 {
            return Err(Error::OutOfRange {
                target: end as i64,
                size: self.size(),
            });
        }
        Ok(offset as usize..end as usize)
    }

    pub(crate) fn empty(&self, requested: usize) -> Error {
        Error::BufferEmpty {
            offset: self.tell(),
            requested: requested as u32,
            available: self.bytes_left(),
        }
    }

    /// Consumes `n` bytes, or fails without moving.
    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.len() - self.cursor {
            return Err(self.empty(n));
        }
        let start = self.cursor;
        self.cursor += n;
        self.bit = 0;
        Ok(&self.data.as_ref()[start..start + n])
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn get_i8(&mut self) -> Result<i8> {
        Ok(self.get_u8()? as i8)
    }

    pub fn get_u16<B: ByteOrder>(&mut self) -> Result<u16> {
        Ok(B::read_u16(self.take(2)?))
    }

    pub fn get_u32<B: ByteOrder>(&mut self) -> Result<u32> {
        Ok(B::read_u32(self.take(4)?))
    }

    pub fn get_i16<B: ByteOrder>(&mut self) -> Result<i16> {
        Ok(B::read_i16(self.take(2)?))
    }

    pub fn get_i32<B: ByteOrder>(&mut self) -> Result<i32> {
        Ok(B::read_i32(self.take(4)?))
    }

    pub fn get_u16_le(&mut self) -> Result<u16> {
        self.get_u16::<LittleEndian>()
    }

    pub fn get_u16_be(&mut self) -> Result<u16> {
        self.get_u16::<BigEndian>()
    }

    pub fn get_u32_le(&mut self) -> Result<u32> {
        self.get_u32::<LittleEndian>()
    }

    pub fn get_u32_be(&mut self) -> Result<u32> {
        self.get_u32::<BigEndian>()
    }

    pub fn get_i16_le(&mut self) -> Result<i16> {
        self.get_i16::<LittleEndian>()
    }

    pub fn get_i16_be(&mut self) -> Result<i16> {
        self.get_i16::<BigEndian>()
    }

    pub fn get_i32_le(&mut self) -> Result<i32> {
        self.get_i32::<LittleEndian>()
    }

    pub fn get_i32_be(&mut self) -> Result<i32> {
        self.get_i32::<BigEndian>()
    }

    pub fn get_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    /// Fills `into` completely from the buffer.
    pub fn get_data(&mut self, into: &mut [u8]) -> Result<()> {
        into.copy_from_slice(self.take(into.len())?);
        Ok(())
    }

    /// Reads a NUL terminated string. The NUL is consumed but not returned.
    pub fn get_string(&mut self) -> Result<String> {
        let end = self
            .remaining()
            .iter()
            .position(|&byte| byte == 0)
            .ok_or_else(|| self.empty(self.bytes_left() as usize + 1))?;
        let bytes = self.take(end + 1)?;
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Reads a fixed width, NUL padded string of `len` bytes.
    pub fn get_fixed_string(&mut self, len: u32) -> Result<String> {
        let bytes = self.take(len as usize)?;
        let end = bytes.iter().position(|&byte| byte == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// Writes `n` bytes of this buffer into `other`, advancing both cursors.
    pub fn copy_to<D>(&mut self, other: &mut Buffer<D>, n: u32) -> Result<()>
    where
        D: AsRef<[u8]> + AsMut<[u8]>,
    {
        if n > other.bytes_left() {
            return Err(other.full(n as usize));
        }
        other.put_data(self.take(n as usize)?)
    }

    /// Writes the whole buffer, and rewinds it.
    pub fn save<W: Write>(&mut self, write: W) -> Result<()> {
        self.save_prefix(write, self.size())
    }

    /// Writes the first `n` bytes of the buffer, and rewinds it.
    pub fn save_prefix<W: Write>(&mut self, mut write: W, n: u32) -> Result<()> {
        if n > self.size() {
            self.rewind();
            return Err(self.empty(n as usize));
        }
        self.rewind();
        write.write_all(&self.as_slice()[..n as usize])?;
        write.flush()?;
        Ok(())
    }

    /// Hex dump of `n` bytes from the cursor, or up to the end when `n` is zero.
    ///
    /// 32 bytes per line, each line prefixed by its offset, groups of 8 separated by `|`.
    pub fn dump<W: Write>(&self, mut write: W, n: u32) -> Result<()> {
        let bytes = self.remaining();
        let bytes = match n {
            0 => bytes,
            n => &bytes[..bytes.len().min(n as usize)],
        };

        write!(write, "{:08x}: ", 0)?;
        for (index, byte) in bytes.iter().enumerate() {
            write!(write, "{byte:02x} ")?;
            let count = index + 1;
            if count % 32 == 0 {
                write!(write, "\n{count:08x}: ")?;
            } else if count % 8 == 0 {
                write!(write, "| ")?;
            }
        }
        writeln!(write)?;
        Ok(())
    }

    pub fn dump_and_skip<W: Write>(&mut self, write: W, n: u32) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.dump(write, n)?;
        match self.tell().checked_add(n) {
            Some(target) => self.seek(target),
            None => Err(Error::OutOfRange {
                target: self.tell() as i64 + n as i64,
                size: self.size(),
            }),
        }
    }
}

impl<S> Buffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.data.as_mut()
    }

    pub fn view_mut(&mut self) -> BufferViewMut<'_> {
        BufferViewMut::with_storage(self.data.as_mut())
    }

    /// A writable view over `length` bytes starting at `offset`.
    pub fn make_sub_buffer_mut(&mut self, offset: u32, length: u32) -> Result<BufferViewMut<'_>> {
        let range = self.range(offset, length)?;
        Ok(BufferViewMut::with_storage(&mut self.data.as_mut()[range]))
    }

    pub(crate) fn full(&self, requested: usize) -> Error {
        Error::BufferFull {
            offset: self.tell(),
            requested: requested as u32,
            available: self.bytes_left(),
        }
    }

    /// Hands out the next `n` bytes for writing, or fails without moving.
    fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        if n > self.len() - self.cursor {
            return Err(self.full(n));
        }
        let start = self.cursor;
        self.cursor += n;
        self.bit = 0;
        Ok(&mut self.data.as_mut()[start..start + n])
    }

    pub fn put_u8(&mut self, x: u8) -> Result<()> {
        self.reserve(1)?[0] = x;
        Ok(())
    }

    pub fn put_i8(&mut self, x: i8) -> Result<()> {
        self.put_u8(x as u8)
    }

    pub fn put_u16<B: ByteOrder>(&mut self, x: u16) -> Result<()> {
        B::write_u16(self.reserve(2)?, x);
        Ok(())
    }

    pub fn put_u32<B: ByteOrder>(&mut self, x: u32) -> Result<()> {
        B::write_u32(self.reserve(4)?, x);
        Ok(())
    }

    pub fn put_i16<B: ByteOrder>(&mut self, x: i16) -> Result<()> {
        B::write_i16(self.reserve(2)?, x);
        Ok(())
    }

    pub fn put_i32<B: ByteOrder>(&mut self, x: i32) -> Result<()> {
        B::write_i32(self.reserve(4)?, x);
        Ok(())
    }

    pub fn put_u16_le(&mut self, x: u16) -> Result<()> {
        self.put_u16::<LittleEndian>(x)
    }

    pub fn put_u16_be(&mut self, x: u16) -> Result<()> {
        self.put_u16::<BigEndian>(x)
    }

    pub fn put_u32_le(&mut self, x: u32) -> Result<()> {
        self.put_u32::<LittleEndian>(x)
    }

    pub fn put_u32_be(&mut self, x: u32) -> Result<()> {
        self.put_u32::<BigEndian>(x)
    }

    pub fn put_i16_le(&mut self, x: i16) -> Result<()> {
        self.put_i16::<LittleEndian>(x)
    }

    pub fn put_i16_be(&mut self, x: i16) -> Result<()> {
        self.put_i16::<BigEndian>(x)
    }

    pub fn put_i32_le(&mut self, x: i32) -> Result<()> {
        self.put_i32::<LittleEndian>(x)
    }

    pub fn put_i32_be(&mut self, x: i32) -> Result<()> {
        self.put_i32::<BigEndian>(x)
    }

    pub fn put_data(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// Writes `byte` `n` times.
    pub fn put_repeated(&mut self, byte: u8, n: u32) -> Result<()> {
        self.reserve(n as usize)?.fill(byte);
        Ok(())
    }

    /// Writes `s` followed by a NUL.
    pub fn put_string(&mut self, s: &str) -> Result<()> {
        let len = s.len() + 1;
        let into = self.reserve(len)?;
        into[..s.len()].copy_from_slice(s.as_bytes());
        into[s.len()] = 0;
        Ok(())
    }

    /// Writes `s` into exactly `len` bytes: truncated if longer, NUL padded if shorter.
    pub fn put_fixed_string(&mut self, s: &str, len: u32) -> Result<()> {
        let into = self.reserve(len as usize)?;
        let copied = s.len().min(into.len());
        into[..copied].copy_from_slice(&s.as_bytes()[..copied]);
        into[copied..].fill(0);
        Ok(())
    }

    /// Reads `n` bytes from `other` into this buffer, advancing both cursors.
    pub fn copy_from<T>(&mut self, other: &mut Buffer<T>, n: u32) -> Result<()>
    where
        T: AsRef<[u8]>,
    {
        if n > self.bytes_left() {
            return Err(self.full(n as usize));
        }
        let bytes = other.take(n as usize)?;
        self.put_data(bytes)
    }

    /// Rewinds, then overwrites the start of this buffer with as many bytes of `other`
    /// as both sizes allow. The cursor stays at the start.
    pub fn fill_from<T>(&mut self, other: &mut Buffer<T>) -> Result<()>
    where
        T: AsRef<[u8]>,
    {
        self.rewind();
        let n = self.len().min(other.len());
        let bytes = other.take(n)?;
        self.data.as_mut()[..n].copy_from_slice(bytes);
        Ok(())
    }

    /// Overwrites the byte at `position` without moving the cursor.
    pub fn patch_u8(&mut self, position: u32, x: u8) -> Result<()> {
        let range = self.range(position, 1)?;
        self.data.as_mut()[range.start] = x;
        Ok(())
    }

    /// Appends `len` bytes copied from `position` onwards, byte by byte, so the source
    /// may overlap with what is being written.
    pub fn repeat_from(&mut self, position: u32, len: u32) -> Result<()> {
        if position as usize >= self.cursor {
            return Err(Error::OutOfRange {
                target: position as i64,
                size: self.tell(),
            });
        }
        if len > self.bytes_left() {
            return Err(self.full(len as usize));
        }

        let start = self.cursor;
        let data = self.data.as_mut();
        for offset in 0..len as usize {
            data[start + offset] = data[position as usize + offset];
        }
        self.cursor += len as usize;
        self.bit = 0;
        Ok(())
    }

    /// Fills the whole buffer from `read`, failing if it runs dry first.
    pub fn load<R: Read>(&mut self, mut read: R) -> Result<()> {
        self.rewind();
        read.read_exact(self.data.as_mut())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_integers_little_and_big_endian() -> Result<()> {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12, 0x12, 0x34];
        let mut buffer = BufferView::from_slice(&data)?;

        assert_eq!(buffer.get_u8()?, 0x01);
        assert_eq!(buffer.get_u16_le()?, 0x1234);
        assert_eq!(buffer.get_u32_le()?, 0x1234_5678);
        assert_eq!(buffer.get_u16_be()?, 0x1234);
        assert!(buffer.at_end());

        buffer.rewind();
        buffer.skip(1)?;
        assert_eq!(buffer.get_u32_be()?, 0x3412_7856);

        Ok(())
    }

    #[test]
    fn read_signed_integers() -> Result<()> {
        let data = [0xff, 0xfe, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xff, 0xfd];
        let mut buffer = BufferView::from_slice(&data)?;

        assert_eq!(buffer.get_i8()?, -1);
        assert_eq!(buffer.get_i16_le()?, -2);
        assert_eq!(buffer.get_i16_be()?, -2);
        assert_eq!(buffer.get_i32_be()?, -3);

        Ok(())
    }

    #[test]
    fn write_then_read_back() -> Result<()> {
        let mut buffer = FileBuffer::new(17);
        buffer.put_u8(0xab)?;
        buffer.put_i16_le(-300)?;
        buffer.put_i16_be(-300)?;
        buffer.put_u32_le(0xdead_beef)?;
        buffer.put_u32_be(0xdead_beef)?;
        buffer.put_i32_le(i32::MIN)?;
        assert!(buffer.at_end());

        buffer.rewind();
        assert_eq!(buffer.get_u8()?, 0xab);
        assert_eq!(buffer.get_i16_le()?, -300);
        assert_eq!(buffer.get_i16_be()?, -300);
        assert_eq!(buffer.get_u32_le()?, 0xdead_beef);
        assert_eq!(buffer.get_u32_be()?, 0xdead_beef);
        assert_eq!(buffer.get_i32_le()?, i32::MIN);

        assert_eq!(
            &buffer.as_slice()[5..13],
            &[0xef, 0xbe, 0xad, 0xde, 0xde, 0xad, 0xbe, 0xef]
        );

        Ok(())
    }

    #[test]
    fn raw_bytes() -> Result<()> {
        let mut buffer = FileBuffer::new(8);
        buffer.put_data(b"VGA:")?;
        buffer.put_repeated(0xee, 4)?;
        buffer.rewind();

        assert_eq!(buffer.get_array::<4>()?, *b"VGA:");
        let mut rest = [0; 3];
        buffer.get_data(&mut rest)?;
        assert_eq!(rest, [0xee; 3]);
        assert!(buffer.get_array::<2>().is_err());
        assert_eq!(buffer.remaining(), &[0xee]);

        Ok(())
    }

    #[test]
    fn read_past_end_is_buffer_empty() {
        let data = [0x01, 0x02, 0x03];
        let mut buffer = BufferView::from_slice(&data).unwrap();
        buffer.skip(2).unwrap();

        let error = buffer.get_u16_le().unwrap_err();

        assert!(matches!(
            error,
            Error::BufferEmpty {
                offset: 2,
                requested: 2,
                available: 1
            }
        ));
        assert_eq!(buffer.tell(), 2);
    }

    #[test]
    fn write_past_end_is_buffer_full() {
        let mut buffer = FileBuffer::new(3);

        let error = buffer.put_u32_le(1).unwrap_err();

        assert!(matches!(error, Error::BufferFull { requested: 4, .. }));
        assert_eq!(buffer.tell(), 0);
    }

    #[test]
    fn strings() -> Result<()> {
        let data = b"RES:\0name\0\0tail";
        let mut buffer = BufferView::from_slice(data)?;

        assert_eq!(buffer.get_string()?, "RES:");
        assert_eq!(buffer.get_fixed_string(6)?, "name");
        assert_eq!(buffer.tell(), 11);
        assert!(matches!(
            buffer.get_string().unwrap_err(),
            Error::BufferEmpty { .. }
        ));

        Ok(())
    }

    #[test]
    fn write_strings() -> Result<()> {
        let mut buffer = FileBuffer::new(12);
        buffer.put_string("abc")?;
        buffer.put_fixed_string("de", 4)?;
        buffer.put_fixed_string("fghij", 4)?;

        assert_eq!(buffer.as_slice(), b"abc\0de\0\0fghi");

        Ok(())
    }

    #[test]
    fn seek_and_skip_stay_in_bounds() -> Result<()> {
        let mut buffer = FileBuffer::new(4);

        buffer.seek(4)?;
        assert!(buffer.at_end());
        assert!(matches!(
            buffer.seek(5).unwrap_err(),
            Error::OutOfRange { target: 5, size: 4 }
        ));
        assert_eq!(buffer.tell(), 4);

        buffer.skip(-3)?;
        assert_eq!(buffer.tell(), 1);
        assert!(buffer.skip(-2).is_err());
        assert!(buffer.skip(4).is_err());
        assert_eq!(buffer.tell(), 1);

        Ok(())
    }

    #[test]
    fn sub_buffer_is_a_view() -> Result<()> {
        let data = [0, 1, 2, 3, 4, 5, 6, 7];
        let buffer = BufferView::from_slice(&data)?;

        let mut sub = buffer.make_sub_buffer(2, 4)?;
        assert_eq!(sub.size(), 4);
        assert_eq!(sub.get_u8()?, 2);
        assert_eq!(buffer.tell(), 0);

        assert!(buffer.make_sub_buffer(6, 3).is_err());
        assert!(buffer.make_sub_buffer(8, 0).is_ok());

        Ok(())
    }

    #[test]
    fn writes_through_mutable_view() -> Result<()> {
        let mut buffer = FileBuffer::new(6);
        {
            let mut sub = buffer.make_sub_buffer_mut(2, 2)?;
            sub.put_u16_be(0xcafe)?;
            assert!(sub.put_u8(0).is_err());
        }

        assert_eq!(buffer.as_slice(), &[0, 0, 0xca, 0xfe, 0, 0]);

        Ok(())
    }

    #[test]
    fn copy_between_buffers() -> Result<()> {
        let mut source = FileBuffer::from_vec(vec![1, 2, 3, 4, 5])?;
        let mut destination = FileBuffer::new(4);

        destination.copy_from(&mut source, 3)?;
        source.copy_to(&mut destination, 1)?;

        assert_eq!(destination.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(source.tell(), 4);
        assert_eq!(destination.tell(), 4);

        assert!(matches!(
            destination.copy_from(&mut source, 1).unwrap_err(),
            Error::BufferFull { .. }
        ));
        assert_eq!(source.tell(), 4);

        Ok(())
    }

    #[test]
    fn fill_from_copies_the_common_prefix() -> Result<()> {
        let mut source = FileBuffer::from_vec(vec![9, 8, 7, 6])?;
        let mut destination = FileBuffer::new(3);
        destination.seek(2)?;

        destination.fill_from(&mut source)?;

        assert_eq!(destination.as_slice(), &[9, 8, 7]);
        assert_eq!(destination.tell(), 0);
        assert_eq!(source.tell(), 3);

        Ok(())
    }

    #[test]
    fn repeat_from_handles_overlap() -> Result<()> {
        let mut buffer = FileBuffer::new(7);
        buffer.put_data(&[b'a', b'b'])?;

        buffer.repeat_from(0, 5)?;

        assert_eq!(buffer.as_slice(), b"abababa");
        assert!(buffer.repeat_from(7, 0).is_err());

        Ok(())
    }

    #[test]
    fn load_and_save() -> Result<()> {
        let mut buffer = FileBuffer::new(3);
        buffer.load(&[7u8, 8, 9, 10][..])?;
        assert_eq!(buffer.as_slice(), &[7, 8, 9]);

        let mut short = FileBuffer::new(8);
        assert!(matches!(short.load(&[1u8][..]).unwrap_err(), Error::Io(_)));

        let mut saved = vec![];
        buffer.skip(2)?;
        buffer.save_prefix(&mut saved, 2)?;
        assert_eq!(saved, [7, 8]);
        assert_eq!(buffer.tell(), 0);
        assert!(buffer.save_prefix(&mut saved, 4).is_err());

        Ok(())
    }

    #[test]
    fn save_then_open() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("resource.bin");
        let mut buffer = FileBuffer::from_vec(vec![1, 2, 3])?;

        buffer.save(std::fs::File::create(&path)?)?;

        assert_eq!(FileBuffer::open(&path)?.as_slice(), &[1, 2, 3]);
        assert_eq!(
            FileBuffer::from_reader(std::fs::File::open(&path)?)?.size(),
            3
        );

        Ok(())
    }

    #[test]
    fn sizes_fit_in_u32() {
        assert!(check_size(u32::MAX as usize).is_ok());
        assert!(FileBuffer::from_vec(vec![]).is_ok());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn storage_past_4_gib_is_rejected() {
        assert!(matches!(
            check_size(u32::MAX as usize + 1).unwrap_err(),
            Error::TooLarge { size: 0x1_0000_0000 }
        ));
    }

    #[test]
    fn open_missing_file() {
        let error = FileBuffer::open("this/file/does/not/exist.bin").unwrap_err();

        assert!(matches!(error, Error::Open { .. }));
    }

    #[test]
    fn dump_layout() -> Result<()> {
        let data: Vec<u8> = (0..34).collect();
        let buffer = BufferView::from_slice(&data)?;
        let mut output = vec![];

        buffer.dump(&mut output, 0)?;

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000: 00 01 02 03 04 05 06 07 | 08 "));
        assert!(lines[0].ends_with("1e 1f "));
        assert_eq!(lines[1], "00000020: 20 21 ");

        Ok(())
    }

    #[test]
    fn dump_and_skip_moves_forward_only() -> Result<()> {
        let data = [0u8; 16];
        let mut buffer = BufferView::from_slice(&data)?;
        buffer.seek(4)?;

        buffer.dump_and_skip(std::io::sink(), 8)?;
        assert_eq!(buffer.tell(), 12);

        assert!(matches!(
            buffer.dump_and_skip(std::io::sink(), u32::MAX).unwrap_err(),
            Error::OutOfRange {
                target: 0x1_0000_000b,
                size: 16
            }
        ));
        assert!(buffer.dump_and_skip(std::io::sink(), 0x8000_0000).is_err());
        assert_eq!(buffer.tell(), 12);

        Ok(())
    }
}
