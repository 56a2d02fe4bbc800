//! Bit level access to a [Buffer].
//!
//! Bits are packed least significant first: the first bit of a code lands in bit 0
//! of the current byte, and a code spilling over a byte boundary continues in bit 0
//! of the next one.

use crate::{
    buffer::Buffer,
    error::{Error, Result},
};

/// Widest code [Buffer::get_bits] and [Buffer::put_bits] handle.
const MAX_BITS: u8 = 32;

fn check_width(amount: u8) -> Result<()> {
    if amount > MAX_BITS {
        return Err(Error::BitWidth(amount));
    }
    Ok(())
}

impl<S> Buffer<S>
where
    S: AsRef<[u8]>,
{
    /// How many bits can still be read.
    pub fn bits_left(&self) -> u64 {
        self.bytes_left() as u64 * 8 - self.bit as u64
    }

    /// Reads an `amount` bits wide value, `amount` being at most 32.
    pub fn get_bits(&mut self, amount: u8) -> Result<u32> {
        check_width(amount)?;
        let total = self.bit as usize + amount as usize;
        let needed = (total + 7) / 8;
        if self.cursor + needed > self.data.as_ref().len() {
            return Err(self.empty(needed));
        }

        let mut byte_buffer = 0u64;
        for (index, &byte) in self.data.as_ref()[self.cursor..self.cursor + needed]
            .iter()
            .enumerate()
        {
            byte_buffer |= (byte as u64) << (8 * index);
        }

        let mask = (1u64 << amount) - 1;
        let data = ((byte_buffer >> self.bit) & mask) as u32;
        self.cursor += total / 8;
        self.bit = (total % 8) as u8;
        Ok(data)
    }

    /// Moves to the start of the next byte if the bit cursor is inside one.
    pub fn skip_bits(&mut self) {
        if self.bit != 0 {
            self.cursor += 1;
            self.bit = 0;
        }
    }
}

impl<S> Buffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Writes the low `amount` bits of `data`, `amount` being at most 32.
    ///
    /// Bits of the touched bytes that are outside the written range keep their value.
    pub fn put_bits(&mut self, data: u32, amount: u8) -> Result<()> {
        check_width(amount)?;
        let total = self.bit as usize + amount as usize;
        let needed = (total + 7) / 8;
        if self.cursor + needed > self.data.as_ref().len() {
            return Err(self.full(needed));
        }

        let start = self.cursor;
        let window = &mut self.data.as_mut()[start..start + needed];
        let mut byte_buffer = 0u64;
        for (index, &byte) in window.iter().enumerate() {
            byte_buffer |= (byte as u64) << (8 * index);
        }

        let mask = ((1u64 << amount) - 1) << self.bit;
        byte_buffer = (byte_buffer & !mask) | (((data as u64) << self.bit) & mask);
        for (index, byte) in window.iter_mut().enumerate() {
            *byte = (byte_buffer >> (8 * index)) as u8;
        }

        self.cursor += total / 8;
        self.bit = (total % 8) as u8;
        Ok(())
    }
}
