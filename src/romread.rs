//! Big-endian field readers over the rom image.
//!
//! Every multi-byte read in the crate goes through here so the byte order and
//! the bounds check live in one place.

use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};

fn cursor_at(rom: &[u8], offset: usize, len: usize) -> Result<Cursor<&[u8]>> {
    let end = offset.checked_add(len).ok_or(Error::Truncated { offset, len })?;
    if end > rom.len() {
        return Err(Error::Truncated { offset, len });
    }
    let mut cursor = Cursor::new(rom);
    cursor.set_position(offset as u64);
    Ok(cursor)
}

/// `base + rel`, or `Truncated` when that does not fit in the address space.
pub fn offset_from(base: usize, rel: usize) -> Result<usize> {
    base.checked_add(rel).ok_or(Error::Truncated { offset: base, len: rel })
}

pub fn read_u8(rom: &[u8], offset: usize) -> Result<u8> {
    rom.get(offset).copied().ok_or(Error::Truncated { offset, len: 1 })
}

pub fn read_u16_be(rom: &[u8], offset: usize) -> Result<u16> {
    Ok(cursor_at(rom, offset, 2)?.read_u16::<BigEndian>()?)
}

pub fn read_u32_be(rom: &[u8], offset: usize) -> Result<u32> {
    Ok(cursor_at(rom, offset, 4)?.read_u32::<BigEndian>()?)
}

pub fn read_i32_be(rom: &[u8], offset: usize) -> Result<i32> {
    Ok(cursor_at(rom, offset, 4)?.read_i32::<BigEndian>()?)
}

/// Borrow `len` bytes starting at `offset`.
pub fn slice(rom: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.checked_add(len).ok_or(Error::Truncated { offset, len })?;
    rom.get(offset..end).ok_or(Error::Truncated { offset, len })
}
