//! MIO0 decoding.
//!
//! A block starts with a 16-byte header:
//!
//! | offset | field                                   |
//! |--------|-----------------------------------------|
//! | 0      | magic, `"MIO0"`                         |
//! | 4      | uncompressed size                       |
//! | 8      | backreference stream, from block start  |
//! | 12     | literal stream, from block start        |
//!
//! The control stream follows the header as big-endian words read MSB first.
//! A set bit emits one literal byte, a clear bit emits a backreference taken
//! from the backreference stream as a big-endian halfword: the top nibble is
//! the run length minus 3, the low 12 bits the distance.

use log::{debug, trace};

use crate::{
    error::{Error, Result},
    romread::{offset_from, read_i32_be, read_u16_be, read_u32_be, read_u8, slice},
};

pub const MAGIC: &[u8; 4] = b"MIO0";
pub const HEADER_SIZE: usize = 16;

/// Initial output allocation cap; a bogus size in the header must not
/// reserve gigabytes up front.
const MAX_PREALLOC: usize = 16 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mio0Header {
    pub uncompressed_size: u32,
    pub backref_offset: u32,
    pub literal_offset: u32,
}

impl Mio0Header {
    pub fn read(rom: &[u8], block: usize) -> Result<Self> {
        Ok(Self {
            uncompressed_size: read_u32_be(rom, offset_from(block, 4)?)?,
            backref_offset: read_u32_be(rom, offset_from(block, 8)?)?,
            literal_offset: read_u32_be(rom, offset_from(block, 12)?)?,
        })
    }
}

pub fn get_size(rom: &[u8], block: usize) -> Result<u32> {
    read_u32_be(rom, offset_from(block, 4)?)
}

/// Whether the block carries the `MIO0` magic. The decoder does not need it.
pub fn has_magic(rom: &[u8], block: usize) -> bool {
    slice(rom, block, 4).is_ok_and(|m| m == MAGIC)
}

pub fn decode(rom: &[u8], block: usize) -> Result<Vec<u8>> {
    let header = Mio0Header::read(rom, block)?;
    debug!("mio0 at 0x{:x}: {:?}", block, header);

    let size = header.uncompressed_size as usize;
    let mut control = offset_from(block, HEADER_SIZE)?;
    let mut backrefs = offset_from(block, header.backref_offset as usize)?;
    let mut literals = offset_from(block, header.literal_offset as usize)?;

    let mut out = Vec::with_capacity(size.min(MAX_PREALLOC));
    let mut bits: i32 = 0;
    let mut bits_left = 0;

    while out.len() < size {
        if bits_left == 0 {
            bits = read_i32_be(rom, control)?;
            bits_left = 32;
            control += 4;
        }

        if bits < 0 {
            out.push(read_u8(rom, literals)?);
            literals += 1;
        } else {
            let codeword = read_u16_be(rom, backrefs)?;
            backrefs += 2;
            let run = (codeword >> 12) as usize + 3;
            let distance = (codeword & 0xfff) as usize;

            // The copy source sits one byte further back than the distance says.
            let mut src = out
                .len()
                .checked_sub(distance + 1)
                .ok_or(Error::MalformedBlock {
                    block,
                    position: out.len(),
                    distance,
                })?;
            trace!("backref at {}: run {} distance {}", out.len(), run, distance);

            for _ in 0..run {
                if out.len() == size {
                    break;
                }
                out.push(out[src]);
                src += 1;
            }
        }

        bits <<= 1;
        bits_left -= 1;
    }

    Ok(out)
}
