use log::trace;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    romread::{offset_from, read_u32_be},
};

/// One 16-byte dmadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmaEntry {
    pub vrom_start: u32,
    pub phys_start: u32,
    pub phys_end: u32,
    pub compressed: u32,
}

impl DmaEntry {
    pub const SIZE: usize = 16;

    pub fn read(rom: &[u8], offset: usize) -> Result<Self> {
        Ok(Self {
            vrom_start: read_u32_be(rom, offset)?,
            phys_start: read_u32_be(rom, offset_from(offset, 4)?)?,
            phys_end: read_u32_be(rom, offset_from(offset, 8)?)?,
            compressed: read_u32_be(rom, offset_from(offset, 12)?)?,
        })
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed != 0
    }

    /// Size of the stored bytes; only the real file size when uncompressed.
    pub fn raw_size(&self) -> Option<u32> {
        self.phys_end.checked_sub(self.phys_start)
    }
}

/// Walks dmadata records from the table start.
///
/// The first record is the boot segment and always has a zero `vrom_start`;
/// after it, a zero `vrom_start` marks the end of the table.
pub struct DmaTable<'a> {
    rom: &'a [u8],
    offset: usize,
    index: usize,
    done: bool,
}

impl<'a> DmaTable<'a> {
    pub fn new(rom: &'a [u8], offset: usize) -> Self {
        Self { rom, offset, index: 0, done: false }
    }
}

impl Iterator for DmaTable<'_> {
    type Item = Result<(usize, DmaEntry)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let pos = self.offset + self.index * DmaEntry::SIZE;
        let entry = match DmaEntry::read(self.rom, pos) {
            Ok(entry) => entry,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if self.index > 0 && entry.vrom_start == 0 {
            trace!("dmadata ends at index {} (0x{:x})", self.index, pos);
            self.done = true;
            return None;
        }

        let index = self.index;
        self.index += 1;
        Some(Ok((index, entry)))
    }
}

impl std::iter::FusedIterator for DmaTable<'_> {}
