use std::{borrow::Cow, fmt};

use log::debug;

use crate::{
    dmadata::{DmaEntry, DmaTable},
    dmasig::{find_dmadata, DmaLocation},
    error::{Error, Result},
    mio0,
    romread::slice,
};

#[derive(Debug)]
pub struct ExtractedFile<'a> {
    pub index: usize,
    pub entry: DmaEntry,
    pub data: Cow<'a, [u8]>,
}

impl ExtractedFile<'_> {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Display for ExtractedFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:5}:\t{:8x} {:8x} {:8x} {:8}k {}",
            self.index,
            self.entry.vrom_start,
            self.entry.phys_start,
            self.entry.phys_end,
            self.size() / 1024,
            if self.entry.is_compressed() { "compressed" } else { "" }
        )
    }
}

fn entry_data(rom: &[u8], entry: DmaEntry) -> Result<Cow<'_, [u8]>> {
    let start = entry.phys_start as usize;
    if entry.is_compressed() {
        return Ok(Cow::Owned(mio0::decode(rom, start)?));
    }

    let size = entry.raw_size().ok_or(Error::BadRange {
        start: entry.phys_start,
        end: entry.phys_end,
    })?;
    Ok(Cow::Borrowed(slice(rom, start, size as usize)?))
}

/// Reads one table entry's contents out of the rom.
///
/// Failures are wrapped in [`Error::File`] naming the entry.
pub fn extract_entry(rom: &[u8], index: usize, entry: DmaEntry) -> Result<ExtractedFile<'_>> {
    let data = entry_data(rom, entry).map_err(|e| Error::File {
        index,
        phys_start: entry.phys_start,
        source: Box::new(e),
    })?;
    debug!("file {}: {} bytes from 0x{:x}", index, data.len(), entry.phys_start);

    Ok(ExtractedFile { index, entry, data })
}

pub struct Extractor<'a> {
    rom: &'a [u8],
    location: DmaLocation,
}

impl<'a> Extractor<'a> {
    pub fn new(rom: &'a [u8]) -> Result<Self> {
        let location = find_dmadata(rom).ok_or(Error::TableNotFound)?;
        Ok(Self { rom, location })
    }

    pub fn location(&self) -> DmaLocation {
        self.location
    }

    pub fn entries(&self) -> DmaTable<'a> {
        DmaTable::new(self.rom, self.location.offset)
    }

    pub fn files(&self) -> impl Iterator<Item = Result<ExtractedFile<'a>>> + use<'a> {
        let rom = self.rom;
        self.entries()
            .map(move |item| item.and_then(|(index, entry)| extract_entry(rom, index, entry)))
    }
}

#[derive(Debug)]
pub struct Extraction<'a> {
    pub location: DmaLocation,
    pub files: Vec<ExtractedFile<'a>>,
    pub total_size: usize,
}

pub fn extract_all(rom: &[u8]) -> Result<Extraction<'_>> {
    let extractor = Extractor::new(rom)?;
    let files = extractor.files().collect::<Result<Vec<_>>>()?;
    let total_size = files.iter().map(ExtractedFile::size).sum();

    Ok(Extraction { location: extractor.location(), files, total_size })
}
