use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;
use ron::ser::{to_string_pretty, PrettyConfig};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    extract::{extract_all, ExtractedFile, Extractor},
};

pub const MANIFEST_NAME: &str = "dmadata.ron";

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub manifest: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            prefix: "f".to_string(),
            manifest: false,
        }
    }
}

impl ExtractOptions {
    pub fn file_name(&self, index: usize) -> String {
        format!("{}{:02}.bin", self.prefix, index)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    pub index: usize,
    pub file_name: String,
    pub vrom_start: u32,
    pub phys_start: u32,
    pub phys_end: u32,
    pub compressed: bool,
    pub size: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RomManifest {
    pub variant: String,
    pub table_offset: usize,
    pub total_size: usize,
    pub files: Vec<ManifestEntry>,
}

fn write_file(path: &Path, file: &ExtractedFile) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&file.data)?;
    writer.flush()?;
    Ok(())
}

/// Prints the listing line for every entry and the total. Nothing is written.
pub fn list(rom: &[u8]) -> Result<usize> {
    let extraction = extract_all(rom)?;
    println!("dmadata type: {}", extraction.location.signature.description);
    for file in &extraction.files {
        println!("{}", file);
    }
    println!("total size: {}k", extraction.total_size / 1024);
    Ok(extraction.total_size)
}

/// Writes every table entry to its own file, one at a time.
///
/// Stops at the first failure; files written before it are left in place.
pub fn extract_to_dir(rom: &[u8], options: &ExtractOptions) -> Result<RomManifest> {
    let extractor = Extractor::new(rom)?;
    let location = extractor.location();
    println!("dmadata type: {}", location.signature.description);

    fs::create_dir_all(&options.output_dir)?;

    let mut manifest = RomManifest {
        variant: location.signature.description.to_string(),
        table_offset: location.offset,
        total_size: 0,
        files: Vec::new(),
    };

    for file in extractor.files() {
        let file = file?;
        println!("{}", file);

        let file_name = options.file_name(file.index);
        write_file(&options.output_dir.join(&file_name), &file)?;

        manifest.total_size += file.size();
        manifest.files.push(ManifestEntry {
            index: file.index,
            file_name,
            vrom_start: file.entry.vrom_start,
            phys_start: file.entry.phys_start,
            phys_end: file.entry.phys_end,
            compressed: file.entry.is_compressed(),
            size: file.size(),
        });
    }
    println!("total size: {}k", manifest.total_size / 1024);

    if options.manifest {
        let path = options.output_dir.join(MANIFEST_NAME);
        write_manifest(&path, &manifest)?;
        info!("manifest written to {}", path.display());
    }

    Ok(manifest)
}

pub fn write_manifest(path: &Path, manifest: &RomManifest) -> Result<()> {
    let pretty = PrettyConfig::new().struct_names(true);
    let s = to_string_pretty(manifest, pretty)?;
    let mut file = File::create(path)?;
    writeln!(file, "{s}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        dmadata::DmaEntry,
        error::Error,
        extract::tests::{sample_rom, TABLE},
    };

    fn options(dir: &TempDir, manifest: bool) -> ExtractOptions {
        ExtractOptions {
            output_dir: dir.path().join("out"),
            manifest,
            ..Default::default()
        }
    }

    #[test]
    fn file_names() {
        let opts = ExtractOptions::default();
        assert_eq!(opts.file_name(0), "f00.bin");
        assert_eq!(opts.file_name(7), "f07.bin");
        assert_eq!(opts.file_name(123), "f123.bin");

        let opts = ExtractOptions { prefix: "sf_".into(), ..opts };
        assert_eq!(opts.file_name(42), "sf_42.bin");
    }

    #[test]
    fn writes_one_file_per_entry() {
        let rom = sample_rom();
        let dir = TempDir::new().unwrap();
        let opts = options(&dir, false);

        let manifest = extract_to_dir(&rom, &opts).unwrap();
        assert_eq!(manifest.files.len(), 3);
        assert_eq!(manifest.total_size, 0x1050 + 512);

        let out = &opts.output_dir;
        assert_eq!(fs::read(out.join("f00.bin")).unwrap(), &rom[..0x1050]);
        assert_eq!(fs::read(out.join("f01.bin")).unwrap(), &rom[0x2000..0x2100]);
        assert_eq!(fs::read(out.join("f02.bin")).unwrap().len(), 256);
        assert!(!out.join("f03.bin").exists());
        assert!(!out.join(MANIFEST_NAME).exists());
    }

    #[test]
    fn manifest_reads_back() {
        let rom = sample_rom();
        let dir = TempDir::new().unwrap();
        let opts = options(&dir, true);

        let manifest = extract_to_dir(&rom, &opts).unwrap();
        let text = fs::read_to_string(opts.output_dir.join(MANIFEST_NAME)).unwrap();
        assert!(text.starts_with("RomManifest("));

        let parsed: RomManifest = ron::from_str(&text).unwrap();
        assert_eq!(parsed, manifest);
        assert_eq!(parsed.variant, "Star Fox 64");
        assert_eq!(parsed.table_offset, 0x1000);
        assert!(parsed.files[2].compressed);
        assert_eq!(parsed.files[2].file_name, "f02.bin");
    }

    #[test]
    fn no_table_writes_nothing() {
        let rom = vec![0x11u8; 0x800];
        let dir = TempDir::new().unwrap();
        let opts = options(&dir, true);

        assert!(matches!(extract_to_dir(&rom, &opts), Err(Error::TableNotFound)));
        assert!(!opts.output_dir.exists());
    }

    #[test]
    fn stops_at_first_bad_entry() {
        let mut rom = sample_rom();
        // Second entry's physical end now lies before its start.
        let phys_end = TABLE + DmaEntry::SIZE + 8;
        rom[phys_end..phys_end + 4].copy_from_slice(&0x1000u32.to_be_bytes());

        let dir = TempDir::new().unwrap();
        let opts = options(&dir, true);

        match extract_to_dir(&rom, &opts) {
            Err(Error::File { index: 1, phys_start: 0x2000, source }) => {
                assert!(matches!(*source, Error::BadRange { start: 0x2000, end: 0x1000 }));
            }
            other => panic!("unexpected {other:?}"),
        }

        let out = &opts.output_dir;
        assert_eq!(fs::read(out.join("f00.bin")).unwrap(), &rom[..0x1050]);
        assert!(!out.join("f01.bin").exists());
        assert!(!out.join("f02.bin").exists());
        assert!(!out.join(MANIFEST_NAME).exists());
    }

    #[test]
    fn list_totals() {
        assert_eq!(list(&sample_rom()).unwrap(), 0x1050 + 512);
    }
}
