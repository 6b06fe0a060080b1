use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::output::ExtractOptions;

mod dmadata;
mod dmasig;
mod error;
mod extract;
mod mio0;
mod output;
mod romread;

/// Extract files from Star Fox 64 / Lylat Wars roms
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the dmadata table without writing anything
    List { rom: PathBuf },
    /// Write every dmadata file, decompressing MIO0 ones
    Extract {
        rom: PathBuf,
        #[arg(default_value = "output")]
        output_dir: PathBuf,
        /// Output file name prefix, files are named <prefix>NN.bin
        #[arg(long, default_value = "f")]
        prefix: String,
        /// Also write dmadata.ron describing the extracted files
        #[arg(long)]
        manifest: bool,
    },
    /// Decode a single MIO0 block
    Mio0 {
        rom: PathBuf,
        #[arg(value_parser = parse_offset)]
        offset: usize,
        output: PathBuf,
    },
}

fn parse_offset(s: &str) -> std::result::Result<usize, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid offset `{s}`: {e}"))
}

fn read_rom(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("couldn't read rom '{}'", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.command {
        Command::List { rom } => {
            let data = read_rom(&rom)?;
            output::list(&data).with_context(|| format!("in '{}'", rom.display()))?;
        }
        Command::Extract { rom, output_dir, prefix, manifest } => {
            let data = read_rom(&rom)?;
            let options = ExtractOptions { output_dir, prefix, manifest };
            output::extract_to_dir(&data, &options)
                .with_context(|| format!("couldn't extract '{}'", rom.display()))?;
        }
        Command::Mio0 { rom, offset, output } => {
            let data = read_rom(&rom)?;
            if !mio0::has_magic(&data, offset) {
                log::warn!("no MIO0 magic at 0x{:x}, decoding anyway", offset);
            }
            let size = mio0::get_size(&data, offset).with_context(|| {
                format!("no MIO0 header at 0x{:x} in '{}'", offset, rom.display())
            })?;
            log::info!("MIO0 at 0x{:x} declares {} bytes", offset, size);
            let decoded = mio0::decode(&data, offset).with_context(|| {
                format!("couldn't decode MIO0 at 0x{:x} in '{}'", offset, rom.display())
            })?;
            fs::write(&output, &decoded)
                .with_context(|| format!("couldn't write '{}'", output.display()))?;
            println!("{} bytes written to {}", decoded.len(), output.display());
        }
    }

    Ok(())
}
