use log::debug;

/// A known dmadata layout, identified by its first 20 bytes.
#[derive(Debug)]
pub struct DmaSignature {
    pub description: &'static str,
    pub sigdata: [u8; 20],
}

/// Tried in order; the first one found anywhere in the rom wins.
pub const DMADATA_SIGS: &[DmaSignature] = &[
    DmaSignature {
        // or Lylat Wars
        description: "Star Fox 64",
        sigdata: [
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10, 0x50, 0, 0, 0, 0, 0, 0, 0x10, 0x50,
        ],
    },
    DmaSignature {
        description: "Star Fox 64 iQue",
        sigdata: [
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10, 0x60, 0, 0, 0, 0, 0, 0, 0x10, 0x60,
        ],
    },
];

#[derive(Debug, Clone, Copy)]
pub struct DmaLocation {
    pub offset: usize,
    pub signature: &'static DmaSignature,
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub fn find_dmadata(rom: &[u8]) -> Option<DmaLocation> {
    for signature in DMADATA_SIGS {
        if let Some(offset) = find_bytes(rom, &signature.sigdata) {
            debug!("{} dmadata signature at 0x{:x}", signature.description, offset);
            return Some(DmaLocation { offset, signature });
        }
    }
    None
}
