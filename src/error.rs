use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no known dmadata signature found")]
    TableNotFound,

    #[error("read of {len} bytes at 0x{offset:x} is past the end of the rom")]
    Truncated { offset: usize, len: usize },

    #[error("physical end 0x{end:x} is before start 0x{start:x}")]
    BadRange { start: u32, end: u32 },

    #[error(
        "mio0 block at 0x{block:x}: backreference distance {distance} at output \
         position {position} reaches before the start of the output"
    )]
    MalformedBlock {
        block: usize,
        position: usize,
        distance: usize,
    },

    #[error("file {index} at 0x{phys_start:x}")]
    File {
        index: usize,
        phys_start: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("manifest: {0}")]
    Manifest(#[from] ron::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
