use std::io::{Read, Write};
use thiserror::Error;

/// Fixed prefix of every binary side file: 4-byte magic, 4-byte format version,
/// both little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryHeader {
    pub magic: [u8; 4],
    pub version: u32,
}

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("I/O error while reading header: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a recognised file: magic {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl BinaryHeader {
    pub const TOTAL_LEN: usize = 4 + 4;

    pub fn new(magic: [u8; 4], version: u32) -> Self {
        Self { magic, version }
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        w.write_all(&self.magic)?;
        w.write_all(&self.version.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut r: R) -> std::io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;

        let mut v = [0u8; 4];
        r.read_exact(&mut v)?;
        let version = u32::from_le_bytes(v);

        Ok(Self { magic, version })
    }
}

pub trait MagicFile {
    const MAGIC: [u8; 4];
    const VERSION: u32 = 1;

    fn write_header<W: Write>(writer: &mut W) -> std::io::Result<()> {
        let header = BinaryHeader::new(Self::MAGIC, Self::VERSION);
        header.write_to(writer)
    }

    /// Magic is checked before version so a foreign file never reports as
    /// a version mismatch.
    fn read_and_validate_header<R: Read>(reader: &mut R) -> Result<BinaryHeader, HeaderError> {
        let header = BinaryHeader::read_from(reader)?;
        if header.magic != Self::MAGIC {
            return Err(HeaderError::BadMagic {
                found: header.magic,
            });
        }
        if header.version != Self::VERSION {
            return Err(HeaderError::UnsupportedVersion {
                found: header.version,
                expected: Self::VERSION,
            });
        }
        Ok(header)
    }
}

pub enum FileKind {
    MappingIndex,
}

impl FileKind {
    pub const fn magic(&self) -> [u8; 4] {
        match self {
            FileKind::MappingIndex => *b"RTIX",
        }
    }
}
