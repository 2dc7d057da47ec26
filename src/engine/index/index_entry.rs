/// Location of one class section inside a mapping file.
///
/// `byte_offset` points at the first byte of the `original -> obfuscated:`
/// header line; `byte_length` covers the header, its member lines and any
/// blank or comment lines up to the next header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    pub obfuscated_name: String,
    pub original_name: String,
    pub byte_offset: u64,
    pub byte_length: u32,
}

impl IndexEntry {
    pub fn new(
        obfuscated_name: impl Into<String>,
        original_name: impl Into<String>,
        byte_offset: u64,
        byte_length: u32,
    ) -> Self {
        Self {
            obfuscated_name: obfuscated_name.into(),
            original_name: original_name.into(),
            byte_offset,
            byte_length,
        }
    }

    /// Exclusive end of the section. Only meaningful for entries produced by
    /// a scan; entries read from disk go through [`Self::checked_end_offset`].
    pub fn end_offset(&self) -> u64 {
        self.byte_offset.saturating_add(u64::from(self.byte_length))
    }

    /// `None` when the section would end past `u64::MAX`.
    pub fn checked_end_offset(&self) -> Option<u64> {
        self.byte_offset.checked_add(u64::from(self.byte_length))
    }
}
