use crate::shared::storage_header::{BinaryHeader, FileKind, HeaderError, MagicFile};
use std::io::Cursor;

struct Dummy;

impl MagicFile for Dummy {
    const MAGIC: [u8; 4] = *b"TST1";
    const VERSION: u32 = 2;
}

#[test]
fn header_roundtrip_ok() {
    let hdr = BinaryHeader::new(FileKind::MappingIndex.magic(), 1);
    let mut buf = Vec::new();
    hdr.write_to(&mut buf).unwrap();
    assert_eq!(buf.len(), BinaryHeader::TOTAL_LEN);
    assert_eq!(&buf[..4], b"RTIX");

    let read = BinaryHeader::read_from(Cursor::new(buf)).unwrap();
    assert_eq!(read, hdr);
}

#[test]
fn version_mismatch_detected_by_trait() {
    let hdr = BinaryHeader::new(*b"TST1", 1);
    let mut buf = Vec::new();
    hdr.write_to(&mut buf).unwrap();

    let res = Dummy::read_and_validate_header(&mut Cursor::new(buf));
    assert!(matches!(
        res,
        Err(HeaderError::UnsupportedVersion {
            found: 1,
            expected: 2
        })
    ));
}

#[test]
fn magic_checked_before_version() {
    let hdr = BinaryHeader::new(*b"NOPE", 9);
    let mut buf = Vec::new();
    hdr.write_to(&mut buf).unwrap();

    let res = Dummy::read_and_validate_header(&mut Cursor::new(buf));
    assert!(matches!(res, Err(HeaderError::BadMagic { found }) if &found == b"NOPE"));
}

#[test]
fn truncated_header_rejected() {
    let mut buf = Vec::new();
    Dummy::write_header(&mut buf).unwrap();
    buf.truncate(BinaryHeader::TOTAL_LEN - 1);

    let res = Dummy::read_and_validate_header(&mut Cursor::new(buf));
    assert!(matches!(res, Err(HeaderError::Io(_))));
}
