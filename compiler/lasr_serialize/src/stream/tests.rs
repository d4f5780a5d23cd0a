#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn sample<W: Writer>(mut w: W) -> Vec<u8> {
    w.write_u8(7);
    w.write_u32(258);
    w.write_i64(-3);
    w.write_bool(true);
    w.write_str("hi there");
    w.write_f64(1.5);
    w.into_bytes()
}

fn read_sample<'a, R: Reader<'a>>(mut r: R) {
    assert_eq!(r.read_u8("u8").unwrap(), 7);
    assert_eq!(r.read_u32("u32").unwrap(), 258);
    assert_eq!(r.read_i64("i64").unwrap(), -3);
    assert!(r.read_bool("bool").unwrap());
    assert_eq!(r.read_str("str").unwrap(), "hi there");
    assert_eq!(r.read_f64("f64").unwrap(), 1.5);
    assert_eq!(r.remaining(), 0);
}

#[test]
fn test_binary_is_big_endian() {
    let mut w = BinaryWriter::new();
    w.write_u32(0x0102_0304);
    w.write_str("ab");
    assert_eq!(
        w.into_bytes(),
        vec![1, 2, 3, 4, 0, 0, 0, 0, 0, 0, 0, 2, b'a', b'b']
    );
}

#[test]
fn test_text_layout() {
    let mut w = TextWriter::new();
    w.write_u8(3);
    w.write_i64(-12);
    w.write_str("a b");
    assert_eq!(String::from_utf8(w.into_bytes()).unwrap(), "3 -12 3 a b ");
}

#[test]
fn test_both_encodings_read_back() {
    read_sample(BinaryReader::new(&sample(BinaryWriter::new())));
    read_sample(TextReader::new(&sample(TextWriter::new())));
}

#[test]
fn test_binary_truncation_reports_position() {
    let bytes = [0u8, 0, 0];
    let mut r = BinaryReader::new(&bytes);
    assert_eq!(r.read_u8("tag").unwrap(), 0);
    assert_eq!(
        r.read_u32("location"),
        Err(DecodeError::Truncated {
            what: "location",
            pos: 1
        })
    );
}

#[test]
fn test_binary_string_longer_than_input() {
    let mut w = BinaryWriter::new();
    w.write_str("hello");
    let mut bytes = w.into_bytes();
    bytes.truncate(10);
    let mut r = BinaryReader::new(&bytes);
    assert!(matches!(
        r.read_str("name"),
        Err(DecodeError::Truncated { what: "name", .. })
    ));
}

#[test]
fn test_text_rejects_garbage_number() {
    let mut r = TextReader::new(b"12x ");
    assert!(matches!(
        r.read_u64("count"),
        Err(DecodeError::InvalidNumber { what: "count", pos: 0 })
    ));
}

#[test]
fn test_text_missing_terminator_is_truncation() {
    let mut r = TextReader::new(b"5 hel");
    assert!(matches!(
        r.read_bytes("payload"),
        Err(DecodeError::Truncated { .. })
    ));
}

#[test]
fn test_invalid_utf8() {
    let mut w = BinaryWriter::new();
    w.write_bytes(&[0xFF, 0xFE]);
    let bytes = w.into_bytes();
    let mut r = BinaryReader::new(&bytes);
    assert_eq!(r.read_str("name"), Err(DecodeError::InvalidUtf8 { pos: 0 }));
}

#[test]
fn test_list_length_is_bounded_by_input() {
    let mut w = BinaryWriter::new();
    w.write_u64(1 << 40);
    let bytes = w.into_bytes();
    let mut r = BinaryReader::new(&bytes);
    assert!(matches!(
        r.read_len("items"),
        Err(DecodeError::LengthOverflow { what: "items", .. })
    ));
}
