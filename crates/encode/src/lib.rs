//! Byte-exact PDF syntax encoder.
//!
//! `encode` is the single source of truth for the on-disk shape of every
//! value. It is pure and deterministic: identical input always produces
//! identical bytes. See PDF Reference 1.7, section 3.2 for the object
//! syntax it produces.

mod error;

pub use error::EncodeError;

use quire_object::{Dictionary, Name, Value};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";
const UTF16_BOM: [u8; 2] = [0xFE, 0xFF];

/// Encodes `value` into PDF syntax.
///
/// `in_content_stream` controls how general text is written: content
/// streams take the narrow bytes as-is, everywhere else text is widened to
/// UTF-16BE with a byte order mark.
pub fn encode(value: &Value, in_content_stream: bool) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_to(&mut out, value, in_content_stream)?;
    Ok(out)
}

/// Like [`encode`], appending to an existing buffer.
///
/// On error the buffer may hold a partial encoding.
pub fn encode_to(out: &mut Vec<u8>, value: &Value, in_content_stream: bool) -> Result<(), EncodeError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Boolean(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
        Value::Integer(i) => out.extend_from_slice(itoa::Buffer::new().format(*i).as_bytes()),
        Value::Real(r) => {
            if !r.is_finite() {
                return Err(EncodeError::UnsupportedValue(format!("non-finite real {}", r)));
            }
            // `Display` for f64 is the shortest round-trip form and never uses
            // an exponent, which PDF does not allow.
            out.extend_from_slice(r.to_string().as_bytes());
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                encode_to(out, item, in_content_stream)?;
            }
            out.push(b']');
        }
        Value::LiteralString(bytes) => write_literal(out, bytes),
        Value::Timestamp(t) => {
            let mut stamp = t.format("D:%Y%m%d%H%M%S%z").to_string();
            // Offset minutes are not carried; the offset is written as HH'00'.
            stamp.truncate(stamp.len() - 2);
            stamp.push_str("'00'");
            write_literal(out, stamp.as_bytes());
        }
        Value::ByteString(bytes) => write_hex(out, bytes),
        Value::Text(text) => {
            if in_content_stream {
                write_hex(out, text.as_bytes());
            } else {
                write_hex(out, &utf16_be(text));
            }
        }
        Value::Name(name) => write_name(out, name)?,
        Value::Dictionary(dict) => write_dictionary(out, dict, in_content_stream)?,
        Value::Reference(r) => {
            let mut buf = itoa::Buffer::new();
            out.extend_from_slice(buf.format(r.id).as_bytes());
            out.push(b' ');
            out.extend_from_slice(buf.format(r.generation).as_bytes());
            out.extend_from_slice(b" R");
        }
    }
    Ok(())
}

/// Encodes a dictionary; keys are always written as names.
pub fn write_dictionary(out: &mut Vec<u8>, dict: &Dictionary, in_content_stream: bool) -> Result<(), EncodeError> {
    out.extend_from_slice(b"<< ");
    for (key, value) in dict.iter() {
        write_name(out, key)?;
        out.push(b' ');
        encode_to(out, value, in_content_stream)?;
        out.push(b'\n');
    }
    out.extend_from_slice(b">>");
    Ok(())
}

pub fn write_name(out: &mut Vec<u8>, name: &Name) -> Result<(), EncodeError> {
    if !name.is_valid() {
        return Err(EncodeError::InvalidName(name.as_str().to_string()));
    }
    out.push(b'/');
    out.extend_from_slice(name.as_str().as_bytes());
    Ok(())
}

/// Writes `bytes` as a parenthesised literal string, escaping backslash,
/// newline and both parentheses.
pub fn write_literal(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &byte in bytes {
        if matches!(byte, b'\\' | b'\n' | b'(' | b')') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
}

pub fn write_hex(out: &mut Vec<u8>, bytes: &[u8]) {
    out.reserve(bytes.len() * 2 + 2);
    out.push(b'<');
    for &byte in bytes {
        out.push(HEX_DIGITS[usize::from(byte >> 4)]);
        out.push(HEX_DIGITS[usize::from(byte & 0x0F)]);
    }
    out.push(b'>');
}

/// UTF-16BE code units with a leading byte order mark.
pub fn utf16_be(text: &str) -> Vec<u8> {
    let mut wide = Vec::with_capacity(2 + text.len() * 2);
    wide.extend_from_slice(&UTF16_BOM);
    for unit in text.encode_utf16() {
        wide.extend_from_slice(&unit.to_be_bytes());
    }
    wide
}
