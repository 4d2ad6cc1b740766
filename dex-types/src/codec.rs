//! VARINT and length-prefixed string wire primitives (spec.md §6, §9 "Global
//! serialization macros" redesign flag).
//!
//! Continuation-bit base-128, big-endian byte order, no leading zeros — the same
//! encoding must produce the same bytes on every implementation, so this is plain,
//! explicit code rather than a derive/macro: byte-for-byte reproducibility is a hard
//! consensus requirement and is easiest to audit when every field write is visible.

use crate::error::DexTxError;

/// Appends `value` to `out` as a base-128 varint, most-significant group first, each
/// non-final byte's high bit set.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = Vec::new();
    loop {
        groups.push((value & 0x7f) as u8);
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for (i, group) in groups.iter().rev().enumerate() {
        let is_last = i == groups.len() - 1;
        let byte = if is_last { *group } else { group | 0x80 };
        out.push(byte);
    }
}

/// Reads a varint written by `write_varint`, advancing `cursor`.
pub fn read_varint(bytes: &[u8], cursor: &mut usize) -> Result<u64, DexTxError> {
    let mut value: u64 = 0;
    let mut read_any = false;
    loop {
        let byte = *bytes
            .get(*cursor)
            .ok_or_else(|| DexTxError::InvalidAmount("varint truncated".into()))?;
        *cursor += 1;
        value = value
            .checked_shl(7)
            .ok_or_else(|| DexTxError::InvalidAmount("varint overflow".into()))?
            | (byte & 0x7f) as u64;
        read_any = true;
        if byte & 0x80 == 0 {
            break;
        }
    }
    debug_assert!(read_any);
    Ok(value)
}

pub fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

pub fn read_bytes(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, DexTxError> {
    let len = read_varint(bytes, cursor)? as usize;
    let end = cursor
        .checked_add(len)
        .ok_or_else(|| DexTxError::InvalidAmount("length-prefixed field overflow".into()))?;
    let slice = bytes
        .get(*cursor..end)
        .ok_or_else(|| DexTxError::InvalidAmount("length-prefixed field truncated".into()))?;
    *cursor = end;
    Ok(slice.to_vec())
}

pub fn write_str(out: &mut Vec<u8>, s: &str) {
    write_bytes(out, s.as_bytes());
}

pub fn read_str(bytes: &[u8], cursor: &mut usize) -> Result<String, DexTxError> {
    let raw = read_bytes(bytes, cursor)?;
    String::from_utf8(raw).map_err(|e| DexTxError::InvalidSymbol(e.to_string()))
}

pub fn write_fixed32(out: &mut Vec<u8>, bytes: &[u8; 32]) {
    out.extend_from_slice(bytes);
}

pub fn read_fixed32(bytes: &[u8], cursor: &mut usize) -> Result<[u8; 32], DexTxError> {
    let end = *cursor + 32;
    let slice = bytes
        .get(*cursor..end)
        .ok_or_else(|| DexTxError::InvalidAmount("fixed-32 field truncated".into()))?;
    *cursor = end;
    let mut out = [0u8; 32];
    out.copy_from_slice(slice);
    Ok(out)
}
