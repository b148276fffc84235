//! Artifact header validation.
//!
//! The analysis tool has a known defect signature: on malformed input it emits
//! an otherwise well-formed artifact whose declared time range starts on
//! 1970-01-01 UTC. Such artifacts poison a merge and are excluded. Detection
//! reads only a bounded prefix of the file and parses the protobuf wire format
//! minimally: top-level field 1 is the header message, header field 4 is the
//! begin timestamp (varint seconds since the epoch).
//!
//! Known precision limitation: a repository whose genuine first commit falls
//! on 1970-01-01 would be a false positive. Accepted as-is.

use std::io::Read;
use std::path::Path;

use crate::utils::config::HEADER_SCAN_CAP;

/// Field number of the header message in the top-level artifact message.
const HEADER_FIELD: u64 = 1;
/// Field number of the begin timestamp inside the header message.
const BEGIN_TIME_FIELD: u64 = 4;

const SECONDS_PER_DAY: i64 = 86_400;

/// True when the artifact is usable for merging. Fails closed: any read or
/// parse problem counts as invalid, never as an error.
pub fn is_valid(artifact: &Path) -> bool {
    match begin_timestamp(artifact) {
        Some(begin) => !starts_in_epoch_day(begin),
        None => false,
    }
}

/// The corruption signature: a start timestamp that falls on 1970-01-01 UTC.
pub fn starts_in_epoch_day(begin: i64) -> bool {
    (0..SECONDS_PER_DAY).contains(&begin)
}

/// Extract the begin timestamp from the artifact's header. Reads at most
/// [`HEADER_SCAN_CAP`] bytes; None on any read or parse problem.
pub fn begin_timestamp(artifact: &Path) -> Option<i64> {
    let file = std::fs::File::open(artifact).ok()?;
    let mut prefix = Vec::with_capacity(HEADER_SCAN_CAP);
    file.take(HEADER_SCAN_CAP as u64)
        .read_to_end(&mut prefix)
        .ok()?;
    let header = field_bytes(&prefix, HEADER_FIELD)?;
    let begin = field_varint(header, BEGIN_TIME_FIELD)?;
    Some(begin as i64)
}

/// Protobuf varint at `pos`; advances `pos` past it.
fn read_varint(buf: &[u8], pos: &mut usize) -> Option<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = *buf.get(*pos)?;
        *pos += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Some(value);
        }
        shift += 7;
        if shift >= 64 {
            return None;
        }
    }
}

/// Skip one field body given its wire type; None on unknown type or overrun.
/// For length-delimited fields the available slice may be shorter than the
/// declared length (truncated prefix): callers that want the bytes use
/// [`field_bytes`], which clamps.
fn skip_field(buf: &[u8], pos: &mut usize, wire_type: u64) -> Option<()> {
    match wire_type {
        0 => {
            read_varint(buf, pos)?;
        }
        1 => *pos = pos.checked_add(8).filter(|p| *p <= buf.len())?,
        2 => {
            let len = read_varint(buf, pos)? as usize;
            *pos = pos.checked_add(len).filter(|p| *p <= buf.len())?;
        }
        5 => *pos = pos.checked_add(4).filter(|p| *p <= buf.len())?,
        _ => return None,
    }
    Some(())
}

/// First occurrence of length-delimited `field` in `buf`, clamped to the
/// available bytes when the prefix was truncated mid-field.
fn field_bytes(buf: &[u8], field: u64) -> Option<&[u8]> {
    let mut pos = 0usize;
    while pos < buf.len() {
        let tag = read_varint(buf, &mut pos)?;
        let (number, wire_type) = (tag >> 3, tag & 0x7);
        if number == field && wire_type == 2 {
            let len = read_varint(buf, &mut pos)? as usize;
            let end = pos.checked_add(len)?.min(buf.len());
            return Some(&buf[pos..end]);
        }
        skip_field(buf, &mut pos, wire_type)?;
    }
    None
}

/// First occurrence of varint `field` in `buf`.
fn field_varint(buf: &[u8], field: u64) -> Option<u64> {
    let mut pos = 0usize;
    while pos < buf.len() {
        let tag = read_varint(buf, &mut pos)?;
        let (number, wire_type) = (tag >> 3, tag & 0x7);
        if number == field && wire_type == 0 {
            return read_varint(buf, &mut pos);
        }
        skip_field(buf, &mut pos, wire_type)?;
    }
    None
}
