//! Parser for single `TYPE,NAME=VALUE[;VALUE...];` parameter lines

use crate::error::{Error, Result};
use crate::types::parameter::{ParameterEntry, Scalar, ValueKind};

pub const TYPE_KEY_SEP: char = ',';
pub const KEY_VALUE_SEP: char = '=';
pub const ENTRY_SEP: char = ';';
pub const SUB_ENTRY_SEP: char = '|';

/// Outcome of parsing one line. `failed` is set when a numeric token could
/// not be read; the entry then holds a null value of the declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParameter {
    pub key: String,
    pub entry: ParameterEntry,
    pub raw_value: String,
    pub failed: bool,
}

/// Parses one decoded parameter line.
///
/// Only the field between the first and second type separator, and between
/// the first and second key/value separator, is considered. Of the value
/// list only the first non-empty entry is used.
pub fn parse_parameter_line(line: &str) -> Result<ParsedParameter> {
    let malformed = || Error::MalformedParameterLine(line.to_string());

    let mut fields = line.split(TYPE_KEY_SEP);
    let tag = fields.next().ok_or_else(malformed)?;
    let rest = fields.next().ok_or_else(malformed)?;

    let mut kv = rest.split(KEY_VALUE_SEP);
    let key = kv.next().ok_or_else(malformed)?.trim().to_string();
    let values = kv.next().ok_or_else(malformed)?;
    if key.is_empty() {
        return Err(malformed());
    }

    let kind = ValueKind::from_tag(tag).ok_or_else(|| Error::UnknownValueType(tag.to_string()))?;
    let raw = values
        .split(ENTRY_SEP)
        .filter(|s| !s.is_empty())
        .map(str::trim)
        .next()
        .unwrap_or("");

    let (entry, failed) = decode_value(kind, raw);
    Ok(ParsedParameter {
        key,
        entry,
        raw_value: raw.to_string(),
        failed,
    })
}

fn decode_value(kind: ValueKind, raw: &str) -> (ParameterEntry, bool) {
    match kind {
        ValueKind::String => {
            let parts: Vec<&str> = raw.split(SUB_ENTRY_SEP).collect();
            let entry = if parts.len() == 1 {
                ParameterEntry::new(kind, raw)
            } else {
                let list: Vec<Scalar> = parts
                    .into_iter()
                    .map(|p| Scalar::Str(p.to_string()))
                    .collect();
                ParameterEntry::new(kind, list)
            };
            (entry, false)
        }
        ValueKind::Real => match raw.parse::<f64>() {
            Ok(v) => (ParameterEntry::new(kind, v), false),
            Err(_) => (ParameterEntry::null(kind), true),
        },
        // "nan" in an integer field becomes a null float, not an integer
        ValueKind::UInt32 | ValueKind::UInt64 if raw.eq_ignore_ascii_case("nan") => {
            (ParameterEntry::null(ValueKind::Real), false)
        }
        ValueKind::UInt32 => match raw.parse::<u32>() {
            Ok(v) => (ParameterEntry::new(kind, v), false),
            Err(_) => (ParameterEntry::null(kind), true),
        },
        ValueKind::UInt64 => match raw.parse::<u64>() {
            Ok(v) => (ParameterEntry::new(kind, v), false),
            Err(_) => (ParameterEntry::null(kind), true),
        },
    }
}
