use crate::error::{Error, Result};
use crate::types::pre_header::PreHeader;
use winnow::{
    Parser,
    binary::{le_u16, le_u64},
    combinator::repeat,
    error::ContextError,
    token::take,
};

/// Parses the 64-byte pre-header block.
///
/// The layout is as follows:
/// - 4 little‑endian u16 values: file type id (only the first 3 carry characters)
/// - 16 bytes: GUID, kept as raw bytes
/// - 5 little‑endian u64 values: header length (bytes), header length (pairs),
///   header start, pixel data length, analog data length
pub fn parse_pre_header(input: &mut &[u8]) -> std::result::Result<PreHeader, ContextError> {
    let type_units: Vec<u16> = repeat(4, le_u16).parse_next(input)?;
    let guid_bytes = take(16usize).parse_next(input)?;
    let header_len_bytes = le_u64.parse_next(input)?;
    let header_len_entries = le_u64.parse_next(input)?;
    let header_start_bytes = le_u64.parse_next(input)?;
    let pixel_data_len_bytes = le_u64.parse_next(input)?;
    let analog_data_len_bytes = le_u64.parse_next(input)?;

    let file_type: String = type_units[..3]
        .iter()
        .filter(|&&unit| unit != 0)
        .filter_map(|&unit| char::from_u32(u32::from(unit)))
        .collect();

    let mut guid = [0u8; 16];
    guid.copy_from_slice(guid_bytes);

    Ok(PreHeader::builder()
        .file_type(file_type)
        .guid(guid)
        .header_len_bytes(header_len_bytes)
        .header_len_entries(header_len_entries)
        .header_start_bytes(header_start_bytes)
        .pixel_data_len_bytes(pixel_data_len_bytes)
        .analog_data_len_bytes(analog_data_len_bytes)
        .build())
}

/// Decodes the pre-header located at `offset` in `data`.
pub fn decode_pre_header(data: &[u8], offset: u64) -> Result<PreHeader> {
    let malformed = |available| Error::MalformedPreHeader { offset, available };
    let start = usize::try_from(offset).map_err(|_| malformed(0))?;
    let block = data.get(start..).unwrap_or_default();
    if block.len() < PreHeader::SIZE {
        return Err(malformed(block.len()));
    }
    let mut input = &block[..PreHeader::SIZE];
    parse_pre_header(&mut input).map_err(|_| malformed(block.len()))
}

#[cfg(test)]
pub(crate) fn encode_pre_header(header: &PreHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(PreHeader::SIZE);
    let mut units = [0u16; 4];
    for (unit, ch) in units.iter_mut().zip(header.file_type.chars()) {
        *unit = ch as u16;
    }
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out.extend_from_slice(&header.guid);
    for v in [
        header.header_len_bytes,
        header.header_len_entries,
        header.header_start_bytes,
        header.pixel_data_len_bytes,
        header.analog_data_len_bytes,
    ] {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}
