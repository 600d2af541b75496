use bon::Builder;
use itertools::Itertools;
use serde::Serialize;

/// Fixed 64-byte identification block found at the start of the `.smh`
/// file and as a trailer behind the pixel data in the `.smp` file.
///
/// Layout (all integers little-endian):
/// - 4 × u16: file type id (UTF-16 code units, NUL padded)
/// - 16 bytes: recording GUID
/// - u64: header length in bytes
/// - u64: header length in key/value pairs
/// - u64: header start in bytes
/// - u64: pixel data length in bytes
/// - u64: analog data length in bytes
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct PreHeader {
    pub file_type: String,
    pub guid: [u8; 16],
    pub header_len_bytes: u64,
    pub header_len_entries: u64,
    pub header_start_bytes: u64,
    pub pixel_data_len_bytes: u64,
    pub analog_data_len_bytes: u64,
}

impl PreHeader {
    pub const SIZE: usize = 64;

    /// GUID as lowercase hex, byte order as stored.
    pub fn guid_hex(&self) -> String {
        self.guid.iter().map(|b| format!("{b:02x}")).join("")
    }

    /// Byte-wise GUID comparison.
    pub fn same_recording(&self, other: &PreHeader) -> bool {
        self.guid == other.guid
    }
}
