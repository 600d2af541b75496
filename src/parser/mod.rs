//! ScanM file parsing functionality

pub mod line_decoder;
pub mod parameter_parser;
pub mod pixel_parser;
mod pre_header_parser;

// Re-export the parsing functions
pub use line_decoder::{decode_line, decode_lines};
pub use parameter_parser::{ParsedParameter, parse_parameter_line};
pub use pixel_parser::{BufferLayout, Sample, parse_channel_samples};
pub use pre_header_parser::{decode_pre_header, parse_pre_header};

#[cfg(test)]
pub(crate) use line_decoder::encode_line;
