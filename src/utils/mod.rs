//! Helpers for locating and mapping the files of a recording

pub mod file_utils;
pub mod misc;

pub use file_utils::read_binary_file_mmap;
pub use misc::{
    HEADER_FILE_EXT, PIXEL_DATA_FILE_EXT, active_channels, format_mask, join_keys, paired_path,
    recording_base,
};
