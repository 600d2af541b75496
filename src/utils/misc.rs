use itertools::Itertools;
use std::path::{Path, PathBuf};

pub const HEADER_FILE_EXT: &str = "smh";
pub const PIXEL_DATA_FILE_EXT: &str = "smp";

/// Base path of a recording, i.e. the given path without its extension.
pub fn recording_base(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension("")
}

/// Path of one file of the recording pair.
pub fn paired_path(base: impl AsRef<Path>, ext: &str) -> PathBuf {
    let mut name = base.as_ref().as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Indices of the set bits of `mask` below `limit`, ascending.
pub fn active_channels(mask: u64, limit: usize) -> Vec<usize> {
    (0..limit.min(64)).filter(|&i| mask & (1 << i) != 0).collect()
}

/// Channel mask as a zero-padded binary string with at least 4 digits.
pub fn format_mask(mask: u64) -> String {
    format!("{mask:04b}")
}

/// Comma separated list for log messages.
pub fn join_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> String {
    keys.into_iter().join(", ")
}
