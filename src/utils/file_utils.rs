use crate::error::{Error, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Memory-map a recording file read-only.
/// A missing file is reported as [`Error::FileNotFound`].
pub fn read_binary_file_mmap(path: impl AsRef<Path>) -> Result<Mmap> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    // Safety: The file is not modified while the mmap is active
    let mmap = unsafe { Mmap::map(&file) }?;
    Ok(mmap)
}
