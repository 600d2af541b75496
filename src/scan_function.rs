//! Classification of the scan path function used for a recording.

use crate::parameter_store::ParameterStore;
use bon::Builder;
use serde::Serialize;

/// Built-in scan path functions whose pixel buffers are already in frame
/// order.
pub const SIMPLE_SCAN_FUNCTIONS: [&str; 3] = ["XYScan2", "XYScan3", "XYZScan1"];

/// Layout of pixel buffers produced by a scan path function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelDecodeMode {
    /// Raw buffer order matches the final array order.
    Resorted,
    /// An external decoder has to reconstruct the frames.
    Decoded,
}

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct ClassifiedScanFunction {
    pub name: String,
    pub is_external: bool,
    #[builder(default = PixelDecodeMode::Resorted)]
    pub decode_mode: PixelDecodeMode,
}

impl ClassifiedScanFunction {
    /// Pixel data needs decoding by an external function.
    pub fn needs_decoding(&self) -> bool {
        self.is_external && self.decode_mode == PixelDecodeMode::Decoded
    }
}

/// Classifies the scan path function named in the store. A missing name is
/// treated as an external function.
pub fn classify(store: &ParameterStore) -> ClassifiedScanFunction {
    let name = store.scan_path_func_name().unwrap_or_default().to_string();
    let is_external = !SIMPLE_SCAN_FUNCTIONS.contains(&name.as_str());
    // Recordings never carry a decode mode; buffers are always resorted
    ClassifiedScanFunction::builder()
        .name(name)
        .is_external(is_external)
        .build()
}
