//! Type definitions for the ScanM file format

pub mod channel_data;
pub mod keys;
pub mod parameter;
pub mod pre_header;
pub mod scan_mode;

// Re-export the main types for convenience
pub use channel_data::{ChannelData, ChannelView};
pub use parameter::{Count, ParameterEntry, Scalar, Value, ValueKind};
pub use pre_header::PreHeader;
pub use scan_mode::{ScanMode, ScanType};
