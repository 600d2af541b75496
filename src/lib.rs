//! Reader for ScanM two-photon microscope recordings.
//!
//! A recording consists of a header file (`.smh`) with a pre-header and the
//! acquisition parameters, and a pixel data file (`.smp`) with the
//! interleaved samples of all active input channels.
//!
//! ```no_run
//! use scanm::RecordingHandle;
//!
//! let mut recording = RecordingHandle::new();
//! recording.load_header("data/M1_FOV1_chirp.smh")?;
//! recording.load_pixel_data()?;
//! println!("{}", recording.summary());
//! if let Some(ch0) = recording.get_data(0, true) {
//!     println!("channel 0: {:?}", ch0.shape());
//! }
//! # Ok::<(), scanm::Error>(())
//! ```

pub mod error;
pub mod parameter_store;
pub mod parser;
pub mod pixel_reader;
pub mod scan_function;
pub mod scanm_file;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use parameter_store::ParameterStore;
pub use pixel_reader::{FrameArithmetic, ScanGeometry};
pub use scan_function::{ClassifiedScanFunction, PixelDecodeMode};
pub use scanm_file::{LoadOptions, LoadState, RecordingHandle};
pub use types::{
    ChannelData, ChannelView, PreHeader, ScanMode, ScanType, Value, keys,
};
