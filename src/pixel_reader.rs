//! Reading of the interleaved pixel buffers of a `.smp` file.

use crate::error::{Error, Result};
use crate::parameter_store::{MAX_INPUT_CHANNELS, ParameterStore};
use crate::parser::{BufferLayout, Sample, parse_channel_samples};
use crate::scan_function::ClassifiedScanFunction;
use crate::types::channel_data::ChannelData;
use crate::types::keys;
use crate::types::scan_mode::{ScanMode, ScanType};
use crate::utils::{active_channels, format_mask};
use bon::Builder;
use log::{error, info};
use ndarray::Array3;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Scan mode of the store, accepting only modes the reader can reshape.
pub fn supported_scan_mode(store: &ParameterStore) -> Result<ScanMode> {
    let Some(code) = store.scan_mode_code() else {
        error!("ERROR: No scan mode");
        return Err(Error::UnsupportedScanMode(None));
    };
    match ScanMode::from_code(code) {
        Some(ScanMode::XYImage) => Ok(ScanMode::XYImage),
        Some(mode) => {
            error!("ERROR: `{mode}` not implemented");
            Err(Error::NotImplemented(mode.name().to_string()))
        }
        None => {
            error!("ERROR: Unknown scan mode {code}");
            Err(Error::UnsupportedScanMode(Some(code)))
        }
    }
}

/// Frames acquired per z-step if the recording is an averaged z-stack.
pub fn averaged_z_stack_frames(store: &ParameterStore) -> Option<u64> {
    let per_step = store.get_u64(keys::N_FR_PER_STEP)?;
    (store.scan_type() == Some(ScanType::ZStack) && per_step > 1).then_some(per_step)
}

/// Axis lengths used to lay out the pixel stream of a planar scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder, Serialize)]
pub struct ScanGeometry {
    pub scan_mode: ScanMode,
    pub fast: usize,
    #[builder(default)]
    pub retrace: usize,
    #[builder(default)]
    pub offset: usize,
    #[builder(default = 1)]
    pub slow1: usize,
    #[builder(default = 1)]
    pub slow2: usize,
    pub pixel_size: usize,
    pub channel_mask: u64,
}

impl ScanGeometry {
    pub fn from_store(store: &ParameterStore) -> Result<Self> {
        let scan_mode = supported_scan_mode(store)?;
        let required = |key: &'static str| -> Result<usize> {
            store
                .get_usize(key)
                .ok_or(Error::MissingParameter(key))
        };
        let fast = required(keys::FRAME_WIDTH)?;
        if fast == 0 {
            return Err(Error::MissingParameter(keys::FRAME_WIDTH));
        }

        let pixel_size = required(keys::PIXEL_SIZE_IN_BYTES)?;
        if pixel_size != u16::SIZE && pixel_size != f64::SIZE {
            return Err(Error::InvalidPixelSize(pixel_size as u64));
        }

        let non_zero = |v: usize| if v == 0 { 1 } else { v };
        Ok(Self::builder()
            .scan_mode(scan_mode)
            .fast(fast)
            .retrace(store.get_usize(keys::PIX_RETRACE_LEN).unwrap_or(0))
            .offset(store.get_usize(keys::X_PIX_LINE_OFFS).unwrap_or(0))
            .slow1(non_zero(store.get_usize(keys::FRAME_HEIGHT).unwrap_or(0)))
            .slow2(non_zero(store.get_usize(keys::FRAME_DEPTH).unwrap_or(0)))
            .pixel_size(pixel_size)
            .channel_mask(store.input_channel_mask().unwrap_or(0))
            .build())
    }

    /// `None` if the frame does not fit in `usize` pixels.
    pub fn pixels_per_frame(&self) -> Option<usize> {
        self.fast.checked_mul(self.slow1)?.checked_mul(self.slow2)
    }

    /// Active input channels in ascending bit order.
    pub fn channels(&self) -> Vec<usize> {
        active_channels(self.channel_mask, MAX_INPUT_CHANNELS)
    }
}

/// Buffer and frame counts derived from the recording parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameArithmetic {
    pub pixel_buffer_len: usize,
    pub pixels_per_frame: usize,
    pub buffers_per_frame: f64,
    /// Buffers set for the recording, scaled by stimulus buffers per frame.
    pub buffers_set: u64,
    /// Buffers read per channel.
    pub buffers_to_read: usize,
    pub frame_count: usize,
    pub samples_per_channel: usize,
}

/// Buffer counters as stored in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct BufferCounts {
    pub set: u64,
    pub counter: u64,
    #[builder(default = 1)]
    pub stim_bufs_per_frame: u64,
    #[builder(default = 1)]
    pub frames_per_step: u64,
    #[builder(default = 1)]
    pub images_per_frame: u64,
}

impl BufferCounts {
    pub fn from_store(store: &ParameterStore) -> Self {
        Self::builder()
            .set(store.pixel_bufs_set().unwrap_or(0))
            .counter(store.pixel_buf_counter().unwrap_or(0))
            .stim_bufs_per_frame(store.stim_bufs_per_frame().unwrap_or(1))
            .frames_per_step(averaged_z_stack_frames(store).unwrap_or(1))
            .images_per_frame(store.images_per_frame().unwrap_or(1).max(1))
            .build()
    }
}

impl FrameArithmetic {
    pub fn compute(
        geometry: &ScanGeometry,
        pixel_buffer_len: usize,
        counts: BufferCounts,
    ) -> Result<Self> {
        if pixel_buffer_len == 0 {
            return Err(Error::MissingParameter(keys::IN_CHAN_PIX_BUF_LEN_LIST));
        }

        // The buffer counters do not account for stimulus buffers spanning
        // several frames.
        let (mut set, mut counter) = (counts.set, counts.counter);
        if counts.stim_bufs_per_frame > 0 {
            set = set
                .checked_mul(counts.stim_bufs_per_frame)
                .ok_or(Error::InvalidParameter(keys::NUMBER_OF_PIX_BUFS_SET))?;
            counter = counter
                .checked_mul(counts.stim_bufs_per_frame)
                .ok_or(Error::InvalidParameter(keys::PIX_BUF_COUNTER))?;
        }

        let pixels_per_frame = geometry
            .pixels_per_frame()
            .ok_or(Error::InvalidParameter(keys::FRAME_WIDTH))?;
        let buffers_per_frame = pixels_per_frame as f64 / pixel_buffer_len as f64;
        let buffers = if set == counter {
            set as f64 * buffers_per_frame
        } else {
            set.saturating_sub(counter) as f64 * buffers_per_frame
        };
        let per_step = counts.frames_per_step as f64;
        let buffers_to_read = (buffers * per_step) as usize;

        let samples = buffers_to_read as f64 / per_step * pixel_buffer_len as f64;
        let frame_count =
            (samples / pixels_per_frame as f64 * counts.images_per_frame as f64) as usize;

        if counts.images_per_frame != 1 {
            return Err(Error::NotImplemented(format!(
                "{} images per frame",
                counts.images_per_frame
            )));
        }

        Ok(Self {
            pixel_buffer_len,
            pixels_per_frame,
            buffers_per_frame,
            buffers_set: set,
            buffers_to_read,
            frame_count,
            samples_per_channel: samples as usize,
        })
    }
}

/// Result of a pixel read: per-channel arrays keyed by input channel index.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelReadout {
    pub geometry: ScanGeometry,
    pub arithmetic: FrameArithmetic,
    pub channels: BTreeMap<usize, ChannelData>,
}

/// Reads the pixel buffers starting at `data_offset` and reshapes each
/// channel into `(frames, slow1, fast)`.
pub fn read_pixel_data(
    data: &[u8],
    store: &ParameterStore,
    scan_function: &ClassifiedScanFunction,
    data_offset: usize,
) -> Result<PixelReadout> {
    if scan_function.needs_decoding() {
        return Err(Error::NotImplemented("pixel decoding".into()));
    }
    if scan_function.is_external {
        error!("ERROR: scan path function `{}` needs an external decoder", scan_function.name);
        return Err(Error::NotImplemented("external scan path decoder".into()));
    }
    if averaged_z_stack_frames(store).is_some() {
        return Err(Error::NotImplemented("z-stack averaging".into()));
    }

    let geometry = ScanGeometry::from_store(store)?;
    let pixel_buffer_len = store
        .pixel_buffer_lengths()
        .and_then(|lens| lens.first().copied())
        .and_then(|len| usize::try_from(len).ok())
        .ok_or(Error::MissingParameter(keys::IN_CHAN_PIX_BUF_LEN_LIST))?;
    let counts = BufferCounts::from_store(store);
    let arithmetic = FrameArithmetic::compute(&geometry, pixel_buffer_len, counts)?;

    let channels = geometry.channels();
    info!(
        "{} AI channel(s) (0b{})",
        channels.len(),
        format_mask(geometry.channel_mask)
    );
    info!(
        "{} of {} buffer(s) (each {} pixels) per channel",
        arithmetic.buffers_to_read,
        arithmetic.buffers_set,
        pixel_buffer_len
    );

    let layout = BufferLayout {
        buffer_len: pixel_buffer_len,
        channel_count: channels.len(),
    };
    let shape = [
        arithmetic.frame_count,
        geometry.slow1 / counts.images_per_frame as usize,
        geometry.fast,
    ];
    let data = data.get(data_offset..).unwrap_or_default();

    let arrays = match geometry.pixel_size {
        2 => read_channels::<u16>(data, layout, &arithmetic, shape, ChannelData::U16)?,
        8 => read_channels::<f64>(data, layout, &arithmetic, shape, ChannelData::F64)?,
        other => return Err(Error::InvalidPixelSize(other as u64)),
    };
    info!("{} pixel buf(s) read", arithmetic.buffers_to_read);

    Ok(PixelReadout {
        geometry,
        arithmetic,
        channels: channels.into_iter().zip(arrays).collect(),
    })
}

fn read_channels<T: Sample>(
    data: &[u8],
    layout: BufferLayout,
    arithmetic: &FrameArithmetic,
    shape: [usize; 3],
    wrap: fn(Array3<T>) -> ChannelData,
) -> Result<Vec<ChannelData>> {
    let expected = arithmetic.buffers_to_read;
    let buffer_bytes = layout.buffer_bytes::<T>();
    if buffer_bytes > 0 {
        let fits = expected
            .checked_mul(buffer_bytes)
            .is_some_and(|needed| needed <= data.len());
        if !fits {
            return Err(Error::UnexpectedEndOfFile {
                read: data.len() / buffer_bytes,
                expected,
            });
        }
    }

    // Channels are independent; within a channel buffers stay in file order
    (0..layout.channel_count)
        .into_par_iter()
        .map(|slot| {
            let mut samples = vec![T::default(); arithmetic.samples_per_channel];
            parse_channel_samples(data, layout, slot, &mut samples).map_err(|_| {
                Error::UnexpectedEndOfFile {
                    read: data.len() / buffer_bytes.max(1),
                    expected,
                }
            })?;
            let len = samples.len();
            Array3::from_shape_vec((shape[0], shape[1], shape[2]), samples)
                .map(wrap)
                .map_err(|_| Error::ReshapeFailure { len, shape })
        })
        .collect()
}
