//! Typed parameter dictionary of a `.smh` header.
//!
//! Building a store runs in fixed order: line parsing, repair of entries
//! whose numeric value could not be read, aggregation of numbered keys into
//! list and matrix entries, backfilling of keys missing in older files,
//! scan-mode specific corrections and finally clamping.

use crate::error::{Error, Result};
use crate::parser::{decode_lines, parse_parameter_line};
use crate::types::keys;
use crate::types::parameter::{ParameterEntry, Scalar, Value, ValueKind};
use crate::types::pre_header::PreHeader;
use crate::types::scan_mode::{ScanMode, ScanType};
use crate::utils::{active_channels, join_keys};
use log::{debug, info, warn};
use ndarray::Array2;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MAX_STIM_BUF_MAP_ENTRIES: usize = 128;
pub const MAX_STIM_CHANNELS: usize = 32;
pub const MAX_INPUT_CHANNELS: usize = 4;

/// Sub-value positions inside the `ScanPathFunc` descriptor, e.g.
/// `XYScan2|5120|80|64|10|6|0|1`: name, buffer length, width, height,
/// retrace, line offset, ...
pub const SCAN_PATH_RETRACE_INDEX: usize = 4;
pub const SCAN_PATH_OFFSET_INDEX: usize = 5;

/// Recovers a value for a key whose literal could not be parsed.
pub type Recovery = fn(&ParameterStore) -> Option<ParameterEntry>;

const REPAIRS: [(&str, Recovery); 2] = [
    (keys::PIX_RETRACE_LEN, recover_retrace),
    (keys::X_PIX_LINE_OFFS, recover_line_offset),
];

fn recover_retrace(store: &ParameterStore) -> Option<ParameterEntry> {
    let v = store.scan_path_param(SCAN_PATH_RETRACE_INDEX)?;
    Some(ParameterEntry::new(ValueKind::UInt32, v))
}

fn recover_line_offset(store: &ParameterStore) -> Option<ParameterEntry> {
    let v = store.scan_path_param(SCAN_PATH_OFFSET_INDEX)?;
    Some(ParameterEntry::new(ValueKind::UInt32, v))
}

/// Recovery function registered for `key`, if any.
pub fn recovery_for(key: &str) -> Option<Recovery> {
    REPAIRS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, recover)| *recover)
}

#[derive(Debug, Clone, Copy)]
enum Backfill {
    Const(u32),
    CopyOf(&'static str),
}

/// Keys added when absent, for files written before they existed.
const BACKFILLS: [(&str, Backfill); 9] = [
    (keys::N_IMG_PER_FR, Backfill::Const(1)),
    (keys::DX_FR_DECODED, Backfill::Const(0)),
    (keys::DY_FR_DECODED, Backfill::Const(0)),
    (keys::DZ_FR_DECODED, Backfill::Const(0)),
    (keys::FRAME_DEPTH, Backfill::Const(1)),
    (keys::NUMBER_OF_PIX_BUFS_SET, Backfill::CopyOf(keys::NUMBER_OF_FRAMES)),
    (keys::PIX_BUF_COUNTER, Backfill::CopyOf(keys::FRAME_COUNTER)),
    (keys::STIM_BUF_PER_FR, Backfill::Const(1)),
    (keys::ASPECT_RATIO_FRAME, Backfill::Const(1)),
];

/// Decoded frame size keys and the raw frame size they default to.
const DECODED_FRAME_DIMS: [(&str, &str); 3] = [
    (keys::DX_FR_DECODED, keys::FRAME_WIDTH),
    (keys::DY_FR_DECODED, keys::FRAME_HEIGHT),
    (keys::DZ_FR_DECODED, keys::FRAME_DEPTH),
];

const CLAMPED_TO_ONE: [&str; 3] = [
    keys::ASPECT_RATIO_FRAME,
    keys::STIM_BUF_PER_FR,
    keys::N_IMG_PER_FR,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterStore {
    entries: BTreeMap<String, ParameterEntry>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the text section of a header file, i.e. everything behind
    /// the pre-header.
    pub fn from_header_bytes(data: &[u8], verbose: bool) -> Result<Self> {
        let text = data.get(PreHeader::SIZE..).unwrap_or_default();
        let lines = decode_lines(text).inspect(|line| {
            if verbose {
                debug!("-> {line}");
            }
        });
        Self::parse(lines)
    }

    /// Parses decoded parameter lines and runs the post-processing passes.
    pub fn parse<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        let mut failed: Vec<String> = Vec::new();
        let mut count = 0usize;

        for line in lines {
            let parsed = parse_parameter_line(line.as_ref())?;
            if parsed.failed {
                warn!(
                    "ERROR reading `{}` (value is `{}`)",
                    parsed.key, parsed.raw_value
                );
                failed.push(parsed.key.clone());
            }
            store.entries.insert(parsed.key, parsed.entry);
            count += 1;
        }
        if count == 0 {
            return Err(Error::NoParametersFound);
        }
        info!("{count} key-value pair(s) found");

        store.repair(&failed);
        store.aggregate_stimulus_lists();
        store.aggregate_stim_buffer_map();
        store.aggregate_input_channels();
        store.backfill_defaults();
        store.correct_legacy();
        store.clamp_minimums();

        info!("{} parameter(s) extracted", store.len());
        Ok(store)
    }

    /// Replaces entries listed in `failed` using the recovery table. Returns
    /// the keys that stay null.
    pub fn repair(&mut self, failed: &[String]) -> Vec<String> {
        if failed.is_empty() {
            return Vec::new();
        }
        warn!("Errors in key(s): {}", join_keys(failed));
        warn!("Trying to repair ...");

        let mut unrepaired = Vec::new();
        for key in failed {
            match recovery_for(key).and_then(|recover| recover(self)) {
                Some(entry) => {
                    info!("Repaired `{key}` -> {:?}", entry.value());
                    self.entries.insert(key.clone(), entry);
                }
                None => unrepaired.push(key.clone()),
            }
        }
        unrepaired
    }

    fn aggregate_stimulus_lists(&mut self) {
        let n_stim_buf = self.get_usize(keys::NUMBER_OF_STIM_BUFS).unwrap_or(0);
        let mut buf_lens = Vec::with_capacity(n_stim_buf);
        let mut targeted = Vec::with_capacity(n_stim_buf);
        let mut real = Vec::with_capacity(n_stim_buf);

        for i in 0..n_stim_buf {
            buf_lens.push(self.take_scalar(&keys::stim_buf_len(i)));
            targeted.push(self.take_scalar(&keys::targeted_stim_dur(i)));
            real.push(self.take_scalar(&keys::real_stim_dur(i)));
        }

        self.insert(
            keys::STIM_BUF_LEN_LIST,
            ParameterEntry::new(ValueKind::UInt32, buf_lens),
        );
        self.insert(
            keys::TARGETED_STIM_DUR_LIST,
            ParameterEntry::new(ValueKind::Real, targeted),
        );
        self.insert(
            keys::REAL_STIM_DUR_LIST,
            ParameterEntry::new(ValueKind::Real, real),
        );
    }

    fn aggregate_stim_buffer_map(&mut self) {
        let mask = self.get_u64(keys::STIM_CHANNEL_MASK).unwrap_or(0);
        let mut map_len = self.get_usize(keys::MAX_STIM_BUF_MAP_LEN).unwrap_or(0);
        if map_len > MAX_STIM_BUF_MAP_ENTRIES {
            warn!("Stimulus buffer map length {map_len} exceeds {MAX_STIM_BUF_MAP_ENTRIES}");
            map_len = MAX_STIM_BUF_MAP_ENTRIES;
        }

        let mut map = Array2::from_elem(
            (MAX_STIM_CHANNELS, MAX_STIM_BUF_MAP_ENTRIES),
            Scalar::UInt64(0),
        );
        for ch in active_channels(mask, MAX_STIM_CHANNELS) {
            for entry in 0..map_len {
                let v = self.take_scalar(&keys::stim_buf_map_entry(ch, entry));
                map[[ch, entry]] = Scalar::UInt64(v.as_u64().unwrap_or(0));
            }
        }
        self.insert(
            keys::STIM_BUF_MAP_ENTRIES,
            ParameterEntry::new(ValueKind::UInt64, map),
        );
    }

    fn aggregate_input_channels(&mut self) {
        let mask = self.get_u64(keys::INPUT_CHANNEL_MASK).unwrap_or(0);
        let channels = active_channels(mask, MAX_INPUT_CHANNELS);
        let buf_lens: Vec<Scalar> = (0..channels.len())
            .map(|slot| self.take_scalar(&keys::pix_buf_len(slot)))
            .collect();

        self.insert(
            keys::NUMBER_OF_INPUT_CHANS,
            ParameterEntry::new(ValueKind::UInt32, channels.len() as u32),
        );
        self.insert(
            keys::IN_CHAN_PIX_BUF_LEN_LIST,
            ParameterEntry::new(ValueKind::UInt32, buf_lens),
        );
    }

    fn backfill_defaults(&mut self) {
        for (key, fill) in BACKFILLS {
            if self.get(key).is_some() {
                continue;
            }
            let value = match fill {
                Backfill::Const(v) => Value::from(v),
                Backfill::CopyOf(source) => self.get(source).cloned().unwrap_or(Value::NULL),
            };
            debug!("Adding missing `{key}` = {value:?}");
            self.insert(key, ParameterEntry::new(ValueKind::UInt32, value));
        }
    }

    /// Corrections for files written by older acquisition software.
    fn correct_legacy(&mut self) {
        info!("Correct parameters for older files ...");
        if self.scan_mode() != Some(ScanMode::XYImage) {
            return;
        }

        let dx = self.get_f64(keys::FRAME_WIDTH);
        let retrace = self.get_f64(keys::PIX_RETRACE_LEN);
        let offset = self.get_f64(keys::X_PIX_LINE_OFFS);
        if let (Some(dx), Some(retrace), Some(offset)) = (dx, retrace, offset) {
            if dx / (retrace + offset) < 4.0 {
                for (key, index) in [
                    (keys::PIX_RETRACE_LEN, SCAN_PATH_RETRACE_INDEX),
                    (keys::X_PIX_LINE_OFFS, SCAN_PATH_OFFSET_INDEX),
                ] {
                    match self.scan_path_param(index) {
                        Some(v) => {
                            self.set_integer(key, u64::from(v));
                        }
                        None => warn!("Cannot recover `{key}` from scan path function"),
                    }
                }
            }
        }

        for (decoded, raw) in DECODED_FRAME_DIMS {
            if self.get_u64(decoded) == Some(0) {
                if let Some(v) = self.get_u64(raw) {
                    self.set_integer(decoded, v);
                }
            }
        }
    }

    fn clamp_minimums(&mut self) {
        for key in CLAMPED_TO_ONE {
            if self.get_f64(key).is_none_or(|v| v < 1.0) {
                self.set_integer(key, 1);
            }
        }
    }

    /// Value for `key`; `None` when absent or null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .get(key)
            .map(ParameterEntry::value)
            .filter(|v| !v.is_null())
    }

    /// Full entry including type and count, null values included.
    pub fn entry(&self, key: &str) -> Option<&ParameterEntry> {
        self.entries.get(key)
    }

    /// Bounds-checked access to element `index` (row `index` of a matrix).
    pub fn get_indexed(&self, key: &str, index: usize) -> Option<Value> {
        self.entries.get(key)?.indexed(index)
    }

    /// Replaces the value of an existing key. Returns `false` (and leaves
    /// the store untouched) if the key does not exist.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.set_value(value);
                true
            }
            None => {
                warn!("ERROR: Key `{key}` not found");
                false
            }
        }
    }

    /// Sets an integer, stored according to the entry's type tag.
    fn set_integer(&mut self, key: &str, v: u64) -> bool {
        let value = match self.entries.get(key).map(|e| e.kind) {
            Some(ValueKind::UInt32) if v <= u64::from(u32::MAX) => Value::from(v as u32),
            Some(ValueKind::Real) => Value::from(v as f64),
            Some(ValueKind::String) => Value::from(v.to_string()),
            Some(ValueKind::UInt32 | ValueKind::UInt64) | None => Value::from(v),
        };
        self.set(key, value)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: ParameterEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key).map(ParameterEntry::into_value)
    }

    /// Removes `key` and returns its scalar, `Null` if absent.
    fn take_scalar(&mut self, key: &str) -> Scalar {
        match self.remove(key) {
            Some(Value::Scalar(s)) => s,
            Some(other) => {
                warn!("Expected a scalar for `{key}`, found {other:?}");
                Scalar::Null
            }
            None => Scalar::Null,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)?.as_u64()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get_u64(key).and_then(|v| usize::try_from(v).ok())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Sub-values of a string entry; a single value yields one element.
    pub fn get_str_list(&self, key: &str) -> Option<Vec<&str>> {
        match self.get(key)? {
            Value::Scalar(Scalar::Str(s)) => Some(vec![s.as_str()]),
            Value::List(list) => list.iter().map(Scalar::as_str).collect(),
            _ => None,
        }
    }

    /// Integer at position `index` of the scan path function descriptor.
    pub fn scan_path_param(&self, index: usize) -> Option<u32> {
        let list = self.get(keys::SCAN_PATH_FUNC)?.as_list()?;
        list.get(index)?
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
    }

    /// Name of the scan path function (first descriptor field).
    pub fn scan_path_func_name(&self) -> Option<&str> {
        self.get_str_list(keys::SCAN_PATH_FUNC)?.first().copied()
    }

    pub fn scan_mode_code(&self) -> Option<u64> {
        self.get_u64(keys::SCAN_MODE)
    }

    pub fn scan_mode(&self) -> Option<ScanMode> {
        self.scan_mode_code().and_then(ScanMode::from_code)
    }

    pub fn scan_type(&self) -> Option<ScanType> {
        self.get_u64(keys::SCAN_TYPE).map(ScanType::from_code)
    }

    pub fn pixel_size_bytes(&self) -> Option<u64> {
        self.get_u64(keys::PIXEL_SIZE_IN_BYTES)
    }

    pub fn frame_width(&self) -> Option<u64> {
        self.get_u64(keys::FRAME_WIDTH)
    }

    pub fn frame_height(&self) -> Option<u64> {
        self.get_u64(keys::FRAME_HEIGHT)
    }

    pub fn frame_depth(&self) -> Option<u64> {
        self.get_u64(keys::FRAME_DEPTH)
    }

    pub fn retrace_len(&self) -> Option<u64> {
        self.get_u64(keys::PIX_RETRACE_LEN)
    }

    pub fn line_offset(&self) -> Option<u64> {
        self.get_u64(keys::X_PIX_LINE_OFFS)
    }

    pub fn images_per_frame(&self) -> Option<u64> {
        self.get_u64(keys::N_IMG_PER_FR)
    }

    pub fn stim_bufs_per_frame(&self) -> Option<u64> {
        self.get_u64(keys::STIM_BUF_PER_FR)
    }

    pub fn pixel_bufs_per_frame(&self) -> Option<u64> {
        self.get_u64(keys::CHUNKS_PER_FRAME)
    }

    pub fn stim_buf_count(&self) -> Option<u64> {
        self.get_u64(keys::NUMBER_OF_STIM_BUFS)
    }

    pub fn stim_channel_mask(&self) -> Option<u64> {
        self.get_u64(keys::STIM_CHANNEL_MASK)
    }

    pub fn input_channel_mask(&self) -> Option<u64> {
        self.get_u64(keys::INPUT_CHANNEL_MASK)
    }

    pub fn input_channel_count(&self) -> Option<u64> {
        self.get_u64(keys::NUMBER_OF_INPUT_CHANS)
    }

    pub fn pixel_buffer_lengths(&self) -> Option<Vec<u64>> {
        self.get(keys::IN_CHAN_PIX_BUF_LEN_LIST)?
            .as_list()?
            .iter()
            .map(Scalar::as_u64)
            .collect()
    }

    pub fn pixel_bufs_set(&self) -> Option<u64> {
        self.get_u64(keys::NUMBER_OF_PIX_BUFS_SET)
    }

    pub fn pixel_buf_counter(&self) -> Option<u64> {
        self.get_u64(keys::PIX_BUF_COUNTER)
    }

    pub fn pixel_duration_us(&self) -> Option<f64> {
        self.get_f64(keys::REAL_PIX_DUR)
    }

    pub fn target_pixel_duration_us(&self) -> Option<f64> {
        self.get_f64(keys::TARGETED_PIX_DUR)
    }

    pub fn zoom(&self) -> Option<f64> {
        self.get_f64(keys::ZOOM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::encode_line;
    use crate::types::parameter::Count;

    fn base_lines() -> Vec<String> {
        [
            "String,ComputerName=SCANM-PC;",
            "UINT32,PixelSizeInBytes=2;",
            "UINT32,StimulusChannelMask=5;",
            "UINT32,MaxStimulusBufferMapLength=2;",
            "UINT32,NumberOfStimulusBuffers=2;",
            "UINT32,InputChannelMask=11;",
            "REAL32,TargetedPixelDuration_µs=2.000000;",
            "UINT32,NumberOfFrames=10;",
            "UINT32,FrameCounter=10;",
            "UINT32,StimulusBufferLength_#0=5120;",
            "UINT32,StimulusBufferLength_#1=5120;",
            "REAL32,Channel_0_TargetedStimulusDuration_µs=128000.0;",
            "REAL32,Channel_1_TargetedStimulusDuration_µs=128000.0;",
            "REAL32,AO_A_Channel_0_RealStimulusDuration_µs=127999.5;",
            "REAL32,AO_A_Channel_1_RealStimulusDuration_µs=128001.0;",
            "UINT32,Channel_0_StimulusBufferMapEntry_#0=0;",
            "UINT32,Channel_0_StimulusBufferMapEntry_#1=1;",
            "UINT32,Channel_2_StimulusBufferMapEntry_#0=2;",
            "UINT32,Channel_2_StimulusBufferMapEntry_#1=3;",
            "UINT32,PixelBuffer_#0_Length=5120;",
            "UINT32,PixelBuffer_#1_Length=5120;",
            "UINT32,PixelBuffer_#2_Length=5120;",
            "UINT32,ScanMode=0;",
            "UINT32,ScanType=10;",
            "UINT32,FrameWidth=80;",
            "UINT32,FrameHeight=64;",
            "String,ScanPathFunc=XYScan2|5120|80|64|10|6|0|1;",
            "UINT32,PixRetraceLen=10;",
            "UINT32,XPixLineOffs=6;",
            "REAL32,Zoom=0.650000;",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn replace(lines: &mut Vec<String>, prefix: &str, with: Option<&str>) {
        lines.retain(|l| !l.starts_with(prefix));
        if let Some(line) = with {
            lines.push(line.to_string());
        }
    }

    #[test]
    fn test_empty_input_has_no_parameters() {
        let lines: Vec<&str> = Vec::new();
        assert!(matches!(
            ParameterStore::parse(lines),
            Err(Error::NoParametersFound)
        ));
    }

    #[test]
    fn test_stimulus_lists_replace_numbered_keys() {
        let store = ParameterStore::parse(base_lines()).unwrap();

        let lens = store.entry(keys::STIM_BUF_LEN_LIST).unwrap();
        assert_eq!(lens.kind, ValueKind::UInt32);
        assert_eq!(lens.count(), Count::Length(2));
        assert_eq!(store.get_indexed(keys::STIM_BUF_LEN_LIST, 1), Some(Value::from(5120u32)));

        let real = store.entry(keys::REAL_STIM_DUR_LIST).unwrap();
        assert_eq!(real.kind, ValueKind::Real);
        assert_eq!(real.value().as_list().unwrap()[0], Scalar::Real(127999.5));

        assert!(!store.contains_key("StimulusBufferLength_#0"));
        assert!(!store.contains_key("Channel_1_TargetedStimulusDuration_µs"));
        assert!(!store.contains_key("AO_A_Channel_0_RealStimulusDuration_µs"));
    }

    #[test]
    fn test_stim_buffer_map_matrix() {
        let store = ParameterStore::parse(base_lines()).unwrap();
        let entry = store.entry(keys::STIM_BUF_MAP_ENTRIES).unwrap();
        assert_eq!(entry.count(), Count::Shape(32, 128));
        let map = entry.value().as_matrix().unwrap();
        assert_eq!(map[[0, 1]], Scalar::UInt64(1));
        assert_eq!(map[[2, 0]], Scalar::UInt64(2));
        assert_eq!(map[[2, 1]], Scalar::UInt64(3));
        assert_eq!(map[[1, 0]], Scalar::UInt64(0));
        assert!(!store.contains_key("Channel_2_StimulusBufferMapEntry_#1"));

        let row = store.get_indexed(keys::STIM_BUF_MAP_ENTRIES, 2).unwrap();
        assert_eq!(row.as_list().unwrap().len(), 128);
        assert_eq!(store.get_indexed(keys::STIM_BUF_MAP_ENTRIES, 32), None);
    }

    #[test]
    fn test_input_channels_use_continuous_slots() {
        // mask 0b1011 -> AI0, AI1, AI3 read from PixelBuffer_#0..#2
        let store = ParameterStore::parse(base_lines()).unwrap();
        assert_eq!(store.input_channel_count(), Some(3));
        assert_eq!(store.pixel_buffer_lengths(), Some(vec![5120, 5120, 5120]));
        assert!(!store.contains_key("PixelBuffer_#2_Length"));
    }

    #[test]
    fn test_backfill_defaults() {
        let store = ParameterStore::parse(base_lines()).unwrap();
        assert_eq!(store.images_per_frame(), Some(1));
        assert_eq!(store.stim_bufs_per_frame(), Some(1));
        assert_eq!(store.get_u64(keys::ASPECT_RATIO_FRAME), Some(1));
        assert_eq!(store.frame_depth(), Some(1));
        assert_eq!(store.pixel_bufs_set(), Some(10));
        assert_eq!(store.pixel_buf_counter(), Some(10));
        // decoded sizes default to the raw frame size for XY scans
        assert_eq!(store.get_u64(keys::DX_FR_DECODED), Some(80));
        assert_eq!(store.get_u64(keys::DY_FR_DECODED), Some(64));
        assert_eq!(store.get_u64(keys::DZ_FR_DECODED), Some(1));
    }

    #[test]
    fn test_backfill_keeps_present_values() {
        let mut lines = base_lines();
        lines.push("UINT32,NumberOfPixBufsSet=7;".into());
        lines.push("UINT32,dxFrDecoded=40;".into());
        let store = ParameterStore::parse(lines).unwrap();
        assert_eq!(store.pixel_bufs_set(), Some(7));
        assert_eq!(store.get_u64(keys::DX_FR_DECODED), Some(40));
    }

    #[test]
    fn test_clamp_to_one() {
        let mut lines = base_lines();
        lines.push("UINT32,nImgPerFr=0;".into());
        lines.push("UINT32,StimBufPerFr=0;".into());
        lines.push("UINT32,AspectRatioFrame=3;".into());
        let store = ParameterStore::parse(lines).unwrap();
        assert_eq!(store.images_per_frame(), Some(1));
        assert_eq!(store.stim_bufs_per_frame(), Some(1));
        assert_eq!(store.get_u64(keys::ASPECT_RATIO_FRAME), Some(3));
        assert_eq!(store.entry(keys::N_IMG_PER_FR).unwrap().kind, ValueKind::UInt32);
    }

    #[test]
    fn test_repair_retrace_from_scan_path() {
        let mut lines = base_lines();
        replace(&mut lines, "UINT32,PixRetraceLen", Some("UINT32,PixRetraceLen=1O;"));
        replace(&mut lines, "UINT32,XPixLineOffs", Some("UINT32,XPixLineOffs=?;"));
        let store = ParameterStore::parse(lines).unwrap();
        assert_eq!(store.retrace_len(), Some(10));
        assert_eq!(store.line_offset(), Some(6));
    }

    #[test]
    fn test_unrepairable_key_stays_null() {
        let mut lines = base_lines();
        lines.push("UINT32,SetupID=one;".into());
        let store = ParameterStore::parse(lines).unwrap();
        assert!(store.contains_key(keys::SETUP_ID));
        assert_eq!(store.get(keys::SETUP_ID), None);
        assert!(store.entry(keys::SETUP_ID).unwrap().value().is_null());
    }

    #[test]
    fn test_repair_table_in_isolation() {
        let mut store = ParameterStore::new();
        store.insert(
            keys::SCAN_PATH_FUNC,
            ParameterEntry::new(
                ValueKind::String,
                ["XYScan2", "5120", "80", "64", "12", "4"]
                    .iter()
                    .map(|s| Scalar::Str(s.to_string()))
                    .collect::<Vec<_>>(),
            ),
        );
        store.insert(keys::PIX_RETRACE_LEN, ParameterEntry::null(ValueKind::UInt32));
        store.insert(keys::COMMENT, ParameterEntry::null(ValueKind::String));

        let left = store.repair(&[keys::PIX_RETRACE_LEN.to_string(), keys::COMMENT.to_string()]);
        assert_eq!(left, vec![keys::COMMENT.to_string()]);
        assert_eq!(store.retrace_len(), Some(12));
        assert!(recovery_for(keys::X_PIX_LINE_OFFS).is_some());
        assert!(recovery_for(keys::FRAME_WIDTH).is_none());
    }

    #[test]
    fn test_legacy_retrace_correction() {
        // 80 / (30 + 0) < 4 -> retrace and offset come from the scan path function
        let mut lines = base_lines();
        replace(&mut lines, "UINT32,PixRetraceLen", Some("UINT32,PixRetraceLen=30;"));
        replace(&mut lines, "UINT32,XPixLineOffs", Some("UINT32,XPixLineOffs=0;"));
        let store = ParameterStore::parse(lines).unwrap();
        assert_eq!(store.retrace_len(), Some(10));
        assert_eq!(store.line_offset(), Some(6));
    }

    #[test]
    fn test_no_correction_outside_xy_mode() {
        let mut lines = base_lines();
        replace(&mut lines, "UINT32,ScanMode", Some("UINT32,ScanMode=4;"));
        replace(&mut lines, "UINT32,PixRetraceLen", Some("UINT32,PixRetraceLen=30;"));
        let store = ParameterStore::parse(lines).unwrap();
        assert_eq!(store.retrace_len(), Some(30));
        assert_eq!(store.get_u64(keys::DX_FR_DECODED), Some(0));
    }

    #[test]
    fn test_decoded_width_wider_than_u32() {
        let mut lines = base_lines();
        replace(&mut lines, "UINT32,FrameWidth", Some("UINT64,FrameWidth=5000000000;"));
        let store = ParameterStore::parse(lines).unwrap();
        assert_eq!(store.get_u64(keys::DX_FR_DECODED), Some(5_000_000_000));
        assert_eq!(store.entry(keys::DX_FR_DECODED).unwrap().kind, ValueKind::UInt32);
        assert_eq!(store.get_u64(keys::DY_FR_DECODED), Some(64));
    }

    #[test]
    fn test_nan_integer_keeps_float_typing() {
        let mut lines = base_lines();
        lines.push("UINT32,LaserWavelength_nm=NaN;".into());
        let store = ParameterStore::parse(lines).unwrap();
        let entry = store.entry("LaserWavelength_nm").unwrap();
        assert_eq!(entry.kind, ValueKind::Real);
        assert!(entry.value().is_null());
    }

    #[test]
    fn test_counts_match_values() {
        let store = ParameterStore::parse(base_lines()).unwrap();
        for key in store.keys() {
            let entry = store.entry(key).unwrap();
            assert_eq!(entry.count(), entry.value().count(), "count of `{key}`");
        }
    }

    #[test]
    fn test_later_lines_overwrite() {
        let mut lines = base_lines();
        lines.push("REAL32,Zoom=2.0;".into());
        let store = ParameterStore::parse(lines).unwrap();
        assert_eq!(store.zoom(), Some(2.0));
    }

    #[test]
    fn test_set_and_remove() {
        let mut store = ParameterStore::parse(base_lines()).unwrap();
        assert!(store.set(keys::ZOOM, 1.25));
        assert_eq!(store.zoom(), Some(1.25));
        assert!(!store.set("NoSuchKey", 1u32));
        assert!(!store.contains_key("NoSuchKey"));
        assert_eq!(store.remove(keys::ZOOM), Some(Value::from(1.25)));
        assert_eq!(store.remove(keys::ZOOM), None);
    }

    #[test]
    fn test_scan_path_accessors() {
        let store = ParameterStore::parse(base_lines()).unwrap();
        assert_eq!(store.scan_path_func_name(), Some("XYScan2"));
        assert_eq!(store.scan_path_param(2), Some(80));
        assert_eq!(store.scan_path_param(20), None);
        assert_eq!(store.scan_mode(), Some(ScanMode::XYImage));
        assert_eq!(store.scan_type(), Some(ScanType::TimeLapsed));
    }

    #[test]
    fn test_from_header_bytes() {
        let mut data = vec![0u8; PreHeader::SIZE];
        for line in base_lines() {
            data.extend(encode_line(&line));
        }
        let store = ParameterStore::from_header_bytes(&data, true).unwrap();
        assert_eq!(store.target_pixel_duration_us(), Some(2.0));
        assert_eq!(store.get_str(keys::COMPUTER_NAME), Some("SCANM-PC"));
    }

    #[test]
    fn test_json_dump() {
        let store = ParameterStore::parse(base_lines()).unwrap();
        let json = store.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["FrameWidth"]["kind"], "UInt32");
        assert_eq!(parsed["FrameWidth"]["value"], 80);
    }
}
