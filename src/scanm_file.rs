use crate::error::{Error, Result};
use crate::parameter_store::ParameterStore;
use crate::parser::decode_pre_header;
use crate::pixel_reader::{PixelReadout, ScanGeometry, read_pixel_data, supported_scan_mode};
use crate::scan_function::{ClassifiedScanFunction, classify};
use crate::types::channel_data::ChannelView;
use crate::types::keys;
use crate::types::parameter::Value;
use crate::types::pre_header::PreHeader;
use crate::utils::file_utils::read_binary_file_mmap;
use crate::utils::{HEADER_FILE_EXT, PIXEL_DATA_FILE_EXT, format_mask, paired_path, recording_base};
use bon::Builder;
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Loader settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Builder)]
pub struct LoadOptions {
    /// Log every decoded parameter line.
    #[builder(default)]
    pub verbose: bool,
    /// Byte offset of the first pixel buffer in the `.smp` file.
    #[builder(default)]
    pub pixel_data_offset: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadState {
    Empty,
    HeaderLoaded,
    PixelDataLoaded,
}

/// Contents of a `.smh` file.
#[derive(Debug, Clone)]
pub struct HeaderData {
    /// Recording path without extension.
    pub base_path: PathBuf,
    pub pre_header: PreHeader,
    pub parameters: ParameterStore,
}

/// Contents of a `.smp` file.
#[derive(Debug, Clone)]
pub struct PixelData {
    pub trailer: PreHeader,
    pub guid_matches: bool,
    pub scan_function: ClassifiedScanFunction,
    pub readout: PixelReadout,
}

/// A ScanM recording, loaded in two steps: header, then pixel data.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandle {
    options: LoadOptions,
    header: Option<HeaderData>,
    pixels: Option<PixelData>,
}

impl RecordingHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Opens a recording and loads its header and pixel data.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut handle = Self::new();
        handle.load_header(path)?;
        handle.load_pixel_data()?;
        Ok(handle)
    }

    /// Loads the `.smh` file of the recording `path` points to; the
    /// extension of `path` is ignored. Any loaded state is dropped first.
    pub fn load_header(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.reset();

        let base_path = recording_base(path);
        let smh_path = paired_path(&base_path, HEADER_FILE_EXT);
        let data = read_binary_file_mmap(&smh_path)?;
        info!("Processing file `{}`", smh_path.display());

        info!("Loading pre-header ...");
        let pre_header = decode_pre_header(&data, 0)?;

        info!("Loading parameters (key-value pairs) ...");
        let parameters = ParameterStore::from_header_bytes(&data, self.options.verbose)?;

        self.header = Some(HeaderData {
            base_path,
            pre_header,
            parameters,
        });
        info!("Done.");
        Ok(())
    }

    /// Loads the `.smp` file belonging to the loaded header. Fails without
    /// touching the handle if no header is loaded or pixel data already is.
    pub fn load_pixel_data(&mut self) -> Result<()> {
        let header = self
            .header
            .as_ref()
            .ok_or(Error::InvalidState("load the header first"))?;
        if self.pixels.is_some() {
            return Err(Error::InvalidState("pixel data already loaded"));
        }

        let smp_path = paired_path(&header.base_path, PIXEL_DATA_FILE_EXT);
        if !smp_path.exists() {
            return Err(Error::FileNotFound(smp_path));
        }
        let store = &header.parameters;
        supported_scan_mode(store)?;
        let scan_function = classify(store);

        let data = read_binary_file_mmap(&smp_path)?;
        info!("Processing file `{}`", smp_path.display());

        info!("Loading post-header ...");
        let trailer = decode_pre_header(&data, header.pre_header.analog_data_len_bytes)?;
        let guid_matches = trailer.same_recording(&header.pre_header);
        if !guid_matches {
            warn!(
                "WARNING: GUID mismatch {} != {}",
                header.pre_header.guid_hex(),
                trailer.guid_hex()
            );
        }

        let offset = usize::try_from(self.options.pixel_data_offset).unwrap_or(usize::MAX);
        let readout = read_pixel_data(&data, store, &scan_function, offset)?;

        self.pixels = Some(PixelData {
            trailer,
            guid_matches,
            scan_function,
            readout,
        });
        info!("Done.");
        Ok(())
    }

    pub fn reset(&mut self) {
        self.header = None;
        self.pixels = None;
    }

    pub fn state(&self) -> LoadState {
        match (&self.header, &self.pixels) {
            (None, _) => LoadState::Empty,
            (Some(_), None) => LoadState::HeaderLoaded,
            (Some(_), Some(_)) => LoadState::PixelDataLoaded,
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn header(&self) -> Option<&HeaderData> {
        self.header.as_ref()
    }

    pub fn pixel_data(&self) -> Option<&PixelData> {
        self.pixels.as_ref()
    }

    pub fn parameters(&self) -> Option<&ParameterStore> {
        self.header.as_ref().map(|h| &h.parameters)
    }

    pub fn pre_header(&self) -> Option<&PreHeader> {
        self.header.as_ref().map(|h| &h.pre_header)
    }

    /// GUID of the recording as lowercase hex.
    pub fn guid(&self) -> Option<String> {
        self.pre_header().map(PreHeader::guid_hex)
    }

    /// Whether the `.smp` trailer carries the header's GUID.
    pub fn guid_matches(&self) -> Option<bool> {
        self.pixels.as_ref().map(|p| p.guid_matches)
    }

    /// Parameter value; `None` if no header is loaded, the key is unknown or
    /// its value is null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters()?.get(key)
    }

    pub fn geometry(&self) -> Option<&ScanGeometry> {
        self.pixels.as_ref().map(|p| &p.readout.geometry)
    }

    /// Pixel array of input channel `channel`, shaped (frames, rows, columns).
    /// With `crop` the fast axis is restricted to the imaged region.
    pub fn get_data(&self, channel: usize, crop: bool) -> Option<ChannelView<'_>> {
        let pixels = self.pixels.as_ref()?;
        let data = pixels.readout.channels.get(&channel)?;
        if crop {
            let g = &pixels.readout.geometry;
            Some(data.cropped(g.offset, g.retrace))
        } else {
            Some(data.view())
        }
    }

    /// Loaded input channels in ascending order.
    pub fn channels(&self) -> Vec<usize> {
        self.pixels
            .as_ref()
            .map(|p| p.readout.channels.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of frames read; `None` before pixel data is loaded.
    pub fn frame_count(&self) -> Option<usize> {
        self.pixels.as_ref().map(|p| p.readout.arithmetic.frame_count)
    }

    /// Human-readable overview of the recording.
    pub fn summary(&self) -> String {
        let Some(store) = self.parameters() else {
            return "Summary\n-------\nNo header loaded\n".to_string();
        };
        let or_na = |v: Option<String>| v.unwrap_or_else(|| "n/a".to_string());
        let num = |v: Option<u64>| or_na(v.map(|v| v.to_string()));

        let mode_name = store
            .scan_mode()
            .map(|m| m.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let count = self
            .frame_count()
            .map(|n| format!("{n} recorded"))
            .unwrap_or_else(|| "n/a".to_string());

        let lines = [
            "Summary".to_string(),
            "-------".to_string(),
            format!(
                "Scan    : mode, type   : {mode_name} ({}), {}",
                num(store.scan_mode_code()),
                num(store.get_u64(keys::SCAN_TYPE))
            ),
            format!(
                "Pixel   : size         : {} bytes/pixel",
                num(store.pixel_size_bytes())
            ),
            format!(
                "          duration     : {} us ({})",
                or_na(store.pixel_duration_us().map(|v| v.to_string())),
                or_na(store.target_pixel_duration_us().map(|v| v.to_string()))
            ),
            format!(
                "Frame   : x-y size     : {} x {} pixels",
                num(store.frame_width()),
                num(store.frame_height())
            ),
            format!("          x-offset     : {} pixels", num(store.line_offset())),
            format!("          x-retrace    : {} pixels", num(store.retrace_len())),
            format!("          count        : {count}"),
            format!(
                "          organisation : {} pixel buffers/frame",
                num(store.pixel_bufs_per_frame())
            ),
            format!("Stimulus: # of buffers : {}", num(store.stim_buf_count())),
            format!(
                "          mask         : {}",
                or_na(store.stim_channel_mask().map(format_mask))
            ),
            format!("Input   : # of channels: {}", num(store.input_channel_count())),
            format!(
                "          mask         : {}",
                or_na(store.input_channel_mask().map(format_mask))
            ),
            format!(
                "Zoom factor            : {}",
                or_na(store.zoom().map(|z| format!("{z:3.2}")))
            ),
        ];
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_data_needs_header() {
        let mut handle = RecordingHandle::new();
        assert!(matches!(
            handle.load_pixel_data(),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(handle.state(), LoadState::Empty);
        assert!(handle.get_data(0, true).is_none());
        assert_eq!(handle.frame_count(), None);
        assert!(handle.channels().is_empty());
    }

    #[test]
    fn test_missing_header_file() {
        let mut handle = RecordingHandle::with_options(LoadOptions::builder().verbose(true).build());
        let err = handle.load_header("/nonexistent/recording.smh").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(ref p) if p.ends_with("recording.smh")));
        assert_eq!(err.code(), 2);
        assert_eq!(handle.state(), LoadState::Empty);
    }

    #[test]
    fn test_summary_without_header() {
        assert!(RecordingHandle::new().summary().contains("No header loaded"));
    }

    #[test]
    fn test_summary_layout() {
        let parameters = ParameterStore::parse([
            "UINT32,ScanMode=0;",
            "UINT32,FrameWidth=80;",
            "UINT32,FrameHeight=16;",
            "UINT32,InputChannelMask=5;",
            "REAL32,Zoom=0.650000;",
        ])
        .unwrap();
        let handle = RecordingHandle {
            header: Some(HeaderData {
                base_path: PathBuf::from("rec"),
                pre_header: PreHeader::builder()
                    .file_type("SM4".to_string())
                    .guid([0; 16])
                    .header_len_bytes(0)
                    .header_len_entries(5)
                    .header_start_bytes(64)
                    .pixel_data_len_bytes(0)
                    .analog_data_len_bytes(0)
                    .build(),
                parameters,
            }),
            ..RecordingHandle::default()
        };
        let summary = handle.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 15);
        assert!(summary.ends_with('\n'));
        assert_eq!(lines[0], "Summary");
        assert_eq!(lines[2], "Scan    : mode, type   : XYImage (0), n/a");
        assert_eq!(lines[5], "Frame   : x-y size     : 80 x 16 pixels");
        assert_eq!(lines[8], "          count        : n/a");
        assert_eq!(lines[13], "          mask         : 0101");
        assert_eq!(lines[14], "Zoom factor            : 0.65");
    }

    #[test]
    fn test_default_options() {
        let options = LoadOptions::default();
        assert!(!options.verbose);
        assert_eq!(options.pixel_data_offset, 0);
        assert_eq!(LoadOptions::builder().build(), options);
    }
}
