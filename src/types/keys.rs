//! Parameter key names as written by ScanM, plus the keys synthesized
//! while loading.

pub const COMPUTER_NAME: &str = "ComputerName";
pub const USER_NAME: &str = "UserName";
pub const ORIG_PIX_DATA_FILE_NAME: &str = "OriginalPixelDataFileName";
pub const DATE_STAMP: &str = "DateStamp";
pub const TIME_STAMP: &str = "TimeStamp";
pub const PIXEL_SIZE_IN_BYTES: &str = "PixelSizeInBytes";
pub const STIM_CHANNEL_MASK: &str = "StimulusChannelMask";
pub const MIN_VOLTS_AO: &str = "MinVoltsAO";
pub const MAX_VOLTS_AO: &str = "MaxVoltsAO";
pub const MAX_STIM_BUF_MAP_LEN: &str = "MaxStimulusBufferMapLength";
pub const NUMBER_OF_STIM_BUFS: &str = "NumberOfStimulusBuffers";
pub const INPUT_CHANNEL_MASK: &str = "InputChannelMask";
pub const TARGETED_PIX_DUR: &str = "TargetedPixelDuration_µs";
pub const MIN_VOLTS_AI: &str = "MinVoltsAI";
pub const MAX_VOLTS_AI: &str = "MaxVoltsAI";
pub const NUMBER_OF_FRAMES: &str = "NumberOfFrames";
pub const PIXEL_OFFSET: &str = "PixelOffset";
pub const HEADER_LEN_IN_VALUE_PAIRS: &str = "HeaderLengthInValuePairs";
pub const HEADER_LEN_IN_BYTES: &str = "Header_length_in_bytes";
pub const FRAME_COUNTER: &str = "FrameCounter";
pub const REAL_PIX_DUR: &str = "RealPixelDuration_µs";
pub const OVERSAMPLING_FACTOR: &str = "Oversampling_Factor";
pub const NUMBER_OF_PIX_BUFS_SET: &str = "NumberOfPixBufsSet";
pub const PIX_BUF_COUNTER: &str = "PixBufCounter";

// Synthesized
pub const STIM_BUF_LEN_LIST: &str = "StimBufLenList";
pub const STIM_BUF_MAP_ENTRIES: &str = "StimBufMapEntries";
pub const TARGETED_STIM_DUR_LIST: &str = "TargetedStimDurList";
pub const REAL_STIM_DUR_LIST: &str = "RealStimDurList";
pub const NUMBER_OF_INPUT_CHANS: &str = "NumberOfInputChans";
pub const IN_CHAN_PIX_BUF_LEN_LIST: &str = "InChan_PixBufLenList";

// User keys
pub const SCAN_MODE: &str = "ScanMode";
pub const SCAN_TYPE: &str = "ScanType";
pub const FRAME_WIDTH: &str = "FrameWidth";
pub const FRAME_HEIGHT: &str = "FrameHeight";
pub const FRAME_DEPTH: &str = "dZPixels";
pub const SCAN_PATH_FUNC: &str = "ScanPathFunc";
pub const PIX_RETRACE_LEN: &str = "PixRetraceLen";
pub const X_PIX_LINE_OFFS: &str = "XPixLineOffs";
pub const Y_PIX_LINE_OFFS: &str = "YPixLineOffs";
pub const Z_PIX_LINE_OFFS: &str = "ZPixLineOffs";
pub const CHUNKS_PER_FRAME: &str = "ChunksPerFrame";
pub const N_SUB_PIX_OVERSAMP: &str = "NSubPixOversamp";
pub const X_COORD_UM: &str = "XCoord_um";
pub const Y_COORD_UM: &str = "YCoord_um";
pub const Z_COORD_UM: &str = "ZCoord_um";
pub const Z_STEP_UM: &str = "ZStep_um";
pub const ZOOM: &str = "Zoom";
pub const ANGLE_DEG: &str = "Angle_deg";
pub const N_FR_PER_STEP: &str = "NFrPerStep";
pub const COMMENT: &str = "Comment";
pub const SETUP_ID: &str = "SetupID";
pub const OBJECTIVE: &str = "Objective";
pub const ASPECT_RATIO_FRAME: &str = "AspectRatioFrame";
pub const STIM_BUF_PER_FR: &str = "StimBufPerFr";
pub const DX_FR_DECODED: &str = "dxFrDecoded";
pub const DY_FR_DECODED: &str = "dyFrDecoded";
pub const DZ_FR_DECODED: &str = "dzFrDecoded";
pub const N_IMG_PER_FR: &str = "nImgPerFr";

pub fn stim_buf_len(buffer: usize) -> String {
    format!("StimulusBufferLength_#{buffer}")
}

pub fn targeted_stim_dur(buffer: usize) -> String {
    format!("Channel_{buffer}_TargetedStimulusDuration_µs")
}

pub fn real_stim_dur(buffer: usize) -> String {
    format!("AO_A_Channel_{buffer}_RealStimulusDuration_µs")
}

pub fn stim_buf_map_entry(channel: usize, entry: usize) -> String {
    format!("Channel_{channel}_StimulusBufferMapEntry_#{entry}")
}

/// Pixel buffers are numbered continuously over the active input channels,
/// not by AI channel index.
pub fn pix_buf_len(slot: usize) -> String {
    format!("PixelBuffer_#{slot}_Length")
}
