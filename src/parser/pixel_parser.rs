use winnow::{
    Parser,
    binary::{le_f64, le_u16},
    error::ContextError,
};

/// A raw pixel sample as stored in the `.smp` file.
pub trait Sample: Copy + Default + Send + Sync {
    const SIZE: usize;

    fn parse_le(input: &mut &[u8]) -> Result<Self, ContextError>;
}

impl Sample for u16 {
    const SIZE: usize = 2;

    fn parse_le(input: &mut &[u8]) -> Result<Self, ContextError> {
        le_u16.parse_next(input)
    }
}

impl Sample for f64 {
    const SIZE: usize = 8;

    fn parse_le(input: &mut &[u8]) -> Result<Self, ContextError> {
        le_f64.parse_next(input)
    }
}

/// Layout of the interleaved pixel buffers: each buffer holds
/// `buffer_len` samples of every active channel, channel after channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    pub buffer_len: usize,
    pub channel_count: usize,
}

impl BufferLayout {
    /// Bytes per buffer covering all channels.
    pub fn buffer_bytes<T: Sample>(&self) -> usize {
        self.buffer_len * self.channel_count * T::SIZE
    }

    /// Byte range of channel `slot` inside buffer `index`.
    pub fn slice_range<T: Sample>(&self, index: usize, slot: usize) -> std::ops::Range<usize> {
        let start = self.buffer_bytes::<T>() * index + slot * self.buffer_len * T::SIZE;
        start..start + self.buffer_len * T::SIZE
    }
}

/// Copies channel `slot` of the first `dest.len() / buffer_len` buffers in
/// `data` into `dest`, buffer by buffer.
pub fn parse_channel_samples<T: Sample>(
    data: &[u8],
    layout: BufferLayout,
    slot: usize,
    dest: &mut [T],
) -> Result<(), ContextError> {
    if layout.buffer_len == 0 {
        return Ok(());
    }
    for (index, chunk) in dest.chunks_exact_mut(layout.buffer_len).enumerate() {
        let range = layout.slice_range::<T>(index, slot);
        let mut input = data.get(range).ok_or_else(ContextError::new)?;
        for sample in chunk.iter_mut() {
            *sample = T::parse_le(&mut input)?;
        }
    }
    Ok(())
}
