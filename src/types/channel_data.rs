//! Per-channel pixel arrays

use ndarray::{Array3, ArrayView3, s};

/// Reshaped samples of one input channel, shaped (frames, slow, fast).
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelData {
    U16(Array3<u16>),
    F64(Array3<f64>),
}

/// Borrowed view of a channel, optionally cropped along the fast axis.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelView<'a> {
    U16(ArrayView3<'a, u16>),
    F64(ArrayView3<'a, f64>),
}

impl ChannelData {
    pub fn shape(&self) -> [usize; 3] {
        let dim = match self {
            ChannelData::U16(a) => a.dim(),
            ChannelData::F64(a) => a.dim(),
        };
        [dim.0, dim.1, dim.2]
    }

    pub fn view(&self) -> ChannelView<'_> {
        match self {
            ChannelData::U16(a) => ChannelView::U16(a.view()),
            ChannelData::F64(a) => ChannelView::F64(a.view()),
        }
    }

    /// Fast axis restricted to `[offset, len - retrace)`. No copy.
    pub fn cropped(&self, offset: usize, retrace: usize) -> ChannelView<'_> {
        let fast = self.shape()[2];
        let end = fast.saturating_sub(retrace);
        let start = offset.min(end);
        match self {
            ChannelData::U16(a) => ChannelView::U16(a.slice(s![.., .., start..end])),
            ChannelData::F64(a) => ChannelView::F64(a.slice(s![.., .., start..end])),
        }
    }
}

impl<'a> ChannelView<'a> {
    pub fn shape(&self) -> [usize; 3] {
        let dim = match self {
            ChannelView::U16(a) => a.dim(),
            ChannelView::F64(a) => a.dim(),
        };
        [dim.0, dim.1, dim.2]
    }

    pub fn as_u16(&self) -> Option<&ArrayView3<'a, u16>> {
        match self {
            ChannelView::U16(a) => Some(a),
            ChannelView::F64(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<&ArrayView3<'a, f64>> {
        match self {
            ChannelView::F64(a) => Some(a),
            ChannelView::U16(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_fast_axis() {
        let data = ChannelData::U16(Array3::from_shape_fn((2, 4, 80), |(_, _, x)| x as u16));
        let view = data.cropped(6, 10);
        assert_eq!(view.shape(), [2, 4, 64]);
        let arr = view.as_u16().unwrap();
        assert_eq!(arr[[0, 0, 0]], 6);
        assert_eq!(arr[[1, 3, 63]], 69);
    }

    #[test]
    fn test_crop_without_retrace_keeps_tail() {
        let data = ChannelData::F64(Array3::zeros((1, 2, 16)));
        assert_eq!(data.cropped(4, 0).shape(), [1, 2, 12]);
        assert_eq!(data.view().shape(), [1, 2, 16]);
    }

    #[test]
    fn test_crop_larger_than_axis_is_empty() {
        let data = ChannelData::U16(Array3::zeros((1, 1, 8)));
        assert_eq!(data.cropped(6, 6).shape(), [1, 1, 0]);
    }
}
