//! Scene-camera frame references.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A reference to one scene-camera frame.
///
/// The scene video itself stays on disk; recordings only carry the
/// per-frame capture timestamps, and the index here is the frame's
/// ordinal in that sequence. Fused rows keep the index so playback
/// can seek the video to the frame a row was aligned against.
///
/// # Example
///
/// ```
/// use gaze_types::VideoFrame;
///
/// let frame = VideoFrame::new(42);
/// assert_eq!(frame.index, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VideoFrame {
    /// Zero-based frame index into the scene video.
    pub index: u64,
}

impl VideoFrame {
    /// Creates a frame reference from its index.
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self { index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_round_trip() {
        let frame = VideoFrame::new(42);
        assert_eq!(frame.index, 42);
        assert_eq!(frame, VideoFrame::new(42));
    }
}
