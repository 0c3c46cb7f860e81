use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::stream_info::StreamInfo;

/// Produces frames for the live loop and enrollment captures.
///
/// Implementations own the I/O details (codec, container, still-image
/// decoding); consumers see only [`Frame`] and [`StreamInfo`]. A video
/// file or a single still both satisfy this interface, so the session
/// code treats camera stand-ins and captured images uniformly.
pub trait FrameSource: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<StreamInfo, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
