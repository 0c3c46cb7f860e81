use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::stream_info::StreamInfo;
use crate::video::domain::frame_source::FrameSource;

/// Adapts a still image file to the [`FrameSource`] interface.
///
/// Decodes via the `image` crate and presents the result as a one-frame
/// stream with `fps = 0`, so enrollment stills flow through the same seam
/// as video.
pub struct ImageFileSource {
    frame: Option<Frame>,
}

impl ImageFileSource {
    pub fn new() -> Self {
        Self { frame: None }
    }

    /// Convenience for enrollment: open, decode, and return the single
    /// frame in one call.
    pub fn load_still(path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let mut source = Self::new();
        source.open(path)?;
        let frame = source
            .frames()
            .next()
            .ok_or("ImageFileSource produced no frame")??;
        Ok(frame)
    }
}

impl Default for ImageFileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for ImageFileSource {
    fn open(&mut self, path: &Path) -> Result<StreamInfo, Box<dyn std::error::Error>> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        self.frame = Some(Frame::new(rgb.into_raw(), width, height, 0));

        Ok(StreamInfo {
            width,
            height,
            fps: 0.0,
            total_frames: 1,
            source_path: Some(path.to_path_buf()),
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if self.frame.is_none() {
            return Box::new(std::iter::once(Err("ImageFileSource: not opened".into())));
        }
        Box::new(self.frame.take().into_iter().map(Ok))
    }

    fn close(&mut self) {
        self.frame = None;
    }
}
