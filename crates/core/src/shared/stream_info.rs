use std::path::PathBuf;

/// Metadata of an opened frame source.
///
/// Still images are represented as a one-frame stream with `fps = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}
