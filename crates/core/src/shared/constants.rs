pub const DETECTOR_MODEL_NAME: &str = "blazeface_short_range.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/facematch/facematch/releases/download/v0.1.0/blazeface_short_range.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/facematch/facematch/releases/download/v0.1.0/w600k_r50.onnx";

/// Embedding length produced by the bundled ArcFace model.
pub const DESCRIPTOR_LEN: usize = 512;

/// Euclidean distance above which a match is reported as unknown.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Live loop poll interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
