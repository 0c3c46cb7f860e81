//! Face enrollment and live matching.
//!
//! The crate is split into domain modules (traits and pure logic) and
//! infrastructure modules (ONNX, ffmpeg, and image-codec backends):
//!
//! - [`matching`] — the labeled-descriptor registry and the nearest-label
//!   matcher built from it.
//! - [`detection`] — face detection and descriptor extraction seams plus
//!   their pretrained-model implementations.
//! - [`session`] — the enrollment session and the cancellable live
//!   matching loop.
//! - [`video`] — frame sources for videos and still images.
//! - [`shared`] — frame/stream types, constants, and model resolution.

pub mod detection;
pub mod matching;
pub mod session;
pub mod shared;
pub mod video;
