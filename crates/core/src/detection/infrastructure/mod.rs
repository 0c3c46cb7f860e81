pub mod execution_provider;
pub mod onnx_arcface_extractor;
pub mod onnx_blazeface_detector;
