use crate::matching::descriptor::Descriptor;
use crate::shared::frame::Frame;

/// Domain interface for turning a face crop into an embedding descriptor.
///
/// The input frame is expected to be a crop centered on a single face;
/// pairing with a [`FaceDetector`](super::face_detector::FaceDetector) is
/// the scanner's job.
pub trait DescriptorExtractor: Send {
    fn extract(&self, face: &Frame) -> Result<Descriptor, Box<dyn std::error::Error>>;
}
