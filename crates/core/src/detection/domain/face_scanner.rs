use crate::detection::domain::descriptor_extractor::DescriptorExtractor;
use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::face_detector::FaceDetector;
use crate::matching::descriptor::Descriptor;
use crate::shared::frame::{Frame, CHANNELS};

/// Composes a detector and an extractor into a descriptor-per-face scan.
///
/// This is the boundary the rest of the system consumes: a still image in,
/// descriptors out. `scan_single` is the enrollment contract (best face or
/// none), `scan` the live-loop contract (every face, per frame).
pub struct FaceScanner {
    detector: Box<dyn FaceDetector>,
    extractor: Box<dyn DescriptorExtractor>,
}

impl FaceScanner {
    pub fn new(detector: Box<dyn FaceDetector>, extractor: Box<dyn DescriptorExtractor>) -> Self {
        Self {
            detector,
            extractor,
        }
    }

    /// Extracts a descriptor for every detected face.
    pub fn scan(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<(FaceBox, Descriptor)>, Box<dyn std::error::Error>> {
        let faces = self.detector.detect(frame)?;
        let mut results = Vec::with_capacity(faces.len());
        for face in faces {
            let crop = square_crop(frame, &face);
            let descriptor = self.extractor.extract(&crop)?;
            results.push((face, descriptor));
        }
        Ok(results)
    }

    /// Extracts a descriptor for the highest-confidence face, or `None`
    /// when the frame contains no detectable face.
    pub fn scan_single(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<(FaceBox, Descriptor)>, Box<dyn std::error::Error>> {
        let faces = self.detector.detect(frame)?;
        let Some(best) = faces.into_iter().max_by(|a, b| {
            a.score
                .partial_cmp(&b.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        }) else {
            return Ok(None);
        };

        let crop = square_crop(frame, &best);
        let descriptor = self.extractor.extract(&crop)?;
        Ok(Some((best, descriptor)))
    }
}

/// Extracts a square crop centered on the face box, clamped to frame bounds.
///
/// Recognition models want square, face-centered input; the side length is
/// the larger box dimension.
fn square_crop(frame: &Frame, face: &FaceBox) -> Frame {
    let fw = frame.width() as i32;
    let fh = frame.height() as i32;

    let cx = face.x + face.width / 2;
    let cy = face.y + face.height / 2;
    let half = face.width.max(face.height) / 2;

    let x1 = (cx - half).max(0) as usize;
    let y1 = (cy - half).max(0) as usize;
    let x2 = (cx + half).min(fw) as usize;
    let y2 = (cy + half).min(fh) as usize;

    let crop_w = x2 - x1;
    let crop_h = y2 - y1;

    let src = frame.as_ndarray();
    let mut data = Vec::with_capacity(crop_w * crop_h * CHANNELS);

    for row in y1..y2 {
        for col in x1..x2 {
            for c in 0..CHANNELS {
                data.push(src[[row, col, c]]);
            }
        }
    }

    Frame::new(data, crop_w as u32, crop_h as u32, frame.index())
}
