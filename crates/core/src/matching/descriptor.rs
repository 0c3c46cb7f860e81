/// A face embedding vector produced by a recognition model.
///
/// Immutable once constructed. The length is model-determined (512 for the
/// bundled ArcFace model); distance is only meaningful between descriptors
/// of the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor(Vec<f32>);

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// Euclidean distance to another descriptor, accumulated in f64.
    pub fn distance(&self, other: &Descriptor) -> f64 {
        debug_assert_eq!(
            self.0.len(),
            other.0.len(),
            "descriptors must have equal length"
        );
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = (*a as f64) - (*b as f64);
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}
