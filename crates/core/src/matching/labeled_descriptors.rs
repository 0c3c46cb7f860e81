use crate::matching::descriptor::Descriptor;

/// A named person and the descriptors captured for them.
///
/// Descriptor order is insertion order; the registry guarantees the list is
/// never empty while the entry exists.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledDescriptors {
    label: String,
    descriptors: Vec<Descriptor>,
}

impl LabeledDescriptors {
    pub fn new(label: String, descriptors: Vec<Descriptor>) -> Self {
        Self {
            label,
            descriptors,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub(crate) fn push(&mut self, descriptor: Descriptor) {
        self.descriptors.push(descriptor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction() {
        let entry = LabeledDescriptors::new(
            "alice".to_string(),
            vec![Descriptor::new(vec![0.1, 0.2])],
        );
        assert_eq!(entry.label(), "alice");
        assert_eq!(entry.descriptors().len(), 1);
    }

    #[test]
    fn test_push_preserves_order() {
        let mut entry =
            LabeledDescriptors::new("bob".to_string(), vec![Descriptor::new(vec![1.0])]);
        entry.push(Descriptor::new(vec![2.0]));
        entry.push(Descriptor::new(vec![3.0]));
        let values: Vec<f32> = entry
            .descriptors()
            .iter()
            .map(|d| d.values()[0])
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }
}
