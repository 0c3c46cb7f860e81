use thiserror::Error;

use crate::matching::descriptor::Descriptor;
use crate::matching::labeled_descriptors::LabeledDescriptors;

#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("label must not be empty")]
    EmptyLabel,
    #[error("descriptor must not be empty")]
    EmptyDescriptor,
    #[error("descriptor length {actual} does not match registry length {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Accumulates named face descriptors for matcher construction.
///
/// Labels are unique; adding under an existing label appends to that
/// label's descriptor list rather than replacing it, so repeated captures
/// of the same person widen their descriptor set. Entries are kept in
/// first-added order, which fixes snapshot order and, downstream, the
/// matcher's tie-breaking.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    entries: Vec<LabeledDescriptors>,
}

impl DescriptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor under `label`, creating the entry on first use.
    ///
    /// Returns the number of descriptors now stored for that label.
    /// A failed add leaves the registry unchanged.
    pub fn add(&mut self, label: &str, descriptor: Descriptor) -> Result<usize, RegistryError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(RegistryError::EmptyLabel);
        }
        if descriptor.is_empty() {
            return Err(RegistryError::EmptyDescriptor);
        }
        if let Some(expected) = self.descriptor_len() {
            if descriptor.len() != expected {
                return Err(RegistryError::LengthMismatch {
                    expected,
                    actual: descriptor.len(),
                });
            }
        }

        match self.entries.iter_mut().find(|e| e.label() == label) {
            Some(entry) => {
                entry.push(descriptor);
                Ok(entry.descriptors().len())
            }
            None => {
                self.entries
                    .push(LabeledDescriptors::new(label.to_string(), vec![descriptor]));
                Ok(1)
            }
        }
    }

    /// Defensive copy of all entries in registry order, for matcher
    /// construction. Does not alias internal storage.
    pub fn snapshot(&self) -> Vec<LabeledDescriptors> {
        self.entries.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Descriptor length pinned by the first add, if any.
    fn descriptor_len(&self) -> Option<usize> {
        self.entries
            .first()
            .and_then(|e| e.descriptors().first())
            .map(|d| d.len())
    }
}
