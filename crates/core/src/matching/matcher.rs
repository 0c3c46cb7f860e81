use thiserror::Error;

use crate::matching::descriptor::Descriptor;
use crate::matching::labeled_descriptors::LabeledDescriptors;
use crate::shared::constants::DEFAULT_MATCH_THRESHOLD;

#[derive(Error, Debug, PartialEq)]
pub enum MatcherError {
    #[error("cannot build a matcher from an empty registry")]
    EmptyRegistry,
}

/// Outcome of matching one descriptor against the enrolled set.
///
/// `label` is `None` when the nearest label is still beyond the distance
/// threshold (open-set "unknown"); `distance` is the smallest distance
/// found either way.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub label: Option<String>,
    pub distance: f64,
}

impl MatchResult {
    pub fn is_unknown(&self) -> bool {
        self.label.is_none()
    }
}

/// Nearest-label classifier over a frozen registry snapshot.
///
/// Owns its copy of the labeled descriptor sets; registry mutation after
/// construction never changes an already-built matcher. Safe to share
/// behind `Arc` and reuse across any number of `best_match` calls.
#[derive(Debug)]
pub struct FaceMatcher {
    entries: Vec<LabeledDescriptors>,
    threshold: f64,
}

impl FaceMatcher {
    /// Builds a matcher from a registry snapshot.
    ///
    /// Fails when the snapshot has no entries; the caller decides whether
    /// that means "disallow matching" or "treat every face as unknown".
    pub fn build(
        entries: Vec<LabeledDescriptors>,
        threshold: f64,
    ) -> Result<Self, MatcherError> {
        if entries.is_empty() {
            return Err(MatcherError::EmptyRegistry);
        }
        Ok(Self { entries, threshold })
    }

    /// Builds with the stock threshold of 0.6.
    pub fn build_with_default_threshold(
        entries: Vec<LabeledDescriptors>,
    ) -> Result<Self, MatcherError> {
        Self::build(entries, DEFAULT_MATCH_THRESHOLD)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Labels in snapshot order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label())
    }

    /// Classifies `query` against the closest enrolled label.
    ///
    /// Per label: the minimum distance between `query` and any of that
    /// label's descriptors. Across labels: the smallest minimum wins, with
    /// ties resolved to the first-encountered label in snapshot order.
    /// A winning distance above the threshold is reported as unknown.
    pub fn best_match(&self, query: &Descriptor) -> MatchResult {
        let mut best_label: Option<&str> = None;
        let mut best_distance = f64::INFINITY;

        for entry in &self.entries {
            let label_distance = entry
                .descriptors()
                .iter()
                .map(|d| query.distance(d))
                .fold(f64::INFINITY, f64::min);

            // Strict less-than keeps the first-encountered label on ties
            if label_distance < best_distance {
                best_distance = label_distance;
                best_label = Some(entry.label());
            }
        }

        if best_distance > self.threshold {
            MatchResult {
                label: None,
                distance: best_distance,
            }
        } else {
            MatchResult {
                label: best_label.map(str::to_string),
                distance: best_distance,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn descriptor(values: &[f32]) -> Descriptor {
        Descriptor::new(values.to_vec())
    }

    fn entry(label: &str, descriptors: &[&[f32]]) -> LabeledDescriptors {
        LabeledDescriptors::new(
            label.to_string(),
            descriptors.iter().map(|v| descriptor(v)).collect(),
        )
    }

    #[test]
    fn test_build_empty_snapshot_fails() {
        let result = FaceMatcher::build(vec![], 0.6);
        assert_eq!(result.unwrap_err(), MatcherError::EmptyRegistry);
    }

    #[test]
    fn test_build_with_default_threshold() {
        let matcher =
            FaceMatcher::build_with_default_threshold(vec![entry("alice", &[&[0.0]])]).unwrap();
        assert_relative_eq!(matcher.threshold(), 0.6);
    }

    #[test]
    fn test_nearest_label_within_threshold() {
        // distance(query, alice) = 0.3, distance(query, bob) = 0.9
        let matcher = FaceMatcher::build(
            vec![entry("alice", &[&[0.3, 0.0]]), entry("bob", &[&[0.9, 0.0]])],
            0.6,
        )
        .unwrap();

        let result = matcher.best_match(&descriptor(&[0.0, 0.0]));
        assert_eq!(result.label.as_deref(), Some("alice"));
        assert_relative_eq!(result.distance, 0.3);
    }

    #[test]
    fn test_nearest_label_beyond_threshold_is_unknown() {
        // Same geometry, tighter threshold: alice is nearest but still unknown
        let matcher = FaceMatcher::build(
            vec![entry("alice", &[&[0.3, 0.0]]), entry("bob", &[&[0.9, 0.0]])],
            0.2,
        )
        .unwrap();

        let result = matcher.best_match(&descriptor(&[0.0, 0.0]));
        assert!(result.is_unknown());
        assert_relative_eq!(result.distance, 0.3);
    }

    #[test]
    fn test_distance_exactly_at_threshold_matches() {
        let matcher = FaceMatcher::build(vec![entry("alice", &[&[0.6, 0.0]])], 0.6).unwrap();
        let result = matcher.best_match(&descriptor(&[0.0, 0.0]));
        assert_eq!(result.label.as_deref(), Some("alice"));
    }

    #[test]
    fn test_label_minimum_over_its_descriptor_set() {
        // alice's second capture is the close one
        let matcher = FaceMatcher::build(
            vec![entry("alice", &[&[5.0, 0.0], &[0.1, 0.0]])],
            0.6,
        )
        .unwrap();

        let result = matcher.best_match(&descriptor(&[0.0, 0.0]));
        assert_eq!(result.label.as_deref(), Some("alice"));
        assert_relative_eq!(result.distance, 0.1);
    }

    #[test]
    fn test_tie_resolves_to_first_snapshot_entry() {
        // Both labels at distance 0.5 from the query
        let matcher = FaceMatcher::build(
            vec![entry("carol", &[&[0.5, 0.0]]), entry("dave", &[&[-0.5, 0.0]])],
            0.6,
        )
        .unwrap();

        let result = matcher.best_match(&descriptor(&[0.0, 0.0]));
        assert_eq!(result.label.as_deref(), Some("carol"));
    }

    #[test]
    fn test_best_match_deterministic() {
        let matcher = FaceMatcher::build(
            vec![entry("alice", &[&[0.1, 0.2]]), entry("bob", &[&[0.7, 0.1]])],
            0.6,
        )
        .unwrap();

        let query = descriptor(&[0.0, 0.0]);
        let first = matcher.best_match(&query);
        let second = matcher.best_match(&query);
        assert_eq!(first, second);
    }

    #[test]
    fn test_matcher_isolated_from_registry_mutation() {
        use crate::matching::registry::DescriptorRegistry;

        let mut registry = DescriptorRegistry::new();
        registry.add("alice", descriptor(&[0.3, 0.0])).unwrap();

        let matcher = FaceMatcher::build(registry.snapshot(), 0.6).unwrap();
        let before = matcher.best_match(&descriptor(&[0.0, 0.0]));

        // A closer "bob" added afterwards must not affect the built matcher
        registry.add("bob", descriptor(&[0.05, 0.0])).unwrap();
        let after = matcher.best_match(&descriptor(&[0.0, 0.0]));

        assert_eq!(before, after);
        assert_eq!(after.label.as_deref(), Some("alice"));
    }

    #[test]
    fn test_unknown_reports_smallest_distance_found() {
        let matcher = FaceMatcher::build(
            vec![entry("alice", &[&[2.0, 0.0]]), entry("bob", &[&[3.0, 0.0]])],
            0.6,
        )
        .unwrap();

        let result = matcher.best_match(&descriptor(&[0.0, 0.0]));
        assert!(result.is_unknown());
        assert_relative_eq!(result.distance, 2.0);
    }

    #[test]
    fn test_labels_in_snapshot_order() {
        let matcher = FaceMatcher::build(
            vec![entry("zoe", &[&[1.0]]), entry("amy", &[&[2.0]])],
            0.6,
        )
        .unwrap();
        let labels: Vec<&str> = matcher.labels().collect();
        assert_eq!(labels, vec!["zoe", "amy"]);
    }
}
