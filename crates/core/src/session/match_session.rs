use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::detection::domain::face_scanner::FaceScanner;
use crate::matching::matcher::{FaceMatcher, MatcherError};
use crate::matching::registry::{DescriptorRegistry, RegistryError};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no face found in the captured image")]
    NoFaceFound,
    #[error("face scan failed: {0}")]
    Scan(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Matcher(#[from] MatcherError),
}

/// Shared slot holding the matcher the live loop reads each tick.
///
/// `rebuild` swaps the inner `Arc` under a short write lock; readers clone
/// the `Arc` under a read lock and use it lock-free. `None` means no
/// matcher has been built yet.
pub type SharedMatcher = Arc<RwLock<Option<Arc<FaceMatcher>>>>;

/// One enrollment-and-matching session.
///
/// Owns the registry and the shared matcher slot the application passes
/// into UI handlers and the live loop. Enrolling never rebuilds the
/// matcher implicitly; `rebuild` is the explicit swap point.
pub struct MatchSession {
    registry: DescriptorRegistry,
    matcher: SharedMatcher,
    threshold: f64,
}

impl MatchSession {
    pub fn new(threshold: f64) -> Self {
        Self {
            registry: DescriptorRegistry::new(),
            matcher: Arc::new(RwLock::new(None)),
            threshold,
        }
    }

    /// Scans a captured still and stores its best face's descriptor under
    /// `label`. Returns the label's new descriptor count.
    ///
    /// Fails with [`SessionError::NoFaceFound`] when the scanner detects no
    /// face — the caller should prompt for another capture; registry state
    /// is untouched on any failure.
    pub fn enroll(
        &mut self,
        label: &str,
        still: &Frame,
        scanner: &mut FaceScanner,
    ) -> Result<usize, SessionError> {
        let scanned = scanner
            .scan_single(still)
            .map_err(|e| SessionError::Scan(e.to_string()))?;
        let Some((_, descriptor)) = scanned else {
            return Err(SessionError::NoFaceFound);
        };
        Ok(self.registry.add(label, descriptor)?)
    }

    /// Builds a matcher from the current registry snapshot and atomically
    /// swaps it into the shared slot.
    ///
    /// Live-loop ticks already holding the previous matcher finish with
    /// it; the next tick observes the new one.
    pub fn rebuild(&mut self) -> Result<(), SessionError> {
        let matcher = FaceMatcher::build(self.registry.snapshot(), self.threshold)?;
        let mut slot = self
            .matcher
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = Some(Arc::new(matcher));
        Ok(())
    }

    /// The matcher slot handle to hand to the live loop.
    pub fn shared_matcher(&self) -> SharedMatcher {
        self.matcher.clone()
    }

    /// The currently built matcher, if any.
    pub fn current_matcher(&self) -> Option<Arc<FaceMatcher>> {
        self.matcher
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Clears all enrollments and drops the current matcher, returning the
    /// session to its initial state. Handles already given out observe the
    /// cleared slot.
    pub fn reset(&mut self) {
        self.registry.clear();
        let mut slot = self
            .matcher
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::descriptor_extractor::DescriptorExtractor;
    use crate::detection::domain::face_box::FaceBox;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::matching::descriptor::Descriptor;

    // --- Stubs ---

    struct StubDetector {
        faces: Vec<FaceBox>,
    }

    impl FaceDetector for StubDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
            Ok(self.faces.clone())
        }
    }

    struct FixedExtractor {
        values: Vec<f32>,
    }

    impl DescriptorExtractor for FixedExtractor {
        fn extract(&self, _face: &Frame) -> Result<Descriptor, Box<dyn std::error::Error>> {
            Ok(Descriptor::new(self.values.clone()))
        }
    }

    // --- Helpers ---

    fn make_frame() -> Frame {
        Frame::new(vec![128; 100 * 100 * 3], 100, 100, 0)
    }

    fn one_face() -> Vec<FaceBox> {
        vec![FaceBox {
            x: 10,
            y: 10,
            width: 40,
            height: 40,
            score: 0.9,
        }]
    }

    fn scanner_returning(values: &[f32]) -> FaceScanner {
        FaceScanner::new(
            Box::new(StubDetector { faces: one_face() }),
            Box::new(FixedExtractor {
                values: values.to_vec(),
            }),
        )
    }

    fn scanner_finding_nothing() -> FaceScanner {
        FaceScanner::new(
            Box::new(StubDetector { faces: vec![] }),
            Box::new(FixedExtractor { values: vec![1.0] }),
        )
    }

    // --- Tests ---

    #[test]
    fn test_enroll_adds_descriptor() {
        let mut session = MatchSession::new(0.6);
        let mut scanner = scanner_returning(&[0.1, 0.2]);

        let count = session.enroll("alice", &make_frame(), &mut scanner).unwrap();
        assert_eq!(count, 1);
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_enroll_same_label_accumulates() {
        let mut session = MatchSession::new(0.6);
        let mut scanner = scanner_returning(&[0.1, 0.2]);

        session.enroll("alice", &make_frame(), &mut scanner).unwrap();
        let count = session.enroll("alice", &make_frame(), &mut scanner).unwrap();
        assert_eq!(count, 2);
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn test_enroll_no_face_fails_without_mutation() {
        let mut session = MatchSession::new(0.6);
        let mut scanner = scanner_finding_nothing();

        let result = session.enroll("alice", &make_frame(), &mut scanner);
        assert!(matches!(result, Err(SessionError::NoFaceFound)));
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_enroll_empty_label_surfaces_registry_error() {
        let mut session = MatchSession::new(0.6);
        let mut scanner = scanner_returning(&[0.5]);

        let result = session.enroll("", &make_frame(), &mut scanner);
        assert!(matches!(
            result,
            Err(SessionError::Registry(RegistryError::EmptyLabel))
        ));
    }

    #[test]
    fn test_rebuild_before_any_enroll_fails() {
        let mut session = MatchSession::new(0.6);
        let result = session.rebuild();
        assert!(matches!(
            result,
            Err(SessionError::Matcher(MatcherError::EmptyRegistry))
        ));
        assert!(session.current_matcher().is_none());
    }

    #[test]
    fn test_rebuild_populates_shared_slot() {
        let mut session = MatchSession::new(0.6);
        let mut scanner = scanner_returning(&[0.1, 0.2]);
        let handle = session.shared_matcher();

        session.enroll("alice", &make_frame(), &mut scanner).unwrap();
        assert!(handle.read().unwrap().is_none());

        session.rebuild().unwrap();
        let matcher = handle.read().unwrap().clone().unwrap();
        assert_eq!(matcher.labels().collect::<Vec<_>>(), vec!["alice"]);
    }

    #[test]
    fn test_rebuild_swaps_matcher_observed_by_prior_handle() {
        let mut session = MatchSession::new(0.6);
        let handle = session.shared_matcher();

        let mut alice = scanner_returning(&[0.0, 0.0]);
        session.enroll("alice", &make_frame(), &mut alice).unwrap();
        session.rebuild().unwrap();
        let first = handle.read().unwrap().clone().unwrap();

        let mut bob = scanner_returning(&[1.0, 1.0]);
        session.enroll("bob", &make_frame(), &mut bob).unwrap();
        session.rebuild().unwrap();
        let second = handle.read().unwrap().clone().unwrap();

        // New matcher knows bob; the previously read Arc is unaffected
        assert_eq!(first.labels().count(), 1);
        assert_eq!(second.labels().count(), 2);
    }

    #[test]
    fn test_enroll_does_not_rebuild_implicitly() {
        let mut session = MatchSession::new(0.6);
        let mut scanner = scanner_returning(&[0.1]);

        session.enroll("alice", &make_frame(), &mut scanner).unwrap();
        session.rebuild().unwrap();
        session.enroll("bob", &make_frame(), &mut scanner).unwrap();

        // Matcher still reflects the snapshot taken at rebuild time
        let matcher = session.current_matcher().unwrap();
        assert_eq!(matcher.labels().collect::<Vec<_>>(), vec!["alice"]);
    }

    #[test]
    fn test_reset_clears_registry_and_matcher() {
        let mut session = MatchSession::new(0.6);
        let mut scanner = scanner_returning(&[0.1]);
        let handle = session.shared_matcher();

        session.enroll("alice", &make_frame(), &mut scanner).unwrap();
        session.rebuild().unwrap();
        session.reset();

        assert!(session.registry().is_empty());
        assert!(session.current_matcher().is_none());
        assert!(handle.read().unwrap().is_none());
    }

    #[test]
    fn test_matched_label_roundtrip() {
        let mut session = MatchSession::new(0.6);
        let mut scanner = scanner_returning(&[0.1, 0.2]);

        session.enroll("alice", &make_frame(), &mut scanner).unwrap();
        session.rebuild().unwrap();

        let matcher = session.current_matcher().unwrap();
        let result = matcher.best_match(&Descriptor::new(vec![0.1, 0.2]));
        assert_eq!(result.label.as_deref(), Some("alice"));
    }
}
