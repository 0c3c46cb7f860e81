use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use crate::detection::domain::face_box::FaceBox;
use crate::detection::domain::face_scanner::FaceScanner;
use crate::matching::matcher::MatchResult;
use crate::session::match_session::SharedMatcher;
use crate::video::domain::frame_source::FrameSource;

/// One detected face in a live tick.
///
/// `matched` is `None` when no matcher has been built yet — a state kept
/// deliberately distinct from a built matcher answering unknown, which is
/// `Some(MatchResult { label: None, .. })`.
#[derive(Clone, Debug)]
pub struct FaceSighting {
    pub face: FaceBox,
    pub matched: Option<MatchResult>,
}

pub enum LiveEvent {
    /// Result of one tick; empty `sightings` means a frame with no faces.
    Faces {
        frame_index: usize,
        sightings: Vec<FaceSighting>,
    },
    Error(String),
    Finished,
    Cancelled,
}

pub struct LiveLoopParams {
    /// Frame source, already opened by the caller.
    pub source: Box<dyn FrameSource>,
    pub scanner: FaceScanner,
    pub matcher: SharedMatcher,
    pub interval: Duration,
}

/// Owned handle for deterministic teardown of the live loop.
pub struct LiveLoopHandle {
    cancelled: Arc<AtomicBool>,
    join: Option<thread::JoinHandle<()>>,
}

impl LiveLoopHandle {
    /// Requests cancellation; the loop stops at its next tick boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Waits for the worker thread to exit.
    pub fn join(mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns the live matching loop on a worker thread.
///
/// Each tick: pull a frame, scan it, read the current matcher from the
/// shared slot, and emit a [`LiveEvent::Faces`]. Ticks are paced to
/// `interval`. The loop ends with exactly one terminal event: `Finished`
/// when the source drains, `Cancelled` after [`LiveLoopHandle::cancel`],
/// or `Error` on a decode/scan failure.
pub fn spawn(params: LiveLoopParams) -> (Receiver<LiveEvent>, LiveLoopHandle) {
    let (tx, rx) = crossbeam_channel::unbounded::<LiveEvent>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_worker = cancelled.clone();

    let join = thread::spawn(move || {
        let event = match run_live(&tx, &cancelled_worker, params) {
            Ok(()) if cancelled_worker.load(Ordering::Relaxed) => LiveEvent::Cancelled,
            Ok(()) => LiveEvent::Finished,
            Err(e) => LiveEvent::Error(e.to_string()),
        };
        let _ = tx.send(event);
    });

    (
        rx,
        LiveLoopHandle {
            cancelled,
            join: Some(join),
        },
    )
}

fn run_live(
    tx: &Sender<LiveEvent>,
    cancelled: &Arc<AtomicBool>,
    params: LiveLoopParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = params.source;
    let mut scanner = params.scanner;

    for frame_result in source.frames() {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }

        let frame = frame_result?;
        let scanned = scanner.scan(&frame)?;

        // Clone the Arc under the read lock, then match lock-free. A
        // rebuild swapping the slot mid-tick leaves this tick on the
        // matcher it already read.
        let matcher = params
            .matcher
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        let sightings = scanned
            .into_iter()
            .map(|(face, descriptor)| FaceSighting {
                matched: matcher.as_ref().map(|m| m.best_match(&descriptor)),
                face,
            })
            .collect();

        if tx
            .send(LiveEvent::Faces {
                frame_index: frame.index(),
                sightings,
            })
            .is_err()
        {
            // Receiver gone; nobody is watching anymore
            break;
        }

        thread::sleep(params.interval);
    }

    source.close();
    Ok(())
}
