use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use facematch_core::detection::domain::face_scanner::FaceScanner;
use facematch_core::detection::infrastructure::onnx_arcface_extractor::OnnxArcfaceExtractor;
use facematch_core::detection::infrastructure::onnx_blazeface_detector::{
    OnnxBlazefaceDetector, DEFAULT_CONFIDENCE,
};
use facematch_core::matching::matcher::MatchResult;
use facematch_core::session::live_loop::{self, LiveEvent, LiveLoopParams};
use facematch_core::session::match_session::MatchSession;
use facematch_core::shared::constants::{
    DEFAULT_MATCH_THRESHOLD, DEFAULT_TICK_INTERVAL_MS, DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL,
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL,
};
use facematch_core::shared::model_resolver;
use facematch_core::video::domain::frame_source::FrameSource;
use facematch_core::video::infrastructure::ffmpeg_source::FfmpegFrameSource;
use facematch_core::video::infrastructure::image_file_source::ImageFileSource;

/// Face enrollment and live matching against a video feed.
#[derive(Parser)]
#[command(name = "facematch")]
struct Cli {
    /// Enroll a face as NAME=IMAGE (repeatable; same name accumulates).
    #[arg(long, value_name = "NAME=IMAGE")]
    enroll: Vec<String>,

    /// Video file to live-match against (stands in for a camera feed).
    #[arg(long)]
    watch: Option<PathBuf>,

    /// Match distance threshold; the nearest label beyond it is unknown.
    #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
    threshold: f64,

    /// Live loop poll interval in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    interval_ms: u64,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Directory with pre-downloaded models (checked before the cache).
    #[arg(long)]
    models: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let enrollments = parse_enroll_specs(&cli.enroll)?;
    let mut scanner = build_scanner(&cli)?;
    let mut session = MatchSession::new(cli.threshold);

    for (name, image) in &enrollments {
        let still = ImageFileSource::load_still(image)
            .map_err(|e| format!("failed to read {}: {e}", image.display()))?;
        let count = session
            .enroll(name, &still, &mut scanner)
            .map_err(|e| format!("enrolling {} from {}: {e}", name, image.display()))?;
        log::info!("Enrolled {name} ({count} descriptor(s))");
    }

    if let Some(video) = &cli.watch {
        if session.registry().is_empty() {
            log::warn!("Nothing enrolled; every face will be reported without a match");
        } else {
            session.rebuild()?;
        }
        run_watch(video, scanner, &session, cli.interval_ms)?;
    } else {
        println!(
            "Enrolled {} label(s): {}",
            session.registry().len(),
            session.registry().labels().collect::<Vec<_>>().join(", ")
        );
    }

    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.enroll.is_empty() && cli.watch.is_none() {
        return Err("nothing to do: pass --enroll and/or --watch".into());
    }
    if cli.threshold <= 0.0 {
        return Err("threshold must be positive".into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err("confidence must be between 0.0 and 1.0".into());
    }
    Ok(())
}

/// Splits each `NAME=IMAGE` spec at the first `=`.
fn parse_enroll_specs(specs: &[String]) -> Result<Vec<(String, PathBuf)>, String> {
    specs
        .iter()
        .map(|spec| {
            spec.split_once('=')
                .map(|(name, path)| (name.to_string(), PathBuf::from(path)))
                .ok_or_else(|| format!("invalid --enroll value '{spec}', expected NAME=IMAGE"))
        })
        .collect()
}

fn build_scanner(cli: &Cli) -> Result<FaceScanner, Box<dyn std::error::Error>> {
    let detector_path = resolve_model(DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, cli)?;
    let embedding_path = resolve_model(EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, cli)?;

    let detector = OnnxBlazefaceDetector::new(&detector_path, cli.confidence)?;
    let extractor = OnnxArcfaceExtractor::new(&embedding_path)?;
    Ok(FaceScanner::new(Box::new(detector), Box::new(extractor)))
}

fn resolve_model(name: &str, url: &str, cli: &Cli) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let progress: model_resolver::ProgressFn = Box::new(|downloaded, total| {
        if total > 0 {
            let pct = downloaded as f64 / total as f64 * 100.0;
            eprint!("\rDownloading model: {pct:.0}%");
        }
    });
    let path = model_resolver::resolve(name, url, cli.models.as_deref(), Some(progress))?;
    Ok(path)
}

fn run_watch(
    video: &Path,
    scanner: FaceScanner,
    session: &MatchSession,
    interval_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source: Box<dyn FrameSource> = Box::new(FfmpegFrameSource::new());
    let info = source.open(video)?;
    log::info!(
        "Watching {} ({}x{}, {:.1} fps)",
        video.display(),
        info.width,
        info.height,
        info.fps
    );

    let (events, handle) = live_loop::spawn(LiveLoopParams {
        source,
        scanner,
        matcher: session.shared_matcher(),
        interval: Duration::from_millis(interval_ms),
    });

    let mut outcome = Ok(());
    for event in events {
        match event {
            LiveEvent::Faces {
                frame_index,
                sightings,
            } => {
                for sighting in &sightings {
                    println!(
                        "frame {frame_index}: {} at ({}, {}) {}x{}",
                        describe_match(sighting.matched.as_ref()),
                        sighting.face.x,
                        sighting.face.y,
                        sighting.face.width,
                        sighting.face.height,
                    );
                }
            }
            LiveEvent::Error(message) => {
                outcome = Err(message.into());
                break;
            }
            LiveEvent::Finished => {
                log::info!("End of stream");
                break;
            }
            LiveEvent::Cancelled => break,
        }
    }

    handle.join();
    outcome
}

fn describe_match(matched: Option<&MatchResult>) -> String {
    match matched {
        None => "face (no matcher built)".to_string(),
        Some(result) => match &result.label {
            Some(label) => format!("{label} ({:.2})", result.distance),
            None => format!("unknown ({:.2})", result.distance),
        },
    }
}
