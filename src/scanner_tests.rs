use super::*;
use crate::analysis::MockAnalyzer;
use crate::camera::{CameraError, MediaStream, VideoTrack};
use crate::landmarks::{FixedPoints, RandomPoints};
use crate::types::AnalysisState;
use image::RgbImage;
use std::cell::Cell;
use std::rc::Rc;

// =========================================================================
// Fakes
// =========================================================================

struct CountingTrack {
    stops: Rc<Cell<u32>>,
    live: bool,
}

impl VideoTrack for CountingTrack {
    fn label(&self) -> String {
        "counting".into()
    }
    fn resolution(&self) -> (u32, u32) {
        (8, 8)
    }
    fn read_frame(&mut self) -> Result<RgbImage, CameraError> {
        Ok(RgbImage::new(8, 8))
    }
    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
        self.live = false;
    }
    fn is_live(&self) -> bool {
        self.live
    }
}

#[derive(Default)]
struct Host {
    deny: bool,
    stops: Rc<Cell<u32>>,
}

impl CaptureDevice for Host {
    fn acquire(&mut self, _request: &StreamRequest) -> Result<MediaStream, CameraError> {
        if self.deny {
            return Err(CameraError::Denied("NotAllowedError".into()));
        }
        Ok(MediaStream::new(vec![Box::new(CountingTrack {
            stops: self.stops.clone(),
            live: true,
        })]))
    }
}

struct FailingAnalyzer;

impl Analyzer for FailingAnalyzer {
    fn name(&self) -> String {
        "failing".into()
    }
    async fn analyze(&self) -> Result<AnalysisState, AnalysisError> {
        Err(AnalysisError::Unavailable("model missing".into()))
    }
}

/// Answers immediately, ahead of the reveal timer.
struct InstantAnalyzer;

impl Analyzer for InstantAnalyzer {
    fn name(&self) -> String {
        "instant".into()
    }
    async fn analyze(&self) -> Result<AnalysisState, AnalysisError> {
        Ok(AnalysisState::new("Oval", 90, "quick"))
    }
}

fn mock(config: &AppConfig) -> MockAnalyzer {
    MockAnalyzer::new(config.timing.complete_delay(), config.analysis.clone())
}

fn assert_near(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(10),
        "expected ~{expected:?}, got {actual:?}"
    );
}

// =========================================================================
// Sequence
// =========================================================================

#[tokio::test(start_paused = true)]
async fn sequence_follows_configured_delays() {
    let config = AppConfig::default();
    let mut host = Host::default();
    let screen = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(3, 1.0), mock(&config), &config);
    assert_eq!(screen.state(), ScanState::Idle);

    let timeline = screen.run().await.unwrap();
    assert_eq!(
        timeline.phases(),
        vec![Phase::Idle, Phase::Analyzing, Phase::Revealed, Phase::Complete]
    );
    assert_eq!(timeline.at(Phase::Analyzing), Some(Duration::ZERO));
    assert_near(timeline.at(Phase::Revealed).unwrap(), 500);
    assert_near(timeline.at(Phase::Complete).unwrap(), 3500);

    match screen.state() {
        ScanState::Complete(result) => assert_eq!(result, AnalysisState::default()),
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn subscribers_observe_points_before_result() {
    let config = AppConfig::default();
    let mut host = Host::default();
    let screen = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(3, 1.0), mock(&config), &config);
    let mut rx = screen.subscribe();

    let watcher = async {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let phase = rx.borrow_and_update().phase();
            seen.push(phase);
            if phase == Phase::Complete {
                break;
            }
        }
        seen
    };
    let (seen, outcome) = tokio::join!(watcher, screen.run());
    outcome.unwrap();
    assert_eq!(seen, vec![Phase::Analyzing, Phase::Revealed, Phase::Complete]);
}

#[tokio::test(start_paused = true)]
async fn fast_analyzer_still_completes_after_reveal() {
    let config = AppConfig::default();
    let mut host = Host::default();
    let screen = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(3, 1.0), InstantAnalyzer, &config);

    let timeline = screen.run().await.unwrap();
    let revealed = timeline.at(Phase::Revealed).unwrap();
    let complete = timeline.at(Phase::Complete).unwrap();
    assert!(revealed <= complete);
    assert_near(complete, 500);
}

#[tokio::test(start_paused = true)]
async fn failed_analysis_stays_revealed() {
    let config = AppConfig::default();
    let mut host = Host::default();
    let screen = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(3, 1.0), FailingAnalyzer, &config);

    let err = screen.run().await.unwrap_err();
    assert_eq!(err, AnalysisError::Unavailable("model missing".into()));
    assert_eq!(screen.state().phase(), Phase::Revealed);
    assert!(screen.state().analysis().is_pending());
}

// =========================================================================
// Camera lifecycle
// =========================================================================

#[tokio::test(start_paused = true)]
async fn denied_camera_does_not_block_completion() {
    let config = AppConfig::default();
    let mut host = Host { deny: true, ..Host::default() };
    let mut screen = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(3, 1.0), mock(&config), &config);
    assert!(!screen.camera().is_active());
    assert_eq!(screen.view().viewport, Viewport::Connecting);

    let timeline = screen.run().await.unwrap();
    assert_eq!(timeline.phases().last(), Some(&Phase::Complete));

    assert_eq!(screen.teardown(), 0);
    assert_eq!(screen.teardown(), 0);
    assert_eq!(host.stops.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn teardown_mid_scan_cancels_and_releases() {
    let config = AppConfig::default();
    let mut host = Host::default();
    let mut screen = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(3, 1.0), mock(&config), &config);
    assert!(screen.camera().is_active());

    let started = Instant::now();
    let outcome = screen
        .present(Duration::from_millis(100), |_, _| started.elapsed() < Duration::from_millis(1000))
        .await;

    assert!(outcome.is_none(), "scan should have been cancelled");
    assert_eq!(screen.state().phase(), Phase::Revealed);
    assert!(!screen.camera().is_active());
    assert_eq!(host.stops.get(), 1);

    assert_eq!(screen.teardown(), 0);
    drop(screen);
    assert_eq!(host.stops.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn present_renders_until_closed() {
    let config = AppConfig::default();
    let mut host = Host::default();
    let mut screen = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(3, 1.0), mock(&config), &config);

    let mut phases = Vec::new();
    let mut frames = 0;
    let outcome = screen
        .present(Duration::from_millis(100), |camera, view| {
            if camera.frame().is_some() {
                frames += 1;
            }
            if phases.last() != Some(&view.phase) {
                phases.push(view.phase);
            }
            view.phase != Phase::Complete
        })
        .await;

    let timeline = outcome.expect("scan finished").unwrap();
    assert_near(timeline.at(Phase::Complete).unwrap(), 3500);
    assert_eq!(phases, vec![Phase::Idle, Phase::Analyzing, Phase::Revealed, Phase::Complete]);
    assert!(frames > 0);
    assert_eq!(host.stops.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn remount_starts_over() {
    let config = AppConfig::default();
    let mut host = Host::default();

    let first = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(1, 1.0), mock(&config), &config);
    first.run().await.unwrap();
    assert_eq!(first.state().phase(), Phase::Complete);
    let first_points = first.points().to_vec();
    drop(first);

    let second = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(2, 1.0), mock(&config), &config);
    assert_eq!(second.state(), ScanState::Idle);
    assert_ne!(second.points(), first_points.as_slice());
    assert_eq!(host.stops.get(), 1);
}

#[test]
fn points_do_not_touch_analysis() {
    let config = AppConfig::default();
    let mut host = Host::default();
    let point = LandmarkPoint { id: 0, x: 50.0, y: 50.0, reveal_delay: 0.0 };
    let screen = ScanScreen::mount(&mut host, &mut FixedPoints(vec![point; 4]), mock(&config), &config);
    assert_eq!(screen.points().len(), 4);
    assert!(screen.state().analysis().is_pending());
    assert_eq!(screen.view().recommendations, screen.catalog().fallback());
}

#[tokio::test(start_paused = true)]
async fn overlay_uses_the_mounted_constellation() {
    let config = AppConfig::default();
    let mut host = Host::default();
    let screen = ScanScreen::mount(&mut host, &mut RandomPoints::seeded(5, 1.0), mock(&config), &config);
    assert!(screen.view().overlay.points.is_empty());
    assert_eq!(screen.analyzer_name(), "Mock (3500 ms)");

    let mut rx = screen.subscribe();
    let watcher = async {
        while rx.changed().await.is_ok() {
            if *rx.borrow_and_update() == ScanState::Revealed {
                return screen.view();
            }
        }
        panic!("scan ended without revealing points");
    };
    let (revealed, outcome) = tokio::join!(watcher, screen.run());
    outcome.unwrap();

    assert_eq!(revealed.phase, Phase::Revealed);
    assert_eq!(revealed.overlay.points, screen.points());
    assert_eq!(screen.view().overlay.points, screen.points());
}
