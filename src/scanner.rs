use crate::analysis::{AnalysisError, Analyzer};
use crate::camera::{CameraSession, CaptureDevice, StreamRequest};
use crate::catalog::RecommendationTable;
use crate::config::{AppConfig, TimingConfig, UiConfig};
use crate::landmarks::PointGenerator;
use crate::types::{LandmarkPoint, Phase, ScanState, Timeline};
use crate::view::{ScreenView, Viewport};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Drives `Idle -> Analyzing -> Revealed -> Complete` for one mount.
pub struct Scanner<A: Analyzer> {
    analyzer: A,
    timing: TimingConfig,
}

impl<A: Analyzer> Scanner<A> {
    pub fn new(analyzer: A, timing: TimingConfig) -> Self {
        Self { analyzer, timing }
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    /// Runs the sequence, publishing every state on `updates`.
    ///
    /// The reveal timer and the analyzer run side by side; Complete is only
    /// published once both are done, so Revealed never comes after it.
    pub async fn run(&self, updates: &watch::Sender<ScanState>) -> Result<Timeline, AnalysisError> {
        let started = Instant::now();
        let mut timeline = Timeline::default();
        timeline.push(Phase::Idle, Duration::ZERO);

        updates.send_replace(ScanState::Analyzing);
        timeline.push(Phase::Analyzing, started.elapsed());
        log::debug!("Scan started with {}", self.analyzer.name());

        let reveal_delay = self.timing.reveal_delay();
        let reveal = async move {
            tokio::time::sleep(reveal_delay).await;
            updates.send_replace(ScanState::Revealed);
            started.elapsed()
        };
        let (revealed_at, outcome) = tokio::join!(reveal, self.analyzer.analyze());
        timeline.push(Phase::Revealed, revealed_at);

        match outcome {
            Ok(result) => {
                log::info!("Analysis complete: {} ({}%)", result.face_type, result.trust_score);
                updates.send_replace(ScanState::Complete(result));
                timeline.push(Phase::Complete, started.elapsed());
                Ok(timeline)
            }
            Err(e) => {
                log::error!("Analysis failed: {}", e);
                Err(e)
            }
        }
    }
}

/// One mounted instance of the scan screen. Dropping it (or calling
/// `teardown`) releases the camera; mounting again starts from Idle.
pub struct ScanScreen<A: Analyzer> {
    camera: CameraSession,
    scanner: Scanner<A>,
    points: Vec<LandmarkPoint>,
    state: watch::Sender<ScanState>,
    catalog: RecommendationTable,
    ui: UiConfig,
}

impl<A: Analyzer> ScanScreen<A> {
    pub fn mount(
        device: &mut dyn CaptureDevice,
        generator: &mut dyn PointGenerator,
        analyzer: A,
        config: &AppConfig,
    ) -> Self {
        let request = StreamRequest::front_camera(config.camera.index);
        let camera = CameraSession::open(device, &request, config.camera.mirror);
        let points = generator.generate(config.landmarks.point_count);
        let (state, _) = watch::channel(ScanState::Idle);

        Self {
            camera,
            scanner: Scanner::new(analyzer, config.timing),
            points,
            state,
            catalog: config.catalog.clone(),
            ui: config.ui.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ScanState {
        self.state.borrow().clone()
    }

    pub fn camera(&self) -> &CameraSession {
        &self.camera
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }

    pub fn catalog(&self) -> &RecommendationTable {
        &self.catalog
    }

    pub fn analyzer_name(&self) -> String {
        self.scanner.analyzer().name()
    }

    pub fn view(&self) -> ScreenView {
        let viewport = if self.camera.is_active() {
            Viewport::Live { mirrored: self.camera.is_mirrored() }
        } else {
            Viewport::Connecting
        };
        let state = self.state.borrow();
        ScreenView::derive(&state, viewport, &self.points, &self.catalog, &self.ui)
    }

    /// Runs the scan sequence without a render loop.
    pub async fn run(&self) -> Result<Timeline, AnalysisError> {
        self.scanner.run(&self.state).await
    }

    /// Runs the scan while calling `render` every `frame_interval`. When
    /// `render` returns false the screen is torn down: pending timers are
    /// dropped and the camera is released. Returns `None` if that happened
    /// before the scan finished.
    pub async fn present<F>(
        &mut self,
        frame_interval: Duration,
        mut render: F,
    ) -> Option<Result<Timeline, AnalysisError>>
    where
        F: FnMut(&mut CameraSession, &ScreenView) -> bool,
    {
        let mut outcome = None;
        {
            let scan = self.scanner.run(&self.state);
            tokio::pin!(scan);
            let mut ticker = tokio::time::interval(frame_interval);

            loop {
                // Frames first: a frame at t=0 still shows the Idle screen.
                tokio::select! {
                    biased;
                    _ = ticker.tick() => {
                        let view = self.view();
                        if !render(&mut self.camera, &view) {
                            break;
                        }
                    }
                    res = &mut scan, if outcome.is_none() => {
                        outcome = Some(res);
                    }
                }
            }
        }
        self.teardown();
        outcome
    }

    pub fn teardown(&mut self) -> usize {
        self.camera.release()
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod scanner_tests;
