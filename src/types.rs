use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Label carried by the analysis result until the analyzer has answered.
pub const PENDING_FACE_TYPE: &str = "Analyzing";

/// Result of a (mock) face-shape analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisState {
    pub face_type: String,
    pub trust_score: u8, // 0..=100, cosmetic
    pub description: String,
}

impl AnalysisState {
    pub fn new(face_type: impl Into<String>, trust_score: u8, description: impl Into<String>) -> Self {
        Self {
            face_type: face_type.into(),
            trust_score: trust_score.min(100),
            description: description.into(),
        }
    }

    /// Sentinel shown while the scan is running.
    pub fn pending() -> Self {
        Self::new(PENDING_FACE_TYPE, 0, "")
    }

    pub fn is_pending(&self) -> bool {
        self.face_type == PENDING_FACE_TYPE
    }
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new(
            "Square",
            98,
            "Round and aviator frames soften a straight jawline and maximise the trust you project.",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: u32,
    pub name: String,
    pub price: String, // pre-formatted, e.g. "₩249,000"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ProductRecord {
    pub fn new(id: u32, name: &str, price: &str, label: Option<&str>) -> Self {
        Self {
            id,
            name: name.to_string(),
            price: price.to_string(),
            label: label.map(str::to_string),
        }
    }
}

/// Decorative dot drawn over the camera view. Coordinates are percentages of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkPoint {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub reveal_delay: f32, // seconds, relative to the Revealed transition
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Idle,
    Analyzing,
    /// Landmark dots are visible; the points live on the screen that generated them.
    Revealed,
    Complete(AnalysisState),
}

impl ScanState {
    pub fn phase(&self) -> Phase {
        match self {
            ScanState::Idle => Phase::Idle,
            ScanState::Analyzing => Phase::Analyzing,
            ScanState::Revealed => Phase::Revealed,
            ScanState::Complete(_) => Phase::Complete,
        }
    }

    /// The analysis as the screen should display it right now.
    pub fn analysis(&self) -> AnalysisState {
        match self {
            ScanState::Complete(result) => result.clone(),
            _ => AnalysisState::pending(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Idle,
    Analyzing,
    Revealed,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub phase: Phase,
    pub at: Duration, // since screen activation
}

/// Ordered record of the transitions a scan went through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    pub transitions: Vec<Transition>,
}

impl Timeline {
    pub fn push(&mut self, phase: Phase, at: Duration) {
        self.transitions.push(Transition { phase, at });
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.transitions.iter().map(|t| t.phase).collect()
    }

    pub fn at(&self, phase: Phase) -> Option<Duration> {
        self.transitions.iter().find(|t| t.phase == phase).map(|t| t.at)
    }
}
