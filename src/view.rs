use crate::catalog::RecommendationTable;
use crate::config::UiConfig;
use crate::types::{LandmarkPoint, Phase, ProductRecord, ScanState};

/// Everything the screen shows, derived from scan state and camera status.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub title: String,
    pub accent: (u8, u8, u8),
    pub phase: Phase,
    pub viewport: Viewport,
    pub overlay: Overlay,
    pub report: ReportPanel,
    pub recommendations: Vec<ProductRecord>,
    pub nav: [NavItem; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewport {
    /// Camera not (yet) available; the placeholder asks for permission.
    Connecting,
    Live { mirrored: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub points: Vec<LandmarkPoint>,
    pub hud_brackets: bool,
    pub face_guide: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportPanel {
    Skeleton,
    Revealed {
        headline: String,
        score_caption: String,
        score_text: String,
        description: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub active: bool,
}

pub const PLACEHOLDER_TEXT: &str = "Please allow camera access";
const FALLBACK_ACCENT: (u8, u8, u8) = (0xC9, 0xA2, 0x27);

impl ScreenView {
    pub fn derive(
        state: &ScanState,
        viewport: Viewport,
        points: &[LandmarkPoint],
        catalog: &RecommendationTable,
        ui: &UiConfig,
    ) -> Self {
        let phase = state.phase();
        let analysis = state.analysis();

        let report = match state {
            ScanState::Complete(result) => ReportPanel::Revealed {
                headline: format!("Your face shape is {}.", result.face_type),
                score_caption: "Expected image uplift".to_string(),
                score_text: format!("+{}%", result.trust_score.min(100)),
                description: result.description.clone(),
            },
            _ => ReportPanel::Skeleton,
        };

        let overlay = Overlay {
            points: if phase >= Phase::Revealed { points.to_vec() } else { Vec::new() },
            hud_brackets: matches!(viewport, Viewport::Live { .. }),
            face_guide: true,
        };

        Self {
            title: ui.title.clone(),
            accent: ui.accent_rgb().unwrap_or(FALLBACK_ACCENT),
            phase,
            viewport,
            overlay,
            report,
            recommendations: catalog.lookup(&analysis.face_type).to_vec(),
            nav: [
                NavItem { label: "SCAN", active: true },
                NavItem { label: "SHOP", active: false },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnalysisState;

    fn points() -> Vec<LandmarkPoint> {
        vec![LandmarkPoint { id: 0, x: 40.0, y: 50.0, reveal_delay: 0.2 }]
    }

    fn derive(state: &ScanState, viewport: Viewport) -> ScreenView {
        ScreenView::derive(state, viewport, &points(), &RecommendationTable::default(), &UiConfig::default())
    }

    #[test]
    fn analyzing_shows_skeleton_and_fallback_products() {
        let view = derive(&ScanState::Analyzing, Viewport::Connecting);
        assert_eq!(view.report, ReportPanel::Skeleton);
        assert!(view.overlay.points.is_empty());
        assert!(!view.overlay.hud_brackets);
        assert_eq!(view.recommendations, RecommendationTable::default().fallback());
    }

    #[test]
    fn revealed_shows_points_but_no_report() {
        let view = derive(&ScanState::Revealed, Viewport::Live { mirrored: true });
        assert_eq!(view.overlay.points.len(), 1);
        assert!(view.overlay.hud_brackets);
        assert_eq!(view.report, ReportPanel::Skeleton);
    }

    #[test]
    fn complete_reveals_report_and_matching_products() {
        let view = derive(&ScanState::Complete(AnalysisState::default()), Viewport::Live { mirrored: true });
        match &view.report {
            ReportPanel::Revealed { headline, score_text, .. } => {
                assert!(headline.contains("Square"));
                assert_eq!(score_text, "+98%");
            }
            other => panic!("expected revealed report, got {other:?}"),
        }
        assert_eq!(view.recommendations.len(), 3);
        assert_eq!(view.recommendations[0].name, "Classic Gold");
        assert_eq!(view.overlay.points.len(), 1);
    }

    #[test]
    fn navigation_is_static() {
        let view = derive(&ScanState::Idle, Viewport::Connecting);
        assert_eq!(view.nav[0], NavItem { label: "SCAN", active: true });
        assert_eq!(view.nav[1], NavItem { label: "SHOP", active: false });
        assert_eq!(view.accent, (0xC9, 0xA2, 0x27));
    }
}
