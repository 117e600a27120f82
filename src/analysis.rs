use crate::types::AnalysisState;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
}

/// Produces the face-shape result for the current scan.
///
/// The scan screen only depends on this trait, so a real classifier can
/// replace the timer-driven mock without touching presentation.
#[allow(async_fn_in_trait)]
pub trait Analyzer {
    fn name(&self) -> String;
    async fn analyze(&self) -> Result<AnalysisState, AnalysisError>;
}

/// Answers with a fixed result after a fixed delay.
pub struct MockAnalyzer {
    delay: Duration,
    result: AnalysisState,
}

impl MockAnalyzer {
    pub fn new(delay: Duration, result: AnalysisState) -> Self {
        Self { delay, result }
    }
}

impl Analyzer for MockAnalyzer {
    fn name(&self) -> String {
        format!("Mock ({} ms)", self.delay.as_millis())
    }

    async fn analyze(&self) -> Result<AnalysisState, AnalysisError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.result.clone())
    }
}
