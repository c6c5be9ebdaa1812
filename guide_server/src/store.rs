use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// The model's description of one sampled frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameAnalysis {
    /// 1-based position among the sampled frames.
    pub frame: usize,
    pub description: String,
}

impl FrameAnalysis {
    pub fn new(frame: usize, description: impl Into<String>) -> Self {
        Self {
            frame,
            description: description.into(),
        }
    }
}

impl fmt::Display for FrameAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame {}: {}", self.frame, self.description)
    }
}

#[derive(Debug, Clone)]
pub struct StoredAnalysis {
    pub frames: Vec<FrameAnalysis>,
    pub recorded_at: DateTime<Utc>,
}

/// Analyses of the most recently uploaded video.
///
/// Every upload replaces the whole list under the write lock, so readers
/// see either the previous upload or the new one, never a mix.
#[derive(Debug, Default)]
pub struct AnalysisStore {
    latest: RwLock<Option<StoredAnalysis>>,
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, frames: Vec<FrameAnalysis>) {
        let stored = StoredAnalysis {
            frames,
            recorded_at: Utc::now(),
        };
        *self.latest.write().await = Some(stored);
    }

    /// The stored analyses, or `None` if nothing with frames was recorded.
    pub async fn snapshot(&self) -> Option<StoredAnalysis> {
        self.latest
            .read()
            .await
            .as_ref()
            .filter(|stored| !stored.frames.is_empty())
            .cloned()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot().await.is_none()
    }
}
