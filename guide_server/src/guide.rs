use std::sync::Arc;

use frame_sampler::{EncodedFrame, FrameExtractor};
use model_client::{ChatMessage, ChatModel, ModelError};
use tracing::{info, warn};

use crate::errors::Error;
use crate::prompts::Prompts;
use crate::store::{AnalysisStore, FrameAnalysis};

/// Result of analysing one uploaded video.
#[derive(Debug, Clone)]
pub struct VideoReport {
    pub summary: String,
    pub frames: Vec<FrameAnalysis>,
}

/// Upload and question workflow on top of a frame extractor and a chat model.
pub struct VideoGuide {
    model: Arc<dyn ChatModel>,
    extractor: Arc<dyn FrameExtractor>,
    prompts: Prompts,
    store: AnalysisStore,
}

impl VideoGuide {
    pub fn new(
        model: Arc<dyn ChatModel>,
        extractor: Arc<dyn FrameExtractor>,
        prompts: Prompts,
    ) -> Self {
        Self {
            model,
            extractor,
            prompts,
            store: AnalysisStore::new(),
        }
    }

    pub fn store(&self) -> &AnalysisStore {
        &self.store
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub async fn model_health(&self) -> Result<bool, ModelError> {
        self.model.check_health().await
    }

    /// Runs frame extraction on the blocking pool.
    pub async fn extract_frames(&self, video: Vec<u8>) -> Result<Vec<EncodedFrame>, Error> {
        let extractor = Arc::clone(&self.extractor);
        let frames = tokio::task::spawn_blocking(move || extractor.extract(&video))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("join frame extraction task: {e}"),
            })??;

        info!(
            "Extracted {} of at most {} frame(s)",
            frames.len(),
            self.extractor.max_frames()
        );
        Ok(frames)
    }

    /// Asks the model to describe a single frame.
    pub async fn analyze_frame(&self, frame: &EncodedFrame) -> Result<String, ModelError> {
        info!("Sending frame #{} to model for analysis", frame.index);
        let message = ChatMessage::user(self.prompts.frame_analysis()).with_image(frame.jpeg.clone());
        self.model.chat(vec![message]).await
    }

    /// Asks the model for one summary over all frame descriptions.
    pub async fn summarize(&self, analyses: &[FrameAnalysis]) -> Result<String, ModelError> {
        info!("Generating video summary from {} frame(s)", analyses.len());
        let prompt = self.prompts.summary(&frame_descriptions(analyses));
        self.model.chat(vec![ChatMessage::user(prompt)]).await
    }

    /// Samples, describes and summarises an uploaded video.
    ///
    /// The store is replaced as soon as every frame is described, before
    /// the summary is requested.
    pub async fn describe_video(&self, video: Vec<u8>) -> Result<VideoReport, Error> {
        let frames = self.extract_frames(video).await?;
        if frames.is_empty() {
            warn!("Upload produced no frames, nothing to analyse");
            return Err(Error::NoFrames);
        }

        let mut analyses = Vec::with_capacity(frames.len());
        for (position, frame) in frames.iter().enumerate() {
            let description = self.analyze_frame(frame).await?;
            analyses.push(FrameAnalysis::new(position + 1, description));
        }

        self.store.replace(analyses.clone()).await;

        let summary = self.summarize(&analyses).await?;
        Ok(VideoReport {
            summary,
            frames: analyses,
        })
    }

    /// Builds the question prompt from the stored analyses.
    pub async fn question_prompt(&self, question: &str) -> Result<String, Error> {
        let stored = self.store.snapshot().await.ok_or(Error::NoVideoAnalyzed)?;
        Ok(self.prompts.question(&question_context(&stored.frames), question))
    }

    pub async fn answer_question(&self, question: &str) -> Result<String, Error> {
        let prompt = self.question_prompt(question).await?;
        info!("Answering question against stored frame analyses");
        Ok(self.model.chat(vec![ChatMessage::user(prompt)]).await?)
    }
}

/// One `Frame i: ...` line per analysis, each newline-terminated.
fn frame_descriptions(analyses: &[FrameAnalysis]) -> String {
    analyses.iter().map(|analysis| format!("{analysis}\n")).collect()
}

fn question_context(analyses: &[FrameAnalysis]) -> String {
    analyses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
