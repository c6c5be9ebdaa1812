use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use frame_sampler::{EncodedFrame, FrameExtractor, SampleError};
use model_client::{ChatMessage, ChatModel, ModelError};

/// Chat model that replays canned replies and records every request.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
    healthy: bool,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            healthy: true,
        }
    }

    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|reply| Ok(reply.into())).collect())
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ModelError> {
        self.requests.lock().unwrap().push(messages);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::MalformedResponse("no scripted reply left".into())))
    }

    async fn check_health(&self) -> Result<bool, ModelError> {
        Ok(self.healthy)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Extractor that ignores its input and returns `frames` one-byte frames,
/// the byte being the frame's position.
pub struct FixedExtractor {
    frames: usize,
}

impl FixedExtractor {
    pub fn new(frames: usize) -> Self {
        Self { frames }
    }
}

impl FrameExtractor for FixedExtractor {
    fn max_frames(&self) -> usize {
        5
    }

    fn extract(&self, _video: &[u8]) -> Result<Vec<EncodedFrame>, SampleError> {
        Ok((0..self.frames)
            .map(|i| EncodedFrame {
                index: i as u64,
                width: 1,
                height: 1,
                jpeg: vec![i as u8],
            })
            .collect())
    }
}

pub struct FailingExtractor;

impl FrameExtractor for FailingExtractor {
    fn max_frames(&self) -> usize {
        5
    }

    fn extract(&self, _video: &[u8]) -> Result<Vec<EncodedFrame>, SampleError> {
        Err(SampleError::NoVideoStream)
    }
}
