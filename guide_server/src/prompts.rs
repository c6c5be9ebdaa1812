use serde::{Deserialize, Serialize};

const FRAME_ANALYSIS_PROMPT: &str = "#Role\n\
You are an assistive system that guides a blind person navigating a university campus.\n\
#Instructions\n\
Analyze the given video frame:\n\
- Identify obstacles\n\
- Describe environment transitions\n\
- Be concise, clear, and factual\n\
- No assumptions. Only observable details.\n";

const SUMMARY_PROMPT: &str = "Based on the following frame analyses, summarize the full environment context.\n\
Speak clearly as if guiding a blind user.\n\
\n\
{frame_descriptions}\n";

const QUESTION_PROMPT: &str = "You are an assistive AI system.\n\
The user previously recorded a video and the following frames were analyzed:\n\
\n\
{context}\n\
\n\
Now answer the user's question clearly based only on the frame analysis:\n\
Question: {question}\n";

/// Prompt templates sent to the model.
///
/// `summary` takes `{frame_descriptions}`, `question` takes `{context}` and
/// `{question}`. Unknown `{...}` sequences are left as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub frame_analysis: String,
    pub summary: String,
    pub question: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            frame_analysis: FRAME_ANALYSIS_PROMPT.to_string(),
            summary: SUMMARY_PROMPT.to_string(),
            question: QUESTION_PROMPT.to_string(),
        }
    }
}

impl Prompts {
    pub fn frame_analysis(&self) -> &str {
        &self.frame_analysis
    }

    pub fn summary(&self, frame_descriptions: &str) -> String {
        render(&self.summary, &[("frame_descriptions", frame_descriptions)])
    }

    pub fn question(&self, context: &str, question: &str) -> String {
        render(
            &self.question,
            &[("context", context), ("question", question)],
        )
    }
}

/// Substitutes `{name}` placeholders in a single pass, so substituted text
/// is never scanned for further placeholders.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
