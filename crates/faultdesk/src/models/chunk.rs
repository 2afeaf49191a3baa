use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// One incremental piece of a streaming response. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    pub reasoning: Option<String>,
    pub content: Option<String>,
    pub usage: Option<Usage>,
}

impl StreamChunk {
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn reasoning<S: Into<String>>(reasoning: S) -> Self {
        Self {
            reasoning: Some(reasoning.into()),
            ..Default::default()
        }
    }

    /// Reasoning fragment, if present and non-empty
    pub fn reasoning_text(&self) -> Option<&str> {
        self.reasoning.as_deref().filter(|s| !s.is_empty())
    }

    /// Answer fragment, if present and non-empty
    pub fn content_text(&self) -> Option<&str> {
        self.content.as_deref().filter(|s| !s.is_empty())
    }
}
