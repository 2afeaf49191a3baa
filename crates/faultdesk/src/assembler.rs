//! Merges the reasoning and answer streams of one turn into two progressively
//! rendered panels.
//!
//! The assembler owns the buffers and the turn state; drawing is left to a
//! [`Renderer`], which is called every time a panel's content changes.

use serde::Serialize;

use crate::models::chunk::StreamChunk;

/// Appended to a panel while its stream is still running
pub const CURSOR: &str = "▌";

/// Shown once above the answer when think mode is on
pub const ANSWER_HEADING: &str = "Answer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Thinking,
    Answer,
}

/// Receives panel updates. Every call replaces the previous content of that panel.
pub trait Renderer {
    fn render(&mut self, panel: Panel, content: &str);

    fn heading(&mut self, _panel: Panel, _title: &str) {}
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render(&mut self, panel: Panel, content: &str) {
        (**self).render(panel, content)
    }

    fn heading(&mut self, panel: Panel, title: &str) {
        (**self).heading(panel, title)
    }
}

/// Discards all updates
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _panel: Panel, _content: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    Idle,
    Streaming,
    Finalized,
}

/// Outcome of a finished turn. Only `answer` belongs in the conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledResponse {
    pub answer: String,
    pub reasoning: String,
}

pub struct ResponseAssembler<R: Renderer> {
    think_mode: bool,
    reasoning: String,
    answer: String,
    answer_started: bool,
    state: AssemblerState,
    renderer: R,
}

impl<R: Renderer> ResponseAssembler<R> {
    pub fn new(think_mode: bool, renderer: R) -> Self {
        Self {
            think_mode,
            reasoning: String::new(),
            answer: String::new(),
            answer_started: false,
            state: AssemblerState::Idle,
            renderer,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    pub fn think_mode(&self) -> bool {
        self.think_mode
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Apply one chunk
    pub fn push(&mut self, chunk: &StreamChunk) {
        match self.state {
            AssemblerState::Finalized => {
                tracing::warn!("Ignoring chunk received after the response was finalized");
                return;
            }
            AssemblerState::Idle => self.state = AssemblerState::Streaming,
            AssemblerState::Streaming => {}
        }

        if let Some(reasoning) = chunk.reasoning_text() {
            self.reasoning.push_str(reasoning);
            if self.think_mode {
                self.renderer
                    .render(Panel::Thinking, &with_cursor(&self.reasoning));
            }
        }

        if let Some(content) = chunk.content_text() {
            self.answer.push_str(content);
            if !self.answer_started {
                self.answer_started = true;
                if self.think_mode {
                    self.renderer.heading(Panel::Answer, ANSWER_HEADING);
                }
            }
            self.renderer.render(Panel::Answer, &with_cursor(&self.answer));
        }
    }

    /// Render both panels without the cursor and hand back the buffers
    pub fn finish(&mut self) -> AssembledResponse {
        if self.state != AssemblerState::Finalized {
            if self.think_mode {
                self.renderer.render(Panel::Thinking, &self.reasoning);
            }
            self.renderer.render(Panel::Answer, &self.answer);
            self.state = AssemblerState::Finalized;
        }

        AssembledResponse {
            answer: self.answer.clone(),
            reasoning: self.reasoning.clone(),
        }
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

fn with_cursor(buffer: &str) -> String {
    format!("{}{}", buffer, CURSOR)
}
