use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::{AgentError, AgentResult};
use crate::prompt_template::load_prompt;

const INSTRUCTIONS_TEMPLATE: &str = include_str!("prompts/instructions.md");

/// Shown in place of the parts list when the catalog is empty
pub const NO_PARTS_PLACEHOLDER: &str = "No available parts";

/// Format of the timestamp embedded in the instructions
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefix for transcripts submitted through the analyze action
pub const ANALYZE_PREFIX: &str = "请分析以下对话并提供建议:\n\n";

#[derive(Serialize)]
struct InstructionContext<'a> {
    current_time: String,
    parts: &'a [&'a str],
}

/// Build the system instructions for one turn.
///
/// Pure string construction: the same time and part names always give the
/// same text.
pub fn build_instructions(current_time: NaiveDateTime, parts: &[&str]) -> AgentResult<String> {
    let context = InstructionContext {
        current_time: current_time.format(TIME_FORMAT).to_string(),
        parts,
    };
    load_prompt(INSTRUCTIONS_TEMPLATE, &context).map_err(|e| AgentError::Prompt(e.to_string()))
}

/// Wrap a pasted customer-service transcript into an analysis request
pub fn analyze_request(transcript: &str) -> String {
    format!("{}{}", ANALYZE_PREFIX, transcript)
}
