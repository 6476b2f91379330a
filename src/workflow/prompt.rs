//! Prompt context shared by every model call in one workflow run.
//!
//! The system prompt is rendered once from the transcript, the note collection, and
//! the document-format guide, then shared read-only across concurrent refinements.

use crate::error::ApiError;
use crate::workflow::types::{Message, Note};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// Format guide used when no `workflow.format_guide` file is configured.
pub const DEFAULT_FORMAT_GUIDE: &str = "\
Notes are markdown documents with this layout:

# <Title>

**Description:** one or two sentences on what the note is for.

**Content:**
The body: headings, lists, and tables as the material needs.

Rules:
- Exactly one top-level `#` heading, at the start.
- Use fenced code blocks with a language tag for anything executable (```bash).
- Keep lists flat unless nesting carries meaning.
- No commentary about the document itself; the file content is the whole answer.";

const ROLE_PREAMBLE: &str = "\
You maintain a personal collection of notes captured from voice conversations. \
You turn what was said into clear, reusable note documents and keep existing notes current. \
Always answer with the requested output only. Never ask questions or ask for confirmation.";

/// Read the format guide from `path`, or fall back to the built-in guide.
pub fn load_format_guide(path: Option<&Path>) -> Result<String, ApiError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to read format guide {}: {}",
                path.display(),
                e
            ))
        }),
        None => Ok(DEFAULT_FORMAT_GUIDE.to_string()),
    }
}

/// Rendered inputs for one workflow invocation.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub system: Arc<str>,
    transcript: String,
    notes: String,
}

impl PromptContext {
    pub fn new(transcript: &[Message], notes: &[Note], format_guide: &str) -> Self {
        let transcript = render_transcript(transcript);
        let notes = render_notes(notes);

        let mut system = String::new();
        system.push_str(ROLE_PREAMBLE);
        let _ = write!(system, "\n\n## Document format\n\n{}", format_guide.trim());
        let _ = write!(system, "\n\n## Conversation\n\n{}", transcript);
        let _ = write!(system, "\n\n## Current notes\n\n{}", notes);

        Self {
            system: Arc::from(system),
            transcript,
            notes,
        }
    }

    /// Transcript as `role: content` lines
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

fn render_transcript(transcript: &[Message]) -> String {
    if transcript.is_empty() {
        return "(the conversation is empty)".to_string();
    }
    transcript
        .iter()
        .map(|message| format!("{}: {}", message.role.as_str(), message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "(no notes yet)".to_string();
    }
    notes
        .iter()
        .map(|note| format!("### {} (id: {})\n{}", note.name, note.id, note.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
