//! # Prompt Composer
//!
//! Builds the text sent to the provider for the newest user turn: optional
//! mode instructions, then any attached file context, then the question.
//! The stored message is always the user's verbatim text.

use lib_ai::ModeFlags;
use lib_core::model::store::FileAttachment;

const THINKING_PREFIX: &str = "[THINKING MODE] Please think through this step by step: ";
const DEEP_RESEARCH_PREFIX: &str = "[DEEP RESEARCH MODE] Please provide a comprehensive, well-researched response with detailed analysis: ";
const COMBINED_PREFIX: &str = "[THINKING + DEEP RESEARCH MODE] Please think through this step by step and provide a comprehensive, well-researched response with detailed analysis: ";

const CONTEXT_HEADER: &str = "\n\n--- CONTEXT FILES ---\n";
const CONTEXT_FOOTER: &str = "\n--- END CONTEXT FILES ---\n\n";
const FILE_SEPARATOR_WIDTH: usize = 50;

/// Outbound prompt and the text to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub prompt: String,
    pub stored: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PromptComposer {
    mode_prefixes: bool,
}

impl PromptComposer {
    /// `mode_prefixes` enables the instruction prefixes for the mode flags.
    pub fn new(mode_prefixes: bool) -> Self {
        Self { mode_prefixes }
    }

    pub fn compose(&self, user_text: &str, files: &[FileAttachment], modes: ModeFlags) -> ComposedPrompt {
        let mut prompt = String::new();

        if self.mode_prefixes {
            if let Some(prefix) = mode_prefix(modes) {
                prompt.push_str(prefix);
            }
        }

        if files.is_empty() {
            prompt.push_str(user_text);
        } else {
            prompt.push_str(&format_file_context(files));
            prompt.push_str("User Question: ");
            prompt.push_str(user_text);
        }

        ComposedPrompt {
            prompt,
            stored: user_text.to_string(),
        }
    }
}

/// At most one prefix; both flags select the combined one.
fn mode_prefix(modes: ModeFlags) -> Option<&'static str> {
    match (modes.thinking, modes.deep_research) {
        (true, true) => Some(COMBINED_PREFIX),
        (true, false) => Some(THINKING_PREFIX),
        (false, true) => Some(DEEP_RESEARCH_PREFIX),
        (false, false) => None,
    }
}

fn format_file_context(files: &[FileAttachment]) -> String {
    let separator = "-".repeat(FILE_SEPARATOR_WIDTH);
    let mut context = String::from(CONTEXT_HEADER);
    for file in files {
        context.push_str(&format!(
            "\nFile: {}\nType: {}\nContent:\n{}\n{}\n",
            file.original_filename, file.file_type, file.content, separator
        ));
    }
    context.push_str(CONTEXT_FOOTER);
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn file(name: &str, file_type: &str, content: &str) -> FileAttachment {
        FileAttachment {
            id: 1,
            chat_id: 1,
            filename: format!("stored-{}", name),
            original_filename: name.to_string(),
            file_type: file_type.to_string(),
            file_size: content.len() as i64,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_plain_prompt_is_verbatim() {
        let composed = PromptComposer::new(true).compose("hi there", &[], ModeFlags::default());
        assert_eq!(composed.prompt, "hi there");
        assert_eq!(composed.stored, "hi there");
    }

    #[test]
    fn test_file_context_layout() {
        let files = [file("a.txt", "txt", "hello")];
        let composed = PromptComposer::new(true).compose("what is this?", &files, ModeFlags::default());

        let expected = format!(
            "\n\n--- CONTEXT FILES ---\n\nFile: a.txt\nType: txt\nContent:\nhello\n{}\n\n--- END CONTEXT FILES ---\n\nUser Question: what is this?",
            "-".repeat(50)
        );
        assert_eq!(composed.prompt, expected);
        assert!(composed.prompt.contains("File: a.txt"));
        assert!(composed.prompt.ends_with("User Question: what is this?"));
        assert_eq!(composed.stored, "what is this?");
    }

    #[test]
    fn test_both_modes_use_one_combined_prefix() {
        let composed = PromptComposer::new(true).compose("q", &[], ModeFlags::new(true, true));
        assert!(composed.prompt.starts_with(COMBINED_PREFIX));
        assert_eq!(composed.prompt.matches("MODE]").count(), 1);
        assert!(!composed.prompt.contains(THINKING_PREFIX));
    }

    #[test]
    fn test_prefix_precedes_file_context() {
        let files = [file("notes.md", "md", "# Notes")];
        let composed = PromptComposer::new(true).compose("summarize", &files, ModeFlags::new(false, true));
        assert!(composed.prompt.starts_with(DEEP_RESEARCH_PREFIX));
        assert!(composed.prompt.ends_with("User Question: summarize"));
        assert_eq!(composed.stored, "summarize");
    }

    #[test]
    fn test_prefixes_can_be_disabled() {
        let composed = PromptComposer::new(false).compose("q", &[], ModeFlags::new(true, false));
        assert_eq!(composed.prompt, "q");
    }
}
