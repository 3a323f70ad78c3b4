//! Reply Formatter
//!
//! The question-answering backend replies with a loosely structured text:
//!
//! ```text
//! Context:
//! BNS Section: 303
//! Subject: Theft
//! Whoever, intending to take dishonestly any movable property...
//!
//! BNS Section: 304
//! Subject: Snatching
//! ...
//! Question: what is the punishment for theft?
//! Answer: Imprisonment of up to three years, or fine, or both.
//! ```
//!
//! [`parse_reply`] turns that text into a [`ReplyLayout`]; its `Display`
//! impl renders the Markdown shown in the chat window. [`format_reply`]
//! chains both and falls back to the raw text when the markers are missing.
//!
//! The marker vocabulary is fixed by the backend and must not change.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Marker opening the retrieved context
pub const CONTEXT_MARKER: &str = "Context:";

/// Marker separating the context from the echoed question
pub const QUESTION_MARKER: &str = "Question:";

/// Marker preceding the generated answer
pub const ANSWER_MARKER: &str = "Answer:";

/// Shown when the reply carries no answer text
pub const NO_ANSWER_PLACEHOLDER: &str = "⚠️ No answer returned.";

const SECTION_PREFIX: &str = "BNS Section:";
const SUBJECT_PREFIX: &str = "Subject:";

lazy_static! {
    /// A line opening a context block
    static ref SECTION_LINE: Regex = Regex::new(r"(?m)^BNS Section:").unwrap();
}

/// Why a reply could not be laid out
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReply {
    #[error("reply has no \"Context:\" marker")]
    MissingContext,

    #[error("reply has no \"Question:\" marker after the context")]
    MissingQuestion,
}

/// One cited section of the penal code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBlock {
    /// Section identifier, e.g. `303`
    pub section: String,

    /// Subject line, empty when the block had none
    pub subject: String,

    /// Remaining block text
    pub body: String,
}

impl ContextBlock {
    fn parse(block: &str) -> Self {
        let mut lines = block.lines();

        let section = lines
            .next()
            .map(|line| {
                line.trim_start()
                    .trim_start_matches(SECTION_PREFIX)
                    .trim()
                    .to_string()
            })
            .unwrap_or_default();

        let mut subject = None;
        let mut body = Vec::new();
        for line in lines {
            let trimmed = line.trim_start();
            if subject.is_none() && trimmed.starts_with(SUBJECT_PREFIX) {
                subject = Some(trimmed[SUBJECT_PREFIX.len()..].trim().to_string());
            } else {
                body.push(line);
            }
        }

        Self {
            section,
            subject: subject.unwrap_or_default(),
            body: body.join("\n").trim().to_string(),
        }
    }
}

impl fmt::Display for ContextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "🔹 **Section {}**  \n📌 *{}*\n> {}",
            self.section, self.subject, self.body
        )
    }
}

/// A parsed backend reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyLayout {
    /// Answer text, or [`NO_ANSWER_PLACEHOLDER`]
    pub answer: String,

    /// Context blocks in reply order
    pub sections: Vec<ContextBlock>,
}

impl fmt::Display for ReplyLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**🧠 Answer:**\n{}\n\n---\n\n**📚 Context:**\n", self.answer)?;
        for (i, block) in self.sections.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}

/// Parse a raw backend reply.
///
/// The context runs from the first `Context:` to the next `Question:`.
/// It is split before every line starting with `BNS Section:`; anything
/// before the first such line is preamble and dropped. The answer is the
/// text after the last `Answer:` following the question.
pub fn parse_reply(raw: &str) -> Result<ReplyLayout, MalformedReply> {
    let (_, after_context) = raw
        .split_once(CONTEXT_MARKER)
        .ok_or(MalformedReply::MissingContext)?;
    let (raw_context, after_question) = after_context
        .split_once(QUESTION_MARKER)
        .ok_or(MalformedReply::MissingQuestion)?;

    let answer = after_question
        .rsplit_once(ANSWER_MARKER)
        .map(|(_, answer)| answer.trim())
        .filter(|answer| !answer.is_empty())
        .unwrap_or(NO_ANSWER_PLACEHOLDER)
        .to_string();

    Ok(ReplyLayout {
        answer,
        sections: split_blocks(raw_context.trim()),
    })
}

fn split_blocks(context: &str) -> Vec<ContextBlock> {
    let starts: Vec<usize> = SECTION_LINE.find_iter(context).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(context.len());
            ContextBlock::parse(context[start..end].trim())
        })
        .collect()
}

/// Format a raw backend reply for display.
///
/// Never fails: a reply without the expected markers is returned unchanged.
pub fn format_reply(raw: &str) -> String {
    match parse_reply(raw) {
        Ok(layout) => layout.to_string(),
        Err(e) => {
            tracing::warn!("Could not format bot reply: {}", e);
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "Prompt follows\nContext:\nBNS Section: 100\nSubject: Theft\nSome text\nQuestion: what is theft? Answer: 42";

    #[test]
    fn test_format_sample_reply() {
        let out = format_reply(SAMPLE);

        assert!(out.contains("Section 100"));
        assert!(out.contains("Theft"));
        assert!(out.contains("Some text"));
        assert!(out.contains("42"));
        assert!(!out.contains("BNS Section:"));
    }

    #[test]
    fn test_exact_layout() {
        let out = format_reply(SAMPLE);
        assert_eq!(
            out,
            "**🧠 Answer:**\n42\n\n---\n\n**📚 Context:**\n🔹 **Section 100**  \n📌 *Theft*\n> Some text"
        );
    }

    #[test]
    fn test_multiple_blocks_and_preamble() {
        let raw = "Context:\nRetrieved documents follow.\nBNS Section: 303\nSubject: Theft\nWhoever commits theft\nshall be punished.\n\nBNS Section: 304\nSubject: Snatching\nSnatching is theft.\nQuestion: q\nAnswer: a";
        let layout = parse_reply(raw).unwrap();

        assert_eq!(layout.sections.len(), 2);
        assert_eq!(layout.sections[0].section, "303");
        assert_eq!(layout.sections[0].subject, "Theft");
        assert_eq!(
            layout.sections[0].body,
            "Whoever commits theft\nshall be punished."
        );
        assert_eq!(layout.sections[1].section, "304");
        assert_eq!(layout.sections[1].body, "Snatching is theft.");

        let out = layout.to_string();
        assert!(!out.contains("Retrieved documents follow."));
        assert!(out.contains("> Whoever commits theft\nshall be punished.\n\n🔹 **Section 304**"));
    }

    #[test]
    fn test_indented_section_line_stays_in_body() {
        let raw = "Context:\nBNS Section: 318\nSubject: Cheating\nSee also:\n  BNS Section: 319\nQuestion: q\nAnswer: a";
        let layout = parse_reply(raw).unwrap();

        assert_eq!(layout.sections.len(), 1);
        assert_eq!(layout.sections[0].section, "318");
        assert_eq!(layout.sections[0].body, "See also:\n  BNS Section: 319");
    }

    #[test]
    fn test_block_without_subject() {
        let raw = "Context:\nBNS Section: 61\nCriminal conspiracy text\nQuestion: q\nAnswer: a";
        let layout = parse_reply(raw).unwrap();

        assert_eq!(layout.sections[0].subject, "");
        assert_eq!(layout.sections[0].body, "Criminal conspiracy text");
        assert!(layout.to_string().contains("📌 **\n"));
    }

    #[test]
    fn test_section_line_at_end_of_block() {
        let raw = "Context:\nBNS Section: 7\nQuestion: q\nAnswer: a";
        let out = format_reply(raw);

        assert!(out.contains("Section 7"));
        assert!(!out.contains("BNS Section:"));
    }

    #[test]
    fn test_missing_answer_uses_placeholder() {
        let raw = "Context:\nBNS Section: 1\nSubject: S\nBody\nQuestion: only a question";
        let layout = parse_reply(raw).unwrap();
        assert_eq!(layout.answer, NO_ANSWER_PLACEHOLDER);

        let blank = "Context:\nBNS Section: 1\nQuestion: q\nAnswer:   \n";
        assert_eq!(parse_reply(blank).unwrap().answer, NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn test_answer_after_last_marker() {
        let raw = "Context:\nBNS Section: 1\nQuestion: q\nAnswer: draft\nAnswer:  final answer \n";
        assert_eq!(parse_reply(raw).unwrap().answer, "final answer");
    }

    #[test]
    fn test_no_context_blocks() {
        let raw = "Context:\nnothing relevant\nQuestion: q\nAnswer: a";
        let layout = parse_reply(raw).unwrap();

        assert!(layout.sections.is_empty());
        assert!(layout.to_string().ends_with("**📚 Context:**\n"));
    }

    #[test]
    fn test_missing_markers_return_raw() {
        let no_context = "Sorry, I couldn't find relevant legal information.";
        assert_eq!(format_reply(no_context), no_context);
        assert_eq!(parse_reply(no_context), Err(MalformedReply::MissingContext));

        let no_question = "Context:\nBNS Section: 1\nAnswer: a";
        assert_eq!(format_reply(no_question), no_question);
        assert_eq!(parse_reply(no_question), Err(MalformedReply::MissingQuestion));

        let question_first = "Question: q\nContext: c";
        assert_eq!(format_reply(question_first), question_first);
    }

    proptest! {
        #[test]
        fn prop_without_context_marker_is_identity(raw in "\\PC*") {
            prop_assume!(!raw.contains(CONTEXT_MARKER));
            prop_assert_eq!(format_reply(&raw), raw);
        }

        #[test]
        fn prop_without_question_marker_is_identity(body in "\\PC*") {
            let raw = format!("Context:\n{}", body);
            prop_assume!(!raw.contains(QUESTION_MARKER));
            prop_assert_eq!(format_reply(&raw), raw);
        }

        #[test]
        fn prop_formatted_output_drops_section_prefix(
            section in "[0-9]{1,3}",
            subject in "[A-Za-z ]{0,20}",
            body in "[a-z ]{1,40}",
        ) {
            let raw = format!(
                "Context:\nBNS Section: {}\nSubject: {}\n{}\nQuestion: q\nAnswer: yes",
                section, subject, body
            );
            let out = format_reply(&raw);
            let expected = format!("Section {}", section);
            prop_assert!(out.contains(&expected));
            prop_assert!(!out.contains("BNS Section:"));
        }
    }
}
