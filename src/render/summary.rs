use crate::models::ParsedTranscript;

pub const EMPTY_SUMMARY: &str = "Empty conversation";

const MAX_SUMMARY_CHARS: usize = 120;
const MIN_WORD_BREAK_CHARS: usize = 80;
const ELLIPSIS: &str = "...";

/// One-line summary taken from the first user message.
///
/// Messages of at most 120 characters come back whole (newlines flattened).
/// Longer ones are cut at 120 characters, pulled back to the last space when that
/// space sits past character 80, and suffixed with `...`. The result never exceeds
/// 123 characters.
pub fn generate_summary(transcript: &ParsedTranscript) -> String {
    let Some(first) = transcript.first_user_message() else {
        return EMPTY_SUMMARY.to_string();
    };
    summarize_text(&first.content)
}

fn summarize_text(text: &str) -> String {
    let Some((cut, _)) = text.char_indices().nth(MAX_SUMMARY_CHARS) else {
        return flatten(text);
    };

    let truncated = &text[..cut];
    let end = match truncated.rfind(' ') {
        Some(space) if truncated[..space].chars().count() > MIN_WORD_BREAK_CHARS => space,
        _ => truncated.len(),
    };

    let mut summary = flatten(&truncated[..end]);
    summary.push_str(ELLIPSIS);
    summary
}

fn flatten(text: &str) -> String {
    text.replace('\n', " ")
}

/// First `max_chars` characters, for document titles
pub fn title_from_summary(summary: &str, max_chars: usize) -> String {
    summary.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Role};

    fn with_user_text(text: &str) -> ParsedTranscript {
        ParsedTranscript::from_messages(vec![
            Message { role: Role::Assistant, content: "greeting".to_string() },
            Message { role: Role::User, content: text.to_string() },
        ])
    }

    #[test]
    fn test_short_message_verbatim_with_newlines_flattened() {
        assert_eq!(generate_summary(&with_user_text("fix\nthe build")), "fix the build");
    }

    #[test]
    fn test_exactly_120_chars_is_not_truncated() {
        let text = "a".repeat(120);
        assert_eq!(generate_summary(&with_user_text(&text)), text);
    }

    #[test]
    fn test_long_single_word_hard_cut() {
        let summary = generate_summary(&with_user_text(&"x".repeat(200)));
        assert_eq!(summary.chars().count(), 123);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_long_message_breaks_on_word_past_80() {
        let text = format!("{} {}", "a".repeat(100), "b".repeat(100));
        let summary = generate_summary(&with_user_text(&text));
        assert_eq!(summary, format!("{}...", "a".repeat(100)));
    }

    #[test]
    fn test_space_before_80_is_ignored() {
        let text = format!("{} {}", "a".repeat(50), "b".repeat(150));
        let summary = generate_summary(&with_user_text(&text));
        assert_eq!(summary.chars().count(), 123);
        assert!(summary.starts_with(&"a".repeat(50)));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "é".repeat(119);
        assert_eq!(generate_summary(&with_user_text(&text)), text);

        let long = "é".repeat(200);
        let summary = generate_summary(&with_user_text(&long));
        assert_eq!(summary.chars().count(), 123);
    }

    #[test]
    fn test_no_user_message() {
        let transcript = ParsedTranscript::from_messages(vec![Message {
            role: Role::Assistant,
            content: "only me".to_string(),
        }]);
        assert_eq!(generate_summary(&transcript), EMPTY_SUMMARY);
    }

    #[test]
    fn test_title_from_summary() {
        assert_eq!(title_from_summary("abcdef", 3), "abc");
        assert_eq!(title_from_summary("ab", 60), "ab");
    }
}
