use std::sync::OnceLock;

use regex::Regex;

/// Default number of words per segment produced by [`split_for_shorts`].
pub const DEFAULT_MAX_WORDS: usize = 20;

fn sentence_break() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?,]\s+").expect("sentence pattern is valid"))
}

/// Splits narration prose into caption segments.
///
/// The text is broken after every `.`, `!`, `?` or `,` that is followed by
/// whitespace, and each piece is cut into runs of at most `max_words` words.
pub fn split_for_shorts(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in sentence_break().find_iter(text) {
        // Keep the punctuation mark with the sentence it closes.
        sentences.push(&text[last..m.start() + 1]);
        last = m.end();
    }
    sentences.push(&text[last..]);

    let mut frames = Vec::new();
    for sentence in sentences {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        for chunk in words.chunks(max_words) {
            frames.push(chunk.join(" "));
        }
    }
    frames
}

/// Breaks `text` into display lines of `width` words each.
///
/// With no width the text is kept as a single line, untouched.
pub fn wrap_words(text: &str, width: Option<usize>) -> Vec<String> {
    let width = match width {
        Some(w) if w > 0 => w,
        _ => return vec![text.to_string()],
    };

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }
    words.chunks(width).map(|chunk| chunk.join(" ")).collect()
}
