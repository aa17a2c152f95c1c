//! Display helpers for scene summaries. Never used by the compositor.

/// Cut `text` to its first `max_words` whitespace-delimited words, appending `...` when anything
/// was dropped. Whitespace runs in the kept prefix collapse to single spaces.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let mut words = text.split_whitespace();
    let kept: Vec<&str> = words.by_ref().take(max_words).collect();
    let mut out = kept.join(" ");
    if words.next().is_some() {
        out.push_str("...");
    }
    out
}
