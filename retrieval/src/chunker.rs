//! Word-bounded text chunking.

/// Split text into chunks of at most `max_words` whitespace-delimited
/// words.
///
/// Tokens are accumulated in order until the running chunk reaches
/// `max_words`, then the chunk is emitted and a new one started; any
/// non-empty remainder becomes the final chunk. Joining the chunks back
/// with single spaces reproduces the original token sequence (original
/// whitespace is not preserved).
///
/// Text that yields no tokens at all produces a single degenerate chunk
/// equal to the original text — callers must tolerate a possibly empty
/// chunk rather than an empty sequence.
pub fn chunk_words(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in text.split_whitespace() {
        current.push(word);
        if current.len() >= max_words {
            chunks.push(current.join(" "));
            current.clear();
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    if chunks.is_empty() {
        chunks.push(text.to_string());
    }

    chunks
}

/// Truncate text to at most `max_chars` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
