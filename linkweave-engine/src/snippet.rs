/// Lowercased copy of a text that remembers where each byte came from.
struct Lowered {
    text: String,
    origin: Vec<usize>,
}

impl Lowered {
    fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len());
        for (offset, ch) in source.char_indices() {
            for lower in ch.to_lowercase() {
                let start = text.len();
                text.push(lower);
                origin.extend(std::iter::repeat_n(offset, text.len() - start));
            }
        }
        Self { text, origin }
    }

    fn original_offset(&self, pos: usize, source_len: usize) -> usize {
        self.origin.get(pos).copied().unwrap_or(source_len)
    }
}

fn is_word_char(ch: Option<char>) -> bool {
    ch.map(char::is_alphanumeric).unwrap_or(false)
}

/// Byte range of the first whole-word, case-insensitive occurrence of
/// `phrase` in `text`. Multi-word phrases fall back to their first word.
pub fn locate(text: &str, phrase: &str) -> Option<(usize, usize)> {
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let lowered = Lowered::new(text);
    if let Some(range) = locate_lowered(&lowered, text.len(), &needle) {
        return Some(range);
    }

    let first_word = needle.split_whitespace().next()?;
    if first_word != needle {
        return locate_lowered(&lowered, text.len(), first_word);
    }
    None
}

fn locate_lowered(lowered: &Lowered, source_len: usize, needle: &str) -> Option<(usize, usize)> {
    let haystack = lowered.text.as_str();
    for (pos, _) in haystack.match_indices(needle) {
        let end = pos + needle.len();
        let before = haystack[..pos].chars().next_back();
        let after = haystack[end..].chars().next();
        if is_word_char(before) || is_word_char(after) {
            continue;
        }
        return Some((
            lowered.original_offset(pos, source_len),
            lowered.original_offset(end, source_len),
        ));
    }
    None
}

/// Text around `range` with up to `context_chars` characters on each side,
/// whitespace collapsed, and `...` marking truncation.
pub fn context(text: &str, range: (usize, usize), context_chars: usize) -> String {
    let (start, end) = range;
    let start = start.min(text.len());
    let end = end.clamp(start, text.len());

    let window_start = text[..start]
        .char_indices()
        .rev()
        .take(context_chars)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let window_end = text[end..]
        .char_indices()
        .nth(context_chars)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let body = text[window_start..window_end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut snippet = String::with_capacity(body.len() + 6);
    if window_start > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(&body);
    if window_end < text.len() {
        snippet.push_str("...");
    }
    snippet
}

/// Convenience: locate `phrase` and cut context around it.
pub fn snippet_for(text: &str, phrase: &str, context_chars: usize) -> Option<String> {
    locate(text, phrase).map(|range| context(text, range, context_chars))
}
