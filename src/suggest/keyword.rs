//! Query normalization and keyword completion.

/// Normalize a search string or keyword for exact comparison: trim, lowercase,
/// and collapse every whitespace run to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Complete `query` to the keyword phrase shown for a match.
///
/// The first keyword that extends the query by at least one word is cut back
/// to that word. Failing that, the longest keyword the query is a strict
/// prefix of wins, and the query itself is the last resort.
pub fn full_keyword(query: &str, keywords: &[impl AsRef<str>]) -> String {
    // A trailing space asks for the word after it.
    let wanted_words = query.split_whitespace().count()
        + usize::from(query.ends_with(char::is_whitespace));
    let candidates = move || {
        keywords
            .iter()
            .map(AsRef::as_ref)
            .filter(move |keyword| keyword.starts_with(query))
    };

    for keyword in candidates() {
        let words: Vec<&str> = keyword.split_whitespace().collect();
        if words.len() > wanted_words {
            return words[..wanted_words].join(" ");
        }
    }
    candidates()
        .filter(|keyword| keyword.len() > query.len())
        .max_by_key(|keyword| keyword.trim().len())
        .unwrap_or(query)
        .to_string()
}
