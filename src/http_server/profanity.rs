//! Chirp body cleaning

/// Words replaced by [`clean_body`]
pub const PROFANE_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];

const MASK: &str = "****";

/// Replace profane words with `****`
///
/// The body is split on single spaces. A word matches when its lowercase
/// form, with `.,!?` trimmed from both ends, is in [`PROFANE_WORDS`]; the
/// whole word, punctuation included, is replaced. Spacing is preserved.
pub fn clean_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let bare = word
                .trim_matches(|c| matches!(c, '.' | ',' | '!' | '?'))
                .to_lowercase();
            if PROFANE_WORDS.contains(&bare.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
