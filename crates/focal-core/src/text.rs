//! Text heuristics for titles and keyword tokenization.
//!
//! Pure functions, no state. These back the title synthesizer (file-name
//! titles, clipping, casing) and the keyword indexing pass (word
//! tokenization, set-union deduplication).

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Maximum length of a record title.
pub const CLIP_TITLE: usize = 300;

/// Maximum length of a record description.
pub const CLIP_DESCRIPTION: usize = 16_000;

/// Maximum length of short varchar-backed fields (camera serial and such).
pub const CLIP_VARCHAR: usize = 255;

/// Maximum length of a file-derived title.
const CLIP_FILE_TITLE: usize = 100;

/// Camera-generated file name stems like `IMG_1234` or `20200102_120000`.
static GENERATED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(crw|dcim|dsc[nf]?|gopr|img|image|mvimg|pano|pict|photo|scan|screenshot|snapshot|vid|mov)?[-_ ]?\d{3,}[-_ ().\d]*$")
        .expect("invalid generated-name pattern")
});

/// Word tokens: runs of letters and digits.
static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("invalid word pattern"));

/// Trim `s` and cut it to at most `max` characters.
pub fn clip(s: &str, max: usize) -> String {
    let trimmed = s.trim();
    let clipped: String = trimmed.chars().take(max).collect();
    clipped.trim_end().to_string()
}

/// Returns true if `s` contains a decimal digit.
pub fn contains_number(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

/// Capitalize the first letter of every whitespace-separated word.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if a file name or path looks camera-generated,
/// e.g. `IMG_1234.jpg`, `DSC00042`, `20200102_120000.heic`.
pub fn is_generated(name: &str) -> bool {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    !stem.is_empty() && GENERATED_NAME.is_match(stem)
}

/// Derive a presentable title from a file name or path.
///
/// Takes the last path element without its extension, splits it into word
/// tokens, drops pure-number and single-character tokens, and title-cases
/// the rest. Returns an empty string when nothing presentable remains.
pub fn file_title(s: &str) -> String {
    let stem = Path::new(s)
        .file_stem()
        .and_then(|p| p.to_str())
        .unwrap_or("");

    let tokens: Vec<&str> = WORD
        .find_iter(stem)
        .map(|m| m.as_str())
        .filter(|t| t.chars().count() > 1 && t.chars().any(|c| c.is_alphabetic()))
        .collect();

    let joined = tokens.join(" ");

    if joined.chars().filter(|c| c.is_alphabetic()).count() < 3 {
        return String::new();
    }

    clip(&title_case(&joined), CLIP_FILE_TITLE)
}

/// Split text into word tokens, preserving case.
pub fn words(s: &str) -> Vec<String> {
    WORD.find_iter(s).map(|m| m.as_str().to_string()).collect()
}

/// Lowercase keyword tokens: words of at least three characters that
/// contain at least one letter.
pub fn keywords(s: &str) -> Vec<String> {
    words(s)
        .into_iter()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= 3 && w.chars().any(|c| c.is_alphabetic()))
        .collect()
}

/// Sort and deduplicate a word list.
pub fn unique_words(mut words: Vec<String>) -> Vec<String> {
    words.sort();
    words.dedup();
    words
}

/// Remove every occurrence of `word` from the list.
pub fn remove_from_words(words: Vec<String>, word: &str) -> Vec<String> {
    words.into_iter().filter(|w| w != word).collect()
}
