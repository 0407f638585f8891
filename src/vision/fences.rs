use lazy_static::lazy_static;
use regex::Regex;

/// Removes a markdown code fence wrapped around a model response.
///
/// Handles ```` ```json ... ``` ```` and bare ```` ``` ... ``` ````; anything
/// else is returned trimmed but otherwise untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    lazy_static! {
        static ref FENCED: Regex =
            Regex::new(r"(?s)\A```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)\s*```\z").unwrap();
    }
    let trimmed = raw.trim();
    match FENCED.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}
