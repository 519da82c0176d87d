use std::sync::LazyLock;

use regex::Regex;

/// North-American phone number: optional parenthesized area code, optional
/// `-`, `.` or whitespace separators.
const PHONE_PATTERN: &str = r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}";

/// Characters stripped from the emergency field to leave the contact name.
const NAME_NOISE_PATTERN: &str = r"[\d()\-\s]+";

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(PHONE_PATTERN).unwrap());
static NAME_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_NOISE_PATTERN).unwrap());

/// Split a free-text emergency contact (`"Liu, Leslie-daughter-9175139188"`)
/// into the first phone number it contains and the remaining name text.
///
/// The name keeps everything except digits, parentheses, hyphens and
/// whitespace, so `"Liu, Leslie-daughter-9175139188"` yields
/// `"Liu,Lesliedaughter"`.
pub fn extract_phone_and_name(text: &str) -> (Option<String>, String) {
    let phone = PHONE_RE.find(text).map(|m| m.as_str().to_string());
    let name = NAME_NOISE_RE.replace_all(text, "").into_owned();
    (phone, name)
}
