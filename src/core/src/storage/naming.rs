//! Artifact file names.
//!
//! Names look like `<number>_<label>.png`, or `<number>.png` when no label
//! was given. The raw stem is truncated to the configured length first and
//! sanitized second, so truncation may cut through the separator or even
//! the digits. That is accepted as-is.

/// Extension of every artifact written by the store.
pub const ARTIFACT_EXTENSION: &str = "png";

/// Marker a file name must contain to be counted as an artifact.
pub const ARTIFACT_MARKER: &str = ".png";

pub const LABEL_SEPARATOR: char = '_';

/// Builds the file name for artifact `number`.
///
/// Lengths are counted in characters, not bytes, so multi-byte labels are
/// never split inside a code point.
pub fn generate_name(number: u64, label: &str, max_len: usize) -> String {
    let mut stem = number.to_string();
    if !label.is_empty() {
        stem.push(LABEL_SEPARATOR);
        stem.push_str(label);
    }
    let truncated: String = stem.chars().take(max_len).collect();
    format!("{}.{}", sanitize_file_name(&truncated), ARTIFACT_EXTENSION)
}

/// Replaces every non-alphanumeric character with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn is_artifact_name(file_name: &str) -> bool {
    file_name.contains(ARTIFACT_MARKER)
}

/// The part of the name before the first `.png`.
pub fn artifact_stem(file_name: &str) -> &str {
    match file_name.find(ARTIFACT_MARKER) {
        Some(idx) => &file_name[..idx],
        None => file_name,
    }
}

/// Numeric identity of an artifact: the stem up to the first separator.
///
/// `None` means the name is malformed.
pub fn parse_artifact_number(file_name: &str) -> Option<u64> {
    let stem = artifact_stem(file_name);
    let prefix = match stem.split_once(LABEL_SEPARATOR) {
        Some((prefix, _)) => prefix,
        None => stem,
    };
    // `u64::from_str` would also take a leading `+`.
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// Label carried by an artifact name, if it has a separator.
///
/// `"12_login_page.png"` gives `Some("login_page")`, `"12.png"` gives `None`.
pub fn artifact_label(file_name: &str) -> Option<&str> {
    artifact_stem(file_name)
        .split_once(LABEL_SEPARATOR)
        .map(|(_, label)| label)
}
