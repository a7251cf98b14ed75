//! Input sanitization for free-text form fields.

/// Remove every character from `text` that is not an ASCII letter, one of
/// the Swedish letters å, ä and ö (either case), a digit, a space or one of
/// the punctuation characters `- . , ? !`.
///
/// Leading and trailing whitespace is trimmed from the result.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|&c| is_allowed(c) || c == ' ')
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Reduce an uploaded file name to something that is safe to store as a file
/// in an attachment directory, keeping the name otherwise unchanged.
///
/// Directory components and control characters are removed. Returns "bilaga"
/// if nothing but dots and whitespace is left.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    let sanitized: String = base_name.chars().filter(|c| !c.is_control()).collect();

    if sanitized.chars().all(|c| c == '.' || c.is_whitespace()) {
        "bilaga".to_owned()
    } else {
        sanitized
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, 'å' | 'ä' | 'ö' | 'Å' | 'Ä' | 'Ö' | '-' | '.' | ',' | '?' | '!')
}
