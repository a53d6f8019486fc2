//! Profile name helpers.

/// Characters allowed in a profile identifier besides ASCII letters and digits.
const EXTRA_NAME_CHARS: &[char] = &['-', '_', '.', '(', ')', ' '];

/// Split `file_name` at its last `.`, returning the part before it.
///
/// A name without any `.` is returned whole.
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    }
}

/// Turn a free-form name into a profile identifier.
///
/// Drops every character outside `[A-Za-z0-9\-_.() ]`, replaces spaces with
/// underscores and lower-cases the result.
pub fn sanitize_profile_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || EXTRA_NAME_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c.to_ascii_lowercase() })
        .collect()
}
