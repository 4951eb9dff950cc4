//! Name sanitization
//!
//! Normalizes a single path segment into a safe filesystem name.

/// Placeholder substituted for every disallowed character
pub const REPLACEMENT: char = '_';

/// Returns true if `c` may appear in a stored file or folder name.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Sanitize a single file or folder name, or one segment of a relative path.
///
/// Every character outside `[A-Za-z0-9._-]` is replaced with `_`, one for
/// one, so the output has as many characters as the input. A name made only
/// of dots (`.`, `..`, `...`) has every dot replaced as well, so the result
/// can never name the current or parent directory.
///
/// Does not touch the filesystem. Empty input yields an empty string; the
/// caller decides whether that is acceptable.
pub fn sanitize_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c == '.') {
        return name.chars().map(|_| REPLACEMENT).collect();
    }
    name.chars()
        .map(|c| if is_allowed_char(c) { c } else { REPLACEMENT })
        .collect()
}
