//! Reserved names and wildcard handling.

/// Suffix that turns a name into a prefix wildcard.
pub const WILDCARD_SUFFIX: char = '*';

/// Name that can never be deactivated.
pub const PROTECTED_NAME: &str = "root";

/// Returns the prefix if `name` is a wildcard pattern.
pub fn wildcard_prefix(name: &str) -> Option<&str> {
    name.strip_suffix(WILDCARD_SUFFIX)
}

pub fn is_protected(name: &str) -> bool {
    name == PROTECTED_NAME
}
