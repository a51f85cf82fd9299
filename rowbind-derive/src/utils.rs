//! Utility functions for code generation

/// Convert a field name to an associated const name: `last_login` and
/// `lastLogin` both become `LAST_LOGIN`.
pub fn upper_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut previous_lower = false;
    for c in s.chars() {
        if c.is_uppercase() && previous_lower {
            result.push('_');
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        result.extend(c.to_uppercase());
    }
    result
}
