//! Identifier and literal quoting for PostgreSQL-compatible servers
//!
//! Role names are not restricted in character set, so every identifier that
//! ends up in SQL text goes through [`quote_identifier`]. Values never do;
//! they travel as bound parameters. [`quote_literal`] exists for drivers that
//! must inline a bound value because the server cannot bind parameters for
//! the statement at hand.

/// Longest identifier the server keeps, in bytes (`NAMEDATALEN - 1`)
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Quote an identifier with double quotes, doubling embedded quotes.
///
/// Always quotes, so the name is matched case-sensitively and reserved words
/// are safe. Returns `None` for an empty name, one containing NUL, or one
/// longer than [`MAX_IDENTIFIER_LEN`] bytes. The server would truncate the
/// last kind silently and act on a different role.
///
/// # Examples
///
/// ```
/// use pgrole_core::quote_identifier;
///
/// assert_eq!(quote_identifier("read_only").as_deref(), Some("\"read_only\""));
/// assert_eq!(quote_identifier("a\"b").as_deref(), Some("\"a\"\"b\""));
/// assert_eq!(quote_identifier(""), None);
/// assert_eq!(quote_identifier(&"x".repeat(64)), None);
/// ```
pub fn quote_identifier(name: &str) -> Option<String> {
    if name.is_empty() || name.len() > MAX_IDENTIFIER_LEN || name.contains('\0') {
        return None;
    }
    Some(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quote a string as an escape-string literal (`E'...'`).
///
/// Backslashes and single quotes are doubled, which keeps the literal intact
/// whatever `standard_conforming_strings` is set to. Returns `None` when the
/// value contains NUL.
pub fn quote_literal(value: &str) -> Option<String> {
    if value.contains('\0') {
        return None;
    }
    let mut quoted = String::with_capacity(value.len() + 3);
    quoted.push_str("E'");
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    Some(quoted)
}
