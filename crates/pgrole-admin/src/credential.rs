//! Legacy MD5 password digests
//!
//! PostgreSQL's `md5` password storage keeps `"md5"` followed by the hex MD5 of
//! the password concatenated with the role name. MD5 is broken as a password
//! hash; this exists so `RoleAdmin::check_user` can compare against servers
//! that still store md5 digests. Roles stored as SCRAM-SHA-256 never match.

/// Prefix the server puts in front of md5 digests in `pg_authid.rolpassword`
pub const MD5_PREFIX: &str = "md5";

/// Compute the stored form of `password` for `user`.
///
/// # Examples
///
/// ```
/// use pgrole_admin::md5_password;
///
/// let digest = md5_password("alice", "swordfish");
/// assert_eq!(digest, "md5259847566da0877a0984a5a612510f79");
/// ```
pub fn md5_password(user: &str, password: &str) -> String {
    let mut input = Vec::with_capacity(password.len() + user.len());
    input.extend_from_slice(password.as_bytes());
    input.extend_from_slice(user.as_bytes());
    format!("{}{:x}", MD5_PREFIX, md5::compute(&input))
}

/// Whether a stored `rolpassword` value is an md5 digest
pub fn is_md5_digest(stored: &str) -> bool {
    stored
        .strip_prefix(MD5_PREFIX)
        .is_some_and(|hex| hex.len() == 32 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests;
