//! SQL text for role administration
//!
//! Builders take identifiers that are already quoted (see
//! [`Connection::quote_identifier`](pgrole_core::Connection::quote_identifier))
//! and never embed values; values travel as bound parameters.

/// Look up a role by name and stored password digest (`$1` name, `$2` digest)
pub const CHECK_USER_QUERY: &str =
    "SELECT 1 FROM pg_catalog.pg_authid WHERE rolname = $1 AND rolpassword = $2";

/// Every role `$1` is a member of, directly or transitively, itself included
pub const ROLES_QUERY: &str = "SELECT rolname FROM pg_catalog.pg_authid \
     WHERE pg_has_role($1::name, oid, 'member') ORDER BY rolname";

/// Whether a role named `$1` exists
pub const ROLE_EXISTS_QUERY: &str = "SELECT 1 FROM pg_catalog.pg_roles WHERE rolname = $1";

/// Direct members of the role named `$1`
pub const ROLE_MEMBERS_QUERY: &str = "SELECT m.rolname FROM pg_catalog.pg_auth_members am \
     JOIN pg_catalog.pg_roles r ON r.oid = am.roleid \
     JOIN pg_catalog.pg_roles m ON m.oid = am.member \
     WHERE r.rolname = $1 ORDER BY m.rolname";

/// `RESET ROLE`
pub const RESET_ROLE: &str = "RESET ROLE";

/// Build a CREATE ROLE statement, with a `$1` password placeholder when
/// `with_password` is set.
///
/// # Examples
///
/// ```
/// use pgrole_admin::statements::build_create_role;
///
/// assert_eq!(build_create_role("\"a\"", false), "CREATE ROLE \"a\"");
/// assert_eq!(
///     build_create_role("\"a\"", true),
///     "CREATE ROLE \"a\" WITH ENCRYPTED PASSWORD $1"
/// );
/// ```
pub fn build_create_role(quoted_role: &str, with_password: bool) -> String {
    if with_password {
        format!("CREATE ROLE {} WITH ENCRYPTED PASSWORD $1", quoted_role)
    } else {
        format!("CREATE ROLE {}", quoted_role)
    }
}

/// Build a DROP ROLE statement
pub fn build_drop_role(quoted_role: &str) -> String {
    format!("DROP ROLE {}", quoted_role)
}

/// Build a statement making `quoted_member` a member of `quoted_group`
pub fn build_grant_role(quoted_group: &str, quoted_member: &str) -> String {
    format!("GRANT {} TO {}", quoted_group, quoted_member)
}

/// Build a statement removing `quoted_member` from `quoted_group`
pub fn build_revoke_role(quoted_group: &str, quoted_member: &str) -> String {
    format!("REVOKE {} FROM {}", quoted_group, quoted_member)
}

/// Build a SET ROLE statement
pub fn build_set_role(quoted_role: &str) -> String {
    format!("SET ROLE {}", quoted_role)
}

/// Build an ALTER ROLE statement replacing the password with `$1`
pub fn build_alter_role_password(quoted_role: &str) -> String {
    format!("ALTER ROLE {} WITH ENCRYPTED PASSWORD $1", quoted_role)
}

/// Build an ALTER ROLE statement renaming `quoted_role` to `quoted_new_name`
pub fn build_rename_role(quoted_role: &str, quoted_new_name: &str) -> String {
    format!("ALTER ROLE {} RENAME TO {}", quoted_role, quoted_new_name)
}
