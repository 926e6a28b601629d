//! Role administration against a live connection
//!
//! `RoleAdmin` owns a [`ConnectionProvider`] and asks it for a connection the
//! first time an operation needs the database. The connection is then reused
//! for the lifetime of the `RoleAdmin`; nothing about roles is cached.
//!
//! Required arguments must be non-empty. An empty argument makes the
//! operation return `Ok(false)` (or an empty list) without resolving the
//! connection or issuing SQL. A name the connection cannot quote is treated
//! the same way, except that the connection has been resolved by then.

use once_cell::sync::OnceCell;
use pgrole_core::{Connection, ConnectionProvider, Result, Value};
use std::fmt;
use std::sync::Arc;

use super::statements::{
    CHECK_USER_QUERY, RESET_ROLE, ROLE_EXISTS_QUERY, ROLE_MEMBERS_QUERY, ROLES_QUERY,
    build_alter_role_password, build_create_role, build_drop_role, build_grant_role,
    build_rename_role, build_revoke_role, build_set_role,
};
use crate::credential::md5_password;

/// Creates, drops, and links database roles, and inspects role membership.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pgrole_admin::RoleAdmin;
/// use pgrole_core::{Connection, PgRoleError, Result};
///
/// let admin = RoleAdmin::new(|| -> Result<Arc<dyn Connection>> {
///     Err(PgRoleError::Connection("offline".into()))
/// });
///
/// // Empty names never reach the provider.
/// assert!(!admin.create("", None).unwrap());
/// assert!(admin.roles("").unwrap().is_empty());
///
/// // Anything else surfaces the provider's error.
/// assert!(admin.create("reporting", None).is_err());
/// ```
pub struct RoleAdmin {
    provider: Box<dyn ConnectionProvider>,
    connection: OnceCell<Arc<dyn Connection>>,
}

impl fmt::Debug for RoleAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleAdmin")
            .field("connected", &self.connection.get().is_some())
            .finish_non_exhaustive()
    }
}

impl RoleAdmin {
    /// Create a role administrator that connects lazily through `provider`
    pub fn new(provider: impl ConnectionProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            connection: OnceCell::new(),
        }
    }

    /// Create a role administrator over an already-open connection
    pub fn from_connection(connection: Arc<dyn Connection>) -> Self {
        let handle = Arc::clone(&connection);
        let provider = move || -> Result<Arc<dyn Connection>> { Ok(Arc::clone(&handle)) };
        Self {
            provider: Box::new(provider),
            connection: OnceCell::with_value(connection),
        }
    }

    /// The connection operations run on, resolving it on first use.
    ///
    /// A failed resolution is not memoized; the next call asks the provider
    /// again.
    pub fn connection(&self) -> Result<&Arc<dyn Connection>> {
        self.connection.get_or_try_init(|| {
            tracing::debug!("resolving connection for role administration");
            self.provider.connection()
        })
    }

    /// Create `role`, optionally with a password.
    ///
    /// The password is bound as a parameter and stored encrypted by the
    /// server. `Some("")` is treated like `None`.
    #[tracing::instrument(skip(self, password), fields(with_password = password.is_some_and(|p| !p.is_empty())))]
    pub fn create(&self, role: &str, password: Option<&str>) -> Result<bool> {
        if role.is_empty() {
            return Ok(skipped("create"));
        }
        let conn = self.connection()?;
        let Some(quoted) = quote(conn, role, "create") else {
            return Ok(false);
        };

        match password.filter(|p| !p.is_empty()) {
            Some(password) => {
                conn.execute(&build_create_role(&quoted, true), &[Value::from(password)])?
            }
            None => conn.execute(&build_create_role(&quoted, false), &[])?,
        };

        tracing::debug!("role created");
        Ok(true)
    }

    /// Drop `role`. Dependent objects are not dropped; the server refuses
    /// when the role still owns anything.
    #[tracing::instrument(skip(self))]
    pub fn drop_role(&self, role: &str) -> Result<bool> {
        if role.is_empty() {
            return Ok(skipped("drop"));
        }
        let conn = self.connection()?;
        let Some(quoted) = quote(conn, role, "drop") else {
            return Ok(false);
        };

        conn.execute(&build_drop_role(&quoted), &[])?;
        tracing::debug!("role dropped");
        Ok(true)
    }

    /// Make `member` a member of `group`
    #[tracing::instrument(skip(self))]
    pub fn add(&self, group: &str, member: &str) -> Result<bool> {
        if group.is_empty() || member.is_empty() {
            return Ok(skipped("add"));
        }
        let conn = self.connection()?;
        let (Some(group), Some(member)) = (quote(conn, group, "add"), quote(conn, member, "add"))
        else {
            return Ok(false);
        };

        conn.execute(&build_grant_role(&group, &member), &[])?;
        Ok(true)
    }

    /// Remove `member` from `group`
    #[tracing::instrument(skip(self))]
    pub fn remove(&self, group: &str, member: &str) -> Result<bool> {
        if group.is_empty() || member.is_empty() {
            return Ok(skipped("remove"));
        }
        let conn = self.connection()?;
        let (Some(group), Some(member)) =
            (quote(conn, group, "remove"), quote(conn, member, "remove"))
        else {
            return Ok(false);
        };

        conn.execute(&build_revoke_role(&group, &member), &[])?;
        Ok(true)
    }

    /// Check `password` against the md5 digest the server stores for `user`.
    ///
    /// This is the legacy md5 scheme (see [`md5_password`]). It only matches
    /// roles whose password was stored while `password_encryption` was `md5`;
    /// SCRAM-SHA-256 credentials never match. Do not rely on it for
    /// authentication.
    #[tracing::instrument(skip(self, password))]
    pub fn check_user(&self, user: &str, password: &str) -> Result<bool> {
        if user.is_empty() || password.is_empty() {
            return Ok(skipped("check_user"));
        }
        let conn = self.connection()?;
        if !nameable(conn, user, "check_user") {
            return Ok(false);
        }
        let digest = md5_password(user, password);

        let result = conn.query(CHECK_USER_QUERY, &[Value::from(user), Value::from(digest)])?;
        Ok(result.has_rows())
    }

    /// Every role `user` belongs to, directly or through other roles.
    ///
    /// Sorted by name without duplicates, and including `user` itself.
    #[tracing::instrument(skip(self))]
    pub fn roles(&self, user: &str) -> Result<Vec<String>> {
        if user.is_empty() {
            skipped("roles");
            return Ok(Vec::new());
        }
        let conn = self.connection()?;
        if !nameable(conn, user, "roles") {
            return Ok(Vec::new());
        }

        let mut roles = conn.query(ROLES_QUERY, &[Value::from(user)])?.first_column_strings();
        roles.sort();
        roles.dedup();

        tracing::debug!(count = roles.len(), "resolved role membership");
        Ok(roles)
    }

    /// Whether `user` belongs to `group`, directly or transitively
    #[tracing::instrument(skip(self))]
    pub fn member_of(&self, user: &str, group: &str) -> Result<bool> {
        if user.is_empty() || group.is_empty() {
            return Ok(skipped("member_of"));
        }
        Ok(self.roles(user)?.iter().any(|role| role == group))
    }

    /// Switch the session's current role to `role` until [`reset`](Self::reset)
    #[tracing::instrument(skip(self))]
    pub fn set(&self, role: &str) -> Result<bool> {
        if role.is_empty() {
            return Ok(skipped("set"));
        }
        let conn = self.connection()?;
        let Some(quoted) = quote(conn, role, "set") else {
            return Ok(false);
        };

        conn.execute(&build_set_role(&quoted), &[])?;
        Ok(true)
    }

    /// Return the session to the role it logged in as
    #[tracing::instrument(skip(self))]
    pub fn reset(&self) -> Result<bool> {
        self.connection()?.execute(RESET_ROLE, &[])?;
        Ok(true)
    }

    /// Whether a role named `role` exists
    #[tracing::instrument(skip(self))]
    pub fn exists(&self, role: &str) -> Result<bool> {
        if role.is_empty() {
            return Ok(skipped("exists"));
        }
        let conn = self.connection()?;
        if !nameable(conn, role, "exists") {
            return Ok(false);
        }
        Ok(conn.query(ROLE_EXISTS_QUERY, &[Value::from(role)])?.has_rows())
    }

    /// Direct members of `group`, sorted by name
    #[tracing::instrument(skip(self))]
    pub fn members(&self, group: &str) -> Result<Vec<String>> {
        if group.is_empty() {
            skipped("members");
            return Ok(Vec::new());
        }
        let conn = self.connection()?;
        if !nameable(conn, group, "members") {
            return Ok(Vec::new());
        }
        let mut members = conn
            .query(ROLE_MEMBERS_QUERY, &[Value::from(group)])?
            .first_column_strings();
        members.sort();
        members.dedup();
        Ok(members)
    }

    /// Replace the password of `role`
    #[tracing::instrument(skip(self, password))]
    pub fn set_password(&self, role: &str, password: &str) -> Result<bool> {
        if role.is_empty() || password.is_empty() {
            return Ok(skipped("set_password"));
        }
        let conn = self.connection()?;
        let Some(quoted) = quote(conn, role, "set_password") else {
            return Ok(false);
        };

        conn.execute(&build_alter_role_password(&quoted), &[Value::from(password)])?;
        Ok(true)
    }

    /// Rename `role` to `new_name`. Memberships follow the role.
    #[tracing::instrument(skip(self))]
    pub fn rename(&self, role: &str, new_name: &str) -> Result<bool> {
        if role.is_empty() || new_name.is_empty() {
            return Ok(skipped("rename"));
        }
        let conn = self.connection()?;
        let (Some(role), Some(new_name)) =
            (quote(conn, role, "rename"), quote(conn, new_name, "rename"))
        else {
            return Ok(false);
        };

        conn.execute(&build_rename_role(&role, &new_name), &[])?;
        Ok(true)
    }
}

fn skipped(operation: &'static str) -> bool {
    tracing::debug!(operation, "required argument missing, skipping");
    false
}

fn quote(conn: &Arc<dyn Connection>, name: &str, operation: &'static str) -> Option<String> {
    let quoted = conn.quote_identifier(name);
    if quoted.is_none() {
        tracing::debug!(operation, name = ?name, "name cannot be quoted, skipping");
    }
    quoted
}

/// Whether a name that travels as a bound value is a valid identifier
fn nameable(conn: &Arc<dyn Connection>, name: &str, operation: &'static str) -> bool {
    quote(conn, name, operation).is_some()
}
