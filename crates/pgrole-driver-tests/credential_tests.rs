//! Legacy md5 credential checks against stored role passwords.

use crate::fixtures::{RoleTestContext, ctx};
use anyhow::Result;
use pgrole_admin::credential::is_md5_digest;
use pgrole_admin::md5_password;
use pgrole_core::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn stored_password(ctx: &RoleTestContext, role: &str) -> Result<Option<String>> {
    let result = ctx.conn.query(
        "SELECT rolpassword FROM pg_catalog.pg_authid WHERE rolname = $1",
        &[Value::from(role)],
    )?;
    Ok(result.first_column_strings().into_iter().next())
}

#[rstest]
fn test_password_is_stored_as_md5_digest(ctx: RoleTestContext) -> Result<()> {
    let role = ctx.role("digest");
    ctx.admin.create(&role, Some("secure!"))?;

    let stored = stored_password(&ctx, &role)?;
    assert_eq!(stored.as_deref(), Some(md5_password(&role, "secure!").as_str()));
    assert!(stored.as_deref().is_some_and(is_md5_digest));
    Ok(())
}

#[rstest]
fn test_check_user(ctx: RoleTestContext) -> Result<()> {
    let role = ctx.role("login");
    ctx.admin.create(&role, Some("secure!"))?;

    assert!(ctx.admin.check_user(&role, "secure!")?);
    assert!(!ctx.admin.check_user(&role, "insecure!")?);
    assert!(!ctx.admin.check_user(&role, "Secure!")?);
    Ok(())
}

#[rstest]
fn test_check_user_without_password(ctx: RoleTestContext) -> Result<()> {
    let role = ctx.role("nopw");
    ctx.admin.create(&role, Some(""))?;

    assert_eq!(stored_password(&ctx, &role)?, None);
    assert!(!ctx.admin.check_user(&role, "anything")?);
    Ok(())
}

#[rstest]
fn test_check_unknown_user(ctx: RoleTestContext) -> Result<()> {
    assert!(!ctx.admin.check_user(&ctx.role("ghost"), "secure!")?);
    Ok(())
}

#[rstest]
#[case::quote("it's")]
#[case::backslash("C:\\path\\")]
#[case::injection("x'; DROP ROLE postgres; --")]
#[case::dollar("$1 $$ $2")]
#[case::unicode("pässwörd")]
fn test_special_character_passwords(ctx: RoleTestContext, #[case] password: &str) -> Result<()> {
    let role = ctx.role("special");
    ctx.admin.create(&role, Some(password))?;

    assert!(ctx.admin.check_user(&role, password)?);
    assert!(ctx.admin.exists("postgres")?);
    Ok(())
}

#[rstest]
fn test_set_password(ctx: RoleTestContext) -> Result<()> {
    let role = ctx.role("rotate");
    ctx.admin.create(&role, Some("old-password"))?;

    assert!(ctx.admin.set_password(&role, "new-password")?);
    assert!(ctx.admin.check_user(&role, "new-password")?);
    assert!(!ctx.admin.check_user(&role, "old-password")?);
    Ok(())
}
