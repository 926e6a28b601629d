//! Role membership tests: grant, revoke, and the transitive closure
//! reported by `roles` and `member_of`.

use crate::fixtures::{RoleTestContext, ctx};
use anyhow::Result;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn create_all(ctx: &RoleTestContext, roles: &[&String]) -> Result<()> {
    for role in roles {
        ctx.admin.create(role, None)?;
    }
    Ok(())
}

#[rstest]
fn test_roles_includes_self(ctx: RoleTestContext) -> Result<()> {
    let user = ctx.role("loner");
    ctx.admin.create(&user, None)?;

    assert_eq!(ctx.admin.roles(&user)?, vec![user.clone()]);
    assert!(ctx.admin.member_of(&user, &user)?);
    Ok(())
}

#[rstest]
fn test_direct_membership(ctx: RoleTestContext) -> Result<()> {
    let (member, group) = (ctx.role("m"), ctx.role("g"));
    create_all(&ctx, &[&member, &group])?;

    assert!(!ctx.admin.member_of(&member, &group)?);
    assert!(ctx.admin.add(&group, &member)?);
    assert!(ctx.admin.member_of(&member, &group)?);
    assert!(ctx.admin.roles(&member)?.contains(&group));
    assert_eq!(ctx.admin.members(&group)?, vec![member.clone()]);
    Ok(())
}

#[rstest]
fn test_transitive_membership(ctx: RoleTestContext) -> Result<()> {
    let (a, b, c) = (ctx.role("a"), ctx.role("b"), ctx.role("c"));
    create_all(&ctx, &[&a, &b, &c])?;

    ctx.admin.add(&b, &a)?;
    ctx.admin.add(&c, &b)?;

    assert_eq!(ctx.admin.roles(&a)?, vec![a.clone(), b.clone(), c.clone()]);
    assert!(ctx.admin.member_of(&a, &c)?);
    // members() reports direct members only
    assert_eq!(ctx.admin.members(&c)?, vec![b.clone()]);
    Ok(())
}

#[rstest]
fn test_diamond_membership_is_deduplicated(ctx: RoleTestContext) -> Result<()> {
    let (user, left, right, top) = (
        ctx.role("a_user"),
        ctx.role("b_left"),
        ctx.role("c_right"),
        ctx.role("d_top"),
    );
    create_all(&ctx, &[&user, &left, &right, &top])?;

    ctx.admin.add(&left, &user)?;
    ctx.admin.add(&right, &user)?;
    ctx.admin.add(&top, &left)?;
    ctx.admin.add(&top, &right)?;

    assert_eq!(
        ctx.admin.roles(&user)?,
        vec![user.clone(), left.clone(), right.clone(), top.clone()]
    );
    Ok(())
}

#[rstest]
fn test_remove_membership(ctx: RoleTestContext) -> Result<()> {
    let (member, group) = (ctx.role("m"), ctx.role("g"));
    create_all(&ctx, &[&member, &group])?;
    ctx.admin.add(&group, &member)?;

    assert!(ctx.admin.remove(&group, &member)?);
    assert!(!ctx.admin.member_of(&member, &group)?);
    assert!(ctx.admin.members(&group)?.is_empty());
    Ok(())
}

#[rstest]
fn test_other_members_unaffected_by_drop(ctx: RoleTestContext) -> Result<()> {
    let (a, b, g) = (ctx.role("a"), ctx.role("b"), ctx.role("g"));
    create_all(&ctx, &[&a, &b, &g])?;
    ctx.admin.add(&g, &a)?;
    ctx.admin.add(&g, &b)?;

    ctx.admin.drop_role(&b)?;

    assert_eq!(ctx.admin.members(&g)?, vec![a.clone()]);
    assert!(ctx.admin.member_of(&a, &g)?);
    Ok(())
}

#[rstest]
fn test_membership_of_unknown_role_is_an_error(ctx: RoleTestContext) -> Result<()> {
    let ghost = ctx.role("ghost");
    assert!(ctx.admin.roles(&ghost).is_err());
    assert!(ctx.admin.members(&ghost)?.is_empty());
    Ok(())
}
