//! User management commands.

use anyhow::{bail, Result};
use shop_sdk::api::UserQuery;
use shop_sdk::commerce::UserId;

use super::{AdminArgs, AdminCommand};
use crate::context::Context;

const WIDTHS: [usize; 5] = [6, 20, 28, 8, 8];

pub async fn run(args: AdminArgs, ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    if !ctx.app.auth().is_admin() {
        bail!("Admin role required");
    }
    let admin = ctx.app.admin();

    match args.command {
        AdminCommand::Users {
            paging,
            username,
            email,
            role,
            enabled,
        } => {
            let mut query = UserQuery {
                username,
                email,
                role,
                enabled,
                page: paging.page.saturating_sub(1),
                ..Default::default()
            };
            if let Some(size) = paging.size {
                query.size = size;
            }
            let page = admin.list_users(&query).await?;
            if ctx.output.is_json() {
                ctx.output.json(&page);
                return Ok(());
            }

            ctx.output.header("Users");
            ctx.output
                .table_row(&["ID", "USERNAME", "EMAIL", "ROLE", "ENABLED"], &WIDTHS);
            for user in &page.content {
                ctx.output.table_row(
                    &[
                        &user.id.to_string(),
                        &user.username,
                        &user.email,
                        user.role.as_str(),
                        if user.enabled { "yes" } else { "no" },
                    ],
                    &WIDTHS,
                );
            }
            ctx.output.info(&format!(
                "Page {} of {} ({} users)",
                page.number + 1,
                page.total_pages.max(1),
                page.total_elements
            ));
        }
        AdminCommand::Stats => {
            let stats = admin.user_statistics().await?;
            if ctx.output.is_json() {
                ctx.output.json(&stats);
                return Ok(());
            }
            ctx.output.header("User statistics");
            ctx.output.kv("total", &stats.total_users.to_string());
            ctx.output.kv("enabled", &stats.enabled_users.to_string());
            ctx.output.kv("disabled", &stats.disabled_users.to_string());
            ctx.output.kv("users", &stats.user_count.to_string());
            ctx.output.kv("sellers", &stats.shoper_count.to_string());
            ctx.output.kv("admins", &stats.admin_count.to_string());
        }
        AdminCommand::Toggle { id } => {
            admin.toggle_user_enabled(UserId::new(id)).await?;
            ctx.output.success(&format!("Toggled user {}", id));
        }
        AdminCommand::Role { id, role } => {
            admin.update_user_role(UserId::new(id), role).await?;
            ctx.output
                .success(&format!("User {} is now {}", id, role.as_str()));
        }
    }
    Ok(())
}
