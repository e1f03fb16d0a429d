//! Session commands.

use anyhow::{Context as _, Result};
use dialoguer::{Input, Password};

use super::{LoginArgs, RegisterArgs};
use crate::context::Context;

pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let username = match args.username {
        Some(username) => username,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let spinner = ctx.output.spinner("Logging in...");
    let result = ctx.app.login(&username, &password).await;
    spinner.finish_and_clear();
    let user = result.context("Login failed")?;

    if ctx.output.is_json() {
        ctx.output.json(&user);
    } else {
        ctx.output.kv("role", user.role.as_str());
    }
    Ok(())
}

pub async fn register(args: RegisterArgs, ctx: &Context) -> Result<()> {
    let username = match args.username {
        Some(username) => username,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };
    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;
    let confirm = Password::new().with_prompt("Confirm password").interact()?;

    let user = ctx
        .app
        .register(&username, &email, &password, &confirm)
        .await
        .context("Registration failed")?;

    if ctx.output.is_json() {
        ctx.output.json(&user);
    } else {
        ctx.output.info("Run `shop login` to start a session.");
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    if !ctx.app.auth().is_logged_in() {
        ctx.output.info("Not logged in.");
        return Ok(());
    }
    let username = ctx.app.auth().username();
    ctx.app.logout().await.context("Failed to clear the session")?;
    ctx.output.success(&format!("Logged out {}", username));
    Ok(())
}

/// Show the saved session, refreshed from the server when possible.
pub async fn whoami(ctx: &Context) -> Result<()> {
    ctx.require_login()?;
    let user = match ctx.app.refresh_user().await {
        Ok(user) => user,
        Err(e) if e.is_auth_failure() => return Err(e).context("Session rejected"),
        Err(e) => {
            ctx.output.warn(&format!("Showing saved profile: {}", e));
            ctx.app
                .auth()
                .user()
                .context("Session has no saved profile")?
        }
    };

    if ctx.output.is_json() {
        ctx.output.json(&user);
        return Ok(());
    }

    ctx.output.header(&user.username);
    ctx.output.kv("id", &user.id.to_string());
    ctx.output.kv("email", &user.email);
    ctx.output.kv("role", user.role.as_str());
    if let Some(exp) = ctx
        .app
        .auth()
        .token()
        .and_then(|t| shop_sdk::auth::jwt_expiration(&t))
    {
        ctx.output.kv("session expires", &exp.to_rfc3339());
    }
    Ok(())
}
