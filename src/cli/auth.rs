//! CLI auth command handlers for login, register, logout, status and whoami.

use crate::error::{FitplanError, Result};
use crate::session::SessionManager;

use super::{require_session, LoginArgs, RegisterArgs};

/// Handle `fitplan auth login <username>`.
pub async fn handle_login(session: &SessionManager, args: LoginArgs) -> Result<()> {
    let password = resolve_password(args.password)?;
    let claims = session.login(&args.username, &password).await?;
    let name = claims
        .map(|c| c.display_name())
        .unwrap_or_else(|| args.username.clone());
    println!("✅ Logged in as {name}");
    Ok(())
}

/// Handle `fitplan auth register <username> --email <email>`.
pub async fn handle_register(session: &SessionManager, args: RegisterArgs) -> Result<()> {
    let password = resolve_password(args.password)?;
    let user = session
        .register(&args.username, &password, &args.email)
        .await?;
    println!("✅ Account {} created", user.username);
    println!("   Run `fitplan auth login {}` to start a session.", user.username);
    Ok(())
}

/// Handle `fitplan auth logout`.
pub fn handle_logout(session: &SessionManager) -> Result<()> {
    session.logout();
    println!("✅ Logged out");
    Ok(())
}

/// Handle `fitplan auth status`. Reads the stored token only.
pub fn handle_status(session: &SessionManager) -> Result<()> {
    println!("🔐 Authentication Status\n");
    println!("  API: {}", session.base_url());

    let credentials = session.store().load();
    match (credentials.access_token.as_deref(), session.session()) {
        (None, _) => println!("  Session: ❌ Not logged in"),
        (Some(_), None) => println!("  Session: ⚠️  Token stored but unreadable"),
        (Some(_), Some(claims)) => {
            let status = match claims.expires_at() {
                Some(at) if claims.is_expired() => {
                    format!("⚠️  Access token expired {} (will refresh)", at.format("%Y-%m-%d %H:%M"))
                }
                Some(at) => format!("✅ Logged in (expires {})", at.format("%Y-%m-%d %H:%M")),
                None => "✅ Logged in".to_string(),
            };
            println!("  User: {}", claims.display_name());
            println!("  Session: {status}");
        }
    }
    let refresh = if credentials.refresh_token.is_some() {
        "✅ Stored"
    } else {
        "❌ Missing"
    };
    println!("  Refresh token: {refresh}");
    Ok(())
}

/// Handle `fitplan auth whoami`. Goes to the server, refreshing if needed.
pub async fn handle_whoami(session: &SessionManager) -> Result<()> {
    require_session(session)?;
    let user = session.current_user().await?;
    println!("{} (id {})", user.username, user.id);
    if !user.email.is_empty() {
        println!("{}", user.email);
    }
    Ok(())
}

fn resolve_password(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| FitplanError::InvalidArgument(format!("could not read password: {e}"))),
    }
}
