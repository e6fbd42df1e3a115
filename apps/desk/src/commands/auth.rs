//! Login, logout and session status.

use tracing::info;

use crate::error::DeskResult;
use crate::state::AppState;

fn forget_local_state(app: &AppState) -> DeskResult<()> {
    app.drop_pending();
    app.desk.with_desk_mut(|desk| {
        desk.reset();
        Ok::<_, tillpoint_core::FlowError>(())
    })?;
    app.transfers.clear()?;
    app.stock.clear()
}

/// `login <user> <password>`
///
/// Anything left over from a previous cashier is dropped.
pub async fn login(app: &AppState, username: &str, password: &str) -> DeskResult<String> {
    let branch = app.client.login(username, password).await?;
    forget_local_state(app)?;
    info!(username, branch = ?branch, "Cashier logged in");
    Ok(match branch {
        Some(branch) => format!("Logged in as {username} at {branch}"),
        None => format!("Logged in as {username}"),
    })
}

/// `logout`: local only. The stored tokens are deleted.
pub async fn logout(app: &AppState) -> DeskResult<String> {
    app.client.logout().await?;
    forget_local_state(app)?;
    Ok("Logged out".to_string())
}

/// `status`
pub async fn status(app: &AppState) -> DeskResult<String> {
    let session = app.client.session().snapshot().await;
    let who = if session.access_token.is_some() {
        format!(
            "logged in, branch {}",
            session.branch.as_deref().unwrap_or("unknown")
        )
    } else {
        "logged out".to_string()
    };
    let (step, last_query) = app.desk.with_desk(|desk| {
        (
            desk.step().name(),
            desk.last_query().map(|q| format!(" | last search \"{q}\"")),
        )
    })?;
    let transfer = if app.transfers.draft()?.is_some() {
        ", transfer draft open"
    } else {
        ""
    };
    Ok(format!(
        "{who} | backend {} | step {step}{transfer}{}",
        app.client.base_url(),
        last_query.unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{at_item, offline_app};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_blank_credentials_never_sent() {
        let app = offline_app();
        let err = login(&app, "  ", "secret").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_logout_drops_workflow() {
        let app = offline_app();
        at_item(&app);
        logout(&app).await.unwrap();
        let text = status(&app).await.unwrap();
        assert!(text.starts_with("logged out"));
        assert!(text.contains("step searching for a bill"));
        assert!(!text.contains("last search"));
    }

    #[tokio::test]
    async fn test_status_names_last_search() {
        let app = offline_app();
        at_item(&app);
        let text = status(&app).await.unwrap();
        assert!(text.ends_with("| last search \"INV-7\""), "{text}");
    }
}
