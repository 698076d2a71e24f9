use serde_json::json;

use crate::cli::config::{self, Session};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::sync::{ApiClient, RetryPolicy};

pub async fn login(server: Option<String>, username: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let saved = config::load_session()?;
    let server = config::resolve_server(server, saved.as_ref());
    let policy = RetryPolicy::from_config(&crate::config::config().sync);
    let mut client = ApiClient::new(&server, policy)?;

    let login = client.login(username, password).await?;
    config::save_session(&Session::signed_in(
        &server,
        login.token,
        login.user.username.clone(),
        login.user.role,
    ))?;

    output_success(
        output_format,
        &format!("Signed in to {} as {} ({})", server, login.user.username, login.user.role),
        Some(json!({ "server": server, "username": login.user.username, "role": login.user.role })),
    )
}

pub async fn logout(output_format: OutputFormat) -> anyhow::Result<()> {
    if let Some(session) = config::load_session()? {
        if let Some(token) = session.token.clone() {
            let policy = RetryPolicy::from_config(&crate::config::config().sync);
            let client = ApiClient::new(&session.server_url, policy)?.with_token(token);
            // Signing out locally still works when the server is unreachable
            if let Err(e) = client.logout().await {
                tracing::warn!("Server logout failed: {}", e);
            }
        }
    }

    let message = if config::clear_session()? {
        "Signed out"
    } else {
        "No saved session"
    };
    output_success(output_format, message, None)
}

pub async fn whoami(server: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = config::client(server)?;
    let user = client.me().await?;

    output_success(
        output_format,
        &format!("{} ({}) on {}", user.username, user.role, client.base_url()),
        Some(json!({ "id": user.id, "username": user.username, "role": user.role })),
    )
}
