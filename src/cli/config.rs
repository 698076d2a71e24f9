use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::{ApiClient, RetryPolicy};
use crate::types::Role;

/// What `feteer login` remembers between invocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub server_url: String,
    pub token: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub saved_at: DateTime<Utc>,
}

impl Session {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: None,
            username: None,
            role: None,
            saved_at: Utc::now(),
        }
    }

    pub fn signed_in(server_url: impl Into<String>, token: String, username: String, role: Role) -> Self {
        Self {
            token: Some(token),
            username: Some(username),
            role: Some(role),
            ..Self::new(server_url)
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FETEER_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("feteer").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn session_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("session.json"))
}

pub fn load_session() -> anyhow::Result<Option<Session>> {
    let path = session_file()?;
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)?;
    let session = serde_json::from_str(&content)
        .with_context(|| format!("corrupt session file {}", path.display()))?;
    Ok(Some(session))
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file()?, content)?;
    Ok(())
}

pub fn clear_session() -> anyhow::Result<bool> {
    let path = session_file()?;
    if path.exists() {
        fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// `--server`, then the saved session, then `SYNC_BASE_URL`/default
pub fn resolve_server(flag: Option<String>, session: Option<&Session>) -> String {
    flag.or_else(|| session.map(|s| s.server_url.clone()))
        .unwrap_or_else(|| crate::config::config().sync.base_url.clone())
}

/// API client for the resolved server, carrying the saved token when it belongs to that server
pub fn client(flag: Option<String>) -> anyhow::Result<ApiClient> {
    let session = load_session()?;
    let server = resolve_server(flag, session.as_ref());
    let policy = RetryPolicy::from_config(&crate::config::config().sync);
    let client = ApiClient::new(&server, policy).with_context(|| format!("invalid server URL '{}'", server))?;

    match session {
        Some(Session { server_url, token: Some(token), .. }) if server_url == server => Ok(client.with_token(token)),
        _ => Ok(client),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_server_flag_wins() {
        let session = Session::new("http://saved:3000");
        assert_eq!(
            resolve_server(Some("http://flag:4000".to_string()), Some(&session)),
            "http://flag:4000"
        );
        assert_eq!(resolve_server(None, Some(&session)), "http://saved:3000");
    }

    #[test]
    fn session_round_trips_through_json() {
        let session = Session::signed_in("http://localhost:3000", "tok".to_string(), "amira".to_string(), Role::Admin);
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
