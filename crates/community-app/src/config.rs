use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};

use community_client::{ApiClient, ClientError};
use community_types::models::UserId;
use community_view::Viewer;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_HISTORY_POLL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub history_poll: Duration,
    pub board_poll: Option<Duration>,
    pub user_id: Option<UserId>,
    pub user_email: String,
    pub session_cookie: Option<String>,
    pub ask_ai: bool,
    pub state_dir: PathBuf,
    pub snapshot_path: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            base_url: get("COMMUNITY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            history_poll: get("COMMUNITY_HISTORY_POLL_MS")
                .map(|v| millis("COMMUNITY_HISTORY_POLL_MS", &v))
                .transpose()?
                .unwrap_or(DEFAULT_HISTORY_POLL),
            board_poll: get("COMMUNITY_BOARD_POLL_MS")
                .map(|v| millis("COMMUNITY_BOARD_POLL_MS", &v))
                .transpose()?,
            user_id: get("COMMUNITY_USER_ID").map(UserId::new),
            user_email: get("COMMUNITY_USER_EMAIL").unwrap_or_else(|| "anonymous".to_string()),
            session_cookie: get("COMMUNITY_SESSION_COOKIE"),
            ask_ai: get("COMMUNITY_ASK_AI")
                .map(|v| flag("COMMUNITY_ASK_AI", &v))
                .transpose()?
                .unwrap_or(true),
            state_dir: get("COMMUNITY_STATE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".community")),
            snapshot_path: get("COMMUNITY_SNAPSHOT_PATH").map(PathBuf::from),
            timeout: get("COMMUNITY_TIMEOUT_SECS")
                .map(|v| number::<u64>("COMMUNITY_TIMEOUT_SECS", &v).map(Duration::from_secs))
                .transpose()?,
        })
    }

    pub fn api_client(&self) -> Result<ApiClient, ClientError> {
        let mut builder = ApiClient::builder(self.base_url.clone());
        if let Some(cookie) = &self.session_cookie {
            builder = builder.session_cookie(cookie.clone());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    pub fn viewer(&self) -> Viewer {
        Viewer::new(self.user_id.clone())
    }
}

fn number<T: FromStr>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'"))
}

fn millis(key: &str, raw: &str) -> anyhow::Result<Duration> {
    let ms: u64 = number(key, raw)?;
    if ms == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_millis(ms))
}

fn flag(key: &str, raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be true or false, got '{other}'"),
    }
}
