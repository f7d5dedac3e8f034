use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_DB_PATH: &str = "emails.db";
pub const DEFAULT_LOG_PATH: &str = "email_processor.log";

/// Connection settings for one mailbox.
#[derive(Clone)]
pub struct Config {
    pub imap_host: String,
    pub imap_port: u16,
    pub username: String,
    pub password: String,
}

// Keep the secret out of log lines.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("imap_host", &self.imap_host)
            .field("imap_port", &self.imap_port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading values through `lookup` instead of the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let imap_host = require(&lookup, "IMAP_HOST")?;
        let username = require(&lookup, "EMAIL_USERNAME")?;
        let password = require(&lookup, "EMAIL_PASSWORD")?;

        let port = get_with(&lookup, "IMAP_PORT", None, false)?;
        let imap_port = match port {
            Some(p) => p.trim().parse::<u16>().map_err(|e| Error::Configuration {
                name: "IMAP_PORT".to_string(),
                reason: format!("not a valid port ({e})"),
            })?,
            None => DEFAULT_IMAP_PORT,
        };

        Ok(Self {
            imap_host,
            imap_port,
            username,
            password,
        })
    }
}

/// Read `name` from the environment.
///
/// Falls back to `default` when unset. Fails with `Error::Configuration`
/// when the value is unset, has no default and `required` is true.
pub fn get(name: &str, default: Option<&str>, required: bool) -> Result<Option<String>> {
    get_with(&|n: &str| std::env::var(n).ok(), name, default, required)
}

fn get_with<F>(
    lookup: &F,
    name: &str,
    default: Option<&str>,
    required: bool,
) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).or_else(|| default.map(str::to_string)) {
        Some(v) => Ok(Some(v)),
        None if required => Err(Error::missing(name)),
        None => Ok(None),
    }
}

fn require<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    get_with(lookup, name, None, true)?.ok_or_else(|| Error::missing(name))
}

pub fn db_path() -> Result<PathBuf> {
    path_setting("MAIL_INGEST_DB", DEFAULT_DB_PATH)
}

pub fn log_path() -> Result<PathBuf> {
    path_setting("MAIL_INGEST_LOG", DEFAULT_LOG_PATH)
}

fn path_setting(name: &str, default: &str) -> Result<PathBuf> {
    let p = get(name, Some(default), false)?.unwrap_or_else(|| default.to_string());
    Ok(PathBuf::from(p))
}
