use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Scratch directory for uploaded credential files. Created on startup.
    pub upload_dir: PathBuf,
    pub debug: bool,
    /// Upper bound on the whole token exchange + bucket listing.
    pub probe_timeout: Duration,
    /// OAuth2 token endpoint. Key files may only name a `token_uri` on
    /// the same origin.
    pub token_endpoint: String,
    /// Base URL of the Cloud Storage JSON API.
    pub storage_endpoint: String,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
}

impl Config {
    /// Default `EnvFilter` directive when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "cloudscope=debug,tower_http=debug"
        } else {
            "cloudscope=info,tower_http=info"
        }
    }

    pub fn ensure_upload_dir(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.upload_dir).with_context(|| {
            format!(
                "failed to create upload directory {}",
                self.upload_dir.display()
            )
        })
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Builds a [`Config`] from an arbitrary key lookup so parsing can be
/// exercised without touching the process environment.
pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let env_mode = lookup("CLOUDSCOPE_ENV").unwrap_or_default();
    let mut debug = match lookup("CLOUDSCOPE_DEBUG") {
        Some(v) => parse_bool(&v).context("CLOUDSCOPE_DEBUG")?,
        None => false,
    };
    if debug && env_mode == "production" {
        eprintln!("⚠️  CLOUDSCOPE_DEBUG is ignored when CLOUDSCOPE_ENV=production");
        debug = false;
    }

    let token_endpoint =
        lookup("CLOUDSCOPE_TOKEN_ENDPOINT").unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.into());
    url::Url::parse(&token_endpoint)
        .with_context(|| format!("CLOUDSCOPE_TOKEN_ENDPOINT is not a valid URL: {token_endpoint}"))?;

    let storage_endpoint = lookup("CLOUDSCOPE_STORAGE_ENDPOINT")
        .unwrap_or_else(|| DEFAULT_STORAGE_ENDPOINT.into());
    url::Url::parse(&storage_endpoint)
        .with_context(|| format!("CLOUDSCOPE_STORAGE_ENDPOINT is not a valid URL: {storage_endpoint}"))?;

    let log_format = match lookup("CLOUDSCOPE_LOG_FORMAT").as_deref() {
        None | Some("pretty") => LogFormat::Pretty,
        Some("json") => LogFormat::Json,
        Some(other) => anyhow::bail!(
            "CLOUDSCOPE_LOG_FORMAT must be 'pretty' or 'json', got '{}'",
            other
        ),
    };

    Ok(Config {
        host: parse_or(&lookup, "CLOUDSCOPE_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
        port: parse_or(&lookup, "CLOUDSCOPE_PORT", 5000)?,
        upload_dir: lookup("CLOUDSCOPE_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("uploads")),
        debug,
        probe_timeout: Duration::from_secs(parse_or(
            &lookup,
            "CLOUDSCOPE_PROBE_TIMEOUT_SECS",
            30,
        )?),
        token_endpoint,
        storage_endpoint: storage_endpoint.trim_end_matches('/').to_string(),
        max_upload_bytes: parse_or(&lookup, "CLOUDSCOPE_MAX_UPLOAD_BYTES", 1024 * 1024)?,
        log_format,
    })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: '{raw}'")),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{}'", other),
    }
}
