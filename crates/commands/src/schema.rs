//! Keeping a copy of the oh-my-opencode JSON schema in the store's cache.
//!
//! A refresh tries the network first, keeps whatever is already cached when
//! the download fails, and only then falls back to the schema bundled with
//! this binary.

use anyhow::{Context, Result};
use omo_switch_store::{CacheSource, GlobalStore};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

pub const SCHEMA_FILE: &str = "oh-my-opencode.schema.json";
pub const DEFAULT_SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/code-yeongyu/oh-my-opencode/master/assets/oh-my-opencode.schema.json";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

pub(crate) const BUNDLED_SCHEMA: &str = include_str!("../assets/oh-my-opencode.schema.json");

/// Where the schema download goes and how long it may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFetch {
    pub url: String,
    pub timeout: Duration,
}

impl SchemaFetch {
    /// Reads `OMO_SWITCH_SCHEMA_URL` and `OMO_SWITCH_FETCH_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let url = std::env::var("OMO_SWITCH_SCHEMA_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEMA_URL.to_string());
        let timeout_ms = match std::env::var("OMO_SWITCH_FETCH_TIMEOUT_MS") {
            Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid OMO_SWITCH_FETCH_TIMEOUT_MS, using default");
                DEFAULT_FETCH_TIMEOUT_MS
            }),
            Err(_) => DEFAULT_FETCH_TIMEOUT_MS,
        };
        Self {
            url,
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

/// Which copy of the schema the cache holds after a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOrigin {
    Downloaded,
    Cached,
    Bundled,
}

impl fmt::Display for SchemaOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchemaOrigin::Downloaded => "downloaded",
            SchemaOrigin::Cached => "cached",
            SchemaOrigin::Bundled => "bundled",
        })
    }
}

async fn download_schema(fetch: &SchemaFetch) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(fetch.timeout)
        .build()
        .context("failed to build HTTP client")?;
    let response = client
        .get(&fetch.url)
        .header("User-Agent", concat!("omo-switch/", env!("CARGO_PKG_VERSION")))
        .send()
        .await
        .with_context(|| format!("request to {} failed", fetch.url))?;

    if !response.status().is_success() {
        anyhow::bail!("schema download failed: HTTP {}", response.status());
    }

    let body = response.bytes().await?.to_vec();
    serde_json::from_slice::<Value>(&body).context("downloaded schema is not valid JSON")?;
    Ok(body)
}

/// Refreshes `cache/schema/` in `store`: download, else keep the cached
/// copy, else write the bundled one.
pub async fn refresh_schema(store: &GlobalStore, fetch: &SchemaFetch) -> Result<SchemaOrigin> {
    let dir = store.cache_schema_dir().to_path_buf();
    match download_schema(fetch).await {
        Ok(body) => {
            let mut extra = Map::new();
            extra.insert("url".into(), Value::String(fetch.url.clone()));
            store.save_cache_file(&dir, SCHEMA_FILE, &body, CacheSource::Github, extra)?;
            tracing::debug!(url = %fetch.url, "schema downloaded");
            Ok(SchemaOrigin::Downloaded)
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "schema download failed");
            if dir.join(SCHEMA_FILE).is_file() {
                return Ok(SchemaOrigin::Cached);
            }
            store.save_cache_file(
                &dir,
                SCHEMA_FILE,
                BUNDLED_SCHEMA.as_bytes(),
                CacheSource::Bundled,
                Map::new(),
            )?;
            Ok(SchemaOrigin::Bundled)
        }
    }
}

/// Blocking wrapper used by the synchronous command handlers.
pub fn refresh_schema_blocking(store: &GlobalStore, fetch: &SchemaFetch) -> Result<SchemaOrigin> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    rt.block_on(refresh_schema(store, fetch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use omo_switch_test_utils::set_env_var;
    use serial_test::serial;

    #[test]
    fn bundled_schema_is_valid_json() {
        let value: Value = serde_json::from_str(BUNDLED_SCHEMA).unwrap();
        assert_eq!(value["type"], "object");
    }

    #[test]
    #[serial]
    fn given_no_overrides_when_reading_env_then_defaults() {
        let _url = set_env_var("OMO_SWITCH_SCHEMA_URL", None);
        let _timeout = set_env_var("OMO_SWITCH_FETCH_TIMEOUT_MS", None);
        let fetch = SchemaFetch::from_env();
        assert_eq!(fetch.url, DEFAULT_SCHEMA_URL);
        assert_eq!(fetch.timeout, Duration::from_millis(10_000));
    }

    #[test]
    #[serial]
    fn given_overrides_when_reading_env_then_they_apply() {
        let _url = set_env_var("OMO_SWITCH_SCHEMA_URL", Some("http://127.0.0.1:9/schema.json"));
        let _timeout = set_env_var("OMO_SWITCH_FETCH_TIMEOUT_MS", Some("250"));
        let fetch = SchemaFetch::from_env();
        assert_eq!(fetch.url, "http://127.0.0.1:9/schema.json");
        assert_eq!(fetch.timeout, Duration::from_millis(250));
    }

    #[test]
    #[serial]
    fn given_garbage_timeout_when_reading_env_then_default() {
        let _timeout = set_env_var("OMO_SWITCH_FETCH_TIMEOUT_MS", Some("soon"));
        assert_eq!(
            SchemaFetch::from_env().timeout,
            Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS)
        );
    }
}
