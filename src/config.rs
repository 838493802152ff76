// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/watch.toml";

pub const ENV_CONFIG_PATH: &str = "EDGAR_WATCH_CONFIG";
pub const ENV_USER_AGENT: &str = "EDGAR_USER_AGENT";
pub const ENV_WEBHOOK_URL: &str = "DISCLOSURE_WEBHOOK_URL";

/// Browser-like agent; EDGAR rejects anonymous clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    pub user_agent: String,
    /// Pause after every outbound request, success or not.
    pub request_interval_ms: u64,
    pub poll_interval_secs: u64,
    pub feed_url: String,
    /// Host serving browse-edgar and /Archives.
    pub www_base: String,
    /// Host serving the submissions JSON.
    pub data_base: String,
    /// Exact-match form types accepted from the feed. Case and spelling sensitive.
    pub form_types: Vec<String>,
    pub log_dir: PathBuf,
    pub webhook_url: Option<String>,
    pub webhook_timeout_secs: u64,
    /// Total attempts per disclosure, first try included.
    pub webhook_retries: u8,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_interval_ms: 300,
            poll_interval_secs: 600,
            feed_url: "https://www.sec.gov/Archives/edgar/usgaap.rss.xml".to_string(),
            www_base: "https://www.sec.gov".to_string(),
            data_base: "https://data.sec.gov".to_string(),
            form_types: vec!["8-K".into(), "8-K/A".into(), "FORM 8-K".into()],
            log_dir: PathBuf::from("logs"),
            webhook_url: None,
            webhook_timeout_secs: 5,
            webhook_retries: 3,
        }
    }
}

impl WatchConfig {
    /// Load from an explicit TOML file; missing keys fall back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading watch config from {}", path.display()))?;
        let cfg: WatchConfig = toml::from_str(&content)
            .with_context(|| format!("parsing watch config {}", path.display()))?;
        cfg.validated()
    }

    /// Resolution order:
    /// 1) $EDGAR_WATCH_CONFIG
    /// 2) config/watch.toml
    /// 3) built-in defaults
    ///
    /// `EDGAR_USER_AGENT` and `DISCLOSURE_WEBHOOK_URL` override whatever was loaded.
    pub fn load_default() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };

        Ok(cfg.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ua) = non_empty_env(ENV_USER_AGENT) {
            self.user_agent = ua;
        }
        if let Some(url) = non_empty_env(ENV_WEBHOOK_URL) {
            self.webhook_url = Some(url);
        }
        self
    }

    fn validated(mut self) -> Result<Self> {
        self.form_types = clean_list(self.form_types);
        if self.form_types.is_empty() {
            return Err(anyhow!("form_types must name at least one form type"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(anyhow!("user_agent must not be empty"));
        }
        self.www_base = self.www_base.trim_end_matches('/').to_string();
        self.data_base = self.data_base.trim_end_matches('/').to_string();
        Ok(self)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Trims and drops blanks but keeps order and exact spelling.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: WatchConfig = toml::from_str(r#"request_interval_ms = 50"#).unwrap();
        assert_eq!(cfg.request_interval_ms, 50);
        assert_eq!(cfg.poll_interval_secs, 600);
        assert_eq!(cfg.form_types, vec!["8-K", "8-K/A", "FORM 8-K"]);
        assert_eq!(cfg.webhook_timeout_secs, 5);
        assert_eq!(cfg.webhook_retries, 3);
    }

    #[test]
    fn form_types_are_trimmed_but_case_preserved() {
        let cfg: WatchConfig =
            toml::from_str(r#"form_types = [" 8-K ", "", "form 8-k", "8-K"]"#).unwrap();
        let cfg = cfg.validated().unwrap();
        assert_eq!(cfg.form_types, vec!["8-K".to_string(), "form 8-k".to_string()]);
    }

    #[test]
    fn empty_allow_list_is_rejected() {
        let cfg: WatchConfig = toml::from_str(r#"form_types = [" "]"#).unwrap();
        assert!(cfg.validated().is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_USER_AGENT);
        env::remove_var(ENV_WEBHOOK_URL);

        let v = WatchConfig::load_default().unwrap();
        assert_eq!(v, WatchConfig::default());

        let p = tmp.path().join("watch.toml");
        fs::write(&p, "poll_interval_secs = 60\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_USER_AGENT, "Acme Research admin@acme.test");
        let v2 = WatchConfig::load_default().unwrap();
        assert_eq!(v2.poll_interval_secs, 60);
        assert_eq!(v2.user_agent, "Acme Research admin@acme.test");

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_USER_AGENT);
        env::set_current_dir(&old).unwrap();
    }
}
