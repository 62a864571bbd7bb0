// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rolodex_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use rolodex_app::csv::EXPORT_FILE_NAME;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Http,
    Sqlite,
}

impl Backend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("gateway.backend {other:?} is not supported; use \"http\" or \"sqlite\""),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub gateway: Gateway,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            gateway: Gateway::default(),
            storage: Storage::default(),
            export: Export::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Gateway {
    pub backend: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Gateway {
    fn default() -> Self {
        Self {
            backend: Some("http".to_owned()),
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some("10s".to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Export {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ROLODEX_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ROLODEX_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(rolodex_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [gateway], [storage], [export], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected {CONFIG_VERSION}",
                path.display(),
                self.version
            );
        }

        if let Some(backend) = &self.gateway.backend {
            Backend::parse(backend)
                .with_context(|| format!("invalid [gateway] in {}", path.display()))?;
        }

        if let Some(base_url) = &self.gateway.base_url
            && base_url.trim().is_empty()
        {
            bail!(
                "gateway.base_url in {} must not be empty; remove it to use {DEFAULT_BASE_URL}",
                path.display()
            );
        }

        if let Some(timeout) = &self.gateway.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "gateway.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(db_path) = &self.storage.db_path {
            rolodex_db::validate_db_path(db_path)?;
        }

        if let Some(export_path) = &self.export.path
            && export_path.trim().is_empty()
        {
            bail!("export.path in {} must not be empty", path.display());
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!(
                "log.level in {} must not be empty; use a level such as \"info\" or \"rolodex=debug\"",
                path.display()
            );
        }

        Ok(())
    }

    pub fn backend(&self) -> Result<Backend> {
        Backend::parse(self.gateway.backend.as_deref().unwrap_or("http"))
    }

    pub fn base_url(&self) -> &str {
        self.gateway
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        match &self.gateway.timeout {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => rolodex_db::default_db_path(),
        }
    }

    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(self.export.path.as_deref().unwrap_or(EXPORT_FILE_NAME))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# rolodex config\n# Place this file at: {}\n\nversion = 1\n\n[gateway]\n# \"http\" talks to a contacts server; \"sqlite\" keeps contacts in a local file\nbackend = \"http\"\nbase_url = \"{}\"\ntimeout = \"10s\"\n\n[storage]\n# Used by the sqlite backend. Default is the platform data dir (for example ~/.local/share/rolodex/rolodex.db)\n# db_path = \"/absolute/path/to/rolodex.db\"\n\n[export]\npath = \"{}\"\n\n[log]\n# Overridden by ROLODEX_LOG\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            EXPORT_FILE_NAME,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
