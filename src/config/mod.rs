use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{Cli, OutputFormat};
use crate::pipeline::SelectionCriteria;
use crate::transport::scrapeops::{DEFAULT_COUNTRY, SCRAPEOPS_ENDPOINT};
use crate::utils::sanitize_video_id;
use crate::Result;

const LOCAL_SETTINGS_FILE: &str = "youtube-transcript.yaml";
const WEBSHARE_DOMAIN: &str = "p.webshare.io";
const WEBSHARE_PORT: u16 = 80;

/// Settings read from the optional YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// ScrapeOps proxy service settings
    pub scrapeops: ScrapeOpsSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeOpsSettings {
    /// API key, overridden by `--scrapeops-api-key`
    pub api_key: Option<String>,

    /// Service endpoint
    pub endpoint: String,

    /// Country hint for the exit node
    pub country: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            scrapeops: ScrapeOpsSettings::default(),
        }
    }
}

impl Default for ScrapeOpsSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: SCRAPEOPS_ENDPOINT.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the first settings file found, or defaults.
    ///
    /// Read only: nothing is written back.
    pub fn load() -> Result<Self> {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read settings file")?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    fn settings_path() -> Option<PathBuf> {
        // Current directory first, for per-project overrides
        let local = PathBuf::from(LOCAL_SETTINGS_FILE);
        if local.exists() {
            return Some(local);
        }

        dirs::config_dir()
            .map(|dir| dir.join("youtube-transcript").join("config.yaml"))
            .filter(|path| path.exists())
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        url::Url::parse(&self.scrapeops.endpoint)
            .with_context(|| format!("Invalid ScrapeOps endpoint: {}", self.scrapeops.endpoint))?;

        Ok(())
    }
}

/// Outbound proxy used by the direct transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyConfig {
    /// No proxy
    Direct,

    /// User-supplied HTTP and/or HTTPS proxy URLs
    Generic {
        http_url: Option<String>,
        https_url: Option<String>,
    },

    /// Webshare rotating residential proxies
    Webshare { username: String, password: String },
}

impl ProxyConfig {
    /// Proxy URLs for plain HTTP and HTTPS targets
    pub fn proxy_urls(&self) -> (Option<String>, Option<String>) {
        match self {
            ProxyConfig::Direct => (None, None),
            ProxyConfig::Generic { http_url, https_url } => (http_url.clone(), https_url.clone()),
            ProxyConfig::Webshare { username, password } => {
                let url = format!(
                    "http://{}-rotate:{}@{}:{}/",
                    username, password, WEBSHARE_DOMAIN, WEBSHARE_PORT
                );
                (Some(url.clone()), Some(url))
            }
        }
    }

    pub fn reqwest_proxies(&self) -> Result<Vec<reqwest::Proxy>> {
        let (http_url, https_url) = self.proxy_urls();
        let mut proxies = Vec::new();

        if let Some(url) = http_url {
            proxies.push(reqwest::Proxy::http(&url).context("Invalid HTTP proxy URL")?);
        }
        if let Some(url) = https_url {
            proxies.push(reqwest::Proxy::https(&url).context("Invalid HTTPS proxy URL")?);
        }

        Ok(proxies)
    }

    /// Whether each request should use a fresh connection
    pub fn prevents_keep_alive(&self) -> bool {
        matches!(self, ProxyConfig::Webshare { .. })
    }
}

/// How requests leave the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    /// reqwest, possibly through a [`ProxyConfig`]
    Direct,

    /// Through the ScrapeOps proxy service
    ScrapeOps {
        api_key: String,
        endpoint: String,
        country: String,
    },
}

/// Raw proxy-related inputs before resolution
#[derive(Debug, Clone, Default)]
pub struct ProxyInputs {
    pub http_proxy: String,
    pub https_proxy: String,
    pub webshare_proxy_username: Option<String>,
    pub webshare_proxy_password: Option<String>,
    pub scrapeops_api_key: Option<String>,
    pub cookies: Option<PathBuf>,
}

impl ProxyInputs {
    /// Pick exactly one proxy configuration.
    ///
    /// Any Webshare credential wins over generic proxy URLs.
    pub fn resolve_proxy(&self) -> ProxyConfig {
        if self.webshare_proxy_username.is_some() || self.webshare_proxy_password.is_some() {
            return ProxyConfig::Webshare {
                username: self.webshare_proxy_username.clone().unwrap_or_default(),
                password: self.webshare_proxy_password.clone().unwrap_or_default(),
            };
        }

        if !self.http_proxy.is_empty() || !self.https_proxy.is_empty() {
            return ProxyConfig::Generic {
                http_url: non_empty(&self.http_proxy),
                https_url: non_empty(&self.https_proxy),
            };
        }

        ProxyConfig::Direct
    }

    /// Pick the transport. A ScrapeOps key selects the shim regardless of proxy settings.
    pub fn resolve_transport(&self, settings: &Settings) -> TransportKind {
        match self
            .scrapeops_api_key
            .as_deref()
            .and_then(non_empty)
            .or_else(|| settings.scrapeops.api_key.as_deref().and_then(non_empty))
        {
            Some(api_key) => TransportKind::ScrapeOps {
                api_key,
                endpoint: settings.scrapeops.endpoint.clone(),
                country: settings.scrapeops.country.clone(),
            },
            None => TransportKind::Direct,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Everything a run needs, assembled once and never mutated
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub video_ids: Vec<String>,
    pub format: OutputFormat,
    pub criteria: SelectionCriteria,
    pub list_transcripts: bool,
    pub proxy: ProxyConfig,
    pub transport: TransportKind,
    pub cookie_path: Option<PathBuf>,
    pub timeout: Duration,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli, settings: &Settings) -> Self {
        let inputs = ProxyInputs::from(cli);
        let proxy = inputs.resolve_proxy();
        let transport = inputs.resolve_transport(settings);

        if matches!(transport, TransportKind::ScrapeOps { .. }) && proxy != ProxyConfig::Direct {
            tracing::warn!("ScrapeOps API key given, proxy settings are ignored");
        }

        Self {
            video_ids: cli.video_ids.iter().map(|id| sanitize_video_id(id)).collect(),
            format: cli.format,
            criteria: SelectionCriteria {
                languages: cli.languages.clone(),
                exclude_generated: cli.exclude_generated,
                exclude_manually_created: cli.exclude_manually_created,
                translate: non_empty(&cli.translate),
            },
            list_transcripts: cli.list_transcripts,
            proxy,
            transport,
            cookie_path: inputs.cookies,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl From<&Cli> for ProxyInputs {
    fn from(cli: &Cli) -> Self {
        Self {
            http_proxy: cli.http_proxy.clone(),
            https_proxy: cli.https_proxy.clone(),
            webshare_proxy_username: cli.webshare_proxy_username.clone(),
            webshare_proxy_password: cli.webshare_proxy_password.clone(),
            scrapeops_api_key: cli.scrapeops_api_key.clone(),
            cookies: cli.cookies.clone(),
        }
    }
}
