use anyhow::{Context, Result};
use chrono_tz::Tz;
use clockify::{ClientOptions, DEFAULT_BASE_URL, RetryPolicy};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_DAYS_BACK: NonZeroU32 = NonZeroU32::new(7).unwrap();

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub api_key: String,
    /// デイリーノートを置く Vault のディレクトリ
    pub vault_path: PathBuf,
    /// 今日を含めて遡る日数
    pub days_back: NonZeroU32,
    #[serde_as(as = "DisplayFromStr")]
    pub time_zone: Tz,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: "YOUR_CLOCKIFY_API_KEY".to_string(),
            vault_path: PathBuf::from("vault/daily"),
            days_back: DEFAULT_DAYS_BACK,
            time_zone: Tz::Europe__Moscow,
            api: ApiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_backoff", with = "humantime_serde")]
    pub retry_backoff: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            retry_attempts: default_retry_attempts(),
            retry_backoff: default_retry_backoff(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> Duration {
    Duration::from_millis(500)
}

impl ApiConfig {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            retry: RetryPolicy {
                max_attempts: self.retry_attempts,
                initial_backoff: self.retry_backoff,
            },
        }
    }
}

pub fn open_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
    let config: Config =
        serde_json::from_str(&content).context("Failed to parse configuration file")?;
    Ok(config)
}

pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(&Config::default())
        .context("Failed to serialize configuration")?;
    fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
    Ok(())
}
