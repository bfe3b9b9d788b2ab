use anyhow::{Context, bail};
use chrono::NaiveDate;
use log::LevelFilter;
use mlb_api::client::{DEFAULT_SCHEDULE_LIMIT, MLB_STATS_API};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "MLBBOARD_CONFIG";
const TEAM_ENV: &str = "MLBBOARD_TEAM";
const DATE_ENV: &str = "MLBBOARD_DATE";
const REPLAY_ENV: &str = "MLBBOARD_REPLAY_DIR";
const DEBUG_ENV: &str = "MLBBOARD_DEBUG";

/// Everything the board needs to run, built once at startup and passed down.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub favorite_team: String,
    pub refresh_interval_secs: u64,
    pub rotation_speed_secs: u64,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_attempts: u32,
    pub recovery_retry_secs: u64,
    pub error_pause_secs: u64,
    pub loop_pause_millis: u64,
    pub housekeeping_secs: u64,
    pub schedule_limit: usize,
    /// Pin the board to one day instead of following the local clock.
    pub date: Option<String>,
    pub base_url: String,
    /// Serve recorded responses from this directory instead of the network.
    pub replay_dir: Option<PathBuf>,
    pub matrix: MatrixSettings,
    pub ticker: Option<TickerSettings>,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            favorite_team: "ATL".to_owned(),
            refresh_interval_secs: 60,
            rotation_speed_secs: 15,
            cache_ttl_secs: 300,
            request_timeout_secs: 10,
            connect_attempts: 3,
            recovery_retry_secs: 30,
            error_pause_secs: 5,
            loop_pause_millis: 250,
            housekeeping_secs: 60,
            schedule_limit: DEFAULT_SCHEDULE_LIMIT,
            date: None,
            base_url: MLB_STATS_API.to_owned(),
            replay_dir: None,
            matrix: MatrixSettings::default(),
            ticker: None,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatrixSettings {
    pub width: u16,
    pub height: u16,
    /// 0.0 (off) to 1.0 (full).
    pub brightness: f32,
}

impl Default for MatrixSettings {
    fn default() -> Self {
        Self { width: 64, height: 32, brightness: 0.8 }
    }
}

/// A price quote page: GET `url`, follow `json_path` to a number. `url` has no default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TickerSettings {
    pub label: String,
    pub url: String,
    pub json_path: Vec<String>,
}

impl Default for TickerSettings {
    fn default() -> Self {
        Self {
            label: "BTC".to_owned(),
            url: String::new(),
            json_path: Vec::new(),
        }
    }
}

impl Settings {
    /// Defaults, then the JSON file (explicit path or `MLBBOARD_CONFIG`), then env overrides.
    pub fn load(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let path = config_path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let mut settings = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(team) = var(TEAM_ENV) {
            self.favorite_team = team;
        }
        if let Some(date) = var(DATE_ENV) {
            self.date = Some(date);
        }
        if let Some(dir) = var(REPLAY_ENV) {
            self.replay_dir = Some(PathBuf::from(dir));
        }
        if let Some(debug) = var(DEBUG_ENV) {
            self.debug = matches!(debug.trim(), "1" | "true" | "yes" | "on");
        }
    }

    pub fn validate(&mut self) -> anyhow::Result<()> {
        self.favorite_team = self.favorite_team.trim().to_ascii_uppercase();
        if mlb_api::teams::team_id(&self.favorite_team).is_none() {
            bail!("unknown favorite team: {}", self.favorite_team);
        }
        if let Some(date) = &self.date
            && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err()
        {
            bail!("date must be YYYY-MM-DD, got {date}");
        }
        if self.refresh_interval_secs == 0 || self.rotation_speed_secs == 0 {
            bail!("refresh and rotation intervals must be at least one second");
        }
        if let Some(ticker) = &self.ticker
            && ticker.url.trim().is_empty()
        {
            bail!("ticker.url is required when a ticker is configured");
        }
        self.matrix.brightness = self.matrix.brightness.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug { LevelFilter::Debug } else { LevelFilter::Info }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn rotation_speed(&self) -> Duration {
        Duration::from_secs(self.rotation_speed_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn recovery_retry(&self) -> Duration {
        Duration::from_secs(self.recovery_retry_secs)
    }

    pub fn error_pause(&self) -> Duration {
        Duration::from_secs(self.error_pause_secs)
    }

    pub fn loop_pause(&self) -> Duration {
        Duration::from_millis(self.loop_pause_millis)
    }

    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_secs(self.housekeeping_secs)
    }
}
