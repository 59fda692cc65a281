use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::range::YearBounds;

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_CONFIG_FILE: &str = "picker.toml";

/// Settings as they may appear in `picker.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    bind: Option<String>,
    timezone: Option<String>,
    min_year: Option<i32>,
    max_year: Option<i32>,
    static_dir: Option<PathBuf>,
}

/// Application settings, built once at startup and handed to the router.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub timezone: Tz,
    pub bounds: YearBounds,
    pub static_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind: DEFAULT_BIND.to_string(),
            timezone: chrono_tz::UTC,
            bounds: YearBounds::default(),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl AppConfig {
    /// Layer the config file, then `PICKER_*` environment variables (looked
    /// up through `env`), then the bind address from the command line.
    pub fn load(
        config_path: Option<&Path>,
        bind_override: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file = match config_path {
            Some(path) => read_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => read_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => FileConfig::default(),
        };

        let mut config = AppConfig::from_file(file);

        if let Some(bind) = env("PICKER_BIND") {
            config.bind = bind;
        }
        if let Some(tz) = env("PICKER_TIMEZONE") {
            config.timezone = parse_timezone(&tz);
        }
        if let Some(bind) = bind_override {
            config.bind = bind;
        }

        Ok(config)
    }

    fn from_file(file: FileConfig) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            bind: file.bind.unwrap_or(defaults.bind),
            timezone: file
                .timezone
                .as_deref()
                .map(parse_timezone)
                .unwrap_or(defaults.timezone),
            bounds: YearBounds::new(
                file.min_year.unwrap_or(defaults.bounds.min_year),
                file.max_year.unwrap_or(defaults.bounds.max_year),
            ),
            static_dir: file.static_dir.unwrap_or(defaults.static_dir),
        }
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        chrono::Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
}

fn parse_timezone(tz_str: &str) -> Tz {
    tz_str.parse().unwrap_or_else(|_| {
        tracing::warn!(timezone = tz_str, "invalid timezone, falling back to UTC");
        chrono_tz::UTC
    })
}
