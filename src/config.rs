use crate::dispatcher::report::UNKNOWN_CATEGORY;
use crate::error::ConfigError;
use chrono::Offset;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub tick_rate: Duration,
    pub sample_interval: Duration,
    pub window_horizon: Duration,
    pub confidence_threshold: f32,
    pub ignored_categories: HashSet<u32>,
    pub category_names: BTreeMap<u32, String>,
    pub report_endpoint: Option<String>,
    pub report_timeout: Duration,
    pub dispatch_grace_period: Duration,
    pub dry_run: bool,
    pub frame_dir: Option<PathBuf>,
    /// Line typed on stdin that asks the run to stop. `None` disables it.
    pub stop_key: Option<String>,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(10),
            sample_interval: Duration::from_secs(12),
            window_horizon: Duration::from_secs(120),
            confidence_threshold: 0.0,
            ignored_categories: HashSet::new(),
            category_names: default_category_names(),
            report_endpoint: None,
            report_timeout: Duration::from_secs(10),
            dispatch_grace_period: Duration::from_secs(10),
            dry_run: false,
            frame_dir: None,
            stop_key: Some("q".to_string()),
            logger_timezone: japan_standard_time(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        config.dry_run = matches!(
            lookup("DRY_RUN").as_deref().map(str::trim),
            Some("1") | Some("true")
        );

        config.report_endpoint = lookup("API_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if config.report_endpoint.is_none() && !config.dry_run {
            return Err(ConfigError::MissingEndpoint);
        }

        if let Some(value) = lookup("SAMPLE_INTERVAL_SECS") {
            config.sample_interval = parse_secs("SAMPLE_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = lookup("WINDOW_SECS") {
            config.window_horizon = parse_secs("WINDOW_SECS", &value)?;
        }
        if let Some(value) = lookup("REQUEST_TIMEOUT_SECS") {
            config.report_timeout = parse_secs("REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("TICK_MILLIS") {
            let millis = parse_positive::<u64>("TICK_MILLIS", &value)?;
            config.tick_rate = Duration::from_millis(millis);
        }
        if let Some(value) = lookup("CONFIDENCE_THRESHOLD") {
            config.confidence_threshold = parse_threshold(&value)?;
        }
        if let Some(value) = lookup("IGNORED_CATEGORIES") {
            config.ignored_categories = parse_categories(&value)?;
        }
        if let Some(value) = lookup("FRAME_DIR") {
            if !value.trim().is_empty() {
                config.frame_dir = Some(PathBuf::from(value.trim()));
            }
        }
        if let Some(value) = lookup("UTC_OFFSET_HOURS") {
            config.logger_timezone = parse_offset(&value)?;
        }

        Ok(config)
    }

    pub fn category_name(&self, category_id: u32) -> &str {
        self.category_names
            .get(&category_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CATEGORY)
    }
}

fn default_category_names() -> BTreeMap<u32, String> {
    BTreeMap::from([
        (0, "Nothing playing".to_string()),
        (1, "The Game of Life".to_string()),
        (2, "Super Smash Bros.".to_string()),
        (3, "Mario Kart".to_string()),
    ])
}

fn japan_standard_time() -> chrono::FixedOffset {
    chrono::FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| chrono::Utc.fix())
}

fn parse_positive<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let parsed = value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: "not a number",
    })?;
    if parsed <= T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be greater than zero",
        });
    }
    Ok(parsed)
}

fn parse_secs(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let secs = parse_positive::<f64>(key, value)?;
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: "out of range",
    })
}

fn parse_threshold(value: &str) -> Result<f32, ConfigError> {
    let invalid = |reason| ConfigError::Invalid {
        key: "CONFIDENCE_THRESHOLD",
        value: value.to_string(),
        reason,
    };
    let threshold = value
        .trim()
        .parse::<f32>()
        .map_err(|_| invalid("not a number"))?;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(invalid("must be between 0 and 1"));
    }
    Ok(threshold)
}

fn parse_categories(value: &str) -> Result<HashSet<u32>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>().map_err(|_| ConfigError::Invalid {
                key: "IGNORED_CATEGORIES",
                value: value.to_string(),
                reason: "expected a comma separated list of category ids",
            })
        })
        .collect()
}

fn parse_offset(value: &str) -> Result<chrono::FixedOffset, ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "UTC_OFFSET_HOURS",
        value: value.to_string(),
        reason: "expected whole hours between -23 and 23",
    };
    let hours = value.trim().parse::<i32>().map_err(|_| invalid())?;
    hours
        .checked_mul(3600)
        .and_then(chrono::FixedOffset::east_opt)
        .ok_or_else(invalid)
}
