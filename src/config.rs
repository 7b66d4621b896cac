use std::env;
use std::str::FromStr;

use chrono::Duration;

use crate::engine::sweep::StalenessPolicy;
use crate::error::AssignError;
use crate::models::assignment::{AssignmentOptions, DEFAULT_MAX_DISTANCE_KM};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub max_distance_km: f64,
    pub consider_workload: bool,
    pub consider_capacity: bool,
    pub stale_after_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            consider_workload: true,
            consider_capacity: true,
            stale_after_minutes: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AssignError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AssignError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: parse_or_default(&lookup, "LOG_FORMAT", defaults.log_format)?,
            max_distance_km: parse_or_default(
                &lookup,
                "ASSIGN_MAX_DISTANCE_KM",
                defaults.max_distance_km,
            )?,
            consider_workload: parse_or_default(
                &lookup,
                "ASSIGN_CONSIDER_WORKLOAD",
                defaults.consider_workload,
            )?,
            consider_capacity: parse_or_default(
                &lookup,
                "ASSIGN_CONSIDER_CAPACITY",
                defaults.consider_capacity,
            )?,
            stale_after_minutes: parse_or_default(
                &lookup,
                "SWEEP_STALE_AFTER_MINUTES",
                defaults.stale_after_minutes,
            )?,
        };

        config
            .assignment_options()
            .validate()
            .map_err(|err| AssignError::InvalidConfig(err.to_string()))?;
        if config.stale_after_minutes < 0 || Duration::try_minutes(config.stale_after_minutes).is_none() {
            return Err(AssignError::InvalidConfig(format!(
                "SWEEP_STALE_AFTER_MINUTES out of range: {}",
                config.stale_after_minutes
            )));
        }

        Ok(config)
    }

    pub fn assignment_options(&self) -> AssignmentOptions {
        AssignmentOptions {
            max_distance_km: self.max_distance_km,
            consider_workload: self.consider_workload,
            consider_capacity: self.consider_capacity,
        }
    }

    pub fn staleness_policy(&self) -> StalenessPolicy {
        Duration::try_minutes(self.stale_after_minutes)
            .map(StalenessPolicy::new)
            .unwrap_or_default()
    }
}

fn parse_or_default<T, F>(lookup: &F, key: &str, default: T) -> Result<T, AssignError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| AssignError::InvalidConfig(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}
