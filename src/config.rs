use crate::utils::time::parse_time_string;
use anyhow::{Context, Result};
use chrono::NaiveTime;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub late_cutoff: NaiveTime,
    pub overnight_checkout_grace_hours: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite:attendance.db".to_string(),
            late_cutoff: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            overnight_checkout_grace_hours: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);

        let late_cutoff = match lookup("LATE_CUTOFF") {
            Some(value) => parse_time_string(&value)
                .with_context(|| format!("LATE_CUTOFF is invalid: '{}'", value))?,
            None => defaults.late_cutoff,
        };

        let overnight_checkout_grace_hours = match lookup("OVERNIGHT_CHECKOUT_GRACE_HOURS") {
            Some(value) => value.trim().parse().with_context(|| {
                format!("OVERNIGHT_CHECKOUT_GRACE_HOURS is invalid: '{}'", value)
            })?,
            None => defaults.overnight_checkout_grace_hours,
        };

        Ok(Config {
            database_url,
            late_cutoff,
            overnight_checkout_grace_hours,
        })
    }
}
