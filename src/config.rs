// config.rs
use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use tracing::info;

use crate::petition::{VotingRules, DEFAULT_PASS_THRESHOLD, DEFAULT_VOTING_WINDOW_DAYS};

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub voting_window_days: i64,
    pub pass_threshold: i64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3030"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            voting_window_days: try_load(
                "VOTING_WINDOW_DAYS",
                &DEFAULT_VOTING_WINDOW_DAYS.to_string(),
            ),
            pass_threshold: try_load("PASS_THRESHOLD", &DEFAULT_PASS_THRESHOLD.to_string()),
        }
    }

    pub fn voting_rules(&self) -> VotingRules {
        VotingRules {
            window: Duration::days(self.voting_window_days),
            pass_threshold: self.pass_threshold,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .unwrap_or_else(|e| panic!("invalid {key} value: {e}"))
}
