use crate::anchor::{DEFAULT_EXPLORER_URL, Explorer};
use log::{info, warn};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    pub database_url: String,
    pub explorer_base_url: String,
    pub watch_interval: Duration,
}

impl Config {
    /// Reads the environment. Call after `dotenvy::dotenv()`.
    pub fn load() -> Self {
        Self {
            database_url: try_load("DATABASE_URL", "sqlite:fair.db"),
            explorer_base_url: try_load("EXPLORER_BASE_URL", DEFAULT_EXPLORER_URL),
            watch_interval: Duration::from_secs(try_load("WATCH_INTERVAL_SECS", "15")),
        }
    }

    pub fn explorer(&self) -> Explorer {
        Explorer::new(&self.explorer_base_url)
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    });

    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid {} value {:?}: {}, using default: {}", key, raw, e, default);
            default
                .parse()
                .unwrap_or_else(|_| panic!("default for {} must parse", key))
        }
    }
}
