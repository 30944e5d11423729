use anyhow::Context;
use envconfig::Envconfig;
use std::time::Duration;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "PORT", default = "8080")]
    pub port: u16,
    /// Base64 HMAC secret. A random per-process key is used when unset.
    #[envconfig(from = "JWT_SECRET")]
    pub jwt_secret: Option<String>,
    #[envconfig(from = "TOKEN_TTL_HOURS", default = "24")]
    pub token_ttl_hours: u64,
    #[envconfig(from = "SEED_PATH")]
    pub seed_path: Option<String>,
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,
    #[envconfig(from = "LOG_FORMAT", default = "pretty")]
    pub log_format: String,
    #[envconfig(from = "UPCOMING_WINDOW_HOURS", default = "24")]
    pub upcoming_window_hours: u64,
    #[envconfig(from = "UPCOMING_SWEEP_SECS", default = "300")]
    pub upcoming_sweep_secs: u64,
}

impl Config {
    pub fn token_ttl(&self) -> anyhow::Result<Duration> {
        hours("TOKEN_TTL_HOURS", self.token_ttl_hours)
    }

    pub fn upcoming_window(&self) -> anyhow::Result<chrono::Duration> {
        let window = hours("UPCOMING_WINDOW_HOURS", self.upcoming_window_hours)?;
        chrono::Duration::from_std(window).context("UPCOMING_WINDOW_HOURS is out of range")
    }

    pub fn upcoming_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.upcoming_sweep_secs.max(1))
    }
}

fn hours(name: &str, hours: u64) -> anyhow::Result<Duration> {
    hours
        .checked_mul(60 * 60)
        .map(Duration::from_secs)
        .with_context(|| format!("{name} is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.jwt_secret.is_none());
        assert!(config.seed_path.is_none());
        assert_eq!(config.token_ttl().unwrap(), Duration::from_secs(86_400));
        assert_eq!(config.upcoming_window().unwrap(), chrono::Duration::hours(24));
        assert_eq!(config.log_format, "pretty");
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("PORT".to_string(), "9000".to_string()),
            ("SEED_PATH".to_string(), "seed.json".to_string()),
            ("UPCOMING_SWEEP_SECS".to_string(), "0".to_string()),
        ]);
        let config = Config::init_from_hashmap(&vars).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.seed_path.as_deref(), Some("seed.json"));
        assert_eq!(config.upcoming_sweep_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_extreme_durations_are_errors() {
        let vars = HashMap::from([
            ("TOKEN_TTL_HOURS".to_string(), u64::MAX.to_string()),
            ("UPCOMING_WINDOW_HOURS".to_string(), (u64::MAX / 3600).to_string()),
        ]);
        let config = Config::init_from_hashmap(&vars).unwrap();
        let err = config.token_ttl().unwrap_err();
        assert!(err.to_string().contains("TOKEN_TTL_HOURS"));
        let err = config.upcoming_window().unwrap_err();
        assert!(err.to_string().contains("UPCOMING_WINDOW_HOURS"));

        let negative = HashMap::from([("UPCOMING_WINDOW_HOURS".to_string(), "-1".to_string())]);
        assert!(Config::init_from_hashmap(&negative).is_err());
    }
}
