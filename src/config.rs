use std::env;

/// Process configuration, sourced from `METRICS_RELAY_*` environment
/// variables with defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the time-series backend.
    pub backend_address: String,
    /// Listen address of the query API.
    pub listen_address: String,
    /// Listen address of the health/telemetry endpoint.
    pub health_address: String,
    /// Log level when `RUST_LOG` is unset.
    pub log_level: String,
    /// Number of concurrent ingestion handlers.
    pub handler_count: usize,
    /// Queue topic carrying check results.
    pub topic: String,
    /// Queue channel name for this consumer.
    pub channel: String,
    /// Queue discovery addresses.
    pub lookupd_addresses: Vec<String>,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        let handler_count = var_or("METRICS_RELAY_MAX_TASKS", "4")
            .parse()
            .unwrap_or(4);

        let lookupd_addresses = var_or("METRICS_RELAY_LOOKUPD_ADDRS", "")
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        Self {
            backend_address: var_or("METRICS_RELAY_BACKEND_ADDRESS", "http://localhost:8080"),
            listen_address: var_or("METRICS_RELAY_ADDRESS", "0.0.0.0:9111"),
            health_address: var_or("METRICS_RELAY_HEALTH_ADDRESS", "0.0.0.0:9112"),
            log_level: var_or("METRICS_RELAY_LOG_LEVEL", "info"),
            handler_count,
            topic: var_or("METRICS_RELAY_TOPIC", "_.results"),
            channel: var_or("METRICS_RELAY_CHANNEL", "metrics-relay-worker"),
            lookupd_addresses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_apply_without_env() {
        // Only checks keys this test does not set; runs in-process env.
        let config = Config::from_env();
        assert_eq!(config.topic, "_.results");
        assert_eq!(config.channel, "metrics-relay-worker");
        assert!(config.handler_count > 0);
    }
}
