use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

/// Runtime knobs for the kiosk, loaded once at startup and handed down to the
/// pollers, the flow controller and the HTTP server.
#[derive(Debug, Clone)]
pub struct Config {
    /// How often the gesture command feed is polled.
    pub gesture_poll_interval: Duration,
    /// Pause after a processed command before polling resumes.
    pub gesture_settle_delay: Duration,
    /// How often the finalized-order feed is polled.
    pub finalized_poll_interval: Duration,
    /// Stop watching the finalized feed after one order until reset.
    pub stop_after_first_order: bool,
    /// How often the sensor record is polled.
    pub sensor_poll_interval: Duration,
    /// Port for the sensor/snapshot HTTP surface.
    pub port: u16,
}

impl Config {
    pub fn load() -> Self {
        Self {
            gesture_poll_interval: Duration::from_millis(try_load("ORDR_GESTURE_POLL_MS", "500")),
            gesture_settle_delay: Duration::from_millis(try_load("ORDR_SETTLE_MS", "1000")),
            finalized_poll_interval: Duration::from_millis(try_load("ORDR_ORDER_POLL_MS", "5000")),
            stop_after_first_order: true,
            sensor_poll_interval: Duration::from_millis(try_load("ORDR_SENSOR_POLL_MS", "500")),
            port: try_load("ORDR_PORT", "8080"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gesture_poll_interval: Duration::from_millis(500),
            gesture_settle_delay: Duration::from_millis(1000),
            finalized_poll_interval: Duration::from_millis(5000),
            stop_after_first_order: true,
            sensor_poll_interval: Duration::from_millis(500),
            port: 8080,
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
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.gesture_poll_interval, Duration::from_millis(500));
        assert_eq!(cfg.finalized_poll_interval, Duration::from_millis(5000));
        assert!(cfg.stop_after_first_order);
        assert_eq!(cfg.port, 8080);
    }
}
