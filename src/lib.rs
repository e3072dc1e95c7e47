use config::{Config, ConfigError};
use serde::Deserialize;

use crate::domain::core::NearbyOptions;

pub mod domain;
pub mod infrastructure;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookingConfig {
    #[serde(default)]
    pub logger: Logger,
    #[serde(default)]
    pub nearby: NearbyOptions,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl BookingConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("booking")
    }

    pub fn load_from(name: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("BOOKING").separator("__"))
            .build()?
            .try_deserialize::<BookingConfig>()
    }

    /// Capacity of the configured room, if any
    pub fn capacity_of(&self, room_id: &str) -> Option<u32> {
        self.rooms
            .iter()
            .find(|r| r.id == room_id)
            .map(|r| r.capacity)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    pub capacity: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Logger {
    #[serde(default)]
    pub level: Level,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub enum Level {
    TRACE,
    DEBUG,
    #[default]
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = BookingConfig::load_from("does-not-exist").unwrap();
        assert_eq!(config.nearby, NearbyOptions::default());
        assert!(config.rooms.is_empty());
        assert_eq!(tracing::Level::from(&config.logger.level), tracing::Level::INFO);
    }

    #[test]
    fn test_capacity_of() {
        let config = BookingConfig {
            rooms: vec![Room {
                id: "room-12".to_owned(),
                hotel_id: "hotel-1".to_owned(),
                capacity: 4,
            }],
            ..Default::default()
        };
        assert_eq!(config.capacity_of("room-12"), Some(4));
        assert_eq!(config.capacity_of("room-99"), None);
    }
}
