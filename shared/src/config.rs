use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::PositionOptions;
use crate::messages::Locale;

pub const USERS_COLLECTION: &str = "usuarios";
pub const ALERTS_COLLECTION: &str = "alertas";
pub const EMERGENCY_POINTER_KEY: &str = "emergenciaActiva";
pub const MIN_PASSWORD_CHARS: usize = 6;
/// Stored in place of the email on alerts raised by accounts without one.
pub const ANONYMOUS_EMAIL: &str = "Anónimo";
pub const ALERT_TIMESTAMP_FIELD: &str = "timestamp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    #[error("{field} cannot contain '/'")]
    ContainsSlash { field: &'static str },
    #[error("geolocation timeout must be positive")]
    ZeroTimeout,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub users_collection: String,
    pub alerts_collection: String,
    pub emergency_pointer_key: String,
    pub position_options: PositionOptions,
    pub locale: Locale,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            users_collection: USERS_COLLECTION.into(),
            alerts_collection: ALERTS_COLLECTION.into(),
            emergency_pointer_key: EMERGENCY_POINTER_KEY.into(),
            position_options: PositionOptions::default(),
            locale: Locale::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("users_collection", &self.users_collection),
            ("alerts_collection", &self.alerts_collection),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty { field });
            }
            if value.contains('/') {
                return Err(ConfigError::ContainsSlash { field });
            }
        }
        if self.emergency_pointer_key.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "emergency_pointer_key",
            });
        }
        if self.position_options.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
