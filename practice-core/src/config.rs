//! Tunables for the practice core.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values it overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    /// Key of the persistence slot holding the whole database snapshot.
    pub storage_key: String,
    /// Only external events whose title contains this keyword are imported.
    pub sync_keyword: String,
    /// Marks bookings that originate from an external calendar import.
    pub import_prefix: String,
    /// Simulated round-trip of the calendar connect action.
    pub connect_delay_ms: u64,
    /// Length of the "recent bookings" list.
    pub recent_bookings: usize,
    pub currency_symbol: String,
}

impl PracticeConfig {
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            storage_key: "shiatsu_db".to_string(),
            sync_keyword: "Shiatsu".to_string(),
            import_prefix: "gcal_".to_string(),
            connect_delay_ms: 1500,
            recent_bookings: 5,
            currency_symbol: "€".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let cfg: PracticeConfig = serde_json::from_str(r#"{"sync_keyword": "Massage"}"#).unwrap();

        assert_eq!(cfg.sync_keyword, "Massage");
        assert_eq!(cfg.import_prefix, "gcal_");
        assert_eq!(cfg.connect_delay(), Duration::from_millis(1500));
    }
}
