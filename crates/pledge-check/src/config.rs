//! Contract checking configuration.
//!
//! Reads from environment variables:
//! - `PLEDGE_ENABLED`: whether decorating operations attach contracts
//!   (default: "true"; "0", "false", "off" and "no" disable)

use serde::{Deserialize, Serialize};

/// Settings a [`ContractRegistry`](crate::registry::ContractRegistry) starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Whether decorating operations wrap callables. Consulted at decoration
    /// time only; callables wrapped while enabled keep checking.
    pub enabled: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        ContractConfig { enabled: true }
    }
}

impl ContractConfig {
    pub const ENV_ENABLED: &'static str = "PLEDGE_ENABLED";

    /// Configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_enabled_var(std::env::var(Self::ENV_ENABLED).ok().as_deref())
    }

    fn from_enabled_var(value: Option<&str>) -> Self {
        let enabled = match value.map(|v| v.trim().to_ascii_lowercase()) {
            None => true,
            Some(v) => match v.as_str() {
                "" | "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                other => {
                    tracing::warn!(
                        var = Self::ENV_ENABLED,
                        value = other,
                        "unrecognized value, keeping contracts enabled"
                    );
                    true
                }
            },
        };
        ContractConfig { enabled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_enabled() {
        assert!(ContractConfig::default().enabled);
        assert!(ContractConfig::from_enabled_var(None).enabled);
    }

    #[test]
    fn parses_switch_values() {
        for off in ["0", "false", "OFF", " no "] {
            assert!(!ContractConfig::from_enabled_var(Some(off)).enabled, "{off}");
        }
        for on in ["1", "true", "On", "yes", ""] {
            assert!(ContractConfig::from_enabled_var(Some(on)).enabled, "{on}");
        }
    }

    #[test]
    fn unknown_values_keep_contracts_on() {
        assert!(ContractConfig::from_enabled_var(Some("maybe")).enabled);
    }
}
