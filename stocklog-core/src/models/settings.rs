use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// UI color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the platform preference.
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(format!(
                "Invalid theme '{}'. Valid options: light, dark, system",
                s
            )),
        }
    }
}

/// Application settings. Stored as a single record, not a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub theme: Theme,
    /// Prefill for the minimum-stock field of new items.
    pub default_min_stock: u32,
    /// Toggles price display and price entry.
    pub is_price_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            default_min_stock: 1,
            is_price_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = AppSettings::default();
        assert_eq!(settings.theme, Theme::System);
        assert_eq!(settings.default_min_stock, 1);
        assert!(settings.is_price_enabled);
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from_str("light").unwrap(), Theme::Light);
        assert_eq!(Theme::from_str("DARK").unwrap(), Theme::Dark);
        assert_eq!(Theme::from_str("system").unwrap(), Theme::System);
        assert!(Theme::from_str("sepia").is_err());
    }

    #[test]
    fn test_settings_json_field_names() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        assert_eq!(json.get("theme").unwrap(), "system");
        assert!(json.get("defaultMinStock").is_some());
        assert!(json.get("isPriceEnabled").is_some());
    }
}
