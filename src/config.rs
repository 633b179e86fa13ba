//! Draw configuration, resolved once at startup.
//!
//! The browser reads it from the page's query string; JS callers may also pass
//! a plain object with the same camelCase field names.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Number Raffle Draw";
pub const DEFAULT_MAX_NUMBER: u32 = 5000;
pub const DEFAULT_WINNER_DELAY_MS: u32 = 3000;
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawConfig {
    /// Display label; unused by the draw itself.
    pub title: String,
    /// Exclusive upper bound of drawn values.
    pub max_number: u32,
    /// How long the animation runs before the number settles.
    pub winner_delay_ms: u32,
    /// Period of the cosmetic redraws during the animation.
    pub tick_interval_ms: u32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            max_number: DEFAULT_MAX_NUMBER,
            winner_delay_ms: DEFAULT_WINNER_DELAY_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl DrawConfig {
    /// Build a config from key-value pairs such as decoded query parameters.
    ///
    /// Recognized keys are `displayTitle`, `maxNumber` and `winnerDelay`
    /// (seconds). Unknown keys are skipped; bad values keep the default.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in params {
            let value = value.as_ref();
            match key.as_ref() {
                "displayTitle" => {
                    if !value.is_empty() {
                        config.title = value.to_string();
                    }
                }
                "maxNumber" => match parse_positive(value) {
                    Some(n) => config.max_number = n,
                    None => log::warn!("Ignoring invalid maxNumber {value:?}"),
                },
                "winnerDelay" => match parse_positive(value) {
                    Some(secs) => config.winner_delay_ms = secs.saturating_mul(1000),
                    None => log::warn!("Ignoring invalid winnerDelay {value:?}"),
                },
                _ => {}
            }
        }
        config
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = DrawConfig::default();
        assert_eq!(c.title, "Number Raffle Draw");
        assert_eq!(c.max_number, 5000);
        assert_eq!(c.winner_delay_ms, 3000);
        assert_eq!(c.tick_interval_ms, 50);
    }

    #[test]
    fn test_from_params_reads_all_keys() {
        let c = DrawConfig::from_params([
            ("displayTitle", "Office Party"),
            ("maxNumber", "250"),
            ("winnerDelay", "5"),
        ]);
        assert_eq!(c.title, "Office Party");
        assert_eq!(c.max_number, 250);
        assert_eq!(c.winner_delay_ms, 5000);
    }

    #[test]
    fn test_invalid_numbers_keep_defaults() {
        let c = DrawConfig::from_params([
            ("maxNumber", "lots"),
            ("winnerDelay", "-2"),
        ]);
        assert_eq!(c.max_number, DEFAULT_MAX_NUMBER);
        assert_eq!(c.winner_delay_ms, DEFAULT_WINNER_DELAY_MS);

        let c = DrawConfig::from_params([("maxNumber", "0"), ("winnerDelay", "")]);
        assert_eq!(c.max_number, DEFAULT_MAX_NUMBER);
        assert_eq!(c.winner_delay_ms, DEFAULT_WINNER_DELAY_MS);
    }

    #[test]
    fn test_partially_numeric_values_rejected() {
        // whole value must be an integer; no prefix parsing
        let c = DrawConfig::from_params([("maxNumber", "12abc"), ("winnerDelay", "3.5")]);
        assert_eq!(c.max_number, DEFAULT_MAX_NUMBER);
        assert_eq!(c.winner_delay_ms, DEFAULT_WINNER_DELAY_MS);

        let c = DrawConfig::from_params([("maxNumber", " 12 ")]);
        assert_eq!(c.max_number, 12);
    }

    #[test]
    fn test_empty_title_and_unknown_keys_ignored() {
        let c = DrawConfig::from_params([("displayTitle", ""), ("theme", "dark")]);
        assert_eq!(c, DrawConfig::default());
    }

    #[test]
    fn test_winner_delay_saturates() {
        let c = DrawConfig::from_params([("winnerDelay", "4294967295")]);
        assert_eq!(c.winner_delay_ms, u32::MAX);
    }

    #[test]
    fn test_deserialize_partial_object() {
        let c: DrawConfig = serde_json::from_str(r#"{"maxNumber": 10}"#).unwrap();
        assert_eq!(c.max_number, 10);
        assert_eq!(c.winner_delay_ms, DEFAULT_WINNER_DELAY_MS);
        assert_eq!(c.title, DEFAULT_TITLE);
    }
}
