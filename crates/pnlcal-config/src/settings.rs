use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ConfigError, MAX_DECIMALS};

/// Typed view of the merged config. Every field has a default, so an empty
/// document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parser: ParserSettings,
    pub calendar: CalendarSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSettings {
    /// `chrono` format strings, tried in order.
    pub date_formats: Vec<String>,
    /// Exactly one character.
    pub grouping_separator: String,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            date_formats: vec!["%Y-%m-%d".to_string(), "%Y/%m/%d".to_string()],
            grouping_separator: ",".to_string(),
        }
    }
}

impl ParserSettings {
    /// The validated separator character. Falls back to `,` only if called
    /// on an unvalidated value.
    pub fn grouping_char(&self) -> char {
        self.grouping_separator.chars().next().unwrap_or(',')
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub week_start: WeekStart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Display decimals for money amounts.
    pub decimals: u8,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl AppConfig {
    /// Deserialize from the merged JSON document and validate.
    ///
    /// Unknown keys are ignored here; see [`crate::report_unused_keys`].
    pub fn from_json(v: &Value) -> Result<AppConfig, ConfigError> {
        let cfg: AppConfig = serde_json::from_value(v.clone()).map_err(|e| ConfigError::Invalid {
            pointer: "/".to_string(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |pointer: &str, message: String| ConfigError::Invalid {
            pointer: pointer.to_string(),
            message,
        };

        let sep = &self.parser.grouping_separator;
        let mut chars = sep.chars();
        let c = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(invalid(
                    "/parser/grouping_separator",
                    format!("must be exactly one character, got '{sep}'"),
                ))
            }
        };
        if c == '.' || c == '+' || c == '-' || c.is_ascii_digit() {
            return Err(invalid(
                "/parser/grouping_separator",
                format!("'{c}' would be ambiguous inside a number"),
            ));
        }

        if self.parser.date_formats.is_empty() {
            return Err(invalid(
                "/parser/date_formats",
                "at least one format is required".to_string(),
            ));
        }
        if let Some(i) = self
            .parser
            .date_formats
            .iter()
            .position(|f| f.trim().is_empty())
        {
            return Err(invalid(
                &format!("/parser/date_formats/{i}"),
                "format must not be empty".to_string(),
            ));
        }

        if self.report.decimals > MAX_DECIMALS {
            return Err(invalid(
                "/report/decimals",
                format!("must be <= {MAX_DECIMALS}, got {}", self.report.decimals),
            ));
        }

        Ok(())
    }
}
