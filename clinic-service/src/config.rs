use report_builder::{DEFAULT_CHAR_BUDGET, REPORT_TITLE, ReportConfig, ReportStyle};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Service settings, read from the environment at startup
#[derive(Debug, Clone)]
pub struct ClinicConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub port: u16,
    pub report: ReportConfig,
    pub report_style: ReportStyle,
    /// Author written into the report's document properties
    pub report_creator: Option<String>,
}

impl ClinicConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let char_budget = match lookup("REPORT_CHAR_BUDGET") {
            Some(value) => match value.parse::<usize>() {
                Ok(budget) if budget > 0 => budget,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "REPORT_CHAR_BUDGET",
                        value,
                    });
                }
            },
            None => DEFAULT_CHAR_BUDGET,
        };

        let report_style = match lookup("REPORT_DIRECTION").as_deref() {
            None | Some("rtl") => ReportStyle::default(),
            Some("ltr") => ReportStyle::left_to_right(),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "REPORT_DIRECTION",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: lookup("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            port,
            report: ReportConfig {
                char_budget,
                title: lookup("REPORT_TITLE").unwrap_or_else(|| REPORT_TITLE.to_string()),
                subtitle: None,
            },
            report_style,
            report_creator: lookup("REPORT_CREATOR").filter(|name| !name.trim().is_empty()),
        })
    }
}
