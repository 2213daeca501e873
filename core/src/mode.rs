//! Runtime mode of the client (which deployment environment it runs in).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Deployment environment the client runs in.
///
/// Only `Development` emits the curl diagnostic for outgoing requests.
/// Deserializes through [`FromStr`], so config values get the same
/// case-insensitive names and short forms as the CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Development,
    Test,
    #[default]
    Production,
}

impl RuntimeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeMode::Development => "development",
            RuntimeMode::Test => "test",
            RuntimeMode::Production => "production",
        }
    }

    pub fn emits_diagnostics(self) -> bool {
        matches!(self, RuntimeMode::Development)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeMode::Development),
            "test" => Ok(RuntimeMode::Test),
            "production" | "prod" => Ok(RuntimeMode::Production),
            other => Err(format!(
                "unknown runtime mode '{other}' (expected development, test or production)"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for RuntimeMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_development_emits_diagnostics() {
        assert!(RuntimeMode::Development.emits_diagnostics());
        assert!(!RuntimeMode::Test.emits_diagnostics());
        assert!(!RuntimeMode::Production.emits_diagnostics());
    }

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("dev".parse::<RuntimeMode>().unwrap(), RuntimeMode::Development);
        assert_eq!(" Production ".parse::<RuntimeMode>().unwrap(), RuntimeMode::Production);
        assert!("staging".parse::<RuntimeMode>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&RuntimeMode::Test).unwrap();
        assert_eq!(json, r#""test""#);
    }

    #[test]
    fn deserializes_like_from_str() {
        let mode: RuntimeMode = serde_json::from_str(r#""Development""#).unwrap();
        assert_eq!(mode, RuntimeMode::Development);
        let mode: RuntimeMode = serde_json::from_str(r#""prod""#).unwrap();
        assert_eq!(mode, RuntimeMode::Production);
        assert!(serde_json::from_str::<RuntimeMode>(r#""staging""#).is_err());
    }
}
