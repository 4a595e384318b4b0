use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which landed response may write a store slot when requests overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingMode {
    /// Responses to superseded requests settle their busy flag but write no data.
    #[default]
    LatestRequest,
    /// Whatever lands last wins, even if it answers an older request.
    LastResponse,
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderingMode::LatestRequest => "latest-request",
            OrderingMode::LastResponse => "last-response",
        };
        f.write_str(label)
    }
}

/// Settings for a budget sync client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "ClientConfig::default_api_base")]
    pub api_base: String,
    #[serde(default = "ClientConfig::default_cache_busting")]
    pub cache_busting: bool,
    #[serde(default)]
    pub response_ordering: OrderingMode,
    /// `EnvFilter` directive, e.g. `budget_sync=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: Self::default_api_base(),
            cache_busting: Self::default_cache_busting(),
            response_ordering: OrderingMode::default(),
            log_filter: None,
        }
    }
}

impl ClientConfig {
    pub fn default_api_base() -> String {
        "api".into()
    }

    pub fn default_cache_busting() -> bool {
        true
    }

    /// Rejects values that cannot form a request path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .api_base
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, '?' | '#'))
        {
            return Err(ConfigError::Invalid {
                field: "api_base",
                reason: format!("`{}` is not a path prefix", self.api_base),
            });
        }
        if matches!(&self.log_filter, Some(filter) if filter.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "log_filter",
                reason: "filter directive is empty".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn ordering_uses_kebab_case() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"response_ordering":"last-response"}"#).expect("parse");
        assert_eq!(config.response_ordering, OrderingMode::LastResponse);
        assert_eq!(config.response_ordering.to_string(), "last-response");
    }

    #[test]
    fn query_characters_in_api_base_are_rejected() {
        let config = ClientConfig {
            api_base: "api?x=1".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "api_base", .. })
        ));
    }
}
