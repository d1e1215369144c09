//! Governor configuration with TOML file support.

use serde::{Deserialize, Serialize};

use qv_types::{AccountId, GovernanceParams};
use qv_utils::LogFormat;

use crate::GovernanceError;

/// Configuration for a [`Governor`](crate::Governor).
///
/// Can be loaded from a TOML file via [`GovernorConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Raw stake amounts in `[params]`
/// may be written as quoted decimal strings since they exceed TOML's integer
/// range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Account allowed to change quorum and cancel any unresolved proposal.
    /// `None` once the guardian abdicated or when governance starts without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian: Option<AccountId>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub params: GovernanceParams,
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, GovernanceError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GovernanceError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GovernanceError> {
        let config: Self = toml::from_str(s).map_err(|e| GovernanceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("GovernorConfig is always serializable to TOML")
    }

    pub fn validate(&self) -> Result<(), GovernanceError> {
        self.params.validate().map_err(GovernanceError::Config)
    }

    /// Install the global `tracing` subscriber described by this config.
    pub fn init_logging(&self) -> bool {
        qv_utils::init_logging(self.log_format, &self.log_level)
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            guardian: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            params: GovernanceParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qv_types::{whole_tokens, Ratio};
    use std::io::Write;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = GovernorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GovernorConfig::default());
        assert_eq!(config.params.quorum_votes, 632_000_000_000);
        assert_eq!(config.params.proposal_threshold, whole_tokens(100_000));
    }

    #[test]
    fn large_amounts_parse_from_strings() {
        let config = GovernorConfig::from_toml_str(
            r#"
            guardian = "guardian-multisig"
            log_format = "json"

            [params]
            proposal_threshold = "50_000_000_000_000_000_000_000"
            quorum_votes = 1000
            voting_period_blocks = 40

            [params.proposer_refund]
            succeeded = { numerator = 2, denominator = 1 }
            quorum_failed = { numerator = 1, denominator = 2 }
            canceled = { numerator = 1, denominator = 2 }
            "#,
        )
        .unwrap();

        assert_eq!(config.guardian, Some(AccountId::from("guardian-multisig")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.params.proposal_threshold, whole_tokens(50_000));
        assert_eq!(config.params.quorum_votes, 1000);
        assert_eq!(config.params.voting_period_blocks, 40);
        assert_eq!(config.params.proposer_refund.succeeded, Ratio::new(2, 1));
        assert_eq!(config.params.voting_delay_blocks, 1);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let err = GovernorConfig::from_toml_str("[params]\nvoting_period_blocks = 0\n").unwrap_err();
        assert!(matches!(err, GovernanceError::Config(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = GovernorConfig {
            guardian: Some(AccountId::from("guardian")),
            ..GovernorConfig::default()
        };
        let parsed = GovernorConfig::from_toml_str(&config.to_toml_string()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"\n[params]\nmax_attributes = 4").unwrap();

        let config = GovernorConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.params.max_attributes, 4);
        assert!(GovernorConfig::from_toml_file("/nonexistent/governor.toml").is_err());
    }
}
