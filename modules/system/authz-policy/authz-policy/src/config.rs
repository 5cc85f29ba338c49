//! Configuration for the authz_policy module.

use authz_policy_sdk::DEFAULT_MAX_EXPANSION_PASSES;
use serde::Deserialize;

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthzPolicyConfig {
    /// When `false`, every access decision is granted. Propagation still runs.
    pub enabled: bool,

    /// Pass cap for privilege expansion.
    pub max_expansion_passes: usize,

    /// A single propagation persisting more records than this is logged as a warning.
    pub large_propagation_threshold: usize,
}

impl Default for AuthzPolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_expansion_passes: DEFAULT_MAX_EXPANSION_PASSES,
            large_propagation_threshold: 500,
        }
    }
}

impl AuthzPolicyConfig {
    /// Parse the module's raw config block; a missing block yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on unknown fields, wrong types, or a zero pass cap.
    pub fn from_raw(raw: Option<&serde_json::Value>) -> anyhow::Result<Self> {
        let cfg: Self = match raw {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Self::default(),
        };
        if cfg.max_expansion_passes == 0 {
            anyhow::bail!("max_expansion_passes must be at least 1");
        }
        Ok(cfg)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_block_uses_defaults() {
        let cfg = AuthzPolicyConfig::from_raw(None).unwrap();
        assert!(cfg.enabled);
        assert_eq!(cfg.max_expansion_passes, DEFAULT_MAX_EXPANSION_PASSES);
        assert_eq!(cfg.large_propagation_threshold, 500);
    }

    #[test]
    fn partial_block_keeps_other_defaults() {
        let raw = json!({ "enabled": false });
        let cfg = AuthzPolicyConfig::from_raw(Some(&raw)).unwrap();
        assert!(!cfg.enabled);
        assert_eq!(cfg.max_expansion_passes, DEFAULT_MAX_EXPANSION_PASSES);
    }

    #[test]
    fn rejects_unknown_fields_and_zero_cap() {
        let raw = json!({ "unexpected": true });
        assert!(AuthzPolicyConfig::from_raw(Some(&raw)).is_err());

        let raw = json!({ "max_expansion_passes": 0 });
        assert!(AuthzPolicyConfig::from_raw(Some(&raw)).is_err());
    }

    #[test]
    fn parses_yaml() {
        let yaml = r"
enabled: true
max_expansion_passes: 16
large_propagation_threshold: 50
";
        let cfg: AuthzPolicyConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(cfg.max_expansion_passes, 16);
        assert_eq!(cfg.large_propagation_threshold, 50);
    }
}
