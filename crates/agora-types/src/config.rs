//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{AUTO_RELEASE_GRACE_SECS, DEFAULT_FEE_RATE_BPS, FEE_CAP_BPS};
use crate::{AgoraError, Result};

/// Tunable knobs for a marketplace deployment.
///
/// The grace period is configurable for deployments (short in test
/// environments, the 7-day default in production); the fee cap is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Initial platform fee rate in basis points, `0..=1000`.
    pub fee_rate_bps: u16,
    /// Seconds after an escrow locks before auto-release may fire.
    pub grace_period_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_rate_bps: DEFAULT_FEE_RATE_BPS,
            grace_period_secs: AUTO_RELEASE_GRACE_SECS,
        }
    }
}

impl EngineConfig {
    /// Reject rates above the cap and non-positive grace periods.
    pub fn validate(&self) -> Result<()> {
        if self.fee_rate_bps > FEE_CAP_BPS {
            return Err(AgoraError::FeeAboveCap {
                bps: self.fee_rate_bps,
                cap: FEE_CAP_BPS,
            });
        }
        if self.grace_period_secs <= 0 {
            return Err(AgoraError::Internal(
                "grace period must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.fee_rate_bps, 250);
        assert_eq!(cfg.grace_period_secs, 7 * 24 * 60 * 60);
    }

    #[test]
    fn over_cap_rate_rejected() {
        let cfg = EngineConfig {
            fee_rate_bps: 1_500,
            ..EngineConfig::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            AgoraError::FeeAboveCap { .. }
        ));
    }

    #[test]
    fn zero_grace_rejected() {
        let cfg = EngineConfig {
            grace_period_secs: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
