//! Platform fee model.
//!
//! Fees are expressed in basis points (10 000 bps = 100%) and capped at
//! 1 000 bps. The split is computed at settlement time with the rate in
//! effect *then* — escrows locked under an older rate settle under the
//! current one. `fee + seller_amount == amount` holds exactly for every
//! split.

use serde::{Deserialize, Serialize};

use crate::constants::{BASIS_POINTS_DIVISOR, FEE_CAP_BPS};
use crate::{AgentId, AgoraError, Result};

/// The fee rate and payout target in effect for future settlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Platform fee in basis points, `0..=1000`.
    pub rate_bps: u16,
    /// Where collected fees are paid out.
    pub recipient: AgentId,
}

/// The exact division of a locked amount at settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub fee: u64,
    pub seller_amount: u64,
}

impl FeeSchedule {
    /// Build a schedule, enforcing the cap and a real recipient.
    pub fn new(rate_bps: u16, recipient: AgentId) -> Result<Self> {
        if rate_bps > FEE_CAP_BPS {
            return Err(AgoraError::FeeAboveCap {
                bps: rate_bps,
                cap: FEE_CAP_BPS,
            });
        }
        if recipient.is_nil() {
            return Err(AgoraError::NilAddress);
        }
        Ok(Self {
            rate_bps,
            recipient,
        })
    }

    /// `floor(amount * rate_bps / 10_000)`, widened to avoid overflow.
    #[must_use]
    pub fn fee_for(&self, amount: u64) -> u64 {
        let fee = u128::from(amount) * u128::from(self.rate_bps) / u128::from(BASIS_POINTS_DIVISOR);
        u64::try_from(fee).expect("fee never exceeds the amount it was computed from")
    }

    /// Split a locked amount into fee and seller payout.
    #[must_use]
    pub fn split(&self, amount: u64) -> FeeSplit {
        let fee = self.fee_for(amount);
        FeeSplit {
            fee,
            seller_amount: amount - fee,
        }
    }
}
