//! Swap intent and slippage tolerance

use crate::domain::entities::quote::Quote;
use crate::domain::entities::token::TokenDescriptor;
use crate::shared::constants::{BPS_DENOMINATOR, DEFAULT_SLIPPAGE_BPS};
use crate::shared::error::SwapError;
use crate::shared::types::{Address, Amount};
use crate::shared::utils::percent_to_bps;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Slippage tolerance in basis points, always below 100%
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlippageTolerance(u32);

impl SlippageTolerance {
    pub fn from_bps(bps: u32) -> Result<Self, SwapError> {
        if bps >= BPS_DENOMINATOR {
            return Err(SwapError::validation(format!(
                "Slippage must be below 100%, got {} bps",
                bps
            )));
        }
        Ok(Self(bps))
    }

    pub fn from_percent(percent: f64) -> Result<Self, SwapError> {
        Self::from_bps(percent_to_bps(percent)?)
    }

    pub fn bps(&self) -> u32 {
        self.0
    }

    pub fn percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for SlippageTolerance {
    fn default() -> Self {
        Self(DEFAULT_SLIPPAGE_BPS)
    }
}

/// `quoted * (1 - bps / 10000)`, rounded down.
///
/// Splits `quoted` around the denominator so the multiplication cannot
/// overflow even for `U256::MAX`.
pub fn min_output_amount(quoted: Amount, slippage: SlippageTolerance) -> Amount {
    let denominator = Amount::from(BPS_DENOMINATOR);
    let keep = Amount::from(BPS_DENOMINATOR - slippage.bps());
    let whole = quoted / denominator;
    let rest = quoted % denominator;
    whole * keep + rest * keep / denominator
}

/// A fully-specified swap, built right before submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwapIntent {
    pub id: Uuid,
    pub source: TokenDescriptor,
    pub dest: TokenDescriptor,
    pub amount_in: Amount,
    pub quoted_output: Amount,
    pub min_output: Amount,
    pub slippage: SlippageTolerance,
    pub recipient: Address,
    pub quote_sequence: u64,
    pub session_epoch: u64,
}

impl SwapIntent {
    pub fn from_quote(
        quote: &Quote,
        slippage: SlippageTolerance,
        recipient: Address,
    ) -> Result<Self, SwapError> {
        if quote.amount_in.is_zero() {
            return Err(SwapError::validation("Input amount must be greater than zero"));
        }
        if quote.amount_out.is_zero() {
            return Err(SwapError::quote_unavailable("Quote has no output amount"));
        }
        if quote.source.same_token(&quote.dest) {
            return Err(SwapError::validation("Input and output token must differ"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            source: quote.source.clone(),
            dest: quote.dest.clone(),
            amount_in: quote.amount_in,
            quoted_output: quote.amount_out,
            min_output: min_output_amount(quote.amount_out, slippage),
            slippage,
            recipient,
            quote_sequence: quote.sequence,
            session_epoch: quote.session_epoch,
        })
    }
}
