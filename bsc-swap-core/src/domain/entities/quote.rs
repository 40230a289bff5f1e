//! Quote entity for the swap core

use crate::domain::entities::token::TokenDescriptor;
use crate::domain::entities::intent::{min_output_amount, SlippageTolerance};
use crate::shared::error::SwapError;
use crate::shared::types::Amount;
use crate::shared::utils::amount_to_f64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output estimate for one quote request. Superseded by any later request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub sequence: u64,
    /// Session epoch the quote was fetched under.
    pub session_epoch: u64,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub source: TokenDescriptor,
    pub dest: TokenDescriptor,
    pub quoted_at: DateTime<Utc>,
}

impl Quote {
    pub fn is_empty(&self) -> bool {
        self.amount_in.is_zero() || self.amount_out.is_zero()
    }

    /// Units of `dest` per unit of `source`. Display only.
    pub fn execution_price(&self) -> f64 {
        let amount_in = amount_to_f64(self.amount_in, self.source.decimals);
        if amount_in == 0.0 {
            return 0.0;
        }
        amount_to_f64(self.amount_out, self.dest.decimals) / amount_in
    }

    pub fn minimum_received(&self, slippage: SlippageTolerance) -> Amount {
        min_output_amount(self.amount_out, slippage)
    }
}

/// Input/output token selection. The two sides must differ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradePair {
    pub source: TokenDescriptor,
    pub dest: TokenDescriptor,
}

impl TradePair {
    pub fn new(source: TokenDescriptor, dest: TokenDescriptor) -> Result<Self, SwapError> {
        if source.same_token(&dest) {
            return Err(SwapError::validation(format!(
                "Input and output token must differ: {}",
                source.symbol
            )));
        }
        Ok(Self { source, dest })
    }

    pub fn flipped(&self) -> Self {
        Self { source: self.dest.clone(), dest: self.source.clone() }
    }
}

/// Visible quote state. Only the latest issued request may move it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QuoteState {
    #[default]
    Empty,
    Pending { sequence: u64 },
    Ready(Quote),
    Unavailable { sequence: u64, reason: String },
}

impl QuoteState {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            QuoteState::Ready(quote) => Some(quote),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, QuoteState::Pending { .. })
    }
}

/// What a single `request_quote` call resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Ready(Quote),
    /// Zero or empty input; nothing was fetched.
    Empty,
    /// The quoting call failed. Non-fatal.
    Unavailable(String),
    /// A newer request or a session change made this one obsolete.
    Superseded,
}

impl QuoteOutcome {
    pub fn into_quote(self) -> Option<Quote> {
        match self {
            QuoteOutcome::Ready(quote) => Some(quote),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::token::TokenRegistry;

    fn quote(amount_in: u64, amount_out: u64) -> Quote {
        let registry = TokenRegistry::testnet();
        Quote {
            sequence: 1,
            session_epoch: 0,
            amount_in: Amount::from(amount_in),
            amount_out: Amount::from(amount_out),
            source: registry.by_symbol("BNB").unwrap().clone(),
            dest: registry.by_symbol("BUSD").unwrap().clone(),
            quoted_at: Utc::now(),
        }
    }

    #[test]
    fn test_execution_price() {
        let q = quote(1_000_000_000_000_000_000, 1_980_000_000_000_000_000);
        assert!((q.execution_price() - 1.98).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_received() {
        let q = quote(1_000_000_000_000_000_000, 1_980_000_000_000_000_000);
        let slippage = SlippageTolerance::from_bps(50).unwrap();
        assert_eq!(q.minimum_received(slippage), Amount::from(1_970_100_000_000_000_000u64));
    }

    #[test]
    fn test_empty_quote() {
        assert!(quote(0, 0).is_empty());
        assert!(quote(10, 0).is_empty());
        assert!(!quote(10, 20).is_empty());
        assert_eq!(quote(0, 0).execution_price(), 0.0);
    }

    #[test]
    fn test_trade_pair() {
        let registry = TokenRegistry::testnet();
        let bnb = registry.by_symbol("BNB").unwrap().clone();
        let usdt = registry.by_symbol("USDT").unwrap().clone();
        let pair = TradePair::new(bnb.clone(), usdt.clone()).unwrap();
        let flipped = pair.flipped();
        assert_eq!(flipped.source, usdt);
        assert_eq!(flipped.dest, bnb);
        assert!(TradePair::new(bnb.clone(), bnb.clone()).is_err());

        let wbnb = registry.by_symbol("WBNB").unwrap().clone();
        assert!(TradePair::new(bnb.clone(), wbnb.clone()).is_err());
        assert!(TradePair::new(wbnb, bnb).is_err());
    }

    #[test]
    fn test_quote_state_accessors() {
        let q = quote(10, 20);
        assert_eq!(QuoteState::Ready(q.clone()).quote(), Some(&q));
        assert!(QuoteState::Pending { sequence: 3 }.is_pending());
        assert!(QuoteState::Empty.quote().is_none());
        assert_eq!(QuoteOutcome::Superseded.into_quote(), None);
    }
}
