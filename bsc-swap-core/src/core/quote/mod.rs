//! Debounced quote engine
//!
//! Every request takes the next sequence number. A request only reaches the
//! swap helper once its debounce window passes with no newer request, and only
//! the latest issued sequence may move the visible [`QuoteState`].
//! Quote failures resolve to "no quote" and never propagate.

use crate::core::session::WalletSession;
use crate::domain::entities::quote::{Quote, QuoteOutcome, QuoteState};
use crate::domain::entities::token::TokenDescriptor;
use crate::shared::types::Amount;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct QuoteEngine {
    session: Arc<WalletSession>,
    debounce: Duration,
    sequence: AtomicU64,
    state: watch::Sender<QuoteState>,
}

impl QuoteEngine {
    pub fn new(session: Arc<WalletSession>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(QuoteState::Empty);
        Self {
            session,
            debounce,
            sequence: AtomicU64::new(0),
            state,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn latest_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn is_current_sequence(&self, sequence: u64) -> bool {
        self.latest_sequence() == sequence
    }

    /// Visible state. A ready quote from an earlier session epoch reads as empty.
    pub fn state(&self) -> QuoteState {
        match &*self.state.borrow() {
            QuoteState::Ready(quote) if quote.session_epoch != self.session.epoch() => QuoteState::Empty,
            state => state.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QuoteState> {
        self.state.subscribe()
    }

    /// The visible quote, if it is still backed by the latest request and
    /// the session it was fetched under.
    pub fn current_quote(&self) -> Option<Quote> {
        let state = self.state.borrow();
        state
            .quote()
            .filter(|quote| self.is_current_sequence(quote.sequence))
            .filter(|quote| quote.session_epoch == self.session.epoch())
            .cloned()
    }

    /// Invalidate anything in flight and reset the visible state.
    pub fn clear(&self) {
        let sequence = self.next_sequence();
        self.publish(sequence, QuoteState::Empty);
    }

    pub async fn request_quote(
        &self,
        amount_in: Amount,
        source: &TokenDescriptor,
        dest: &TokenDescriptor,
    ) -> QuoteOutcome {
        let sequence = self.next_sequence();

        if amount_in.is_zero() {
            self.publish(sequence, QuoteState::Empty);
            return QuoteOutcome::Empty;
        }

        if source.same_token(dest) {
            let reason = format!("Cannot quote {} against itself", source.symbol);
            self.publish(sequence, QuoteState::Unavailable { sequence, reason: reason.clone() });
            return QuoteOutcome::Unavailable(reason);
        }

        self.publish(sequence, QuoteState::Pending { sequence });
        tokio::time::sleep(self.debounce).await;
        if !self.is_current_sequence(sequence) {
            log::trace!("Quote request {} superseded during debounce", sequence);
            return QuoteOutcome::Superseded;
        }

        let snapshot = self.session.snapshot();
        let Some(client) = snapshot.client.clone() else {
            let reason = "Connect a wallet to get a quote".to_string();
            self.publish(sequence, QuoteState::Unavailable { sequence, reason: reason.clone() });
            return QuoteOutcome::Unavailable(reason);
        };

        let wrapped = client.wrapped_native();
        let token_in = source.address.contract_address(wrapped);
        let token_out = dest.address.contract_address(wrapped);
        log::debug!(
            "Quote {}: {} {} -> {}",
            sequence,
            amount_in,
            source.symbol,
            dest.symbol
        );
        let result = client.get_amount_out(token_in, token_out, amount_in).await;

        if !self.is_current_sequence(sequence) {
            log::debug!("Discarding stale quote response {}", sequence);
            return QuoteOutcome::Superseded;
        }
        if self.session.epoch() != snapshot.epoch {
            log::debug!("Session changed while quote {} was in flight", sequence);
            self.publish(sequence, QuoteState::Empty);
            return QuoteOutcome::Superseded;
        }

        match result {
            Ok(amount_out) => {
                let quote = Quote {
                    sequence,
                    session_epoch: snapshot.epoch,
                    amount_in,
                    amount_out,
                    source: source.clone(),
                    dest: dest.clone(),
                    quoted_at: Utc::now(),
                };
                self.publish(sequence, QuoteState::Ready(quote.clone()));
                QuoteOutcome::Ready(quote)
            }
            Err(err) => {
                log::warn!("Quote {} unavailable: {}", sequence, err);
                let reason = err.to_string();
                self.publish(sequence, QuoteState::Unavailable { sequence, reason: reason.clone() });
                QuoteOutcome::Unavailable(reason)
            }
        }
    }

    /// Run [`request_quote`](Self::request_quote) on its own task, the way
    /// keystroke handlers fire it.
    pub fn request_quote_detached(
        self: &Arc<Self>,
        amount_in: Amount,
        source: TokenDescriptor,
        dest: TokenDescriptor,
    ) -> JoinHandle<QuoteOutcome> {
        let engine = self.clone();
        tokio::spawn(async move { engine.request_quote(amount_in, &source, &dest).await })
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, sequence: u64, next: QuoteState) {
        self.state.send_if_modified(|state| {
            if !self.is_current_sequence(sequence) || *state == next {
                return false;
            }
            *state = next;
            true
        });
    }
}
