//! The covered put option state machine.
//!
//! One [`CoveredPutOption`] tracks a single contract from creation to
//! settlement, holding its escrowed premium and collateral until a terminal
//! transition releases them:
//!
//! ```text
//! create_as_buyer ──► WaitingForWriter ──fill_as_writer──┐
//!                         │ cancel                       ├──► Active
//! create_as_writer ──► WaitingForBuyer ──fill_as_buyer───┘      │
//!                         │ cancel                   exercise ──► Exercised
//!                         ▼                          reclaim ───► Expired
//!                     (deleted)
//! ```
//!
//! The state machine validates status, role, and escrow amounts. Market
//! timing, fee collection, and index maintenance are layered on top by the
//! trading venue, which drives these transitions inside one critical
//! section per operation.

use crate::error::{Error, Result};
use crate::escrow::{self, AssetKind, Funds};
use crate::ids::{AccountId, MarketId, OptionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a covered put option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionStatus {
    /// Created by a buyer; waiting for a writer to post collateral.
    WaitingForWriter,
    /// Created by a writer; waiting for a buyer to pay the premium.
    WaitingForBuyer,
    /// Fully matched; exercisable once the market enters its window.
    Active,
    /// Settled by the buyer delivering the underlying token.
    Exercised,
    /// Settled by the writer reclaiming escrow after expiration.
    Expired,
}

impl OptionStatus {
    /// Returns `true` for the two unmatched states.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::WaitingForWriter | Self::WaitingForBuyer)
    }

    /// Returns `true` for the two settled states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Exercised | Self::Expired)
    }
}

impl fmt::Display for OptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WaitingForWriter => "WaitingForWriter",
            Self::WaitingForBuyer => "WaitingForBuyer",
            Self::Active => "Active",
            Self::Exercised => "Exercised",
            Self::Expired => "Expired",
        };
        write!(f, "{name}")
    }
}

/// Economic terms of a covered put, fixed at creation.
///
/// The strike price is denominated in the trading asset per whole underlying
/// token; decimals are applied only when the underlying is delivered at
/// exercise. The two escrow legs must add up to the strike value exactly, so
/// the escrowed total always equals what the buyer is owed on exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutTerms {
    /// Trading-asset value per whole underlying token.
    pub strike_price: u64,
    /// Number of whole underlying tokens covered.
    pub underlying_amount: u64,
    /// Amount the buyer escrows as premium.
    pub premium_value: u64,
    /// Amount the writer escrows as collateral.
    pub collateral_value: u64,
}

impl PutTerms {
    /// Strike value of the whole contract, `strike_price * underlying_amount`.
    #[must_use]
    pub const fn notional(&self) -> u128 {
        self.strike_price as u128 * self.underlying_amount as u128
    }

    /// Trading fee one side owes at the given fee rate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MathOverflow`] when the fee computation overflows.
    pub fn fee(&self, fee_rate_bps: u64) -> Result<u64> {
        escrow::trading_fee(self.strike_price, self.underlying_amount, fee_rate_bps)
    }

    /// Checks the terms against the creation invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTerms`] when the strike price or amount is
    /// zero or the escrow legs do not add up to the strike value, and
    /// [`Error::MathOverflow`] when the strike value cannot be settled
    /// within the representable range.
    pub fn validate(&self) -> Result<()> {
        if self.strike_price == 0 {
            return Err(Error::invalid_terms("strike price must be positive"));
        }
        if self.underlying_amount == 0 {
            return Err(Error::invalid_terms("underlying amount must be positive"));
        }
        let escrow_total = u128::from(self.premium_value) + u128::from(self.collateral_value);
        if self.notional() != escrow_total {
            return Err(Error::invalid_terms(
                "premium plus collateral must equal strike price times amount",
            ));
        }
        if self.notional() > u128::from(u64::MAX) {
            return Err(Error::MathOverflow);
        }
        Ok(())
    }
}

/// One covered put contract and its escrowed balances.
///
/// The option holds value in two legs. The premium leg belongs to the side
/// the buyer funded, the collateral leg to the side the writer funded; both
/// stay inside the option until exercise, reclaim, or cancellation drains
/// them. Trading fees never enter the option: they are recorded here for
/// refund bookkeeping but move into the market's fee pool at payment time.
pub struct CoveredPutOption<K: AssetKind> {
    id: OptionId,
    market_id: MarketId,
    terms: PutTerms,
    status: OptionStatus,
    creator: AccountId,
    creator_is_buyer: bool,
    buyer: Option<AccountId>,
    writer: Option<AccountId>,
    premium_escrow: Funds<K>,
    collateral_escrow: Funds<K>,
    buyer_fee_paid: u64,
    writer_fee_paid: u64,
    listed_price: Option<u64>,
    created_at_ms: u64,
    status_changed_at_ms: u64,
}

impl<K: AssetKind> CoveredPutOption<K> {
    /// Opens an option as the buyer, escrowing the premium leg.
    ///
    /// # Arguments
    ///
    /// * `market_id` - Market the option trades in
    /// * `buyer` - Account creating the order
    /// * `terms` - Economic terms, validated against the creation invariants
    /// * `premium` - Net payment after the trading fee has been split off
    /// * `fee_paid` - Fee already charged to the market, recorded for refund
    /// * `now_ms` - Caller-supplied clock reading
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTerms`] or [`Error::MathOverflow`] for bad
    /// terms, and [`Error::PaymentMismatch`] when the escrowed premium does
    /// not equal the recorded premium value exactly.
    pub fn open_as_buyer(
        market_id: MarketId,
        buyer: AccountId,
        terms: PutTerms,
        premium: Funds<K>,
        fee_paid: u64,
        now_ms: u64,
    ) -> Result<Self> {
        terms.validate()?;
        if premium.value() != terms.premium_value {
            return Err(Error::payment_mismatch(terms.premium_value, premium.value()));
        }
        Ok(Self {
            id: OptionId::new(),
            market_id,
            terms,
            status: OptionStatus::WaitingForWriter,
            creator: buyer,
            creator_is_buyer: true,
            buyer: Some(buyer),
            writer: None,
            premium_escrow: premium,
            collateral_escrow: Funds::zero(),
            buyer_fee_paid: fee_paid,
            writer_fee_paid: 0,
            listed_price: None,
            created_at_ms: now_ms,
            status_changed_at_ms: now_ms,
        })
    }

    /// Opens an option as the writer, escrowing the collateral leg.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTerms`] or [`Error::MathOverflow`] for bad
    /// terms, and [`Error::PaymentMismatch`] when the escrowed collateral
    /// does not equal the recorded collateral value exactly.
    pub fn open_as_writer(
        market_id: MarketId,
        writer: AccountId,
        terms: PutTerms,
        collateral: Funds<K>,
        fee_paid: u64,
        now_ms: u64,
    ) -> Result<Self> {
        terms.validate()?;
        if collateral.value() != terms.collateral_value {
            return Err(Error::payment_mismatch(
                terms.collateral_value,
                collateral.value(),
            ));
        }
        Ok(Self {
            id: OptionId::new(),
            market_id,
            terms,
            status: OptionStatus::WaitingForBuyer,
            creator: writer,
            creator_is_buyer: false,
            buyer: None,
            writer: Some(writer),
            premium_escrow: Funds::zero(),
            collateral_escrow: collateral,
            buyer_fee_paid: 0,
            writer_fee_paid: fee_paid,
            listed_price: None,
            created_at_ms: now_ms,
            status_changed_at_ms: now_ms,
        })
    }

    /// Unique identifier of this option.
    #[must_use]
    pub const fn id(&self) -> OptionId {
        self.id
    }

    /// Market the option trades in.
    #[must_use]
    pub const fn market_id(&self) -> MarketId {
        self.market_id
    }

    /// Economic terms fixed at creation.
    #[must_use]
    pub const fn terms(&self) -> PutTerms {
        self.terms
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> OptionStatus {
        self.status
    }

    /// Account that created the order.
    #[must_use]
    pub const fn creator(&self) -> AccountId {
        self.creator
    }

    /// Whether the creator took the buyer side.
    #[must_use]
    pub const fn creator_is_buyer(&self) -> bool {
        self.creator_is_buyer
    }

    /// Recorded buyer, once one exists.
    #[must_use]
    pub const fn buyer(&self) -> Option<AccountId> {
        self.buyer
    }

    /// Recorded writer, once one exists.
    #[must_use]
    pub const fn writer(&self) -> Option<AccountId> {
        self.writer
    }

    /// Value currently held in the premium leg.
    #[must_use]
    pub const fn premium_balance(&self) -> u64 {
        self.premium_escrow.value()
    }

    /// Value currently held in the collateral leg.
    #[must_use]
    pub const fn collateral_balance(&self) -> u64 {
        self.collateral_escrow.value()
    }

    /// Trading fee the buyer side has paid into the market pool.
    #[must_use]
    pub const fn buyer_fee_paid(&self) -> u64 {
        self.buyer_fee_paid
    }

    /// Trading fee the writer side has paid into the market pool.
    #[must_use]
    pub const fn writer_fee_paid(&self) -> u64 {
        self.writer_fee_paid
    }

    /// Trading fee the creator's side paid, refundable on cancellation.
    #[must_use]
    pub const fn creator_fee_paid(&self) -> u64 {
        if self.creator_is_buyer {
            self.buyer_fee_paid
        } else {
            self.writer_fee_paid
        }
    }

    /// Secondary-market asking price. Reserved; no operation sets it.
    #[must_use]
    pub const fn listed_price(&self) -> Option<u64> {
        self.listed_price
    }

    /// Clock reading recorded at creation.
    #[must_use]
    pub const fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// Clock reading recorded at the most recent status change.
    #[must_use]
    pub const fn status_changed_at_ms(&self) -> u64 {
        self.status_changed_at_ms
    }

    /// Buyer and writer of a matched option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`] unless the option is active, which
    /// is the only state with both counterparties set.
    pub fn active_parties(&self) -> Result<(AccountId, AccountId)> {
        match (self.status, self.buyer, self.writer) {
            (OptionStatus::Active, Some(buyer), Some(writer)) => Ok((buyer, writer)),
            _ => Err(Error::invalid_status(OptionStatus::Active, self.status)),
        }
    }

    /// Matches a waiting-for-writer option, escrowing the collateral leg.
    ///
    /// The payment must cover the recorded collateral value; any excess is
    /// retained in escrow rather than refunded, and is paid out with the
    /// rest of the leg at settlement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`] unless the option is waiting for a
    /// writer, [`Error::InsufficientFunds`] when the payment is short, and
    /// [`Error::MathOverflow`] when the combined escrow would exceed the
    /// representable range.
    pub fn fill_as_writer(
        &mut self,
        writer: AccountId,
        collateral: Funds<K>,
        fee_paid: u64,
        now_ms: u64,
    ) -> Result<()> {
        if self.status != OptionStatus::WaitingForWriter {
            return Err(Error::invalid_status(OptionStatus::WaitingForWriter, self.status));
        }
        if collateral.value() < self.terms.collateral_value {
            return Err(Error::insufficient_funds(
                self.terms.collateral_value,
                collateral.value(),
            ));
        }
        self.ensure_escrow_capacity(collateral.value())?;
        self.collateral_escrow.join(collateral)?;
        self.writer = Some(writer);
        self.writer_fee_paid = fee_paid;
        self.set_status(OptionStatus::Active, now_ms);
        Ok(())
    }

    /// Matches a waiting-for-buyer option, escrowing the premium leg.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`] unless the option is waiting for a
    /// buyer, [`Error::InsufficientFunds`] when the payment is short, and
    /// [`Error::MathOverflow`] when the combined escrow would exceed the
    /// representable range.
    pub fn fill_as_buyer(
        &mut self,
        buyer: AccountId,
        premium: Funds<K>,
        fee_paid: u64,
        now_ms: u64,
    ) -> Result<()> {
        if self.status != OptionStatus::WaitingForBuyer {
            return Err(Error::invalid_status(OptionStatus::WaitingForBuyer, self.status));
        }
        if premium.value() < self.terms.premium_value {
            return Err(Error::insufficient_funds(
                self.terms.premium_value,
                premium.value(),
            ));
        }
        self.ensure_escrow_capacity(premium.value())?;
        self.premium_escrow.join(premium)?;
        self.buyer = Some(buyer);
        self.buyer_fee_paid = fee_paid;
        self.set_status(OptionStatus::Active, now_ms);
        Ok(())
    }

    /// Checks that the creator may cancel without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`] once a counterparty has filled the
    /// order, and [`Error::NotAuthorized`] when the caller is not the
    /// creator.
    pub fn ensure_cancellable(&self, caller: AccountId) -> Result<()> {
        if !self.status.is_pending() {
            let expected = if self.creator_is_buyer {
                OptionStatus::WaitingForWriter
            } else {
                OptionStatus::WaitingForBuyer
            };
            return Err(Error::invalid_status(expected, self.status));
        }
        if caller != self.creator {
            return Err(Error::not_authorized("creator"));
        }
        Ok(())
    }

    /// Cancels a still-pending order, draining its escrow back to the
    /// creator. The caller is expected to delete the record afterwards.
    ///
    /// # Errors
    ///
    /// Same conditions as [`CoveredPutOption::ensure_cancellable`].
    pub fn cancel(&mut self, caller: AccountId) -> Result<Funds<K>> {
        self.ensure_cancellable(caller)?;
        self.drain_escrow()
    }

    /// Settles an active option in the buyer's favor, draining both legs.
    ///
    /// The venue pays the drained escrow to the buyer and forwards the
    /// delivered underlying tokens to the writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`] unless the option is active and
    /// [`Error::NotAuthorized`] when the caller is not the recorded buyer.
    pub fn exercise(&mut self, caller: AccountId, now_ms: u64) -> Result<Funds<K>> {
        if self.status != OptionStatus::Active {
            return Err(Error::invalid_status(OptionStatus::Active, self.status));
        }
        if self.buyer != Some(caller) {
            return Err(Error::not_authorized("buyer"));
        }
        let escrow = self.drain_escrow()?;
        self.set_status(OptionStatus::Exercised, now_ms);
        Ok(escrow)
    }

    /// Settles an unexercised option in the writer's favor after expiry,
    /// draining both legs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStatus`] unless the option is active and
    /// [`Error::NotAuthorized`] when the caller is not the recorded writer.
    pub fn reclaim(&mut self, caller: AccountId, now_ms: u64) -> Result<Funds<K>> {
        if self.status != OptionStatus::Active {
            return Err(Error::invalid_status(OptionStatus::Active, self.status));
        }
        if self.writer != Some(caller) {
            return Err(Error::not_authorized("writer"));
        }
        let escrow = self.drain_escrow()?;
        self.set_status(OptionStatus::Expired, now_ms);
        Ok(escrow)
    }

    /// Snapshot of the option's current state.
    #[must_use]
    pub fn info(&self) -> OptionInfo {
        OptionInfo {
            id: self.id,
            market_id: self.market_id,
            status: self.status,
            terms: self.terms,
            creator: self.creator,
            creator_is_buyer: self.creator_is_buyer,
            buyer: self.buyer,
            writer: self.writer,
            premium_balance: self.premium_escrow.value(),
            collateral_balance: self.collateral_escrow.value(),
            buyer_fee_paid: self.buyer_fee_paid,
            writer_fee_paid: self.writer_fee_paid,
            listed_price: self.listed_price,
            created_at_ms: self.created_at_ms,
            status_changed_at_ms: self.status_changed_at_ms,
        }
    }

    fn set_status(&mut self, status: OptionStatus, now_ms: u64) {
        self.status = status;
        self.status_changed_at_ms = now_ms;
    }

    fn drain_escrow(&mut self) -> Result<Funds<K>> {
        let mut drained = self.premium_escrow.take_all();
        drained.join(self.collateral_escrow.take_all())?;
        Ok(drained)
    }

    fn ensure_escrow_capacity(&self, incoming: u64) -> Result<()> {
        let total = u128::from(self.premium_escrow.value())
            + u128::from(self.collateral_escrow.value())
            + u128::from(incoming);
        if total > u128::from(u64::MAX) {
            return Err(Error::MathOverflow);
        }
        Ok(())
    }
}

impl<K: AssetKind> fmt::Debug for CoveredPutOption<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoveredPutOption")
            .field("id", &self.id)
            .field("market_id", &self.market_id)
            .field("status", &self.status)
            .field("asset", &K::SYMBOL)
            .field("premium_balance", &self.premium_escrow.value())
            .field("collateral_balance", &self.collateral_escrow.value())
            .finish_non_exhaustive()
    }
}

/// Point-in-time snapshot of a [`CoveredPutOption`].
///
/// Snapshots are what the per-user order indexes store; they are refreshed
/// on every status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionInfo {
    /// Identifier of the option.
    pub id: OptionId,
    /// Market the option trades in.
    pub market_id: MarketId,
    /// Lifecycle state at snapshot time.
    pub status: OptionStatus,
    /// Economic terms fixed at creation.
    pub terms: PutTerms,
    /// Account that created the order.
    pub creator: AccountId,
    /// Whether the creator took the buyer side.
    pub creator_is_buyer: bool,
    /// Recorded buyer, if any.
    pub buyer: Option<AccountId>,
    /// Recorded writer, if any.
    pub writer: Option<AccountId>,
    /// Value held in the premium leg at snapshot time.
    pub premium_balance: u64,
    /// Value held in the collateral leg at snapshot time.
    pub collateral_balance: u64,
    /// Trading fee paid by the buyer side.
    pub buyer_fee_paid: u64,
    /// Trading fee paid by the writer side.
    pub writer_fee_paid: u64,
    /// Secondary-market asking price. Reserved; no operation sets it.
    pub listed_price: Option<u64>,
    /// Clock reading recorded at creation.
    pub created_at_ms: u64,
    /// Clock reading recorded at the most recent status change.
    pub status_changed_at_ms: u64,
}

impl fmt::Display for OptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "option {}: {}, strike {} x {}, premium {}, collateral {}",
            self.id,
            self.status,
            self.terms.strike_price,
            self.terms.underlying_amount,
            self.premium_balance,
            self.collateral_balance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Usdc;

    impl AssetKind for Usdc {
        const SYMBOL: &'static str = "USDC";
    }

    fn terms() -> PutTerms {
        PutTerms {
            strike_price: 10_000,
            underlying_amount: 1,
            premium_value: 5_000,
            collateral_value: 5_000,
        }
    }

    fn buyer_created() -> (CoveredPutOption<Usdc>, AccountId) {
        let buyer = AccountId::new();
        let option = CoveredPutOption::open_as_buyer(
            MarketId::new(),
            buyer,
            terms(),
            Funds::new(5_000),
            100,
            1_000,
        )
        .unwrap();
        (option, buyer)
    }

    #[test]
    fn test_terms_validation() {
        let mut bad = terms();
        bad.strike_price = 0;
        assert!(matches!(bad.validate(), Err(Error::InvalidTerms { .. })));

        let mut bad = terms();
        bad.underlying_amount = 0;
        assert!(matches!(bad.validate(), Err(Error::InvalidTerms { .. })));

        let mut bad = terms();
        bad.premium_value = 4_999;
        assert!(matches!(bad.validate(), Err(Error::InvalidTerms { .. })));

        assert!(terms().validate().is_ok());
    }

    #[test]
    fn test_terms_notional_too_large_to_settle() {
        let bad = PutTerms {
            strike_price: u64::MAX,
            underlying_amount: 2,
            premium_value: u64::MAX,
            collateral_value: u64::MAX,
        };
        assert_eq!(bad.validate(), Err(Error::MathOverflow));
    }

    #[test]
    fn test_open_as_buyer_sets_waiting_for_writer() {
        let (option, buyer) = buyer_created();
        assert_eq!(option.status(), OptionStatus::WaitingForWriter);
        assert_eq!(option.buyer(), Some(buyer));
        assert_eq!(option.writer(), None);
        assert_eq!(option.creator(), buyer);
        assert!(option.creator_is_buyer());
        assert_eq!(option.premium_balance(), 5_000);
        assert_eq!(option.collateral_balance(), 0);
        assert_eq!(option.buyer_fee_paid(), 100);
        assert_eq!(option.creator_fee_paid(), 100);
    }

    #[test]
    fn test_open_as_writer_sets_waiting_for_buyer() {
        let writer = AccountId::new();
        let option: CoveredPutOption<Usdc> = CoveredPutOption::open_as_writer(
            MarketId::new(),
            writer,
            terms(),
            Funds::new(5_000),
            100,
            1_000,
        )
        .unwrap();
        assert_eq!(option.status(), OptionStatus::WaitingForBuyer);
        assert_eq!(option.writer(), Some(writer));
        assert_eq!(option.buyer(), None);
        assert!(!option.creator_is_buyer());
        assert_eq!(option.collateral_balance(), 5_000);
        assert_eq!(option.premium_balance(), 0);
    }

    #[test]
    fn test_open_rejects_escrow_mismatch() {
        let err = CoveredPutOption::<Usdc>::open_as_buyer(
            MarketId::new(),
            AccountId::new(),
            terms(),
            Funds::new(4_999),
            100,
            1_000,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::PaymentMismatch {
                required: 5_000,
                provided: 4_999
            }
        );
    }

    #[test]
    fn test_fill_as_writer_activates() {
        let (mut option, buyer) = buyer_created();
        let writer = AccountId::new();
        option
            .fill_as_writer(writer, Funds::new(5_000), 100, 2_000)
            .unwrap();
        assert_eq!(option.status(), OptionStatus::Active);
        assert_eq!(option.buyer(), Some(buyer));
        assert_eq!(option.writer(), Some(writer));
        assert_eq!(option.collateral_balance(), 5_000);
        assert_eq!(option.writer_fee_paid(), 100);
        assert_eq!(option.status_changed_at_ms(), 2_000);
    }

    #[test]
    fn test_fill_retains_excess_payment() {
        let (mut option, _) = buyer_created();
        option
            .fill_as_writer(AccountId::new(), Funds::new(5_250), 100, 2_000)
            .unwrap();
        assert_eq!(option.collateral_balance(), 5_250);
    }

    #[test]
    fn test_fill_rejects_short_payment() {
        let (mut option, _) = buyer_created();
        let err = option
            .fill_as_writer(AccountId::new(), Funds::new(4_999), 100, 2_000)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientFunds {
                required: 5_000,
                available: 4_999
            }
        );
        assert_eq!(option.status(), OptionStatus::WaitingForWriter);
        assert_eq!(option.collateral_balance(), 0);
    }

    #[test]
    fn test_fill_rejects_wrong_status() {
        let (mut option, _) = buyer_created();
        let err = option
            .fill_as_buyer(AccountId::new(), Funds::new(5_000), 100, 2_000)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidStatus {
                expected: OptionStatus::WaitingForBuyer,
                actual: OptionStatus::WaitingForWriter
            }
        );
    }

    #[test]
    fn test_cancel_drains_escrow_to_creator() {
        let (mut option, buyer) = buyer_created();
        let refund = option.cancel(buyer).unwrap();
        assert_eq!(refund.value(), 5_000);
        assert_eq!(option.premium_balance(), 0);
    }

    #[test]
    fn test_cancel_rejects_non_creator() {
        let (mut option, _) = buyer_created();
        let err = option.cancel(AccountId::new()).unwrap_err();
        assert_eq!(err, Error::NotAuthorized { role: "creator" });
        assert_eq!(option.premium_balance(), 5_000);
    }

    #[test]
    fn test_cancel_rejects_matched_option() {
        let (mut option, buyer) = buyer_created();
        option
            .fill_as_writer(AccountId::new(), Funds::new(5_000), 100, 2_000)
            .unwrap();
        let err = option.cancel(buyer).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidStatus {
                expected: OptionStatus::WaitingForWriter,
                actual: OptionStatus::Active
            }
        );
    }

    #[test]
    fn test_exercise_pays_full_escrow() {
        let (mut option, buyer) = buyer_created();
        option
            .fill_as_writer(AccountId::new(), Funds::new(5_000), 100, 2_000)
            .unwrap();
        let escrow = option.exercise(buyer, 3_000).unwrap();
        assert_eq!(escrow.value(), 10_000);
        assert_eq!(option.status(), OptionStatus::Exercised);
        assert_eq!(option.premium_balance(), 0);
        assert_eq!(option.collateral_balance(), 0);
    }

    #[test]
    fn test_exercise_rejects_non_buyer() {
        let (mut option, _) = buyer_created();
        let writer = AccountId::new();
        option
            .fill_as_writer(writer, Funds::new(5_000), 100, 2_000)
            .unwrap();
        let err = option.exercise(writer, 3_000).unwrap_err();
        assert_eq!(err, Error::NotAuthorized { role: "buyer" });
        assert_eq!(option.status(), OptionStatus::Active);
    }

    #[test]
    fn test_reclaim_pays_full_escrow_to_writer_side() {
        let (mut option, _) = buyer_created();
        let writer = AccountId::new();
        option
            .fill_as_writer(writer, Funds::new(5_000), 100, 2_000)
            .unwrap();
        let escrow = option.reclaim(writer, 3_000).unwrap();
        assert_eq!(escrow.value(), 10_000);
        assert_eq!(option.status(), OptionStatus::Expired);
    }

    #[test]
    fn test_reclaim_rejects_non_writer() {
        let (mut option, buyer) = buyer_created();
        option
            .fill_as_writer(AccountId::new(), Funds::new(5_000), 100, 2_000)
            .unwrap();
        let err = option.reclaim(buyer, 3_000).unwrap_err();
        assert_eq!(err, Error::NotAuthorized { role: "writer" });
    }

    #[test]
    fn test_exercise_after_reclaim_fails_with_status() {
        let (mut option, buyer) = buyer_created();
        let writer = AccountId::new();
        option
            .fill_as_writer(writer, Funds::new(5_000), 100, 2_000)
            .unwrap();
        option.reclaim(writer, 3_000).unwrap();
        let err = option.exercise(buyer, 3_500).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidStatus {
                expected: OptionStatus::Active,
                actual: OptionStatus::Expired
            }
        );
    }

    #[test]
    fn test_info_snapshot_tracks_state() {
        let (mut option, buyer) = buyer_created();
        let before = option.info();
        assert_eq!(before.status, OptionStatus::WaitingForWriter);
        assert_eq!(before.premium_balance, 5_000);

        option
            .fill_as_writer(AccountId::new(), Funds::new(5_000), 100, 2_000)
            .unwrap();
        let after = option.info();
        assert_eq!(after.status, OptionStatus::Active);
        assert_eq!(after.collateral_balance, 5_000);
        assert_eq!(after.buyer, Some(buyer));
        assert_eq!(after.listed_price, None);
    }

    #[test]
    fn test_status_predicates() {
        assert!(OptionStatus::WaitingForWriter.is_pending());
        assert!(OptionStatus::WaitingForBuyer.is_pending());
        assert!(!OptionStatus::Active.is_pending());
        assert!(OptionStatus::Exercised.is_terminal());
        assert!(OptionStatus::Expired.is_terminal());
        assert!(!OptionStatus::Active.is_terminal());
    }
}
