//! Trading venue orchestration.
//!
//! A [`TradingVenue`] owns one order book, the markets it covers, every
//! option record, and the per-user order indexes, and exposes the public
//! trading operations. Each operation runs inside a single write critical
//! section: it validates market state, drives the option state machine,
//! performs the matching order book move, and refreshes user order
//! snapshots, so no caller can ever observe escrow and index state that
//! disagree. Events are published after the critical section ends.
//!
//! ## Architecture
//!
//! ```text
//! TradingVenueManager (registry, one per asset kind)
//!   └── TradingVenue (per venue name)
//!         ├── OrderBook (stage-bucketed option index)
//!         ├── Market (per pre-listing token)
//!         ├── CoveredPutOption (one per contract)
//!         └── UserOrders (per participant)
//! ```

use crate::error::{Error, Result};
use crate::escrow::{self, AssetKind, Funds, Payout};
use crate::events::{EventKind, EventSink, LogSink, TradeEvent};
use crate::ids::{AccountId, BookId, MarketId, OptionId};
use crate::trading::book::{BookStats, OrderBook};
use crate::trading::market::{Market, MarketInfo};
use crate::trading::option::{CoveredPutOption, OptionInfo, OptionStatus, PutTerms};
use crate::trading::orders::UserOrders;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Everything a venue mutates, behind one lock.
struct VenueState<K: AssetKind> {
    book: OrderBook,
    markets: HashMap<MarketId, Market<K>>,
    options: HashMap<OptionId, CoveredPutOption<K>>,
    user_orders: HashMap<AccountId, UserOrders>,
}

/// The two settlement legs produced by exercising an option.
///
/// The strike payout carries the full escrowed premium and collateral to the
/// exercising buyer; the underlying delivery forwards the buyer's token
/// payment, excess included, to the writer.
#[must_use]
pub struct ExerciseSettlement<K: AssetKind, U: AssetKind> {
    strike_payout: Payout<K>,
    underlying_delivery: Payout<U>,
}

impl<K: AssetKind, U: AssetKind> ExerciseSettlement<K, U> {
    /// Escrowed premium plus collateral, owed to the buyer.
    #[must_use]
    pub const fn strike_payout(&self) -> &Payout<K> {
        &self.strike_payout
    }

    /// Delivered underlying tokens, owed to the writer.
    #[must_use]
    pub const fn underlying_delivery(&self) -> &Payout<U> {
        &self.underlying_delivery
    }

    /// Splits the settlement into its two payout legs.
    pub fn into_parts(self) -> (Payout<K>, Payout<U>) {
        (self.strike_payout, self.underlying_delivery)
    }
}

impl<K: AssetKind, U: AssetKind> fmt::Debug for ExerciseSettlement<K, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExerciseSettlement")
            .field("strike_payout", &self.strike_payout)
            .field("underlying_delivery", &self.underlying_delivery)
            .finish()
    }
}

/// A covered put marketplace for one trading asset.
///
/// Created with an administrator account that alone may configure markets
/// and withdraw fees. All trading operations take the caller's identity and
/// a caller-supplied millisecond clock reading; the venue never samples a
/// wall clock of its own.
pub struct TradingVenue<K: AssetKind> {
    name: String,
    admin: AccountId,
    sink: Arc<dyn EventSink>,
    state: RwLock<VenueState<K>>,
}

impl<K: AssetKind> TradingVenue<K> {
    /// Creates a venue that publishes events through [`LogSink`].
    #[must_use]
    pub fn new(name: impl Into<String>, admin: AccountId) -> Self {
        Self::with_sink(name, admin, Arc::new(LogSink))
    }

    /// Creates a venue with a custom event sink.
    #[must_use]
    pub fn with_sink(name: impl Into<String>, admin: AccountId, sink: Arc<dyn EventSink>) -> Self {
        let name = name.into();
        Self {
            state: RwLock::new(VenueState {
                book: OrderBook::new(&name),
                markets: HashMap::new(),
                options: HashMap::new(),
                user_orders: HashMap::new(),
            }),
            name,
            admin,
            sink,
        }
    }

    /// Venue name, also the label of its order book.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Account holding the administrator role.
    #[must_use]
    pub const fn admin(&self) -> AccountId {
        self.admin
    }

    /// Identifier of the venue's order book.
    #[must_use]
    pub fn book_id(&self) -> BookId {
        self.read_state().book.id()
    }

    /// Creates a market for one pre-listing token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] unless the caller is the
    /// administrator.
    pub fn create_market(
        &self,
        caller: AccountId,
        name: impl Into<String>,
        fee_rate_bps: u64,
        minimum_trading_value: u64,
        now_ms: u64,
    ) -> Result<MarketId> {
        self.ensure_admin(caller)?;
        let market = Market::new(name, fee_rate_bps, minimum_trading_value, now_ms);
        let market_id = market.id();
        let mut guard = self.write_state();
        guard.book.register_market(market_id);
        guard.markets.insert(market_id, market);
        drop(guard);
        debug!(
            target: "premarket_options::venue",
            venue = %self.name,
            market = %market_id,
            fee_rate_bps,
            minimum_trading_value,
            "market created"
        );
        Ok(market_id)
    }

    /// Sets or replaces a market's listing schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] unless the caller is the
    /// administrator, [`Error::MarketNotFound`] for an unknown market, and
    /// [`Error::InvalidSchedule`] when the instants are not strictly
    /// ordered after `now_ms`.
    pub fn set_market_schedule(
        &self,
        caller: AccountId,
        market_id: MarketId,
        exercise_at_ms: u64,
        expire_at_ms: u64,
        now_ms: u64,
    ) -> Result<()> {
        self.ensure_admin(caller)?;
        let mut guard = self.write_state();
        let market = guard
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| Error::market_not_found(market_id))?;
        market.set_schedule(exercise_at_ms, expire_at_ms, now_ms)?;
        drop(guard);
        debug!(
            target: "premarket_options::venue",
            market = %market_id,
            exercise_at_ms,
            expire_at_ms,
            "listing schedule set"
        );
        Ok(())
    }

    /// Binds the underlying token a market settles in at exercise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] unless the caller is the
    /// administrator and [`Error::MarketNotFound`] for an unknown market.
    pub fn bind_underlying(
        &self,
        caller: AccountId,
        market_id: MarketId,
        symbol: impl Into<String>,
        decimals: u8,
    ) -> Result<()> {
        self.ensure_admin(caller)?;
        let symbol = symbol.into();
        let mut guard = self.write_state();
        let market = guard
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| Error::market_not_found(market_id))?;
        market.bind_underlying(&symbol, decimals);
        drop(guard);
        debug!(
            target: "premarket_options::venue",
            market = %market_id,
            symbol,
            decimals,
            "underlying bound"
        );
        Ok(())
    }

    /// Drains a market's accumulated trading fees to the administrator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthorized`] unless the caller is the
    /// administrator and [`Error::MarketNotFound`] for an unknown market.
    pub fn withdraw_fees(&self, caller: AccountId, market_id: MarketId) -> Result<Payout<K>> {
        self.ensure_admin(caller)?;
        let mut guard = self.write_state();
        let market = guard
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| Error::market_not_found(market_id))?;
        let fees = market.drain_fees();
        drop(guard);
        debug!(
            target: "premarket_options::venue",
            market = %market_id,
            amount = fees.value(),
            "fees withdrawn"
        );
        Ok(fees.into_payout(caller))
    }

    /// Creates a put order on the buyer side.
    ///
    /// The payment must equal the premium plus the trading fee exactly; the
    /// fee moves into the market's pool immediately and the premium is
    /// escrowed in the new option, which waits for a writer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarketNotFound`] for an unknown market,
    /// [`Error::MarketNotActive`] past the listing event,
    /// [`Error::InvalidTerms`] or [`Error::MathOverflow`] for bad terms,
    /// and [`Error::PaymentMismatch`] when the payment is not exact.
    pub fn create_put_as_buyer(
        &self,
        caller: AccountId,
        market_id: MarketId,
        terms: PutTerms,
        payment: Funds<K>,
        now_ms: u64,
    ) -> Result<OptionId> {
        self.create_put(caller, market_id, terms, payment, true, now_ms)
    }

    /// Creates a put order on the writer side.
    ///
    /// The payment must equal the collateral plus the trading fee exactly,
    /// and the collateral must meet the market's minimum trading value. The
    /// new option waits for a buyer.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TradingVenue::create_put_as_buyer`], plus
    /// [`Error::TradeBelowMinimum`] when the collateral is too small.
    pub fn create_put_as_writer(
        &self,
        caller: AccountId,
        market_id: MarketId,
        terms: PutTerms,
        payment: Funds<K>,
        now_ms: u64,
    ) -> Result<OptionId> {
        self.create_put(caller, market_id, terms, payment, false, now_ms)
    }

    fn create_put(
        &self,
        caller: AccountId,
        market_id: MarketId,
        terms: PutTerms,
        mut payment: Funds<K>,
        as_buyer: bool,
        now_ms: u64,
    ) -> Result<OptionId> {
        let mut guard = self.write_state();
        let state = &mut *guard;
        let book_id = state.book.id();
        let market = state
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| Error::market_not_found(market_id))?;
        market.ensure_active(now_ms)?;
        terms.validate()?;
        if !as_buyer {
            market.ensure_minimum_trade(terms.collateral_value)?;
        }

        let side_value = if as_buyer {
            terms.premium_value
        } else {
            terms.collateral_value
        };
        let fee = terms.fee(market.fee_rate_bps())?;
        let required = side_value.checked_add(fee).ok_or(Error::MathOverflow)?;
        if payment.value() != required {
            return Err(Error::payment_mismatch(required, payment.value()));
        }

        // The maker's payment is exact, so the escrowed remainder equals the
        // side's recorded value and construction below cannot fail.
        let fee_funds = payment.split(fee)?;
        market.charge_fee(fee_funds)?;
        let option = if as_buyer {
            market.record_premium(terms.premium_value);
            CoveredPutOption::open_as_buyer(market_id, caller, terms, payment, fee, now_ms)?
        } else {
            market.record_collateral(terms.collateral_value);
            CoveredPutOption::open_as_writer(market_id, caller, terms, payment, fee, now_ms)?
        };

        let option_id = option.id();
        let status = option.status();
        let info = option.info();
        state.book.insert(status, option_id)?;
        state.options.insert(option_id, option);
        Self::upsert_snapshots(&mut state.user_orders, book_id, &info);
        drop(guard);

        self.publish(Self::trade_event(EventKind::Created, caller, &info, now_ms));
        Ok(option_id)
    }

    /// Fills a waiting-for-writer order, posting collateral.
    ///
    /// The payment must cover the collateral plus the recomputed trading
    /// fee; any excess beyond the fee stays escrowed in the option and is
    /// paid out with the collateral leg at settlement.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OptionNotFound`] for an unknown option,
    /// [`Error::InvalidStatus`] unless the option waits for a writer,
    /// [`Error::MarketNotActive`] past the listing event, and
    /// [`Error::InsufficientFunds`] when the payment is short.
    pub fn fill_put_as_writer(
        &self,
        caller: AccountId,
        option_id: OptionId,
        payment: Funds<K>,
        now_ms: u64,
    ) -> Result<()> {
        self.fill_put(caller, option_id, payment, false, now_ms)
    }

    /// Fills a waiting-for-buyer order, paying the premium.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TradingVenue::fill_put_as_writer`], expecting a
    /// waiting-for-buyer option instead.
    pub fn fill_put_as_buyer(
        &self,
        caller: AccountId,
        option_id: OptionId,
        payment: Funds<K>,
        now_ms: u64,
    ) -> Result<()> {
        self.fill_put(caller, option_id, payment, true, now_ms)
    }

    fn fill_put(
        &self,
        caller: AccountId,
        option_id: OptionId,
        mut payment: Funds<K>,
        as_buyer: bool,
        now_ms: u64,
    ) -> Result<()> {
        let expected_status = if as_buyer {
            OptionStatus::WaitingForBuyer
        } else {
            OptionStatus::WaitingForWriter
        };

        let mut guard = self.write_state();
        let state = &mut *guard;
        let book_id = state.book.id();
        let option = state
            .options
            .get_mut(&option_id)
            .ok_or_else(|| Error::option_not_found(option_id))?;
        if option.status() != expected_status {
            return Err(Error::invalid_status(expected_status, option.status()));
        }
        let market_id = option.market_id();
        let market = state
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| Error::market_not_found(market_id))?;
        market.ensure_active(now_ms)?;

        let terms = option.terms();
        let side_value = if as_buyer {
            terms.premium_value
        } else {
            terms.collateral_value
        };
        let fee = terms.fee(market.fee_rate_bps())?;
        let required = side_value.checked_add(fee).ok_or(Error::MathOverflow)?;
        if payment.value() < required {
            return Err(Error::insufficient_funds(required, payment.value()));
        }
        let escrowed = payment.value() - fee;
        let held = u128::from(option.premium_balance()) + u128::from(option.collateral_balance());
        if held + u128::from(escrowed) > u128::from(u64::MAX) {
            return Err(Error::MathOverflow);
        }

        // All validations passed; the mutations below cannot fail.
        let fee_funds = payment.split(fee)?;
        market.charge_fee(fee_funds)?;
        if as_buyer {
            market.record_premium(terms.premium_value);
            option.fill_as_buyer(caller, payment, fee, now_ms)?;
        } else {
            market.record_collateral(terms.collateral_value);
            option.fill_as_writer(caller, payment, fee, now_ms)?;
        }
        market.option_activated();

        let info = option.info();
        state
            .book
            .transition(option_id, expected_status, OptionStatus::Active)?;
        Self::upsert_snapshots(&mut state.user_orders, book_id, &info);
        drop(guard);

        self.publish(Self::trade_event(EventKind::Filled, caller, &info, now_ms));
        Ok(())
    }

    /// Cancels a still-pending order, refunding escrow and fee to the
    /// creator and deleting the record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OptionNotFound`] for an unknown option,
    /// [`Error::InvalidStatus`] once a counterparty has filled,
    /// [`Error::NotAuthorized`] when the caller is not the creator, and
    /// [`Error::InsufficientFunds`] when the market pool no longer holds
    /// the fee to refund.
    pub fn cancel_put(
        &self,
        caller: AccountId,
        option_id: OptionId,
        now_ms: u64,
    ) -> Result<Payout<K>> {
        let mut guard = self.write_state();
        let state = &mut *guard;
        let option = state
            .options
            .get_mut(&option_id)
            .ok_or_else(|| Error::option_not_found(option_id))?;
        option.ensure_cancellable(caller)?;

        let status = option.status();
        let fee_paid = option.creator_fee_paid();
        let info = option.info();
        let held = u128::from(option.premium_balance()) + u128::from(option.collateral_balance());
        if held + u128::from(fee_paid) > u128::from(u64::MAX) {
            return Err(Error::MathOverflow);
        }
        let market_id = option.market_id();
        let market = state
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| Error::market_not_found(market_id))?;

        // Taking the fee back out of the pool is the last fallible step; it
        // runs before any option or index mutation.
        let fee_refund = market.refund_fee(fee_paid)?;
        let mut refund = option.cancel(caller)?;
        refund.join(fee_refund)?;

        state.book.remove(status, option_id)?;
        state.options.remove(&option_id);
        if let Some(orders) = state.user_orders.get_mut(&caller) {
            orders.remove_maker(option_id);
        }
        drop(guard);

        self.publish(Self::trade_event(EventKind::Cancelled, caller, &info, now_ms));
        Ok(refund.into_payout(caller))
    }

    /// Exercises an active option inside the market's exercise window.
    ///
    /// The buyer delivers the underlying token; the whole delivery, excess
    /// included, is forwarded to the writer, and the escrowed premium plus
    /// collateral is paid out to the buyer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OptionNotFound`] for an unknown option,
    /// [`Error::InvalidStatus`] unless the option is active,
    /// [`Error::NotAuthorized`] when the caller is not the buyer,
    /// [`Error::MarketNotExercisable`] outside the window,
    /// [`Error::UnderlyingNotBound`] before an underlying is bound,
    /// [`Error::UnderlyingMismatch`] when `U` is not the bound token, and
    /// [`Error::InsufficientFunds`] when too few units are delivered.
    pub fn exercise_put<U: AssetKind>(
        &self,
        caller: AccountId,
        option_id: OptionId,
        payment: Funds<U>,
        now_ms: u64,
    ) -> Result<ExerciseSettlement<K, U>> {
        let mut guard = self.write_state();
        let state = &mut *guard;
        let book_id = state.book.id();
        let option = state
            .options
            .get_mut(&option_id)
            .ok_or_else(|| Error::option_not_found(option_id))?;
        let (buyer, writer) = option.active_parties()?;
        if buyer != caller {
            return Err(Error::not_authorized("buyer"));
        }
        let market_id = option.market_id();
        let market = state
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| Error::market_not_found(market_id))?;
        market.ensure_exercisable(now_ms)?;
        let underlying = market.underlying().ok_or(Error::UnderlyingNotBound)?;
        if underlying.symbol != U::SYMBOL {
            return Err(Error::underlying_mismatch(&underlying.symbol, U::SYMBOL));
        }
        let required_units =
            escrow::underlying_units(option.terms().underlying_amount, underlying.decimals)?;
        if payment.value() < required_units {
            return Err(Error::insufficient_funds(required_units, payment.value()));
        }

        let escrow_funds = option.exercise(caller, now_ms)?;
        market.option_closed();
        let info = option.info();
        state
            .book
            .transition(option_id, OptionStatus::Active, OptionStatus::Exercised)?;
        Self::upsert_snapshots(&mut state.user_orders, book_id, &info);
        drop(guard);

        self.publish(Self::trade_event(EventKind::Exercised, caller, &info, now_ms));
        Ok(ExerciseSettlement {
            strike_payout: escrow_funds.into_payout(caller),
            underlying_delivery: payment.into_payout(writer),
        })
    }

    /// Reclaims an unexercised option's escrow after the market expires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OptionNotFound`] for an unknown option,
    /// [`Error::InvalidStatus`] unless the option is active,
    /// [`Error::NotAuthorized`] when the caller is not the writer, and
    /// [`Error::MarketNotExpired`] before the expiration instant passes.
    pub fn reclaim_collateral(
        &self,
        caller: AccountId,
        option_id: OptionId,
        now_ms: u64,
    ) -> Result<Payout<K>> {
        let mut guard = self.write_state();
        let state = &mut *guard;
        let book_id = state.book.id();
        let option = state
            .options
            .get_mut(&option_id)
            .ok_or_else(|| Error::option_not_found(option_id))?;
        let market_id = option.market_id();
        let market = state
            .markets
            .get_mut(&market_id)
            .ok_or_else(|| Error::market_not_found(market_id))?;
        market.ensure_expired(now_ms)?;

        let escrow_funds = option.reclaim(caller, now_ms)?;
        market.option_closed();
        let info = option.info();
        state
            .book
            .transition(option_id, OptionStatus::Active, OptionStatus::Expired)?;
        Self::upsert_snapshots(&mut state.user_orders, book_id, &info);
        drop(guard);

        self.publish(Self::trade_event(EventKind::Reclaimed, caller, &info, now_ms));
        Ok(escrow_funds.into_payout(caller))
    }

    /// Snapshot of one market.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarketNotFound`] for an unknown market.
    pub fn market_info(&self, market_id: MarketId) -> Result<MarketInfo> {
        self.read_state()
            .markets
            .get(&market_id)
            .map(Market::info)
            .ok_or_else(|| Error::market_not_found(market_id))
    }

    /// Snapshot of one option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OptionNotFound`] for an unknown option.
    pub fn option_info(&self, option_id: OptionId) -> Result<OptionInfo> {
        self.read_state()
            .options
            .get(&option_id)
            .map(CoveredPutOption::info)
            .ok_or_else(|| Error::option_not_found(option_id))
    }

    /// Identifiers currently in one lifecycle bucket.
    #[must_use]
    pub fn options_in(&self, stage: OptionStatus) -> Vec<OptionId> {
        self.read_state().book.ids_in(stage)
    }

    /// Snapshots of every option in one lifecycle bucket, ordered by
    /// creation time.
    #[must_use]
    pub fn orders_in(&self, stage: OptionStatus) -> Vec<OptionInfo> {
        let state = self.read_state();
        let mut infos: Vec<OptionInfo> = state
            .book
            .ids_in(stage)
            .into_iter()
            .filter_map(|id| state.options.get(&id).map(CoveredPutOption::info))
            .collect();
        infos.sort_by_key(|info| info.created_at_ms);
        infos
    }

    /// Maker-side snapshots for one participant, empty if they never traded.
    #[must_use]
    pub fn maker_orders(&self, owner: AccountId) -> Vec<OptionInfo> {
        self.read_state()
            .user_orders
            .get(&owner)
            .map(UserOrders::maker_infos)
            .unwrap_or_default()
    }

    /// Taker-side snapshots for one participant, empty if they never traded.
    #[must_use]
    pub fn taker_orders(&self, owner: AccountId) -> Vec<OptionInfo> {
        self.read_state()
            .user_orders
            .get(&owner)
            .map(UserOrders::taker_infos)
            .unwrap_or_default()
    }

    /// Market identifiers in registration order.
    #[must_use]
    pub fn market_ids(&self) -> Vec<MarketId> {
        self.read_state().book.markets().to_vec()
    }

    /// Per-bucket counts of the venue's order book.
    #[must_use]
    pub fn book_stats(&self) -> BookStats {
        self.read_state().book.stats()
    }

    /// Snapshot of the venue's aggregate counters.
    #[must_use]
    pub fn stats(&self) -> VenueStats {
        let state = self.read_state();
        let book = state.book.stats();
        let fee_pool_total = state
            .markets
            .values()
            .fold(0u64, |total, market| total.saturating_add(market.fee_pool_value()));
        VenueStats {
            name: self.name.clone(),
            markets: state.markets.len(),
            waiting_for_writer: book.waiting_for_writer,
            waiting_for_buyer: book.waiting_for_buyer,
            active: book.active,
            exercised: book.exercised,
            expired: book.expired,
            fee_pool_total,
        }
    }

    fn ensure_admin(&self, caller: AccountId) -> Result<()> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(Error::not_authorized("administrator"))
        }
    }

    fn upsert_snapshots(
        user_orders: &mut HashMap<AccountId, UserOrders>,
        book_id: BookId,
        info: &OptionInfo,
    ) {
        let maker = user_orders
            .entry(info.creator)
            .or_insert_with(|| UserOrders::new(info.creator, book_id));
        maker.record_maker(info.clone());

        let taker = if info.creator_is_buyer {
            info.writer
        } else {
            info.buyer
        };
        if let Some(account) = taker {
            let orders = user_orders
                .entry(account)
                .or_insert_with(|| UserOrders::new(account, book_id));
            orders.record_taker(info.clone());
        }
    }

    fn trade_event(kind: EventKind, actor: AccountId, info: &OptionInfo, now_ms: u64) -> TradeEvent {
        TradeEvent {
            kind,
            option_id: info.id,
            market_id: info.market_id,
            actor,
            strike_price: info.terms.strike_price,
            underlying_amount: info.terms.underlying_amount,
            premium_value: info.terms.premium_value,
            collateral_value: info.terms.collateral_value,
            timestamp_ms: now_ms,
        }
    }

    fn publish(&self, event: TradeEvent) {
        self.sink.publish(&event);
    }

    fn read_state(&self) -> RwLockReadGuard<'_, VenueState<K>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, VenueState<K>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: AssetKind> fmt::Debug for TradingVenue<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradingVenue")
            .field("name", &self.name)
            .field("admin", &self.admin)
            .field("asset", &K::SYMBOL)
            .finish_non_exhaustive()
    }
}

/// Aggregate counters for one [`TradingVenue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueStats {
    /// Venue name.
    pub name: String,
    /// Number of markets.
    pub markets: usize,
    /// Options waiting for a writer.
    pub waiting_for_writer: usize,
    /// Options waiting for a buyer.
    pub waiting_for_buyer: usize,
    /// Matched, unsettled options.
    pub active: usize,
    /// Options settled by exercise.
    pub exercised: usize,
    /// Options settled by reclaim.
    pub expired: usize,
    /// Fees held across all of the venue's markets.
    pub fee_pool_total: u64,
}

impl VenueStats {
    /// Options still awaiting a counterparty.
    #[must_use]
    pub const fn open_options(&self) -> usize {
        self.waiting_for_writer + self.waiting_for_buyer
    }

    /// Options settled by exercise or reclaim.
    #[must_use]
    pub const fn settled_options(&self) -> usize {
        self.exercised + self.expired
    }
}

impl fmt::Display for VenueStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "venue '{}': {} markets, {} open, {} active, {} settled, {} fees held",
            self.name,
            self.markets,
            self.open_options(),
            self.active,
            self.settled_options(),
            self.fee_pool_total
        )
    }
}

/// Registry of trading venues for one trading asset.
///
/// Uses `DashMap` for thread-safe concurrent access; each venue serializes
/// its own operations internally.
pub struct TradingVenueManager<K: AssetKind> {
    venues: DashMap<String, Arc<TradingVenue<K>>>,
}

impl<K: AssetKind> Default for TradingVenueManager<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: AssetKind> TradingVenueManager<K> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            venues: DashMap::new(),
        }
    }

    /// Number of registered venues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    /// Returns `true` when no venues are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Registers a venue that publishes events through [`LogSink`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::VenueExists`] when the name is already taken.
    pub fn create(&self, name: impl Into<String>, admin: AccountId) -> Result<Arc<TradingVenue<K>>> {
        self.create_with_sink(name, admin, Arc::new(LogSink))
    }

    /// Registers a venue with a custom event sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VenueExists`] when the name is already taken.
    pub fn create_with_sink(
        &self,
        name: impl Into<String>,
        admin: AccountId,
        sink: Arc<dyn EventSink>,
    ) -> Result<Arc<TradingVenue<K>>> {
        let name = name.into();
        match self.venues.entry(name.clone()) {
            Entry::Occupied(_) => Err(Error::venue_exists(name)),
            Entry::Vacant(entry) => {
                let venue = Arc::new(TradingVenue::with_sink(name, admin, sink));
                entry.insert(Arc::clone(&venue));
                Ok(venue)
            }
        }
    }

    /// Gets a venue by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VenueNotFound`] when no venue has the name.
    pub fn get(&self, name: &str) -> Result<Arc<TradingVenue<K>>> {
        self.venues
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::venue_not_found(name))
    }

    /// Returns `true` when a venue with the name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.venues.contains_key(name)
    }

    /// Removes a venue. Returns `true` if one was removed.
    pub fn remove(&self, name: &str) -> bool {
        self.venues.remove(name).is_some()
    }

    /// Returns all venue names, sorted.
    #[must_use]
    pub fn venue_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.venues.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot handles to every registered venue.
    #[must_use]
    pub fn venues(&self) -> Vec<Arc<TradingVenue<K>>> {
        self.venues
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Aggregate counters across every registered venue.
    #[must_use]
    pub fn stats(&self) -> GlobalStats {
        let mut stats = GlobalStats {
            venues: self.venues.len(),
            markets: 0,
            open_options: 0,
            active_options: 0,
            settled_options: 0,
            fee_pool_total: 0,
        };
        for entry in self.venues.iter() {
            let venue_stats = entry.value().stats();
            stats.markets += venue_stats.markets;
            stats.open_options += venue_stats.open_options();
            stats.active_options += venue_stats.active;
            stats.settled_options += venue_stats.settled_options();
            stats.fee_pool_total = stats
                .fee_pool_total
                .saturating_add(venue_stats.fee_pool_total);
        }
        stats
    }
}

/// Aggregate counters across a [`TradingVenueManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalStats {
    /// Number of venues.
    pub venues: usize,
    /// Markets across all venues.
    pub markets: usize,
    /// Options awaiting a counterparty.
    pub open_options: usize,
    /// Matched, unsettled options.
    pub active_options: usize,
    /// Settled options.
    pub settled_options: usize,
    /// Fees held across all venues.
    pub fee_pool_total: u64,
}

impl fmt::Display for GlobalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} venues, {} markets, {} open, {} active, {} settled, {} fees held",
            self.venues,
            self.markets,
            self.open_options,
            self.active_options,
            self.settled_options,
            self.fee_pool_total
        )
    }
}
