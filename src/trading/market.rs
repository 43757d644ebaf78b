//! Market configuration, listing schedule, and fee accounting.
//!
//! A [`Market`] groups every covered put written against one pre-listing
//! token. It owns the trading policy (fee rate, minimum trade value), the
//! listing schedule that divides the market's life into a trading phase, an
//! exercise window, and a post-expiration phase, and the pool of collected
//! trading fees.

use crate::error::{Error, Result};
use crate::escrow::{AssetKind, Funds};
use crate::ids::MarketId;
use crate::utils::format_timestamp_ms;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two instants that govern a market's lifecycle.
///
/// Strictly before `exercise_at_ms` the market trades; strictly between the
/// two instants active options may be exercised; strictly after
/// `expire_at_ms` writers may reclaim their escrow. At either exact instant
/// no phase predicate holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSchedule {
    /// Start of the exercise window, milliseconds since the UNIX epoch.
    pub exercise_at_ms: u64,
    /// Expiration instant, milliseconds since the UNIX epoch.
    pub expire_at_ms: u64,
}

impl fmt::Display for ListingSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exercise {}, expiration {}",
            format_timestamp_ms(self.exercise_at_ms),
            format_timestamp_ms(self.expire_at_ms)
        )
    }
}

/// The token a market settles in once it has listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderlyingAsset {
    /// Canonical symbol of the token.
    pub symbol: String,
    /// Number of decimal places in the token's smallest unit.
    pub decimals: u8,
}

impl fmt::Display for UnderlyingAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} decimals)", self.symbol, self.decimals)
    }
}

/// A market for covered puts on one pre-listing token.
///
/// Markets are created without a schedule or a bound underlying asset; both
/// are configured by the venue administrator as the token's listing details
/// become known. Until a schedule is set the market trades indefinitely and
/// nothing can be exercised or reclaimed.
pub struct Market<K: AssetKind> {
    id: MarketId,
    name: String,
    fee_rate_bps: u64,
    minimum_trading_value: u64,
    schedule: Option<ListingSchedule>,
    underlying: Option<UnderlyingAsset>,
    fee_pool: Funds<K>,
    premium_volume: u64,
    collateral_volume: u64,
    active_options: u64,
    created_at_ms: u64,
}

impl<K: AssetKind> Market<K> {
    /// Creates a market with the given trading policy.
    ///
    /// # Arguments
    ///
    /// * `name` - Human readable label, e.g. the token's ticker
    /// * `fee_rate_bps` - Per-side trading fee in basis points
    /// * `minimum_trading_value` - Smallest collateral value a writer-created
    ///   order may carry
    /// * `now_ms` - Caller-supplied clock reading
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        fee_rate_bps: u64,
        minimum_trading_value: u64,
        now_ms: u64,
    ) -> Self {
        Self {
            id: MarketId::new(),
            name: name.into(),
            fee_rate_bps,
            minimum_trading_value,
            schedule: None,
            underlying: None,
            fee_pool: Funds::zero(),
            premium_volume: 0,
            collateral_volume: 0,
            active_options: 0,
            created_at_ms: now_ms,
        }
    }

    /// Unique identifier of this market.
    #[must_use]
    pub const fn id(&self) -> MarketId {
        self.id
    }

    /// Human readable label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-side trading fee in basis points.
    #[must_use]
    pub const fn fee_rate_bps(&self) -> u64 {
        self.fee_rate_bps
    }

    /// Smallest collateral value a writer-created order may carry.
    #[must_use]
    pub const fn minimum_trading_value(&self) -> u64 {
        self.minimum_trading_value
    }

    /// The listing schedule, if one has been set.
    #[must_use]
    pub const fn schedule(&self) -> Option<ListingSchedule> {
        self.schedule
    }

    /// The bound underlying asset, if one has been bound.
    #[must_use]
    pub fn underlying(&self) -> Option<&UnderlyingAsset> {
        self.underlying.as_ref()
    }

    /// Total trading fees currently held by the market.
    #[must_use]
    pub const fn fee_pool_value(&self) -> u64 {
        self.fee_pool.value()
    }

    /// Cumulative premium value traded, including cancelled orders.
    #[must_use]
    pub const fn premium_volume(&self) -> u64 {
        self.premium_volume
    }

    /// Cumulative collateral value traded, including cancelled orders.
    #[must_use]
    pub const fn collateral_volume(&self) -> u64 {
        self.collateral_volume
    }

    /// Number of options currently in the active state.
    #[must_use]
    pub const fn active_options(&self) -> u64 {
        self.active_options
    }

    /// Clock reading recorded when the market was created.
    #[must_use]
    pub const fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// Sets or replaces the listing schedule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSchedule`] unless
    /// `now_ms < exercise_at_ms < expire_at_ms`.
    pub fn set_schedule(&mut self, exercise_at_ms: u64, expire_at_ms: u64, now_ms: u64) -> Result<()> {
        if now_ms < exercise_at_ms && exercise_at_ms < expire_at_ms {
            self.schedule = Some(ListingSchedule {
                exercise_at_ms,
                expire_at_ms,
            });
            Ok(())
        } else {
            Err(Error::invalid_schedule(exercise_at_ms, expire_at_ms, now_ms))
        }
    }

    /// Binds or replaces the underlying asset the market settles in.
    pub fn bind_underlying(&mut self, symbol: impl Into<String>, decimals: u8) {
        self.underlying = Some(UnderlyingAsset {
            symbol: symbol.into(),
            decimals,
        });
    }

    /// Returns `true` while the market accepts new and filling orders.
    ///
    /// A market with no schedule is active indefinitely.
    #[must_use]
    pub fn is_active(&self, now_ms: u64) -> bool {
        match self.schedule {
            None => true,
            Some(schedule) => now_ms < schedule.exercise_at_ms,
        }
    }

    /// Returns `true` while active options may be exercised.
    #[must_use]
    pub fn is_exercisable(&self, now_ms: u64) -> bool {
        self.schedule
            .is_some_and(|s| s.exercise_at_ms < now_ms && now_ms < s.expire_at_ms)
    }

    /// Returns `true` once the market is strictly past expiration.
    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.schedule.is_some_and(|s| now_ms > s.expire_at_ms)
    }

    /// Fails unless the market is in its trading phase.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarketNotActive`] otherwise.
    pub fn ensure_active(&self, now_ms: u64) -> Result<()> {
        if self.is_active(now_ms) {
            Ok(())
        } else {
            Err(Error::MarketNotActive)
        }
    }

    /// Fails unless the market is inside its exercise window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarketNotExercisable`] otherwise.
    pub fn ensure_exercisable(&self, now_ms: u64) -> Result<()> {
        if self.is_exercisable(now_ms) {
            Ok(())
        } else {
            Err(Error::MarketNotExercisable)
        }
    }

    /// Fails unless the market is strictly past expiration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MarketNotExpired`] otherwise.
    pub fn ensure_expired(&self, now_ms: u64) -> Result<()> {
        if self.is_expired(now_ms) {
            Ok(())
        } else {
            Err(Error::MarketNotExpired)
        }
    }

    /// Fails when a trade value is below the configured minimum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TradeBelowMinimum`] when `value` is too small.
    pub fn ensure_minimum_trade(&self, value: u64) -> Result<()> {
        if value < self.minimum_trading_value {
            Err(Error::below_minimum(self.minimum_trading_value, value))
        } else {
            Ok(())
        }
    }

    /// Adds a collected trading fee to the market's pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MathOverflow`] when the pool would exceed the
    /// representable range.
    pub(crate) fn charge_fee(&mut self, fee: Funds<K>) -> Result<()> {
        self.fee_pool.join(fee)
    }

    /// Takes a previously collected fee back out of the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientFunds`] when the pool holds less than
    /// `amount`, for example after the administrator has withdrawn.
    pub(crate) fn refund_fee(&mut self, amount: u64) -> Result<Funds<K>> {
        self.fee_pool.split(amount)
    }

    /// Drains the entire fee pool.
    pub(crate) fn drain_fees(&mut self) -> Funds<K> {
        self.fee_pool.take_all()
    }

    /// Records premium value entering escrow.
    pub(crate) fn record_premium(&mut self, value: u64) {
        self.premium_volume = self.premium_volume.saturating_add(value);
    }

    /// Records collateral value entering escrow.
    pub(crate) fn record_collateral(&mut self, value: u64) {
        self.collateral_volume = self.collateral_volume.saturating_add(value);
    }

    /// Notes that an option reached the active state.
    pub(crate) fn option_activated(&mut self) {
        self.active_options = self.active_options.saturating_add(1);
    }

    /// Notes that an active option was settled.
    pub(crate) fn option_closed(&mut self) {
        self.active_options = self.active_options.saturating_sub(1);
    }

    /// Snapshot of the market's configuration and counters.
    #[must_use]
    pub fn info(&self) -> MarketInfo {
        MarketInfo {
            id: self.id,
            name: self.name.clone(),
            fee_rate_bps: self.fee_rate_bps,
            minimum_trading_value: self.minimum_trading_value,
            schedule: self.schedule,
            underlying: self.underlying.clone(),
            fee_pool: self.fee_pool.value(),
            premium_volume: self.premium_volume,
            collateral_volume: self.collateral_volume,
            active_options: self.active_options,
            created_at_ms: self.created_at_ms,
        }
    }
}

/// Point-in-time snapshot of a [`Market`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    /// Identifier of the market.
    pub id: MarketId,
    /// Human readable label.
    pub name: String,
    /// Per-side trading fee in basis points.
    pub fee_rate_bps: u64,
    /// Smallest collateral value a writer-created order may carry.
    pub minimum_trading_value: u64,
    /// Listing schedule, if set.
    pub schedule: Option<ListingSchedule>,
    /// Bound underlying asset, if bound.
    pub underlying: Option<UnderlyingAsset>,
    /// Fees currently held by the market.
    pub fee_pool: u64,
    /// Cumulative premium value traded.
    pub premium_volume: u64,
    /// Cumulative collateral value traded.
    pub collateral_volume: u64,
    /// Options currently active.
    pub active_options: u64,
    /// Clock reading recorded at creation.
    pub created_at_ms: u64,
}

impl fmt::Display for MarketInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "market '{}': fee {} bps, minimum trade {}, fee pool {}, {} active options",
            self.name, self.fee_rate_bps, self.minimum_trading_value, self.fee_pool, self.active_options
        )?;
        match &self.schedule {
            Some(schedule) => write!(f, ", {schedule}")?,
            None => write!(f, ", no listing schedule")?,
        }
        if let Some(underlying) = &self.underlying {
            write!(f, ", settles in {underlying}")?;
        }
        Ok(())
    }
}
