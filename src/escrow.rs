//! Escrow accounting primitives.
//!
//! The marketplace never moves real value. It tracks custody through
//! [`Funds`], a linear handle that can be split, joined, and drained but
//! never duplicated, and it settles by returning [`Payout`] records that the
//! hosting platform executes against its own ledger. All pricing arithmetic
//! lives here as well, performed in `u128` with division last so a
//! recomputed fee always matches the recorded one.

use crate::error::{Error, Result};
use crate::ids::AccountId;
use std::fmt;
use std::marker::PhantomData;

/// Denominator for basis-point fee rates. A rate of 10_000 is 100%.
pub const FEE_RATE_DENOMINATOR: u64 = 10_000;

/// Marker trait identifying the fungible asset a value is denominated in.
///
/// Implementations are zero-sized tags supplied by the hosting platform. The
/// only runtime information the marketplace reads is [`AssetKind::SYMBOL`],
/// compared by string equality when the underlying token is delivered at
/// exercise.
///
/// # Examples
///
/// ```
/// use premarket_options::escrow::AssetKind;
///
/// struct Usdc;
///
/// impl AssetKind for Usdc {
///     const SYMBOL: &'static str = "USDC";
/// }
/// ```
pub trait AssetKind: Send + Sync + 'static {
    /// Canonical symbol of the asset, e.g. `"USDC"`.
    const SYMBOL: &'static str;
}

/// An amount of asset `K` held in custody by the marketplace.
///
/// `Funds` is deliberately neither `Clone` nor serializable: amounts move
/// between balances instead of being duplicated. Constructing a value with
/// [`Funds::new`] represents a payment the hosting platform has already
/// collected from the payer.
#[must_use]
pub struct Funds<K: AssetKind> {
    amount: u64,
    marker: PhantomData<K>,
}

impl<K: AssetKind> Funds<K> {
    /// Wraps an amount the hosting platform has collected.
    pub const fn new(amount: u64) -> Self {
        Self {
            amount,
            marker: PhantomData,
        }
    }

    /// An empty balance.
    pub const fn zero() -> Self {
        Self::new(0)
    }

    /// Current amount held, in the asset's smallest unit.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.amount
    }

    /// Returns `true` when no value is held.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Moves `amount` out of this balance into a new one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientFunds`] when the balance holds less than
    /// `amount`; the balance is left untouched in that case.
    pub fn split(&mut self, amount: u64) -> Result<Self> {
        if amount > self.amount {
            return Err(Error::insufficient_funds(amount, self.amount));
        }
        self.amount -= amount;
        Ok(Self::new(amount))
    }

    /// Merges another balance into this one, consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MathOverflow`] when the combined amount would exceed
    /// the representable range. The other balance is discarded in that case.
    pub fn join(&mut self, other: Self) -> Result<()> {
        self.amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(Error::MathOverflow)?;
        Ok(())
    }

    /// Drains the entire balance, leaving zero behind.
    pub fn take_all(&mut self) -> Self {
        let amount = self.amount;
        self.amount = 0;
        Self::new(amount)
    }

    /// Converts the balance into a settlement instruction for `recipient`.
    pub fn into_payout(self, recipient: AccountId) -> Payout<K> {
        Payout {
            recipient,
            funds: self,
        }
    }
}

impl<K: AssetKind> fmt::Debug for Funds<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Funds")
            .field("asset", &K::SYMBOL)
            .field("amount", &self.amount)
            .finish()
    }
}

impl<K: AssetKind> fmt::Display for Funds<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, K::SYMBOL)
    }
}

/// A settlement instruction produced by a refunding or terminal operation.
///
/// Carries the drained [`Funds`] together with the account they are owed to.
/// The hosting platform consumes payouts and performs the actual transfers.
#[must_use]
pub struct Payout<K: AssetKind> {
    recipient: AccountId,
    funds: Funds<K>,
}

impl<K: AssetKind> Payout<K> {
    /// Account the funds are owed to.
    #[must_use]
    pub const fn recipient(&self) -> AccountId {
        self.recipient
    }

    /// Amount owed, in the asset's smallest unit.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.funds.value()
    }

    /// Symbol of the asset being paid out.
    #[must_use]
    pub const fn asset_symbol(&self) -> &'static str {
        K::SYMBOL
    }

    /// Splits the payout into its recipient and the carried funds.
    pub fn into_parts(self) -> (AccountId, Funds<K>) {
        (self.recipient, self.funds)
    }
}

impl<K: AssetKind> fmt::Debug for Payout<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payout")
            .field("recipient", &self.recipient)
            .field("asset", &K::SYMBOL)
            .field("amount", &self.funds.value())
            .finish()
    }
}

impl<K: AssetKind> fmt::Display for Payout<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.funds, self.recipient)
    }
}

/// Computes the trading fee for one side of an option trade.
///
/// The fee is `strike_price * underlying_amount * fee_rate_bps / 10_000`,
/// computed in `u128` with the division performed last, so the same inputs
/// always produce the same fee regardless of where it is recomputed.
///
/// # Errors
///
/// Returns [`Error::MathOverflow`] when an intermediate product exceeds
/// `u128` or the final fee exceeds `u64`.
pub fn trading_fee(strike_price: u64, underlying_amount: u64, fee_rate_bps: u64) -> Result<u64> {
    let scaled = u128::from(strike_price)
        .checked_mul(u128::from(underlying_amount))
        .and_then(|v| v.checked_mul(u128::from(fee_rate_bps)))
        .ok_or(Error::MathOverflow)?;
    let fee = scaled / u128::from(FEE_RATE_DENOMINATOR);
    u64::try_from(fee).map_err(|_| Error::MathOverflow)
}

/// Converts a whole-token amount into the asset's smallest unit.
///
/// # Errors
///
/// Returns [`Error::MathOverflow`] when `amount * 10^decimals` exceeds the
/// representable range.
pub fn underlying_units(amount: u64, decimals: u8) -> Result<u64> {
    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or(Error::MathOverflow)?;
    amount.checked_mul(scale).ok_or(Error::MathOverflow)
}
