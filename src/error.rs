//! Error types for the premarket options library.
//!
//! Every fallible operation in the crate returns [`Result`], and every error
//! names the condition that was violated rather than the call site that
//! detected it. Amount-carrying variants report both sides of the failed
//! comparison so callers can log or surface actionable messages.

use crate::ids::{MarketId, OptionId};
use crate::trading::OptionStatus;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by marketplace operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller does not hold the role the operation requires.
    #[error("caller does not hold the {role} role for this operation")]
    NotAuthorized {
        /// Role the operation requires, e.g. `"administrator"` or `"buyer"`.
        role: &'static str,
    },

    /// The option is not in the lifecycle state the operation requires.
    #[error("invalid option status: expected {expected}, found {actual}")]
    InvalidStatus {
        /// Status the operation requires.
        expected: OptionStatus,
        /// Status the option is actually in.
        actual: OptionStatus,
    },

    /// The economic terms of an option failed validation.
    #[error("invalid option terms: {reason}")]
    InvalidTerms {
        /// Human readable description of the violated rule.
        reason: String,
    },

    /// A listing schedule violated the required ordering of instants.
    #[error(
        "invalid listing schedule: require now < exercise < expiration \
         (now {now_ms}, exercise {exercise_at_ms}, expiration {expire_at_ms})"
    )]
    InvalidSchedule {
        /// Proposed start of the exercise window, milliseconds.
        exercise_at_ms: u64,
        /// Proposed expiration instant, milliseconds.
        expire_at_ms: u64,
        /// Clock reading supplied by the caller, milliseconds.
        now_ms: u64,
    },

    /// The market is past its listing event and no longer accepts orders.
    #[error("market is not in its pre-listing trading phase")]
    MarketNotActive,

    /// The market is outside its exercise window.
    #[error("market is not inside its exercise window")]
    MarketNotExercisable,

    /// The market has not reached its expiration instant yet.
    #[error("market has not expired yet")]
    MarketNotExpired,

    /// Exercise was attempted before an underlying asset was bound.
    #[error("no underlying asset has been bound to the market")]
    UnderlyingNotBound,

    /// The delivered asset does not match the bound underlying.
    #[error("underlying asset mismatch: market settles in {expected}, payment is {actual}")]
    UnderlyingMismatch {
        /// Symbol the market was bound to.
        expected: String,
        /// Symbol of the asset the caller delivered.
        actual: String,
    },

    /// A payment or escrow balance is too small for the operation.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Smallest acceptable amount.
        required: u64,
        /// Amount actually available.
        available: u64,
    },

    /// A payment that must match an exact amount did not.
    #[error("payment mismatch: operation requires exactly {required}, received {provided}")]
    PaymentMismatch {
        /// Exact amount the operation requires.
        required: u64,
        /// Amount the caller provided.
        provided: u64,
    },

    /// The trade value is below the market's configured minimum.
    #[error("trade value {value} is below the market minimum of {minimum}")]
    TradeBelowMinimum {
        /// Minimum trading value configured on the market.
        minimum: u64,
        /// Value of the attempted trade.
        value: u64,
    },

    /// An arithmetic step overflowed the supported integer range.
    #[error("arithmetic overflow while computing option values")]
    MathOverflow,

    /// An order book bucket disagreed with an option's lifecycle state.
    #[error(
        "order book index out of sync: option {id} membership in the {stage} \
         bucket does not match its lifecycle state"
    )]
    IndexDesync {
        /// Bucket whose membership was inconsistent.
        stage: OptionStatus,
        /// Option whose entry was inconsistent.
        id: OptionId,
        /// Whether the bucket was expected to contain the option.
        expected_present: bool,
    },

    /// No market exists under the given identifier.
    #[error("market {id} not found")]
    MarketNotFound {
        /// Identifier that failed to resolve.
        id: MarketId,
    },

    /// No option exists under the given identifier.
    #[error("option {id} not found")]
    OptionNotFound {
        /// Identifier that failed to resolve.
        id: OptionId,
    },

    /// No trading venue is registered under the given name.
    #[error("trading venue '{name}' not found")]
    VenueNotFound {
        /// Name that failed to resolve.
        name: String,
    },

    /// A trading venue is already registered under the given name.
    #[error("trading venue '{name}' already exists")]
    VenueExists {
        /// Name that collided.
        name: String,
    },
}

impl Error {
    /// Creates a [`Error::NotAuthorized`] for the given role name.
    pub fn not_authorized(role: &'static str) -> Self {
        Self::NotAuthorized { role }
    }

    /// Creates a [`Error::InvalidStatus`] from the expected and actual states.
    pub fn invalid_status(expected: OptionStatus, actual: OptionStatus) -> Self {
        Self::InvalidStatus { expected, actual }
    }

    /// Creates a [`Error::InvalidTerms`] with the given reason.
    pub fn invalid_terms(reason: impl Into<String>) -> Self {
        Self::InvalidTerms {
            reason: reason.into(),
        }
    }

    /// Creates a [`Error::InvalidSchedule`] from the rejected instants.
    pub fn invalid_schedule(exercise_at_ms: u64, expire_at_ms: u64, now_ms: u64) -> Self {
        Self::InvalidSchedule {
            exercise_at_ms,
            expire_at_ms,
            now_ms,
        }
    }

    /// Creates a [`Error::InsufficientFunds`] from the failed comparison.
    pub fn insufficient_funds(required: u64, available: u64) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }

    /// Creates a [`Error::PaymentMismatch`] from the failed comparison.
    pub fn payment_mismatch(required: u64, provided: u64) -> Self {
        Self::PaymentMismatch { required, provided }
    }

    /// Creates a [`Error::TradeBelowMinimum`] from the failed comparison.
    pub fn below_minimum(minimum: u64, value: u64) -> Self {
        Self::TradeBelowMinimum { minimum, value }
    }

    /// Creates a [`Error::UnderlyingMismatch`] from the two symbols.
    pub fn underlying_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::UnderlyingMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a [`Error::IndexDesync`] for the given bucket and option.
    pub fn index_desync(stage: OptionStatus, id: OptionId, expected_present: bool) -> Self {
        Self::IndexDesync {
            stage,
            id,
            expected_present,
        }
    }

    /// Creates a [`Error::MarketNotFound`] for the given identifier.
    pub fn market_not_found(id: MarketId) -> Self {
        Self::MarketNotFound { id }
    }

    /// Creates a [`Error::OptionNotFound`] for the given identifier.
    pub fn option_not_found(id: OptionId) -> Self {
        Self::OptionNotFound { id }
    }

    /// Creates a [`Error::VenueNotFound`] for the given name.
    pub fn venue_not_found(name: impl Into<String>) -> Self {
        Self::VenueNotFound { name: name.into() }
    }

    /// Creates a [`Error::VenueExists`] for the given name.
    pub fn venue_exists(name: impl Into<String>) -> Self {
        Self::VenueExists { name: name.into() }
    }
}
