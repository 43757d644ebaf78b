//! The shared order book index.
//!
//! An [`OrderBook`] buckets option identifiers by lifecycle stage so
//! browsing and matching never scan option records. Membership must mirror
//! each option's true status at all times; the venue performs the matching
//! bucket move in the same critical section as every status change, and any
//! disagreement surfaces as [`Error::IndexDesync`] rather than being
//! silently repaired.

use crate::error::{Error, Result};
use crate::ids::{BookId, MarketId, OptionId};
use crate::trading::OptionStatus;
use std::collections::HashSet;
use std::fmt;

/// Index of option identifiers bucketed by lifecycle stage.
pub struct OrderBook {
    id: BookId,
    name: String,
    markets: Vec<MarketId>,
    waiting_for_writer: HashSet<OptionId>,
    waiting_for_buyer: HashSet<OptionId>,
    active: HashSet<OptionId>,
    exercised: HashSet<OptionId>,
    expired: HashSet<OptionId>,
}

impl OrderBook {
    /// Creates an empty order book.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BookId::new(),
            name: name.into(),
            markets: Vec::new(),
            waiting_for_writer: HashSet::new(),
            waiting_for_buyer: HashSet::new(),
            active: HashSet::new(),
            exercised: HashSet::new(),
            expired: HashSet::new(),
        }
    }

    /// Unique identifier of this order book.
    #[must_use]
    pub const fn id(&self) -> BookId {
        self.id
    }

    /// Human readable label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Markets this book indexes, in registration order.
    #[must_use]
    pub fn markets(&self) -> &[MarketId] {
        &self.markets
    }

    /// Adds a market to the covered set. Registering the same market twice
    /// has no effect.
    pub fn register_market(&mut self, market_id: MarketId) {
        if !self.markets.contains(&market_id) {
            self.markets.push(market_id);
        }
    }

    /// Returns `true` when the book indexes the given market.
    #[must_use]
    pub fn covers_market(&self, market_id: MarketId) -> bool {
        self.markets.contains(&market_id)
    }

    /// Adds an option to the bucket for `stage`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexDesync`] when the bucket already contains the
    /// option.
    pub fn insert(&mut self, stage: OptionStatus, option_id: OptionId) -> Result<()> {
        if self.bucket_mut(stage).insert(option_id) {
            Ok(())
        } else {
            Err(Error::index_desync(stage, option_id, false))
        }
    }

    /// Removes an option from the bucket for `stage`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexDesync`] when the bucket does not contain the
    /// option.
    pub fn remove(&mut self, stage: OptionStatus, option_id: OptionId) -> Result<()> {
        if self.bucket_mut(stage).remove(&option_id) {
            Ok(())
        } else {
            Err(Error::index_desync(stage, option_id, true))
        }
    }

    /// Moves an option between buckets as one remove plus one insert.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexDesync`] when the option is missing from the
    /// source bucket or already present in the destination bucket.
    pub fn transition(&mut self, option_id: OptionId, from: OptionStatus, to: OptionStatus) -> Result<()> {
        self.remove(from, option_id)?;
        self.insert(to, option_id)
    }

    /// Finds the bucket an option currently belongs to, if any.
    #[must_use]
    pub fn stage_of(&self, option_id: OptionId) -> Option<OptionStatus> {
        const STAGES: [OptionStatus; 5] = [
            OptionStatus::WaitingForWriter,
            OptionStatus::WaitingForBuyer,
            OptionStatus::Active,
            OptionStatus::Exercised,
            OptionStatus::Expired,
        ];
        STAGES
            .into_iter()
            .find(|stage| self.bucket(*stage).contains(&option_id))
    }

    /// Returns `true` when any bucket contains the option.
    #[must_use]
    pub fn contains(&self, option_id: OptionId) -> bool {
        self.stage_of(option_id).is_some()
    }

    /// Identifiers currently in the bucket for `stage`.
    #[must_use]
    pub fn ids_in(&self, stage: OptionStatus) -> Vec<OptionId> {
        self.bucket(stage).iter().copied().collect()
    }

    /// Number of options in the bucket for `stage`.
    #[must_use]
    pub fn count_in(&self, stage: OptionStatus) -> usize {
        self.bucket(stage).len()
    }

    /// Total number of indexed options across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waiting_for_writer.len()
            + self.waiting_for_buyer.len()
            + self.active.len()
            + self.exercised.len()
            + self.expired.len()
    }

    /// Returns `true` when no bucket contains any option.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of per-bucket counts.
    #[must_use]
    pub fn stats(&self) -> BookStats {
        BookStats {
            name: self.name.clone(),
            markets: self.markets.len(),
            waiting_for_writer: self.waiting_for_writer.len(),
            waiting_for_buyer: self.waiting_for_buyer.len(),
            active: self.active.len(),
            exercised: self.exercised.len(),
            expired: self.expired.len(),
        }
    }

    const fn bucket(&self, stage: OptionStatus) -> &HashSet<OptionId> {
        match stage {
            OptionStatus::WaitingForWriter => &self.waiting_for_writer,
            OptionStatus::WaitingForBuyer => &self.waiting_for_buyer,
            OptionStatus::Active => &self.active,
            OptionStatus::Exercised => &self.exercised,
            OptionStatus::Expired => &self.expired,
        }
    }

    fn bucket_mut(&mut self, stage: OptionStatus) -> &mut HashSet<OptionId> {
        match stage {
            OptionStatus::WaitingForWriter => &mut self.waiting_for_writer,
            OptionStatus::WaitingForBuyer => &mut self.waiting_for_buyer,
            OptionStatus::Active => &mut self.active,
            OptionStatus::Exercised => &mut self.exercised,
            OptionStatus::Expired => &mut self.expired,
        }
    }
}

/// Per-bucket counts for an [`OrderBook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookStats {
    /// Label of the book.
    pub name: String,
    /// Number of markets the book covers.
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
}

impl BookStats {
    /// Total number of indexed options.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.waiting_for_writer + self.waiting_for_buyer + self.active + self.exercised + self.expired
    }
}

impl fmt::Display for BookStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "book '{}': {} markets, {} awaiting writer, {} awaiting buyer, {} active, {} exercised, {} expired",
            self.name,
            self.markets,
            self.waiting_for_writer,
            self.waiting_for_buyer,
            self.active,
            self.exercised,
            self.expired
        )
    }
}
