//! Per-participant order indexes.
//!
//! A [`UserOrders`] record tracks which options one participant created
//! (maker side) and which it filled as the counterparty (taker side), each
//! paired with a snapshot of the option's state. Snapshots are refreshed by
//! the venue on every status transition, so browsing a user's orders never
//! touches the option records themselves.

use crate::ids::{AccountId, BookId, OptionId, UserOrdersId};
use crate::trading::OptionInfo;
use std::collections::HashMap;

/// One participant's maker and taker order index, scoped to one order book.
///
/// Created lazily the first time its owner trades; never destroyed. Settled
/// options stay listed with their terminal snapshots.
pub struct UserOrders {
    id: UserOrdersId,
    owner: AccountId,
    book_id: BookId,
    maker: HashMap<OptionId, OptionInfo>,
    taker: HashMap<OptionId, OptionInfo>,
}

impl UserOrders {
    /// Creates an empty index for `owner` scoped to `book_id`.
    #[must_use]
    pub fn new(owner: AccountId, book_id: BookId) -> Self {
        Self {
            id: UserOrdersId::new(),
            owner,
            book_id,
            maker: HashMap::new(),
            taker: HashMap::new(),
        }
    }

    /// Unique identifier of this index.
    #[must_use]
    pub const fn id(&self) -> UserOrdersId {
        self.id
    }

    /// Participant the index belongs to.
    #[must_use]
    pub const fn owner(&self) -> AccountId {
        self.owner
    }

    /// Order book the index is scoped to.
    #[must_use]
    pub const fn book_id(&self) -> BookId {
        self.book_id
    }

    /// Inserts or refreshes the maker-side snapshot for an option.
    pub fn record_maker(&mut self, info: OptionInfo) {
        self.maker.insert(info.id, info);
    }

    /// Inserts or refreshes the taker-side snapshot for an option.
    pub fn record_taker(&mut self, info: OptionInfo) {
        self.taker.insert(info.id, info);
    }

    /// Removes a maker-side entry. Returns `true` if one was present.
    pub fn remove_maker(&mut self, option_id: OptionId) -> bool {
        self.maker.remove(&option_id).is_some()
    }

    /// Removes a taker-side entry. Returns `true` if one was present.
    pub fn remove_taker(&mut self, option_id: OptionId) -> bool {
        self.taker.remove(&option_id).is_some()
    }

    /// Snapshot of one maker-side entry.
    #[must_use]
    pub fn maker_info(&self, option_id: OptionId) -> Option<&OptionInfo> {
        self.maker.get(&option_id)
    }

    /// Snapshot of one taker-side entry.
    #[must_use]
    pub fn taker_info(&self, option_id: OptionId) -> Option<&OptionInfo> {
        self.taker.get(&option_id)
    }

    /// Identifiers of every maker-side entry.
    #[must_use]
    pub fn maker_ids(&self) -> Vec<OptionId> {
        self.maker.keys().copied().collect()
    }

    /// Identifiers of every taker-side entry.
    #[must_use]
    pub fn taker_ids(&self) -> Vec<OptionId> {
        self.taker.keys().copied().collect()
    }

    /// Maker-side snapshots ordered by creation time.
    #[must_use]
    pub fn maker_infos(&self) -> Vec<OptionInfo> {
        let mut infos: Vec<OptionInfo> = self.maker.values().cloned().collect();
        infos.sort_by_key(|info| info.created_at_ms);
        infos
    }

    /// Taker-side snapshots ordered by creation time.
    #[must_use]
    pub fn taker_infos(&self) -> Vec<OptionInfo> {
        let mut infos: Vec<OptionInfo> = self.taker.values().cloned().collect();
        infos.sort_by_key(|info| info.created_at_ms);
        infos
    }

    /// Number of maker-side entries.
    #[must_use]
    pub fn maker_count(&self) -> usize {
        self.maker.len()
    }

    /// Number of taker-side entries.
    #[must_use]
    pub fn taker_count(&self) -> usize {
        self.taker.len()
    }

    /// Returns `true` when the index holds no entries on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maker.is_empty() && self.taker.is_empty()
    }
}
