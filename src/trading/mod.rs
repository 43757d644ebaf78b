//! Covered put trading module.
//!
//! This module provides the full lifecycle of covered put options on
//! pre-listing token markets:
//!
//! ## Hierarchy
//!
//! ```text
//! TradingVenueManager (manages all venues for one trading asset)
//!   └── TradingVenue (per venue, one order book plus its markets)
//!         ├── OrderBook (indexes every option by lifecycle stage)
//!         ├── Market (per pre-listing token: fees, schedule, underlying)
//!         ├── CoveredPutOption (per contract: escrow and state machine)
//!         └── UserOrders (per participant: maker and taker snapshots)
//! ```
//!
//! ## Components
//!
//! - [`TradingVenueManager`]: Top-level registry of venues
//! - [`TradingVenue`]: Orchestrates every trading operation
//! - [`OrderBook`]: Stage-bucketed option index
//! - [`Market`]: Pre-listing token market configuration and counters
//! - [`CoveredPutOption`]: Escrowed covered put contract
//! - [`UserOrders`]: Per-user maker and taker order snapshots
//! - [`PutTerms`]: Economic terms fixed at creation
//! - [`ExerciseSettlement`]: The two payout legs of an exercise
//!
//! ## Example
//!
//! ```rust,ignore
//! use premarket_options::escrow::{AssetKind, Funds};
//! use premarket_options::ids::AccountId;
//! use premarket_options::trading::TradingVenueManager;
//!
//! struct Usdc;
//!
//! impl AssetKind for Usdc {
//!     const SYMBOL: &'static str = "USDC";
//! }
//!
//! let manager: TradingVenueManager<Usdc> = TradingVenueManager::new();
//! let admin = AccountId::new();
//! let venue = manager.create("main", admin)?;
//!
//! // Open a market and trade a put
//! let market = venue.create_market(admin, "WND", 100, 5_000, now_ms)?;
//! let option = venue.create_put_as_buyer(buyer, market, terms, payment, now_ms)?;
//! venue.fill_put_as_writer(writer, option, collateral, now_ms)?;
//! ```

mod book;
mod market;
mod option;
mod orders;
mod venue;

// Re-export all public types
pub use book::{BookStats, OrderBook};
pub use market::{ListingSchedule, Market, MarketInfo, UnderlyingAsset};
pub use option::{CoveredPutOption, OptionInfo, OptionStatus, PutTerms};
pub use orders::UserOrders;
pub use venue::{
    ExerciseSettlement, GlobalStats, TradingVenue, TradingVenueManager, VenueStats,
};
