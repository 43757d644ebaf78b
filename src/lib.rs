//! # Premarket Options - Covered Put Marketplace Infrastructure
//!
//! A Rust library for trading covered put options on pre-listing token
//! markets, providing escrowed option lifecycle management, per-market fee
//! accounting, and status-indexed order books for tokens that do not trade
//! anywhere yet.
//!
//! ## Key Features
//!
//! - **Escrowed Covered Puts**: Every option holds its premium and collateral
//!   in typed escrow from creation to settlement, so contracts are always
//!   fully funded.
//!
//! - **Linear Funds Handles**: Payments are value-typed handles that can only
//!   be split, joined, or paid out, never duplicated, making double spends a
//!   compile error rather than a runtime bug.
//!
//! - **Maker/Taker Order Flow**: Either side of a put can open an order; the
//!   counterparty fills it, with exact payments required from makers and
//!   excess retained from takers.
//!
//! - **Listing Schedule Windows**: Each market moves through trading,
//!   exercise, and expiration phases under a caller-supplied clock, with
//!   strict boundaries at the scheduled instants.
//!
//! - **Status-Indexed Order Books**: Every option is indexed by lifecycle
//!   stage in exactly one bucket, with loud failures on any index drift.
//!
//! - **Thread-Safe Concurrent Access**: Venues serialize their state behind
//!   a lock and register in a `DashMap` for concurrent lookup across threads.
//!
//! - **Result-Based Error Handling**: All fallible operations return
//!   `Result<T, Error>` with descriptive error types.
//!
//! ## Architecture
//!
//! The library follows a hierarchical structure for venue management:
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
//! This architecture enables:
//! - Atomic trading operations across option, book, and market state
//! - Fast lookup of options at any lifecycle stage
//! - Per-market fee pools with exact refund accounting
//! - Per-user maker and taker order views
//! - Statistics aggregation across venues
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`trading`] | Venues, markets, options, order books, and user orders |
//! | [`escrow`] | Linear funds handles, payouts, and fee arithmetic |
//! | [`events`] | Trade event records and pluggable event sinks |
//! | [`ids`] | Typed identifiers for accounts, markets, options, and books |
//! | [`error`] | Error types and `Result` type alias |
//! | [`utils`] | Utility functions (e.g., timestamp formatting) |
//!
//! ## Core Components
//!
//! ### Trading Hierarchy ([`trading`])
//!
//! - [`trading::TradingVenueManager`]: Top-level registry of venues
//! - [`trading::TradingVenue`]: Orchestrates every trading operation
//! - [`trading::OrderBook`]: Stage-bucketed option index
//! - [`trading::Market`]: Pre-listing token market configuration and counters
//! - [`trading::CoveredPutOption`]: Escrowed covered put contract
//! - [`trading::UserOrders`]: Per-user order snapshots
//! - [`trading::PutTerms`]: Economic terms fixed at creation
//! - [`trading::ExerciseSettlement`]: The two payout legs of an exercise
//!
//! ### Escrow Primitives ([`escrow`])
//!
//! - [`escrow::AssetKind`]: Marker trait binding a value type to an asset
//! - [`escrow::Funds`]: Linear handle over an escrowed amount
//! - [`escrow::Payout`]: Funds addressed to a recipient
//!
//! ## Example Usage
//!
//! ### Trading a Covered Put
//!
//! ```rust
//! use premarket_options::escrow::{AssetKind, Funds};
//! use premarket_options::ids::AccountId;
//! use premarket_options::trading::{PutTerms, TradingVenue};
//!
//! struct Usdc;
//!
//! impl AssetKind for Usdc {
//!     const SYMBOL: &'static str = "USDC";
//! }
//!
//! let admin = AccountId::new();
//! let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
//!
//! // Fee rate in basis points, minimum trade value, caller-supplied clock
//! let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
//!
//! let terms = PutTerms {
//!     strike_price: 10_000,
//!     underlying_amount: 1,
//!     premium_value: 5_000,
//!     collateral_value: 5_000,
//! };
//!
//! // The buyer pays the premium plus the 1% fee on the notional
//! let buyer = AccountId::new();
//! let option = venue
//!     .create_put_as_buyer(buyer, market, terms, Funds::new(5_100), 1_500)
//!     .unwrap();
//!
//! // A writer fills the order by posting collateral plus the fee
//! let writer = AccountId::new();
//! venue
//!     .fill_put_as_writer(writer, option, Funds::new(5_100), 1_600)
//!     .unwrap();
//!
//! let stats = venue.stats();
//! assert_eq!(stats.active, 1);
//! assert_eq!(stats.fee_pool_total, 200);
//! ```
//!
//! ### Splitting a Funds Handle
//!
//! ```rust
//! use premarket_options::escrow::{AssetKind, Funds};
//!
//! struct Usdc;
//!
//! impl AssetKind for Usdc {
//!     const SYMBOL: &'static str = "USDC";
//! }
//!
//! let mut payment: Funds<Usdc> = Funds::new(5_100);
//! let fee = payment.split(100).unwrap();
//!
//! assert_eq!(payment.value(), 5_000);
//! assert_eq!(fee.value(), 100);
//! ```
//!
//! ### Exercising with a Typed Underlying
//!
//! ```rust,ignore
//! use premarket_options::escrow::{AssetKind, Funds};
//!
//! struct Wnd;
//!
//! impl AssetKind for Wnd {
//!     const SYMBOL: &'static str = "WND";
//! }
//!
//! // Inside the exercise window, the buyer delivers the underlying token
//! // and receives the escrowed premium plus collateral.
//! let settlement = venue.exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), now_ms)?;
//! let (strike_payout, underlying_delivery) = settlement.into_parts();
//! ```
//!
//! ## Examples
//!
//! The library includes examples demonstrating the trading flows:
//!
//! | Example | Description |
//! |---------|-------------|
//! | `basic_lifecycle` | One option from creation through exercise |
//! | `venue_simulation` | A venue with several markets and participants |
//!
//! Run examples with:
//! ```bash
//! cargo run --example basic_lifecycle
//! cargo run --example venue_simulation
//! ```
//!
//! ## Benchmarks
//!
//! Benchmarks are available for all components:
//!
//! - **escrow_bench**: Funds handle and fee arithmetic operations
//! - **option_bench**: Option state machine transitions
//! - **book_bench**: Order book insertion, transition, and lookup
//! - **venue_bench**: Full trading flows through a venue
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench
//! cargo bench -- venue_benches
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Option Lookup**: O(1) via hash maps keyed by identifier
//! - **Stage Queries**: O(1) bucket access, O(N) to list a bucket
//! - **Venue Lookup**: O(1) concurrent access via `DashMap`
//! - **Trading Operations**: One write critical section per operation
//!
//! ## Dependencies
//!
//! - **dashmap** (6): Concurrent hash map for thread-safe venue registry
//! - **uuid** (1): Unique identifiers for accounts, markets, and options
//! - **chrono** (0.4): Timestamp formatting for display output
//! - **thiserror** (2.0): Error handling
//! - **serde** (1.0): Serialization support
//! - **serde_json** (1.0): Event record serialization
//! - **tracing** (0.1): Structured event and operation logging

pub mod error;
pub mod escrow;
pub mod events;
pub mod ids;
pub mod trading;
pub mod utils;

pub use error::{Error, Result};
