//! Benchmarks for premarket-options library.
//!
//! This module provides benchmarks for all trading components:
//!
//! - **escrow_bench**: Funds handle and fee arithmetic operations
//! - **option_bench**: Covered put state machine transitions
//! - **book_bench**: Order book insertion, transition, and lookup
//! - **venue_bench**: Full trading flows through a venue


use criterion::{criterion_group, criterion_main};

// Escrow primitive benchmarks
criterion_group!(
    escrow_benches,
    escrow_bench::escrow_operations,
    escrow_bench::fee_arithmetic,
);

// CoveredPutOption benchmarks
criterion_group!(option_benches, option_bench::option_operations);

// OrderBook benchmarks
criterion_group!(
    book_benches,
    book_bench::book_operations,
    book_bench::book_scaling,
);

// TradingVenue benchmarks
criterion_group!(
    venue_benches,
    venue_bench::venue_operations,
    venue_bench::trading_scenarios,
    venue_bench::venue_scaling,
);

criterion_main!(escrow_benches, option_benches, book_benches, venue_benches);
