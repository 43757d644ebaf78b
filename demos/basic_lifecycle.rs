//! Basic Covered Put Lifecycle Example
//!
//! This example demonstrates one covered put from creation to exercise:
//! - Creating a trading venue and a pre-listing market
//! - Opening a put order on the buyer side
//! - Filling it with writer collateral
//! - Moving the market through its listing schedule
//! - Exercising the put and settling both legs
//!
//! Run with: `cargo run --example basic_lifecycle`

use premarket_options::escrow::{AssetKind, Funds};
use premarket_options::ids::AccountId;
use premarket_options::trading::{OptionStatus, PutTerms, TradingVenue};
use tracing::info;

/// Stablecoin both legs of every put are denominated in.
struct Usdc;

impl AssetKind for Usdc {
    const SYMBOL: &'static str = "USDC";
}

/// Pre-listing token delivered at exercise.
struct Wnd;

impl AssetKind for Wnd {
    const SYMBOL: &'static str = "WND";
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== Basic Covered Put Lifecycle ===");

    // The administrator opens a venue and one market at a 100 bps fee
    let admin = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 1_000, 1_000).unwrap();
    info!("Created market: {}", venue.market_info(market).unwrap());

    // A buyer opens a put: the right to sell 1 WND for 10_000 USDC
    info!("--- Opening the Order ---");
    let terms = PutTerms {
        strike_price: 10_000,
        underlying_amount: 1,
        premium_value: 5_000,
        collateral_value: 5_000,
    };
    let fee = terms.fee(100).unwrap();
    info!("Trading fee per side: {}", fee);

    let buyer = AccountId::new();
    let option = venue
        .create_put_as_buyer(buyer, market, terms, Funds::new(5_000 + fee), 1_500)
        .unwrap();
    info!(
        "Buyer escrowed the premium: {}",
        venue.option_info(option).unwrap()
    );

    // A writer fills it by posting the other half of the strike
    info!("--- Filling the Order ---");
    let writer = AccountId::new();
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_000 + fee), 1_600)
        .unwrap();
    info!(
        "Writer posted collateral: {}",
        venue.option_info(option).unwrap()
    );

    // The token lists: trading stops at 2_000, exercise runs until 3_000
    info!("--- Listing Event ---");
    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();
    info!("Schedule set: {}", venue.market_info(market).unwrap());

    // The buyer exercises inside the window, delivering 1 WND at 6 decimals
    info!("--- Exercising ---");
    let settlement = venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 2_500)
        .unwrap();
    let (strike_payout, underlying_delivery) = settlement.into_parts();
    info!("Strike payout: {}", strike_payout);
    info!("Underlying delivery: {}", underlying_delivery);

    // Settled state and fee accounting
    info!("--- Settlement State ---");
    let settled = venue.option_info(option).unwrap();
    info!("Option now: {}", settled);
    assert_eq!(settled.status, OptionStatus::Exercised);

    let fees = venue.withdraw_fees(admin, market).unwrap();
    info!("Fees withdrawn to administrator: {}", fees);

    info!("Venue stats: {}", venue.stats());
    info!("=== Example Complete ===");
}
