//! Venue Simulation Example
//!
//! This example runs a small marketplace end to end:
//! - Two pre-listing markets under one venue
//! - Several participants opening and filling puts on both sides
//! - A cancellation refunding escrow and fee
//! - Exercise and reclaim settling the matched contracts
//! - Book, user, and global statistics along the way
//!
//! Run with: `cargo run --example venue_simulation`

use premarket_options::escrow::{AssetKind, Funds};
use premarket_options::ids::AccountId;
use premarket_options::trading::{OptionStatus, PutTerms, TradingVenueManager};
use tracing::info;

/// Stablecoin both legs of every put are denominated in.
struct Usdc;

impl AssetKind for Usdc {
    const SYMBOL: &'static str = "USDC";
}

/// Pre-listing token of the first market.
struct Wnd;

impl AssetKind for Wnd {
    const SYMBOL: &'static str = "WND";
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== Venue Simulation ===");

    let manager: TradingVenueManager<Usdc> = TradingVenueManager::new();
    let admin = AccountId::new();
    let venue = manager.create("main", admin).unwrap();

    // Two markets with different fee schedules
    let wnd = venue.create_market(admin, "WND", 100, 1_000, 1_000).unwrap();
    let abc = venue.create_market(admin, "ABC", 50, 0, 1_000).unwrap();
    info!("Markets: {:?}", venue.market_ids());

    let alice = AccountId::new();
    let bob = AccountId::new();
    let carol = AccountId::new();

    // Alice buys protection on WND; Bob takes the other side
    info!("--- WND: Buyer-Side Order, Filled ---");
    let protective = PutTerms {
        strike_price: 10_000,
        underlying_amount: 1,
        premium_value: 5_000,
        collateral_value: 5_000,
    };
    let alice_put = venue
        .create_put_as_buyer(alice, wnd, protective, Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(bob, alice_put, Funds::new(5_100), 1_600)
        .unwrap();
    info!("Matched: {}", venue.option_info(alice_put).unwrap());

    // Carol quotes the writer side on WND; Alice lifts it
    info!("--- WND: Writer-Side Order, Filled ---");
    let quoted = PutTerms {
        strike_price: 8_000,
        underlying_amount: 1,
        premium_value: 3_000,
        collateral_value: 5_000,
    };
    let carol_put = venue
        .create_put_as_writer(carol, wnd, quoted, Funds::new(5_080), 1_700)
        .unwrap();
    venue
        .fill_put_as_buyer(alice, carol_put, Funds::new(3_080), 1_800)
        .unwrap();
    info!("Matched: {}", venue.option_info(carol_put).unwrap());

    // Bob opens a put on ABC and thinks better of it
    info!("--- ABC: Order Cancelled ---");
    let hedge = PutTerms {
        strike_price: 4_000,
        underlying_amount: 2,
        premium_value: 1_000,
        collateral_value: 7_000,
    };
    let bob_put = venue
        .create_put_as_buyer(bob, abc, hedge, Funds::new(1_040), 1_850)
        .unwrap();
    let refund = venue.cancel_put(bob, bob_put, 1_900).unwrap();
    info!("Refunded in full: {}", refund);

    // Carol leaves an ABC order resting on the book
    let resting = PutTerms {
        strike_price: 6_000,
        underlying_amount: 1,
        premium_value: 2_000,
        collateral_value: 4_000,
    };
    venue
        .create_put_as_buyer(carol, abc, resting, Funds::new(2_030), 1_950)
        .unwrap();

    // WND lists: trading ends at 5_000, exercise closes at 8_000
    info!("--- WND Listing Event ---");
    venue
        .set_market_schedule(admin, wnd, 5_000, 8_000, 2_000)
        .unwrap();
    venue.bind_underlying(admin, wnd, "WND", 6).unwrap();

    // Alice exercises her put inside the window
    info!("--- WND: Exercise ---");
    let settlement = venue
        .exercise_put::<Wnd>(alice, alice_put, Funds::new(1_000_000), 6_000)
        .unwrap();
    let (strike_payout, underlying_delivery) = settlement.into_parts();
    info!("Strike payout: {}", strike_payout);
    info!("Underlying delivery: {}", underlying_delivery);

    // Carol's contract runs out the clock; she reclaims after expiry
    info!("--- WND: Reclaim ---");
    let reclaimed = venue.reclaim_collateral(carol, carol_put, 9_000).unwrap();
    info!("Reclaimed: {}", reclaimed);

    // Views and statistics
    info!("--- Views ---");
    info!("Book: {}", venue.book_stats());
    for order in venue.maker_orders(carol) {
        info!("Carol as maker: {}", order);
    }
    for order in venue.taker_orders(alice) {
        info!("Alice as taker: {}", order);
    }
    info!(
        "Resting orders: {}",
        venue.orders_in(OptionStatus::WaitingForWriter).len()
    );

    let wnd_fees = venue.withdraw_fees(admin, wnd).unwrap();
    info!("WND fees collected: {}", wnd_fees);

    info!("Global stats: {}", manager.stats());
    info!("=== Simulation Complete ===");
}
