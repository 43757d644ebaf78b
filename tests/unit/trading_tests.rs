//! Integration tests for the trading module.

use premarket_options::Error;
use premarket_options::escrow::{AssetKind, Funds};
use premarket_options::events::{EventKind, EventSink, MemorySink, TradeEvent};
use premarket_options::ids::AccountId;
use premarket_options::trading::{OptionStatus, PutTerms, TradingVenue, TradingVenueManager};
use std::sync::Arc;

struct Usdc;

impl AssetKind for Usdc {
    const SYMBOL: &'static str = "USDC";
}

struct Wnd;

impl AssetKind for Wnd {
    const SYMBOL: &'static str = "WND";
}

/// Strike 10_000 for one token, split evenly between the two legs.
fn terms() -> PutTerms {
    PutTerms {
        strike_price: 10_000,
        underlying_amount: 1,
        premium_value: 5_000,
        collateral_value: 5_000,
    }
}

#[test]
fn test_covered_put_full_lifecycle() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);

    // 1% fee on the 10_000 notional is 100 on each side.
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_100), 1_600)
        .unwrap();

    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();

    // Exercise delivers one token at 6 decimals and collects the strike.
    let settlement = venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 2_500)
        .unwrap();
    let (strike_payout, underlying_delivery) = settlement.into_parts();
    assert_eq!(strike_payout.recipient(), buyer);
    assert_eq!(strike_payout.value(), 10_000);
    assert_eq!(underlying_delivery.recipient(), writer);
    assert_eq!(underlying_delivery.value(), 1_000_000);
    assert_eq!(underlying_delivery.asset_symbol(), "WND");

    let market_info = venue.market_info(market).unwrap();
    assert_eq!(market_info.premium_volume, 5_000);
    assert_eq!(market_info.collateral_volume, 5_000);
    assert_eq!(market_info.active_options, 0);
    assert_eq!(market_info.fee_pool, 200);

    let option_info = venue.option_info(option).unwrap();
    assert_eq!(option_info.status, OptionStatus::Exercised);
    assert_eq!(option_info.premium_balance, 0);
    assert_eq!(option_info.collateral_balance, 0);

    let fees = venue.withdraw_fees(admin, market).unwrap();
    assert_eq!(fees.recipient(), admin);
    assert_eq!(fees.value(), 200);
}

#[test]
fn test_cancel_before_match_refunds_everything() {
    let admin = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();

    let option = venue
        .create_put_as_writer(writer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    assert_eq!(venue.market_info(market).unwrap().fee_pool, 100);

    let refund = venue.cancel_put(writer, option, 1_600).unwrap();
    assert_eq!(refund.recipient(), writer);
    assert_eq!(refund.value(), 5_100);

    // The record is deleted, not archived.
    assert!(venue.option_info(option).is_err());
    assert!(venue.options_in(OptionStatus::WaitingForBuyer).is_empty());
    assert!(venue.maker_orders(writer).is_empty());
    assert_eq!(venue.market_info(market).unwrap().fee_pool, 0);
}

#[test]
fn test_cancel_rejected_for_non_creator() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();

    let err = venue.cancel_put(AccountId::new(), option, 1_600).unwrap_err();
    assert_eq!(err, Error::NotAuthorized { role: "creator" });

    // The order is still open and still funded.
    let info = venue.option_info(option).unwrap();
    assert_eq!(info.status, OptionStatus::WaitingForWriter);
    assert_eq!(info.premium_balance, 5_000);
}

#[test]
fn test_cancel_rejected_after_match() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(AccountId::new(), option, Funds::new(5_100), 1_600)
        .unwrap();

    let err = venue.cancel_put(buyer, option, 1_700).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidStatus {
            expected: OptionStatus::WaitingForWriter,
            actual: OptionStatus::Active
        }
    );
}

#[test]
fn test_fill_rejected_after_cancel() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue.cancel_put(buyer, option, 1_600).unwrap();

    let err = venue
        .fill_put_as_writer(AccountId::new(), option, Funds::new(5_100), 1_700)
        .unwrap_err();
    assert_eq!(err, Error::OptionNotFound { id: option });
}

#[test]
fn test_listing_schedule_boundaries_are_strict() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_100), 1_600)
        .unwrap();
    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();

    // At the exercise instant the market is neither trading nor exercisable.
    let err = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 2_000)
        .unwrap_err();
    assert_eq!(err, Error::MarketNotActive);
    let err = venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 2_000)
        .unwrap_err();
    assert_eq!(err, Error::MarketNotExercisable);

    // At the expiration instant neither settlement path is open.
    let err = venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 3_000)
        .unwrap_err();
    assert_eq!(err, Error::MarketNotExercisable);
    let err = venue.reclaim_collateral(writer, option, 3_000).unwrap_err();
    assert_eq!(err, Error::MarketNotExpired);

    assert!(venue.reclaim_collateral(writer, option, 3_001).is_ok());
}

#[test]
fn test_exercise_rejected_after_reclaim() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_100), 1_600)
        .unwrap();
    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();

    let payout = venue.reclaim_collateral(writer, option, 3_500).unwrap();
    assert_eq!(payout.value(), 10_000);

    let err = venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 3_500)
        .unwrap_err();
    assert_eq!(
        err,
        Error::InvalidStatus {
            expected: OptionStatus::Active,
            actual: OptionStatus::Expired
        }
    );
}

#[test]
fn test_reclaim_rejected_after_exercise() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_100), 1_600)
        .unwrap();
    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();
    venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 2_500)
        .unwrap();

    let err = venue.reclaim_collateral(writer, option, 3_500).unwrap_err();
    assert_eq!(
        err,
        Error::InvalidStatus {
            expected: OptionStatus::Active,
            actual: OptionStatus::Exercised
        }
    );
}

#[test]
fn test_taker_excess_is_retained_and_settled() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();

    // The taker owes 5_100 but pays 5_250; the 150 above the fee stays in
    // the collateral leg.
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_250), 1_600)
        .unwrap();
    let info = venue.option_info(option).unwrap();
    assert_eq!(info.collateral_balance, 5_150);

    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    let payout = venue.reclaim_collateral(writer, option, 3_500).unwrap();
    assert_eq!(payout.value(), 10_150);
}

#[test]
fn test_value_is_conserved_across_settlement() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();

    // 5_100 in from the maker, 5_250 in from the taker.
    let paid_in: u64 = 5_100 + 5_250;
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_250), 1_600)
        .unwrap();
    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();

    let settlement = venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 2_500)
        .unwrap();
    let fees = venue.withdraw_fees(admin, market).unwrap();

    let paid_out = settlement.strike_payout().value() + fees.value();
    assert_eq!(paid_in, paid_out);
}

#[test]
fn test_book_buckets_stay_exclusive_through_lifecycle() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();

    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    let stats = venue.book_stats();
    assert_eq!(stats.waiting_for_writer, 1);
    assert_eq!(stats.total(), 1);

    venue
        .fill_put_as_writer(writer, option, Funds::new(5_100), 1_600)
        .unwrap();
    let stats = venue.book_stats();
    assert_eq!(stats.waiting_for_writer, 0);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.total(), 1);

    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();
    venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 2_500)
        .unwrap();
    let stats = venue.book_stats();
    assert_eq!(stats.active, 0);
    assert_eq!(stats.exercised, 1);
    assert_eq!(stats.total(), 1);
}

#[test]
fn test_user_order_views_track_settlement() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_100), 1_600)
        .unwrap();
    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();
    venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 2_500)
        .unwrap();

    // Both views keep the settled order, refreshed to its final snapshot.
    let maker_view = venue.maker_orders(buyer);
    assert_eq!(maker_view.len(), 1);
    assert_eq!(maker_view[0].status, OptionStatus::Exercised);
    assert_eq!(maker_view[0].premium_balance, 0);

    let taker_view = venue.taker_orders(writer);
    assert_eq!(taker_view.len(), 1);
    assert_eq!(taker_view[0].id, option);
    assert_eq!(taker_view[0].status, OptionStatus::Exercised);

    // Strangers have no view at all.
    assert!(venue.maker_orders(AccountId::new()).is_empty());
}

#[test]
fn test_trading_fee_rounds_down_and_can_be_zero() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let venue: TradingVenue<Usdc> = TradingVenue::new("main", admin);
    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();

    // Notional 999 at 100 bps is 9.99, charged as 9.
    let odd_terms = PutTerms {
        strike_price: 333,
        underlying_amount: 3,
        premium_value: 499,
        collateral_value: 500,
    };
    venue
        .create_put_as_buyer(buyer, market, odd_terms, Funds::new(508), 1_500)
        .unwrap();
    assert_eq!(venue.market_info(market).unwrap().fee_pool, 9);

    // A zero-rate market charges nothing at all.
    let free_market = venue.create_market(admin, "FREE", 0, 0, 1_000).unwrap();
    venue
        .create_put_as_buyer(buyer, free_market, terms(), Funds::new(5_000), 1_500)
        .unwrap();
    assert_eq!(venue.market_info(free_market).unwrap().fee_pool, 0);
}

#[test]
fn test_event_stream_covers_the_lifecycle() {
    let admin = AccountId::new();
    let buyer = AccountId::new();
    let writer = AccountId::new();
    let sink = Arc::new(MemorySink::new());
    let manager: TradingVenueManager<Usdc> = TradingVenueManager::new();
    let venue = manager
        .create_with_sink("main", admin, Arc::clone(&sink) as Arc<dyn EventSink>)
        .unwrap();

    let market = venue.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    let option = venue
        .create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    venue
        .fill_put_as_writer(writer, option, Funds::new(5_100), 1_600)
        .unwrap();
    venue
        .set_market_schedule(admin, market, 2_000, 3_000, 1_700)
        .unwrap();
    venue.bind_underlying(admin, market, "WND", 6).unwrap();
    venue
        .exercise_put::<Wnd>(buyer, option, Funds::new(1_000_000), 2_500)
        .unwrap();

    let events = sink.events();
    let kinds: Vec<EventKind> = events.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Created, EventKind::Filled, EventKind::Exercised]
    );
    assert!(events.iter().all(|event| event.option_id == option));
    assert_eq!(events[2].actor, buyer);
    assert_eq!(events[2].timestamp_ms, 2_500);

    // Records serialize cleanly for downstream consumers.
    let json = events[0].to_json().unwrap();
    let parsed: TradeEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, events[0]);
}

#[test]
fn test_manager_tracks_multiple_venues() {
    let manager: TradingVenueManager<Usdc> = TradingVenueManager::new();
    let admin = AccountId::new();
    let buyer = AccountId::new();

    let main = manager.create("main", admin).unwrap();
    let market = main.create_market(admin, "WND", 100, 0, 1_000).unwrap();
    main.create_put_as_buyer(buyer, market, terms(), Funds::new(5_100), 1_500)
        .unwrap();

    let side = manager.create("side", admin).unwrap();
    let side_market = side.create_market(admin, "ABC", 100, 0, 1_000).unwrap();
    let side_option = side
        .create_put_as_buyer(buyer, side_market, terms(), Funds::new(5_100), 1_500)
        .unwrap();
    side.fill_put_as_writer(AccountId::new(), side_option, Funds::new(5_100), 1_600)
        .unwrap();

    let stats = manager.stats();
    assert_eq!(stats.venues, 2);
    assert_eq!(stats.markets, 2);
    assert_eq!(stats.open_options, 1);
    assert_eq!(stats.active_options, 1);
    assert_eq!(stats.fee_pool_total, 300);

    assert_eq!(manager.venue_names(), vec!["main", "side"]);
    assert!(manager.get("main").is_ok());
    assert!(manager.remove("side"));
    assert_eq!(manager.stats().venues, 1);
}
