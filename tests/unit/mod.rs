//! Integration test harness.

mod trading_tests;
