//! Amount Conversion Benchmarks
//!
//! Benchmarks the domain functions that run on every balance refresh
//! and every deposit/withdraw request.
//!
//! Run with: cargo bench --bench units_bench

use alloy::primitives::U256;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use caribou_client::domain::balance::PositionBalance;
use caribou_client::domain::prediction::BetTotals;
use caribou_client::domain::units::{format_units_2dp, parse_units, resolve_input};
use caribou_client::domain::withdrawal::redeem_shares;

/// Benchmark formatting an 18-decimal balance for display.
fn bench_format_units(c: &mut Criterion) {
    let raw = U256::from(123_456_789_012_345_678_901u128);

    c.bench_function("format_units_2dp_18", |b| {
        b.iter(|| format_units_2dp(black_box(raw), black_box(18)));
    });
}

/// Benchmark parsing user input into token units.
fn bench_parse_units(c: &mut Criterion) {
    c.bench_function("parse_units_6", |b| {
        b.iter(|| parse_units(black_box("1234.567891"), black_box(6)));
    });

    c.bench_function("resolve_input_percent", |b| {
        b.iter(|| resolve_input(black_box("37.5%"), black_box(Some(dec!(1250.40)))));
    });
}

/// Benchmark share-balance reconciliation for a rate-quoting market.
fn bench_position_from_shares(c: &mut Criterion) {
    let shares = U256::from(200_000_000u64);
    let rate = U256::from(1_050_000_000_000_000_000u128);

    c.bench_function("position_from_shares", |b| {
        b.iter(|| PositionBalance::from_shares(black_box(shares), black_box(rate), 6));
    });
}

/// Benchmark proportional withdrawal sizing.
fn bench_redeem_shares(c: &mut Criterion) {
    let stored = U256::from(95_000_123u64);

    c.bench_function("redeem_shares_partial", |b| {
        b.iter(|| redeem_shares(black_box(dec!(47.31)), black_box(dec!(99.75)), black_box(stored)));
    });
}

/// Benchmark odds percentages.
fn bench_bet_percentages(c: &mut Criterion) {
    let totals = BetTotals::new(
        U256::from(7_300_000_000_000_000u64),
        U256::from(2_700_000_000_000_000u64),
    );

    c.bench_function("bet_true_percentage", |b| {
        b.iter(|| black_box(totals).true_percentage());
    });
}

criterion_group!(
    benches,
    bench_format_units,
    bench_parse_units,
    bench_position_from_shares,
    bench_redeem_shares,
    bench_bet_percentages,
);
criterion_main!(benches);
