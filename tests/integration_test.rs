//! Integration tests for the backtest pipeline.
//!
//! Tests cover:
//! - Multi-ticker pipeline through mock data and report ports
//! - Skipping tickers without data, failing on malformed data
//! - Reference scenarios for each strategy and the simulator
//! - Simulator invariants under generated price series

mod common;

use approx::assert_relative_eq;
use common::*;
use quantback::adapters::DataSource;
use quantback::cli::{run_backtest_pipeline, RunConfig};
use quantback::domain::backtest::{backtest_ticker, simulate, BacktestConfig};
use quantback::domain::error::QuantbackError;
use quantback::domain::metrics::{trade_markers, MarkerKind, PerformanceSummary};
use quantback::domain::signal::{Signal, SignalSeries};
use quantback::domain::strategy::Strategy;
use std::path::PathBuf;

fn run_config(tickers: &[&str], strategy: Strategy) -> RunConfig {
    RunConfig {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        backtest: sample_config(),
        strategy,
        data_source: DataSource::Csv {
            path: PathBuf::from("unused"),
        },
    }
}

mod full_backtest_pipeline {
    use super::*;

    #[test]
    fn pipeline_runs_every_ticker_and_reports_once() {
        let port = MockDataPort::new()
            .with_bars("AAPL", make_bars(&ramp(20, 100.0, 1.0)))
            .with_bars("MSFT", make_bars(&ramp(20, 200.0, -1.0)));
        let report = MockReportPort::new();
        let run = run_config(&["AAPL", "MSFT"], Strategy::BuyAndHold);

        let results = run_backtest_pipeline(&port, &report, &run).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ticker, "AAPL");
        assert_eq!(results[1].ticker, "MSFT");
        assert_eq!(results[0].trajectory.len(), 20);

        let calls = report.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.len(), 2);
        assert_eq!(calls[0].1, Strategy::BuyAndHold);
    }

    #[test]
    fn pipeline_filters_to_date_range() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&ramp(40, 100.0, 1.0)));
        let report = MockReportPort::new();
        let mut run = run_config(&["AAPL"], Strategy::BuyAndHold);
        run.start_date = date(2024, 1, 11);
        run.end_date = date(2024, 1, 20);

        let results = run_backtest_pipeline(&port, &report, &run).unwrap();
        let trajectory = &results[0].trajectory;
        assert_eq!(trajectory.len(), 10);
        assert_eq!(trajectory.first().unwrap().date, date(2024, 1, 11));
        assert_eq!(trajectory.last().unwrap().date, date(2024, 1, 20));
    }

    #[test]
    fn pipeline_skips_ticker_without_data() {
        let port = MockDataPort::new()
            .with_bars("AAPL", make_bars(&ramp(10, 100.0, 1.0)))
            .with_missing("GONE");
        let report = MockReportPort::new();
        let run = run_config(&["GONE", "AAPL"], Strategy::BuyAndHold);

        let results = run_backtest_pipeline(&port, &report, &run).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticker, "AAPL");
    }

    #[test]
    fn pipeline_skips_ticker_without_bars_in_range() {
        let port = MockDataPort::new()
            .with_bars("AAPL", make_bars(&ramp(10, 100.0, 1.0)))
            .with_bars("OLD", make_bars(&[50.0, 51.0]));
        let report = MockReportPort::new();
        let mut run = run_config(&["OLD", "AAPL"], Strategy::BuyAndHold);
        run.start_date = date(2024, 1, 5);

        let results = run_backtest_pipeline(&port, &report, &run).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticker, "AAPL");
    }

    #[test]
    fn pipeline_with_no_usable_ticker_is_no_data() {
        let port = MockDataPort::new().with_missing("GONE");
        let report = MockReportPort::new();
        let run = run_config(&["GONE", "NONE"], Strategy::BuyAndHold);

        let err = run_backtest_pipeline(&port, &report, &run).unwrap_err();
        assert!(matches!(err, QuantbackError::NoData { ref ticker } if ticker == "GONE, NONE"));
        assert!(report.calls.borrow().is_empty());
    }

    #[test]
    fn pipeline_surfaces_malformed_data() {
        let port = MockDataPort::new()
            .with_bars("AAPL", make_bars(&ramp(10, 100.0, 1.0)))
            .with_missing_close("BAD");
        let report = MockReportPort::new();
        let run = run_config(&["AAPL", "BAD"], Strategy::BuyAndHold);

        let err = run_backtest_pipeline(&port, &report, &run).unwrap_err();
        assert!(matches!(err, QuantbackError::MissingPriceField { .. }));
    }

    #[test]
    fn pipeline_surfaces_unreadable_data() {
        let port = MockDataPort::new()
            .with_bars("AAPL", make_bars(&ramp(10, 100.0, 1.0)))
            .with_error("BAD", "row 3: invalid close value 'n/a'");
        let report = MockReportPort::new();
        let run = run_config(&["BAD", "AAPL"], Strategy::BuyAndHold);

        let err = run_backtest_pipeline(&port, &report, &run).unwrap_err();
        assert!(matches!(err, QuantbackError::Data { .. }));
        assert!(report.calls.borrow().is_empty());
    }

    #[test]
    fn pipeline_rejects_invalid_strategy_parameters() {
        let port = MockDataPort::new().with_bars("AAPL", make_bars(&ramp(10, 100.0, 1.0)));
        let report = MockReportPort::new();
        let run = run_config(
            &["AAPL"],
            Strategy::SmaCrossover {
                short_window: 0,
                long_window: 5,
            },
        );

        let err = run_backtest_pipeline(&port, &report, &run).unwrap_err();
        assert!(matches!(err, QuantbackError::InvalidParameter { .. }));
    }
}

mod reference_scenarios {
    use super::*;

    #[test]
    fn four_bar_round_trip() {
        let history = make_history(&[100.0, 110.0, 105.0, 120.0]);
        let signals = SignalSeries::from_history(
            &history,
            vec![Signal::Buy, Signal::Hold, Signal::Hold, Signal::Sell],
        )
        .unwrap();
        let config = BacktestConfig {
            initial_capital: 1000.0,
            position_size_pct: 50.0,
        };

        let trajectory = simulate(&history, &signals, &config).unwrap();
        let totals = trajectory.total_values();
        assert_eq!(totals.len(), 4);
        assert_relative_eq!(totals[0], 1000.0);
        assert_relative_eq!(totals[1], 1050.0);
        assert_relative_eq!(totals[2], 1025.0);
        assert_relative_eq!(totals[3], 1100.0);

        let summary = PerformanceSummary::compute(&trajectory);
        assert_relative_eq!(summary.total_return, 0.10, epsilon = 1e-12);
        assert_eq!(summary.entries, 1);
        assert_eq!(summary.exits, 1);
    }

    #[test]
    fn budget_below_every_price_never_buys() {
        let history = make_history(&[100.0, 120.0, 90.0, 150.0]);
        let config = BacktestConfig {
            initial_capital: 1000.0,
            position_size_pct: 5.0,
        };

        let result = backtest_ticker("ACME", &history, &Strategy::BuyAndHold, &config).unwrap();
        for snap in &result.trajectory.snapshots {
            assert_eq!(snap.position, 0);
            assert_relative_eq!(snap.total_value, 1000.0);
        }
        assert!(trade_markers(&result.trajectory).is_empty());
    }

    #[test]
    fn crossover_on_constant_prices_only_holds() {
        let history = make_history(&[50.0; 30]);
        let strategy = Strategy::SmaCrossover {
            short_window: 3,
            long_window: 8,
        };

        let signals = strategy.generate_signals(&history);
        assert_eq!(signals.len(), 30);
        assert_eq!(signals.count(Signal::Hold), 30);
    }

    #[test]
    fn crossover_buys_on_upturn_and_sells_on_downturn() {
        let mut closes = ramp(15, 100.0, -2.0);
        closes.extend(ramp(15, 74.0, 3.0));
        closes.extend(ramp(15, 116.0, -4.0));
        let history = make_history(&closes);
        let strategy = Strategy::SmaCrossover {
            short_window: 2,
            long_window: 5,
        };

        let signals: Vec<Signal> = strategy.generate_signals(&history).signals().collect();
        let first_buy = signals.iter().position(|&s| s == Signal::Buy).unwrap();
        let last_sell = signals.iter().rposition(|&s| s == Signal::Sell).unwrap();
        assert!(first_buy >= 15 && first_buy < 30);
        assert!(last_sell >= 30);
    }

    #[test]
    fn rsi_buys_falling_and_sells_rising() {
        let strategy = Strategy::Rsi {
            period: 14,
            threshold_low: 30.0,
            threshold_high: 70.0,
        };

        let falling = make_history(&ramp(30, 200.0, -2.0));
        let signals = strategy.generate_signals(&falling);
        assert!(signals.count(Signal::Buy) > 0);
        assert_eq!(signals.count(Signal::Sell), 0);

        let rising = make_history(&ramp(30, 100.0, 2.0));
        let signals = strategy.generate_signals(&rising);
        assert!(signals.count(Signal::Sell) > 0);
        assert_eq!(signals.count(Signal::Buy), 0);
    }

    #[test]
    fn buy_and_hold_single_entry_at_first_bar() {
        let history = make_history(&ramp(25, 10.0, 0.5));
        let signals: Vec<Signal> = Strategy::BuyAndHold
            .generate_signals(&history)
            .signals()
            .collect();
        assert_eq!(signals[0], Signal::Buy);
        assert_eq!(signals.iter().filter(|&&s| s == Signal::Buy).count(), 1);
        assert_eq!(signals.iter().filter(|&&s| s == Signal::Sell).count(), 0);
    }

    #[test]
    fn rising_equity_has_zero_drawdown() {
        let history = make_history(&ramp(30, 50.0, 1.5));
        let result =
            backtest_ticker("UP", &history, &Strategy::BuyAndHold, &sample_config()).unwrap();

        assert_relative_eq!(result.summary.max_drawdown, 0.0);
        assert!(result.summary.total_return > 0.0);
        let markers = trade_markers(&result.trajectory);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].index, 0);
        assert_eq!(markers[0].kind, MarkerKind::Entry);
    }

    #[test]
    fn empty_history_gives_empty_trajectory() {
        let history = make_history(&[]);
        let result =
            backtest_ticker("NONE", &history, &Strategy::BuyAndHold, &sample_config()).unwrap();
        assert!(result.trajectory.is_empty());
        assert_relative_eq!(result.summary.total_return, 0.0);
        assert_relative_eq!(result.summary.sharpe_ratio, 0.0);
    }
}

mod simulator_properties {
    use super::{backtest_ticker, make_history, sample_config, BacktestConfig};
    use proptest::prelude::*;
    use quantback::domain::strategy::Strategy as TradingStrategy;

    fn any_strategy() -> impl Strategy<Value = TradingStrategy> {
        prop_oneof![
            Just(TradingStrategy::BuyAndHold),
            (1usize..10, 1usize..30).prop_map(|(short_window, long_window)| {
                TradingStrategy::SmaCrossover {
                    short_window,
                    long_window,
                }
            }),
            (1usize..20, 0.0f64..50.0, 50.0f64..100.0).prop_map(
                |(period, threshold_low, threshold_high)| {
                    TradingStrategy::Rsi {
                        period,
                        threshold_low,
                        threshold_high,
                    }
                }
            ),
        ]
    }

    proptest! {
        #[test]
        fn trajectory_matches_history(
            closes in prop::collection::vec(1.0f64..500.0, 0..60),
            strategy in any_strategy(),
            capital in 100.0f64..100_000.0,
            pct in 1.0f64..=100.0,
        ) {
            let history = make_history(&closes);
            let config = BacktestConfig { initial_capital: capital, position_size_pct: pct };
            let result = backtest_ticker("PROP", &history, &strategy, &config).unwrap();

            prop_assert_eq!(result.trajectory.len(), history.len());
            for (snap, bar) in result.trajectory.snapshots.iter().zip(history.bars()) {
                prop_assert_eq!(snap.date, bar.date);
                prop_assert!(snap.cash >= 0.0);
                prop_assert!(snap.total_value >= 0.0);
            }
            prop_assert!(result.summary.max_drawdown <= 0.0);
        }

        #[test]
        fn simulation_is_idempotent(
            closes in prop::collection::vec(1.0f64..500.0, 1..40),
            strategy in any_strategy(),
        ) {
            let history = make_history(&closes);
            let first = backtest_ticker("PROP", &history, &strategy, &sample_config()).unwrap();
            let second = backtest_ticker("PROP", &history, &strategy, &sample_config()).unwrap();

            prop_assert_eq!(first.trajectory, second.trajectory);
            prop_assert_eq!(first.summary, second.summary);
        }

        #[test]
        fn buy_and_hold_never_exits(closes in prop::collection::vec(1.0f64..500.0, 1..60)) {
            let history = make_history(&closes);
            let result = backtest_ticker(
                "PROP",
                &history,
                &TradingStrategy::BuyAndHold,
                &sample_config(),
            )
            .unwrap();

            prop_assert_eq!(result.summary.exits, 0);
            prop_assert!(result.summary.entries <= 1);
        }
    }
}
