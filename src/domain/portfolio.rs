//! Portfolio state and per-bar snapshots.

use chrono::NaiveDate;

/// Derived from the share count; there is no short side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingState {
    Flat,
    Holding,
}

/// Cash and share count owned by a single simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub position: u64,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        PortfolioState {
            cash: initial_capital,
            position: 0,
        }
    }

    pub fn holding_state(&self) -> HoldingState {
        if self.position == 0 {
            HoldingState::Flat
        } else {
            HoldingState::Holding
        }
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.position as f64 * price
    }

    pub fn total_value(&self, price: f64) -> f64 {
        self.cash + self.market_value(price)
    }

    pub fn snapshot(&self, date: NaiveDate, price: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            date,
            price,
            cash: self.cash,
            position: self.position,
            total_value: self.total_value(price),
        }
    }
}

/// Post-step portfolio record for one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub price: f64,
    pub cash: f64,
    pub position: u64,
    pub total_value: f64,
}
