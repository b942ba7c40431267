//! Fill simulation: how one signal changes the portfolio at one price.
//!
//! Each transition is a plain function over `PortfolioState`:
//! - Buy: spend up to a fixed budget on whole shares, never more than cash on hand
//! - Sell: liquidate the whole position
//! - Hold: nothing

use super::portfolio::PortfolioState;
use super::signal::Signal;

/// What a single transition did.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Bought { shares: u64, cost: f64 },
    Sold { shares: u64, proceeds: f64 },
    NoOp(NoOpReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    Hold,
    /// Cash is below the price of one share.
    InsufficientCash,
    /// The budget does not cover one share.
    BudgetTooSmall,
    /// Sell with nothing to sell.
    NoPosition,
}

/// Buy whole shares at `price`.
///
/// 1. Skip if cash < price
/// 2. shares = floor(budget / price), capped at floor(cash / price) and at
///    the largest count whose cost does not exceed cash
/// 3. Skip if shares == 0
/// 4. Deduct cost, add shares
pub fn buy(state: &mut PortfolioState, price: f64, budget: f64) -> Fill {
    if state.cash < price {
        return Fill::NoOp(NoOpReason::InsufficientCash);
    }

    let by_budget = (budget / price).floor();
    let by_cash = (state.cash / price).floor();
    let mut shares = by_budget.min(by_cash).max(0.0) as u64;
    // cash / price can round up to a count whose cost exceeds cash
    while shares > 0 && shares as f64 * price > state.cash {
        shares -= 1;
    }

    if shares == 0 {
        return Fill::NoOp(NoOpReason::BudgetTooSmall);
    }

    let cost = shares as f64 * price;
    state.cash -= cost;
    state.position += shares;

    Fill::Bought { shares, cost }
}

/// Sell the entire position at `price`.
pub fn sell(state: &mut PortfolioState, price: f64) -> Fill {
    if state.position == 0 {
        return Fill::NoOp(NoOpReason::NoPosition);
    }

    let shares = state.position;
    let proceeds = shares as f64 * price;
    state.cash += proceeds;
    state.position = 0;

    Fill::Sold { shares, proceeds }
}

pub fn apply(state: &mut PortfolioState, signal: Signal, price: f64, budget: f64) -> Fill {
    match signal {
        Signal::Buy => buy(state, price, budget),
        Signal::Sell => sell(state, price),
        Signal::Hold => Fill::NoOp(NoOpReason::Hold),
    }
}
