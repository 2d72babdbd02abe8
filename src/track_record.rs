use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{PaperTrade, TradeDirection};

/// Notional used to express percentage returns in USD.
pub const DEFAULT_POSITION_SIZE_USD: i64 = 1_000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectionStats {
    pub trades: usize,
    pub wins: usize,
    /// Win rate in percent, zero when there are no trades.
    pub win_rate: Decimal,
    /// Sum of per-trade percentage returns.
    pub return_pct: Decimal,
    /// Mean return of winning trades, zero when there are none.
    pub avg_win_pct: Decimal,
    /// Mean return of losing trades, zero when there are none.
    pub avg_loss_pct: Decimal,
}

/// Win statistics plus realised USD for a group of supplementary legs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LegStats {
    #[serde(flatten)]
    pub stats: DirectionStats,
    pub pnl_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecordStats {
    pub position_size_usd: Decimal,
    /// Closed long/short trades. Trims and other legs are reported apart.
    pub closed_trades: usize,
    pub open_trades: usize,
    pub trims: usize,
    pub long: DirectionStats,
    pub short: DirectionStats,
    pub overall_win_rate: Decimal,
    pub total_pnl_usd: Decimal,
    pub trim_pnl_usd: Decimal,
    /// Closed Bollinger-band legs (`bb_long`, `bb_short`).
    pub bb: LegStats,
    /// Total minus trims and BB legs.
    pub ema_close_pnl_usd: Decimal,
    /// Every other closed leg, keyed by its direction name.
    pub other_legs: BTreeMap<String, LegStats>,
}

fn win_rate(wins: usize, total: usize) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(wins as u64) / Decimal::from(total as u64) * Decimal::ONE_HUNDRED).round_dp(1)
}

fn mean(sum: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (sum / Decimal::from(count as u64)).round_dp(2)
}

fn direction_stats<'a>(trades: impl Iterator<Item = &'a PaperTrade>) -> DirectionStats {
    let mut stats = DirectionStats::default();
    let mut win_sum = Decimal::ZERO;
    let mut loss_sum = Decimal::ZERO;
    for trade in trades {
        let pnl = trade.pnl_pct.unwrap_or_default();
        stats.trades += 1;
        if pnl >= Decimal::ZERO {
            stats.wins += 1;
            win_sum += pnl;
        } else {
            loss_sum += pnl;
        }
        stats.return_pct += pnl;
    }
    stats.win_rate = win_rate(stats.wins, stats.trades);
    stats.avg_win_pct = mean(win_sum, stats.wins);
    stats.avg_loss_pct = mean(loss_sum, stats.trades - stats.wins);
    stats
}

fn leg_stats(trades: &[&PaperTrade], position_size: Decimal) -> LegStats {
    LegStats {
        stats: direction_stats(trades.iter().copied()),
        pnl_usd: trades.iter().map(|t| pnl_usd(t, position_size)).sum(),
    }
}

fn is_bb_leg(direction: &TradeDirection) -> bool {
    matches!(direction, TradeDirection::Other(raw) if raw.starts_with("bb_"))
}

/// USD result of one closed trade. Trims only realise `trim_pct` of the
/// position, every other leg is counted at full size.
fn pnl_usd(trade: &PaperTrade, position_size: Decimal) -> Decimal {
    let pnl_pct = trade.pnl_pct.unwrap_or_default();
    let fraction = match trade.direction {
        TradeDirection::Trim => trade.trim_pct.unwrap_or_default() / Decimal::ONE_HUNDRED,
        _ => Decimal::ONE,
    };
    (pnl_pct / Decimal::ONE_HUNDRED * position_size * fraction).round_dp(2)
}

/// Summarise a list of paper trades.
pub fn summarize(trades: &[PaperTrade], position_size_usd: Decimal) -> TrackRecordStats {
    let closed: Vec<&PaperTrade> = trades.iter().filter(|t| t.is_closed()).collect();

    let longs = closed
        .iter()
        .copied()
        .filter(|t| t.direction == TradeDirection::Long);
    let shorts = closed
        .iter()
        .copied()
        .filter(|t| t.direction == TradeDirection::Short);
    let long = direction_stats(longs);
    let short = direction_stats(shorts);

    let trims: Vec<&PaperTrade> = closed
        .iter()
        .copied()
        .filter(|t| t.direction == TradeDirection::Trim)
        .collect();

    let bb_legs: Vec<&PaperTrade> = closed
        .iter()
        .copied()
        .filter(|t| is_bb_leg(&t.direction))
        .collect();
    let bb = leg_stats(&bb_legs, position_size_usd);

    let mut by_leg: BTreeMap<String, Vec<&PaperTrade>> = BTreeMap::new();
    for &trade in &closed {
        if let TradeDirection::Other(raw) = &trade.direction {
            by_leg.entry(raw.clone()).or_default().push(trade);
        }
    }
    let other_legs = by_leg
        .into_iter()
        .map(|(name, legs)| (name, leg_stats(&legs, position_size_usd)))
        .collect();

    let total_pnl_usd: Decimal = closed.iter().map(|t| pnl_usd(t, position_size_usd)).sum();
    let trim_pnl_usd: Decimal = trims.iter().map(|t| pnl_usd(t, position_size_usd)).sum();

    let closed_trades = long.trades + short.trades;
    TrackRecordStats {
        position_size_usd,
        closed_trades,
        open_trades: trades.iter().filter(|t| !t.is_closed()).count(),
        trims: trims.len(),
        overall_win_rate: win_rate(long.wins + short.wins, closed_trades),
        long,
        short,
        ema_close_pnl_usd: total_pnl_usd - trim_pnl_usd - bb.pnl_usd,
        total_pnl_usd,
        trim_pnl_usd,
        bb,
        other_legs,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
