//! Volume leaderboard ranking
//!
//! Ranks feed the milestone checker. Ordering is volume descending, ties
//! keep their input order, ranks start at 1.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::types::TradeStats;

/// One trader's running totals as stored by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderStanding {
    /// Wallet address
    pub wallet: String,
    /// Accumulated XP
    #[serde(default)]
    pub points: i64,
    /// Accumulated volume (USD)
    #[serde(default)]
    pub volume_usd: Decimal,
    /// Completed trades
    #[serde(default)]
    pub trade_count: u32,
    /// Fees paid (USD)
    #[serde(default)]
    pub total_fees_paid_usd: Decimal,
}

/// A standing with its assigned rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTrader {
    /// 1-based rank
    pub rank: u32,
    /// The trader's totals
    #[serde(flatten)]
    pub standing: TraderStanding,
}

impl RankedTrader {
    /// Input for the milestone checker
    pub fn trade_stats(&self) -> TradeStats {
        TradeStats {
            rank: i64::from(self.rank),
            volume_usd: self.standing.volume_usd,
            trade_count: self.standing.trade_count,
            total_fees_paid_usd: self.standing.total_fees_paid_usd,
        }
    }
}

/// Ranked, truncated leaderboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<RankedTrader>,
}

impl Leaderboard {
    /// Rank standings by volume and keep the first `limit`
    pub fn rank(mut standings: Vec<TraderStanding>, limit: usize) -> Self {
        // sort_by is stable, equal volumes keep their input order
        standings.sort_by(|a, b| b.volume_usd.cmp(&a.volume_usd));

        let entries = standings
            .into_iter()
            .take(limit)
            .zip(1u32..)
            .map(|(standing, rank)| RankedTrader { rank, standing })
            .collect();

        Self { entries }
    }

    /// Ranked entries, best first
    pub fn entries(&self) -> &[RankedTrader] {
        &self.entries
    }

    /// Rank of a wallet, if it made the board
    pub fn rank_of(&self, wallet: &str) -> Option<u32> {
        self.find(wallet).map(|e| e.rank)
    }

    /// Milestone input for a wallet, if it made the board
    pub fn trade_stats_for(&self, wallet: &str) -> Option<TradeStats> {
        self.find(wallet).map(RankedTrader::trade_stats)
    }

    fn find(&self, wallet: &str) -> Option<&RankedTrader> {
        self.entries.iter().find(|e| e.standing.wallet == wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn standing(wallet: &str, volume: Decimal) -> TraderStanding {
        TraderStanding {
            wallet: wallet.to_string(),
            points: 0,
            volume_usd: volume,
            trade_count: 10,
            total_fees_paid_usd: dec!(30),
        }
    }

    #[test]
    fn test_ranks_by_volume_descending() {
        let board = Leaderboard::rank(
            vec![
                standing("carol", dec!(500)),
                standing("alice", dec!(9000)),
                standing("bob", dec!(1200)),
            ],
            50,
        );

        let order: Vec<_> = board.entries().iter().map(|e| (e.rank, e.standing.wallet.as_str())).collect();
        assert_eq!(order, vec![(1, "alice"), (2, "bob"), (3, "carol")]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let board = Leaderboard::rank(
            vec![standing("first", dec!(100)), standing("second", dec!(100))],
            50,
        );
        assert_eq!(board.rank_of("first"), Some(1));
        assert_eq!(board.rank_of("second"), Some(2));
    }

    #[test]
    fn test_limit_truncates() {
        let standings = (0..60).map(|i| standing(&format!("w{i}"), Decimal::from(i))).collect();
        let board = Leaderboard::rank(standings, 50);

        assert_eq!(board.entries().len(), 50);
        assert_eq!(board.rank_of("w59"), Some(1));
        assert_eq!(board.rank_of("w5"), None);
    }

    #[test]
    fn test_trade_stats_for() {
        let board = Leaderboard::rank(vec![standing("alice", dec!(9000))], 10);
        let stats = board.trade_stats_for("alice").unwrap();

        assert_eq!(stats.rank, 1);
        assert_eq!(stats.volume_usd, dec!(9000));
        assert_eq!(stats.trade_count, 10);
        assert!(board.trade_stats_for("nobody").is_none());
    }

    #[test]
    fn test_standing_deserializes_with_defaults() {
        let standing: TraderStanding = serde_json::from_str(r#"{"wallet": "alice", "volume_usd": 12.5}"#).unwrap();
        assert_eq!(standing.trade_count, 0);
        assert_eq!(standing.volume_usd, dec!(12.5));
    }
}
