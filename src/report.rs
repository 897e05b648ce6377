// src/report.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::application::{SwapIntent, SwapOutcome};
use crate::domain::guard::Verdict;
use crate::domain::rebalance::RebalanceOutcome;
use crate::shared::utils::generate_id;

#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub cooldown_seconds: u64,
    pub swaps: Vec<SwapReport>,
    pub summary: RunSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SwapReport {
    pub trader: String,
    pub pool: String,
    pub sequence: u64,
    pub time: u64,
    pub accepted: bool,
    pub reject_reason: Option<String>,
    pub rebalance_target: Option<String>,
    pub rebalance_amount: Option<u128>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub rebalances: usize,
}

impl RunReport {
    pub fn new(cooldown_seconds: u64, results: &[(SwapIntent, SwapOutcome)]) -> Self {
        let mut summary = RunSummary {
            total: results.len(),
            ..Default::default()
        };

        let swaps = results
            .iter()
            .map(|(intent, outcome)| {
                let (accepted, reject_reason) = match outcome.verdict {
                    Verdict::Accept => {
                        summary.accepted += 1;
                        (true, None)
                    }
                    Verdict::Reject(reason) => {
                        summary.rejected += 1;
                        (false, Some(reason.to_string()))
                    }
                };
                let (rebalance_target, rebalance_amount) = match &outcome.rebalance {
                    Some(RebalanceOutcome::Rebalanced(instruction)) => {
                        summary.rebalances += 1;
                        (
                            Some(instruction.target_pool.to_string()),
                            Some(instruction.amount),
                        )
                    }
                    _ => (None, None),
                };
                SwapReport {
                    trader: intent.trader.to_string(),
                    pool: intent.pool.to_string(),
                    sequence: intent.sequence,
                    time: intent.time,
                    accepted,
                    reject_reason,
                    rebalance_target,
                    rebalance_amount,
                }
            })
            .collect();

        Self {
            run_id: generate_id(),
            timestamp: Utc::now(),
            cooldown_seconds,
            swaps,
            summary,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("write report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rebalance::RebalanceInstruction;
    use crate::shared::errors::RejectReason;
    use crate::shared::types::{Address, PoolKey, SwapDeltas};
    use ethers_core::types::U256;

    fn intent(trader: &str) -> SwapIntent {
        SwapIntent {
            trader: Address::from(trader),
            pool: PoolKey::from("pool-a"),
            sequence: 1,
            time: 1_000,
            deltas: SwapDeltas::new(-10, 10),
            new_sqrt_price_x96: U256::one(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            (
                intent("wallet-1"),
                SwapOutcome {
                    verdict: Verdict::Accept,
                    rebalance: Some(RebalanceOutcome::Rebalanced(RebalanceInstruction {
                        source_pool: PoolKey::from("pool-a"),
                        target_pool: PoolKey::from("pool-b"),
                        amount: 50,
                    })),
                },
            ),
            (
                intent("wallet-2"),
                SwapOutcome {
                    verdict: Verdict::Accept,
                    rebalance: Some(RebalanceOutcome::NoAction),
                },
            ),
            (
                intent("bot-1"),
                SwapOutcome {
                    verdict: Verdict::Reject(RejectReason::BotBlocked),
                    rebalance: None,
                },
            ),
        ];

        let report = RunReport::new(15, &results);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.accepted, 2);
        assert_eq!(report.summary.rejected, 1);
        assert_eq!(report.summary.rebalances, 1);
        assert_eq!(report.swaps[0].rebalance_amount, Some(50));
        assert_eq!(report.swaps[2].reject_reason.as_deref(), Some("address is blocked as a bot"));
    }
}
