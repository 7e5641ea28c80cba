use super::aggregator::AgentAggregate;
use serde::{Deserialize, Serialize};

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: u32,
    #[serde(flatten)]
    pub agent: AgentAggregate,
}

/// Sort agents by total sales (then total deals) and assign dense tie ranks.
///
/// Agents with equal `total_sales` share a rank even when their deal counts
/// differ. The next distinct value takes its 1-indexed position, so sales of
/// 200, 200, 100 rank as 1, 1, 3. The sort is stable, so agents tied on both
/// keys keep their input order.
pub fn rank(mut agents: Vec<AgentAggregate>) -> Vec<RankedEntry> {
    agents.sort_by(|a, b| {
        b.total_sales
            .cmp(&a.total_sales)
            .then_with(|| b.total_deals.cmp(&a.total_deals))
    });

    let mut ranked: Vec<RankedEntry> = Vec::with_capacity(agents.len());
    for (position, agent) in agents.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(previous) if previous.agent.total_sales == agent.total_sales => previous.rank,
            _ => position as u32 + 1,
        };
        ranked.push(RankedEntry { rank, agent });
    }
    ranked
}
