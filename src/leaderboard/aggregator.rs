use crate::database::entities::SaleRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Total sales for agent '{0}' overflowed")]
    SalesOverflow(String),
    #[error("Total deals for agent '{0}' overflowed")]
    DealsOverflow(String),
}

/// Per-agent totals derived from sale records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAggregate {
    pub agent_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_sales: Decimal,
    pub total_deals: i64,
}

impl AgentAggregate {
    fn empty(agent_name: &str) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            total_sales: Decimal::ZERO,
            total_deals: 0,
        }
    }
}

/// Group records by agent name and sum their amounts and deal counts.
///
/// Names are matched exactly (case-sensitive) after trimming. The map is keyed
/// by agent name, so iteration order is independent of the input order.
pub fn aggregate(
    records: &[SaleRecord],
) -> Result<BTreeMap<String, AgentAggregate>, AggregateError> {
    records.iter().try_fold(BTreeMap::new(), |mut totals, record| {
        let name = record.agent_name.trim();
        let entry = totals
            .entry(name.to_string())
            .or_insert_with(|| AgentAggregate::empty(name));
        entry.total_sales = entry
            .total_sales
            .checked_add(record.amount)
            .ok_or_else(|| AggregateError::SalesOverflow(name.to_string()))?;
        entry.total_deals = entry
            .total_deals
            .checked_add(i64::from(record.number_of_sales))
            .ok_or_else(|| AggregateError::DealsOverflow(name.to_string()))?;
        Ok(totals)
    })
}
