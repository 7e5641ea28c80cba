//! Sale ingestion: validation and persistence of new records

pub mod validation;

pub use validation::{SaleInput, ValidationError, validate_bulk_entry, validate_sale};

use crate::database::entities::SaleRecord;
use crate::database::{DatabaseError, DatabaseManager};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SalesError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Validates incoming sales and appends them to the record store
pub struct IngestionService {
    database: Arc<dyn DatabaseManager>,
}

impl IngestionService {
    pub fn new(database: Arc<dyn DatabaseManager>) -> Self {
        Self { database }
    }

    /// Record a single sale
    pub async fn add_sale(&self, input: SaleInput) -> Result<SaleRecord, SalesError> {
        let sale = validate_sale(&input)?;
        let record = self.database.sales().create(sale).await?;

        info!(
            id = record.id,
            agent = %record.agent_name,
            amount = %record.amount,
            number_of_sales = record.number_of_sales,
            "Sale recorded"
        );
        Ok(record)
    }

    /// Record a batch of sales.
    ///
    /// Entries that fail validation are dropped; the batch only fails when it
    /// is empty or nothing in it is valid. Surviving entries are stored in a
    /// single transaction.
    pub async fn add_bulk_sales(
        &self,
        sales: Option<&Value>,
    ) -> Result<Vec<SaleRecord>, SalesError> {
        let entries = match sales {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            _ => return Err(ValidationError::EmptyBatch.into()),
        };

        let valid: Vec<_> = entries.iter().filter_map(validate_bulk_entry).collect();
        let dropped = entries.len() - valid.len();
        if dropped > 0 {
            debug!(dropped, submitted = entries.len(), "Dropped invalid bulk entries");
        }
        if valid.is_empty() {
            return Err(ValidationError::NoValidRecords.into());
        }

        let records = self.database.sales().create_many(valid).await?;
        info!(count = records.len(), "Bulk sales recorded");
        Ok(records)
    }
}
