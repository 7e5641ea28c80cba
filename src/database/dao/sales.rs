use crate::database::entities::{SaleRecord, sales};
use crate::database::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryOrder, Set, TransactionTrait,
};

/// Largest amount a single sale may carry (999,999,999,999.99)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Whether `amount` reads back unchanged from the REAL `amount` column.
///
/// SQLite hands the column back as an `f64`, which is then converted to a
/// `Decimal`; values with more significant digits than an `f64` holds come
/// back altered, or not at all.
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount.to_f64().and_then(Decimal::from_f64) == Some(amount)
}

/// A sale that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    pub agent_name: String,
    pub amount: Decimal,
    pub number_of_sales: i32,
    pub recorded_at: DateTime<Utc>,
}

impl NewSale {
    pub fn new(agent_name: impl Into<String>, amount: Decimal, number_of_sales: i32) -> Self {
        Self {
            agent_name: agent_name.into(),
            amount,
            number_of_sales,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }

    /// Check the row invariants enforced before anything reaches the table
    fn check(&self) -> DatabaseResult<()> {
        if self.agent_name.trim().is_empty() {
            return Err(DatabaseError::Constraint(
                "Agent name is required".to_string(),
            ));
        }
        if self.amount < Decimal::ZERO {
            return Err(DatabaseError::Constraint(
                "Amount cannot be negative".to_string(),
            ));
        }
        if self.amount > MAX_AMOUNT {
            return Err(DatabaseError::Constraint(format!(
                "Amount cannot exceed {}",
                MAX_AMOUNT
            )));
        }
        if !is_storable_amount(self.amount) {
            return Err(DatabaseError::Constraint(
                "Amount has more precision than can be stored".to_string(),
            ));
        }
        if self.number_of_sales < 1 {
            return Err(DatabaseError::Constraint(
                "Number of sales must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn into_active_model(self) -> sales::ActiveModel {
        let now = Utc::now();
        sales::ActiveModel {
            id: ActiveValue::NotSet,
            agent_name: Set(self.agent_name.trim().to_string()),
            amount: Set(self.amount),
            number_of_sales: Set(self.number_of_sales),
            recorded_at: Set(self.recorded_at),
            created_at: Set(now),
            updated_at: Set(now),
        }
    }
}

/// Sales DAO for database operations
///
/// Records are append-only: there is no update and no per-record delete.
pub struct SalesDao {
    db: DatabaseConnection,
}

impl SalesDao {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Store a single sale record
    pub async fn create(&self, sale: NewSale) -> DatabaseResult<SaleRecord> {
        sale.check()?;
        Self::insert(&self.db, sale).await
    }

    /// Store a batch of sale records atomically
    pub async fn create_many(&self, sales: Vec<NewSale>) -> DatabaseResult<Vec<SaleRecord>> {
        for sale in &sales {
            sale.check()?;
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        let mut stored = Vec::with_capacity(sales.len());
        for sale in sales {
            stored.push(Self::insert(&txn, sale).await?);
        }

        txn.commit()
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(stored)
    }

    /// Get every sale record, most recently recorded first
    pub async fn list_all(&self) -> DatabaseResult<Vec<SaleRecord>> {
        sales::Entity::find()
            .order_by_desc(sales::Column::RecordedAt)
            .order_by_desc(sales::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Count stored sale records
    pub async fn count(&self) -> DatabaseResult<u64> {
        sales::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }

    /// Remove every sale record, returning how many were deleted
    pub async fn delete_all(&self) -> DatabaseResult<u64> {
        let result = sales::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    async fn insert<C: ConnectionTrait>(conn: &C, sale: NewSale) -> DatabaseResult<SaleRecord> {
        sale.into_active_model()
            .insert(conn)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))
    }
}
