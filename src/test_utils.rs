use crate::{
    config::Config,
    database::{DatabaseManager, DatabaseManagerImpl, entities::sales},
    server::Server,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue, Set};
use std::sync::Arc;

const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// Test server builder backed by a fresh in-memory SQLite database
pub struct TestServerBuilder {
    config: Config,
    use_memory_db: bool,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            use_memory_db: true,
        }
    }

    /// Keep the database URL from the supplied configuration
    pub fn with_real_database(mut self) -> Self {
        self.use_memory_db = false;
        self
    }

    /// Set a custom configuration
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Build the test server with migrations applied
    pub async fn build(self) -> Server {
        let mut config = self.config;

        if self.use_memory_db {
            config.database.url = MEMORY_DATABASE_URL.to_string();
        }

        // Request logging is noise in test output
        config.logging.log_request = false;

        let server = Server::new(config).await.unwrap();
        server.database.migrate().await.unwrap();
        server
    }
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Migrated in-memory store for service-level tests
pub async fn memory_database() -> Arc<dyn DatabaseManager> {
    let mut config = Config::default();
    config.database.url = MEMORY_DATABASE_URL.to_string();

    let database = DatabaseManagerImpl::new_from_config(&config).await.unwrap();
    database.migrate().await.unwrap();
    Arc::new(database)
}

/// Write a row straight to the table, bypassing the DAO's invariant checks
pub async fn insert_unchecked_sale(
    database: &Arc<dyn DatabaseManager>,
    agent_name: &str,
    amount: Decimal,
) {
    let now = Utc::now();
    sales::ActiveModel {
        id: ActiveValue::NotSet,
        agent_name: Set(agent_name.to_string()),
        amount: Set(amount),
        number_of_sales: Set(1),
        recorded_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(database.connection())
    .await
    .unwrap();
}
