use crate::Config;
use crate::database::{DatabaseManager, DatabaseManagerImpl};
use crate::leaderboard::LeaderboardService;
use clap::Subcommand;
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand)]
pub enum SalesAction {
    /// Print the current leaderboard as JSON
    Leaderboard,
    /// Delete every recorded sale
    Clear,
}

pub async fn handle_sales_command(
    action: SalesAction,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let database: Arc<dyn DatabaseManager> =
        Arc::new(DatabaseManagerImpl::new_from_config(config).await?);
    database.migrate().await?;

    match action {
        SalesAction::Leaderboard => {
            let leaderboard = LeaderboardService::new(database).get_leaderboard().await?;
            println!("{}", serde_json::to_string_pretty(&leaderboard)?);
        }
        SalesAction::Clear => {
            let removed = database.sales().delete_all().await?;
            info!(removed, "Cleared all sales");
            println!("Deleted {} sales", removed);
        }
    }

    Ok(())
}
