use gateway::SeaGateway;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use store::Store;

use crate::{config::Database, error::Result};

mod commands;
mod config;
mod error;

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, command) = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pawledger={level},store={level},gateway={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let db = connect(&settings.database).await?;
    let gateway = SeaGateway::builder()
        .database(db)
        .user(&settings.user)
        .build()?;
    let mut store = Store::builder(gateway).config(settings.store).build();

    let token = store.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling pending requests");
            token.cancel();
        }
    });

    if let Err(err) = store.initialize().await {
        tracing::error!("failed to initialize store: {err}");
        return Err(err.into());
    }
    if let Some(message) = store.error() {
        tracing::warn!("{message}");
        store.clear_error();
    }

    let today = chrono::Local::now().date_naive();
    let mut out = std::io::stdout().lock();
    commands::run(&mut store, command, today, &mut out).await
}

async fn connect(database: &Database) -> Result<DatabaseConnection> {
    tracing::info!(url = %database.url(), "opening database");
    let database = sea_orm::Database::connect(database.url()).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
