use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::auth::pin::{hash_pin, validate_pin};
use crate::ledger::store;
use crate::model::employee::NewEmployee;
use crate::model::role::Role;

/// Open the pool and apply migrations.
///
/// `sqlite::memory:` gets a single long-lived connection so every caller sees
/// the same database.
pub async fn init_db(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL: {database_url}"))?
        .create_if_missing(true)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(5));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Create an `Admin` manager when the database has none yet.
pub async fn bootstrap_manager(pool: &SqlitePool, pin: &str) -> Result<()> {
    if store::count_managers(pool).await? > 0 {
        return Ok(());
    }

    validate_pin(pin).context("BOOTSTRAP_MANAGER_PIN is not a valid PIN")?;
    let pin_hash = hash_pin(pin).map_err(|e| anyhow!("Failed to hash bootstrap PIN: {e}"))?;

    let id = store::insert_employee(
        pool,
        &NewEmployee {
            name: "Admin".to_string(),
            phone: None,
            role: Role::Manager,
            daily_wage: None,
            business_id: None,
            pin_hash,
        },
    )
    .await?;

    tracing::warn!(employee_id = id, "Created bootstrap manager account");
    Ok(())
}
