use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // every connection to :memory: is its own database
    let pool_options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    let db_pool = pool_options.connect_with(options).await?;
    create_schema(&db_pool).await?;
    tracing::info!(database_url, "room store ready");

    Ok(db_pool)
}

async fn create_schema(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS rooms (
            code TEXT PRIMARY KEY NOT NULL,
            text TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL,
            last_updated_at INTEGER NOT NULL
        )",
    )
    .execute(db_pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS rooms_last_updated_at ON rooms (last_updated_at)")
        .execute(db_pool)
        .await?;

    Ok(())
}
