// src/db.rs
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

const SCHEMA: &str = include_str!("../schema.sql");

pub async fn create_pool(database_url: &str) -> Result<Pool<Postgres>, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Apply the schema. Every statement is `IF NOT EXISTS`, so this is safe
/// to run on every startup.
pub async fn init_schema(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
