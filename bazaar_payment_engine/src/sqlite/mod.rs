mod db;
pub mod entitlements;
pub mod orders;
pub mod packages;

pub use db::SqliteDatabase;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::traits::FulfillmentError;

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, FulfillmentError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
