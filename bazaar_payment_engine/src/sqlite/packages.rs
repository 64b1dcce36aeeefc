use sqlx::SqliteConnection;

use crate::{db_types::CatalogPackage, traits::FulfillmentError};

pub async fn fetch_package(code: &str, conn: &mut SqliteConnection) -> Result<Option<CatalogPackage>, sqlx::Error> {
    let package = sqlx::query_as("SELECT * FROM packages WHERE code = $1").bind(code).fetch_optional(conn).await?;
    Ok(package)
}

pub async fn upsert_package(package: CatalogPackage, conn: &mut SqliteConnection) -> Result<(), FulfillmentError> {
    let date_rules = package
        .date_rules
        .as_ref()
        .map(|rules| serde_json::to_string(&rules.0))
        .transpose()
        .map_err(|e| FulfillmentError::DatabaseError(format!("Could not serialize date rules. {e}")))?;
    sqlx::query(
        r#"
            INSERT INTO packages (code, title, base_price, date_rules) VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO UPDATE SET
                title = excluded.title,
                base_price = excluded.base_price,
                date_rules = excluded.date_rules
        "#,
    )
    .bind(package.code)
    .bind(package.title)
    .bind(package.base_price.value())
    .bind(date_rules)
    .execute(conn)
    .await?;
    Ok(())
}
