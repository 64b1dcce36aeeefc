use std::fmt::Debug;

use log::debug;
use sqlx::SqlitePool;

use crate::{
    db_types::{CatalogPackage, EntitlementDelta, EntitlementField, EntitlementRecord, NewOrder, Order, OrderId},
    sqlite::{entitlements, new_pool, orders, packages},
    traits::{EntitlementApiError, FulfillmentDatabase, FulfillmentError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, FulfillmentError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs the embedded schema migrations. Call once at startup, before serving traffic.
    pub async fn migrate(&self) -> Result<(), FulfillmentError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| FulfillmentError::DatabaseError(format!("Migration failure: {e}")))
    }
}

impl FulfillmentDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_package(&self, code: &str) -> Result<Option<CatalogPackage>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let package = packages::fetch_package(code, &mut conn).await?;
        Ok(package)
    }

    async fn upsert_package(&self, package: CatalogPackage) -> Result<(), FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        packages::upsert_package(package, &mut conn).await
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_external_id(&self, external_order_id: &str) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_external_id(external_order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn try_settle_order(
        &self,
        order_id: &OrderId,
        delta: &EntitlementDelta,
    ) -> Result<Option<Order>, FulfillmentError> {
        let mut tx = self.pool.begin().await?;
        let settled = match orders::transition_to_captured(order_id, &mut tx).await? {
            Some(order) => {
                entitlements::apply_delta(&order.user_id, delta, &mut tx).await?;
                debug!("🗃️ Order {} settled and entitlements granted to user {}", order.order_id, order.user_id);
                Some(order)
            },
            None => None,
        };
        tx.commit().await?;
        Ok(settled)
    }

    async fn mark_order_failed(&self, order_id: &OrderId) -> Result<Option<Order>, FulfillmentError> {
        let mut conn = self.pool.acquire().await?;
        orders::transition_to_failed(order_id, &mut conn).await
    }

    async fn fetch_entitlements(&self, user_id: &str) -> Result<EntitlementRecord, EntitlementApiError> {
        let mut conn = self.pool.acquire().await?;
        let record = entitlements::fetch_entitlements(user_id, &mut conn).await?;
        Ok(record.unwrap_or_else(|| EntitlementRecord::empty(user_id)))
    }

    async fn adjust_entitlement(
        &self,
        user_id: &str,
        field: EntitlementField,
        delta: i64,
    ) -> Result<i64, EntitlementApiError> {
        let mut conn = self.pool.acquire().await?;
        entitlements::adjust(user_id, field, delta, &mut conn).await
    }
}
