use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{EntitlementField, EntitlementRecord},
    traits::{EntitlementApiError, FulfillmentDatabase},
};

/// Direct, atomic adjustment of a user's discrete entitlement counters, used outside the order
/// flow (e.g. consuming a product slot when a listing goes live and releasing it on unpublish).
pub struct EntitlementApi<B> {
    db: B,
}

impl<B> Debug for EntitlementApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntitlementApi")
    }
}

impl<B> EntitlementApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> EntitlementApi<B>
where B: FulfillmentDatabase
{
    pub async fn balance(&self, user_id: &str) -> Result<EntitlementRecord, EntitlementApiError> {
        self.db.fetch_entitlements(user_id).await
    }

    /// Applies `delta` to one counter and returns the new value. Decrements that would cross
    /// zero fail with `InsufficientBalance` and leave the counter untouched; the store enforces
    /// the bound atomically, so concurrent adjustments cannot race past it.
    pub async fn adjust(
        &self,
        user_id: &str,
        field: EntitlementField,
        delta: i64,
    ) -> Result<i64, EntitlementApiError> {
        let new_value = self.db.adjust_entitlement(user_id, field, delta).await?;
        debug!("🎟️ {field} for user {user_id} adjusted by {delta} to {new_value}");
        Ok(new_value)
    }
}
