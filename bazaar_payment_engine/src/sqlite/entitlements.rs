use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{EntitlementDelta, EntitlementField, EntitlementRecord},
    traits::EntitlementApiError,
};

pub async fn fetch_entitlements(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<EntitlementRecord>, sqlx::Error> {
    let record =
        sqlx::query_as("SELECT * FROM entitlements WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(record)
}

/// Applies a captured order's delta to the user's record: flags OR in, counters add, and the row
/// is created with the delta's values if the user has none yet. Callers guarantee at-most-once
/// per order by guarding this with the conditional order transition.
pub async fn apply_delta(
    user_id: &str,
    delta: &EntitlementDelta,
    conn: &mut SqliteConnection,
) -> Result<EntitlementRecord, EntitlementApiError> {
    let record: EntitlementRecord = sqlx::query_as(
        r#"
            INSERT INTO entitlements (user_id, brand_page, product_slots, popup_access, popup_extra_slots)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                brand_page = MAX(brand_page, excluded.brand_page),
                product_slots = product_slots + excluded.product_slots,
                popup_access = MAX(popup_access, excluded.popup_access),
                popup_extra_slots = popup_extra_slots + excluded.popup_extra_slots,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(delta.brand_page)
    .bind(delta.product_slots)
    .bind(delta.popup_access)
    .bind(delta.popup_extra_slots)
    .fetch_one(conn)
    .await?;
    debug!("🎟️ Applied entitlement delta for user {user_id}: {delta}");
    Ok(record)
}

// Per-field SQL pairs. The field name cannot be a bind parameter, so each adjustable counter
// gets its own pair of static queries.
const INCR_PRODUCT_SLOTS: &str = r#"
    INSERT INTO entitlements (user_id, product_slots) VALUES ($1, $2)
    ON CONFLICT (user_id) DO UPDATE SET
        product_slots = product_slots + excluded.product_slots,
        updated_at = CURRENT_TIMESTAMP
    RETURNING product_slots
"#;

const DECR_PRODUCT_SLOTS: &str = r#"
    UPDATE entitlements SET product_slots = product_slots + $2, updated_at = CURRENT_TIMESTAMP
    WHERE user_id = $1 AND product_slots + $2 >= 0
    RETURNING product_slots
"#;

const INCR_POPUP_EXTRA_SLOTS: &str = r#"
    INSERT INTO entitlements (user_id, popup_extra_slots) VALUES ($1, $2)
    ON CONFLICT (user_id) DO UPDATE SET
        popup_extra_slots = popup_extra_slots + excluded.popup_extra_slots,
        updated_at = CURRENT_TIMESTAMP
    RETURNING popup_extra_slots
"#;

const DECR_POPUP_EXTRA_SLOTS: &str = r#"
    UPDATE entitlements SET popup_extra_slots = popup_extra_slots + $2, updated_at = CURRENT_TIMESTAMP
    WHERE user_id = $1 AND popup_extra_slots + $2 >= 0
    RETURNING popup_extra_slots
"#;

/// Single-statement bounded adjustment of one counter. The bound lives in the WHERE clause, so
/// two concurrent decrements of a balance of one can never both succeed.
pub async fn adjust(
    user_id: &str,
    field: EntitlementField,
    delta: i64,
    conn: &mut SqliteConnection,
) -> Result<i64, EntitlementApiError> {
    let (incr_sql, decr_sql) = match field {
        EntitlementField::ProductSlots => (INCR_PRODUCT_SLOTS, DECR_PRODUCT_SLOTS),
        EntitlementField::PopupExtraSlots => (INCR_POPUP_EXTRA_SLOTS, DECR_POPUP_EXTRA_SLOTS),
    };
    let query = if delta >= 0 { incr_sql } else { decr_sql };
    let new_value: Option<(i64,)> =
        sqlx::query_as(query).bind(user_id).bind(delta).fetch_optional(&mut *conn).await?;
    match new_value {
        Some((value,)) => {
            trace!("🎟️ Adjusted {field} by {delta} for user {user_id}. New value: {value}");
            Ok(value)
        },
        // A decrement found no row satisfying the bound: either no record, or balance too low.
        None => Err(EntitlementApiError::InsufficientBalance { field, delta }),
    }
}
