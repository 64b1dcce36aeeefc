//! The entitlement accumulator: the pure mapping from an order's line items to the additive
//! entitlement deltas a captured order grants.
//!
//! The mapping is deliberately a closed table over the catalog's package code families. A code
//! nobody recognises contributes nothing; it never blocks the capture.

use log::warn;

use crate::db_types::{EntitlementDelta, OrderLineItem};

/// The number of product slots included in the brand bundle package.
const BUNDLE_PRODUCT_SLOTS: i64 = 5;

/// The quantity-scaled contribution of a single line item.
pub fn delta_for_package(package_code: &str, quantity: i64) -> EntitlementDelta {
    match package_code {
        "bundle_1b5p" => EntitlementDelta {
            brand_page: true,
            product_slots: BUNDLE_PRODUCT_SLOTS * quantity,
            ..Default::default()
        },
        "brand_page" => EntitlementDelta { brand_page: true, ..Default::default() },
        "product_slot" => EntitlementDelta { product_slots: quantity, ..Default::default() },
        "popup_extra_slot" => EntitlementDelta { popup_extra_slots: quantity, ..Default::default() },
        code if code.starts_with("popup_") => EntitlementDelta { popup_access: true, ..Default::default() },
        code => {
            warn!("🎟️ Package '{code}' grants no entitlements. Skipping it in the accumulator");
            EntitlementDelta::default()
        },
    }
}

/// Sums the contributions of every line item into the single delta applied when the order is
/// captured. Safe to call at most once per captured order.
pub fn deltas_for(line_items: &[OrderLineItem]) -> EntitlementDelta {
    line_items
        .iter()
        .map(|item| delta_for_package(&item.package_code, item.quantity))
        .fold(EntitlementDelta::default(), EntitlementDelta::merge)
}

#[cfg(test)]
mod test {
    use bzr_common::MinorUnits;

    use super::{delta_for_package, deltas_for};
    use crate::db_types::{EntitlementDelta, OrderLineItem};

    fn item(code: &str, quantity: i64) -> OrderLineItem {
        OrderLineItem { package_code: code.to_string(), quantity, unit_price: MinorUnits::from(10_000) }
    }

    #[test]
    fn bundle_grants_brand_page_and_slots() {
        let delta = deltas_for(&[item("bundle_1b5p", 1)]);
        assert_eq!(delta, EntitlementDelta { brand_page: true, product_slots: 5, ..Default::default() });
    }

    #[test]
    fn counters_scale_with_quantity() {
        assert_eq!(delta_for_package("product_slot", 3).product_slots, 3);
        assert_eq!(delta_for_package("popup_extra_slot", 2).popup_extra_slots, 2);
        assert_eq!(delta_for_package("bundle_1b5p", 2).product_slots, 10);
    }

    #[test]
    fn popup_packages_grant_access() {
        let delta = delta_for_package("popup_bkk_2025", 1);
        assert!(delta.popup_access);
        assert!(!delta.brand_page);
        assert_eq!(delta.product_slots, 0);
    }

    #[test]
    fn unknown_packages_contribute_nothing() {
        assert!(delta_for_package("tote_bag", 4).is_empty());
    }

    #[test]
    fn mixed_order_sums_contributions() {
        let delta = deltas_for(&[item("bundle_1b5p", 1), item("popup_bkk_2025", 1), item("popup_extra_slot", 2)]);
        assert_eq!(delta, EntitlementDelta {
            brand_page: true,
            product_slots: 5,
            popup_access: true,
            popup_extra_slots: 2,
        });
    }
}
