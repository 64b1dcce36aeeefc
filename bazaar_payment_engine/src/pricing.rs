//! Date-tiered pricing.
//!
//! Prices are resolved once, at order-creation time, and frozen into the order's line items.
//! Packages without date rules always sell at their base price. Packages with date rules sell at
//! the price of the earliest tier whose boundary has not yet passed; once every boundary has
//! passed, the sale is closed and pricing fails rather than falling back to any tier.

use chrono::NaiveDate;
use thiserror::Error;

use bzr_common::MinorUnits;

use crate::db_types::CatalogPackage;

#[derive(Debug, Clone, Error)]
pub enum PricingError {
    #[error("There is no package with code '{0}' in the catalog")]
    UnknownPackage(String),
    #[error("Registration for '{0}' has closed")]
    RegistrationClosed(String),
}

/// Returns the price to charge for `package` on `reference_date`.
///
/// The reference date must be "today" in the same fixed timezone the rule boundaries were
/// defined in, and callers must never substitute a tier price after this fails.
pub fn price_for(package: &CatalogPackage, reference_date: NaiveDate) -> Result<MinorUnits, PricingError> {
    let rules: &[_] = match &package.date_rules {
        None => return Ok(package.base_price),
        Some(rules) => rules.as_slice(),
    };
    if rules.is_empty() {
        return Ok(package.base_price);
    }
    let mut rules = rules.to_vec();
    rules.sort_by_key(|r| r.until);
    rules
        .iter()
        .find(|rule| rule.until >= reference_date)
        .map(|rule| rule.price)
        .ok_or_else(|| PricingError::RegistrationClosed(package.code.clone()))
}
