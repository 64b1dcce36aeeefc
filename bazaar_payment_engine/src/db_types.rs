use std::{fmt::Display, str::FromStr};

use bzr_common::{MinorUnits, THB_CURRENCY_CODE};
use chrono::{DateTime, NaiveDate, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The buyer-visible order reference, generated locally at checkout. Distinct from the payment
/// processor's own id for the same checkout ([`Order::external_order_id`]).
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn random() -> Self {
        Self(format!("bzr-{:016x}", rand::random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order exists locally and at the processor, but no funds have been taken.
    Created,
    /// The payment was captured and the entitlements were granted. Terminal.
    Captured,
    /// The processor permanently rejected the capture. Terminal.
    Failed,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Created => write!(f, "Created"),
            OrderStatusType::Captured => write!(f, "Captured"),
            OrderStatusType::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "Captured" => Ok(Self::Captured),
            "Failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Created");
            OrderStatusType::Created
        })
    }
}

//--------------------------------------    OrderLineItem      -------------------------------------------------------
/// One priced line of an order. `unit_price` is the price actually charged, frozen at
/// order-creation time; later catalog changes never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub package_code: String,
    pub quantity: i64,
    pub unit_price: MinorUnits,
}

impl OrderLineItem {
    pub fn subtotal(&self) -> MinorUnits {
        self.unit_price * self.quantity
    }
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: String,
    /// The processor's id for this checkout.
    pub external_order_id: String,
    pub status: OrderStatusType,
    pub total_price: MinorUnits,
    pub currency: String,
    pub line_items: Json<Vec<OrderLineItem>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub captured_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn line_items(&self) -> &[OrderLineItem] {
        &self.line_items.0
    }
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: String,
    pub external_order_id: String,
    pub total_price: MinorUnits,
    pub currency: String,
    pub line_items: Vec<OrderLineItem>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// Builds a new order with a freshly generated [`OrderId`]. The total is the sum of the line
    /// subtotals; it is stored alongside them and never recomputed.
    pub fn new(user_id: &str, external_order_id: String, line_items: Vec<OrderLineItem>) -> Self {
        let total_price = line_items.iter().map(OrderLineItem::subtotal).sum();
        Self {
            order_id: OrderId::random(),
            user_id: user_id.to_string(),
            external_order_id,
            total_price,
            currency: THB_CURRENCY_CODE.to_string(),
            line_items,
            created_at: Utc::now(),
        }
    }
}

//--------------------------------------      DateRule         -------------------------------------------------------
/// One tier of a date-tiered price. The rule applies to any reference date up to and including
/// `until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub until: NaiveDate,
    pub price: MinorUnits,
}

//--------------------------------------    CatalogPackage     -------------------------------------------------------
/// A sellable catalog entry. Rows are operator configuration and are read-only to the order
/// pipeline.
#[derive(Debug, Clone, FromRow)]
pub struct CatalogPackage {
    pub code: String,
    pub title: String,
    pub base_price: MinorUnits,
    /// Date-tiered prices, ascending by boundary. When present, pricing never falls back to
    /// `base_price`: a reference date past the last boundary means the sale has closed.
    pub date_rules: Option<Json<Vec<DateRule>>>,
}

impl CatalogPackage {
    pub fn new(code: &str, title: &str, base_price: MinorUnits) -> Self {
        Self { code: code.to_string(), title: title.to_string(), base_price, date_rules: None }
    }

    pub fn with_date_rules(mut self, rules: Vec<DateRule>) -> Self {
        self.date_rules = Some(Json(rules));
        self
    }
}

//--------------------------------------  EntitlementRecord    -------------------------------------------------------
/// The durable grants on a user's account. One row per user, created lazily on first write.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct EntitlementRecord {
    pub user_id: String,
    pub brand_page: bool,
    pub product_slots: i64,
    pub popup_access: bool,
    pub popup_extra_slots: i64,
    pub updated_at: DateTime<Utc>,
}

impl EntitlementRecord {
    /// The all-zero record a user has before anything was ever granted.
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            brand_page: false,
            product_slots: 0,
            popup_access: false,
            popup_extra_slots: 0,
            updated_at: Utc::now(),
        }
    }
}

//--------------------------------------   EntitlementDelta    -------------------------------------------------------
/// The additive entitlement contribution of a captured order. Flags OR into the record, counters
/// add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntitlementDelta {
    pub brand_page: bool,
    pub product_slots: i64,
    pub popup_access: bool,
    pub popup_extra_slots: i64,
}

impl EntitlementDelta {
    pub fn is_empty(&self) -> bool {
        !self.brand_page && !self.popup_access && self.product_slots == 0 && self.popup_extra_slots == 0
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            brand_page: self.brand_page || other.brand_page,
            product_slots: self.product_slots + other.product_slots,
            popup_access: self.popup_access || other.popup_access,
            popup_extra_slots: self.popup_extra_slots + other.popup_extra_slots,
        }
    }
}

impl Display for EntitlementDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "brand_page: {}, product_slots: +{}, popup_access: {}, popup_extra_slots: +{}",
            self.brand_page, self.product_slots, self.popup_access, self.popup_extra_slots
        )
    }
}

//--------------------------------------   EntitlementField    -------------------------------------------------------
/// The discrete counters that can be adjusted outside the order flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementField {
    ProductSlots,
    PopupExtraSlots,
}

impl Display for EntitlementField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntitlementField::ProductSlots => write!(f, "product_slots"),
            EntitlementField::PopupExtraSlots => write!(f, "popup_extra_slots"),
        }
    }
}

impl FromStr for EntitlementField {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product_slots" => Ok(Self::ProductSlots),
            "popup_extra_slots" => Ok(Self::PopupExtraSlots),
            s => Err(ConversionError(format!("Invalid entitlement field: {s}"))),
        }
    }
}
