use std::fmt::Debug;

use bzr_common::{MinorUnits, THB_CURRENCY_CODE};
use chrono::{FixedOffset, NaiveDate, Utc};
use log::*;

use crate::{
    bpe_api::order_objects::{CaptureOutcome, OrderItemRequest},
    db_types::{NewOrder, Order, OrderId, OrderLineItem, OrderStatusType},
    entitlements,
    pricing,
    pricing::PricingError,
    traits::{CaptureStatus, FulfillmentDatabase, FulfillmentError, GatewayError, PaymentGateway},
};

/// `OrderFlowApi` is the primary API for the order pipeline: it prices and creates orders, and
/// it is the single procedure both capture triggers (the client's direct call and the
/// processor's webhook) funnel into.
///
/// Capture is idempotent under any interleaving of the two triggers. The fast path is a status
/// check on the loaded order; the slow path is the store's conditional transition, which at most
/// one concurrent caller can win. Entitlements are granted by the winner only, inside the same
/// store transaction as the transition.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
    /// Offset of the storefront's market timezone, used to pick the pricing reference date.
    pricing_offset: FixedOffset,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G, pricing_offset: FixedOffset) -> Self {
        Self { db, gateway, pricing_offset }
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: FulfillmentDatabase,
    G: PaymentGateway,
{
    /// "Today" in the storefront's market timezone. Date rules are defined against this same
    /// timezone, so a plain date comparison in the pricing engine is sound.
    fn reference_date(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.pricing_offset).date_naive()
    }

    /// Submit a new checkout.
    ///
    /// Each requested item is priced at today's tier and the price is frozen into the line item.
    /// The processor order is created before anything is persisted, so a pricing or gateway
    /// failure aborts the whole operation with no partial row.
    pub async fn create_order(&self, user_id: &str, items: &[OrderItemRequest]) -> Result<Order, FulfillmentError> {
        if items.is_empty() {
            return Err(FulfillmentError::EmptyOrder);
        }
        let reference_date = self.reference_date();
        let mut line_items = Vec::with_capacity(items.len());
        for item in items {
            if item.qty <= 0 {
                return Err(FulfillmentError::InvalidQuantity(item.qty));
            }
            let package = self
                .db
                .fetch_package(&item.code)
                .await?
                .ok_or_else(|| PricingError::UnknownPackage(item.code.clone()))?;
            let unit_price = pricing::price_for(&package, reference_date)?;
            line_items.push(OrderLineItem { package_code: package.code, quantity: item.qty, unit_price });
        }
        let total: MinorUnits = line_items.iter().map(OrderLineItem::subtotal).sum();
        let external_order_id = self.gateway.create_external_order(total, THB_CURRENCY_CODE).await?;
        trace!("🔄️📦️ Processor accepted checkout [{external_order_id}] for {total}");
        let order = self.db.insert_order(NewOrder::new(user_id, external_order_id, line_items)).await?;
        info!("🔄️📦️ Order {} created for user {} at {total}", order.order_id, order.user_id);
        Ok(order)
    }

    /// Direct capture: the trigger carrying the buyer-visible order reference.
    pub async fn capture_order_by_id(&self, order_id: &OrderId) -> Result<CaptureOutcome, FulfillmentError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound(order_id.clone()))?;
        self.capture_order(order).await
    }

    /// Webhook capture: the trigger carrying the processor's order id. May fire zero, one or
    /// many times, in any order relative to the direct trigger.
    pub async fn capture_order_by_external_id(
        &self,
        external_order_id: &str,
    ) -> Result<CaptureOutcome, FulfillmentError> {
        let order = self
            .db
            .fetch_order_by_external_id(external_order_id)
            .await?
            .ok_or_else(|| FulfillmentError::ExternalOrderNotFound(external_order_id.to_string()))?;
        self.capture_order(order).await
    }

    async fn capture_order(&self, order: Order) -> Result<CaptureOutcome, FulfillmentError> {
        if order.status != OrderStatusType::Created {
            debug!("🔄️✅️ Order {} is already {}. Nothing to do", order.order_id, order.status);
            return Ok(CaptureOutcome::AlreadySettled(order));
        }
        match self.gateway.capture_external_order(&order.external_order_id).await {
            Ok(capture) => {
                if capture.status != CaptureStatus::Completed {
                    // Funds not finalised yet. Leave the order retryable for the next trigger.
                    warn!("🔄️✅️ Capture of [{}] is still pending at the processor", order.external_order_id);
                    return Err(GatewayError::Transient(format!(
                        "Capture of {} has not completed yet",
                        order.external_order_id
                    ))
                    .into());
                }
                let delta = entitlements::deltas_for(order.line_items());
                match self.db.try_settle_order(&order.order_id, &delta).await? {
                    Some(settled) => {
                        info!("🔄️✅️ Order {} captured. Granted to user {}: {delta}", settled.order_id, settled.user_id);
                        Ok(CaptureOutcome::Captured(settled))
                    },
                    None => {
                        debug!("🔄️✅️ Lost the capture race for order {}. Treating as settled", order.order_id);
                        self.reload_settled(order).await
                    },
                }
            },
            Err(GatewayError::Permanent(payload)) => {
                warn!("🔄️❌️ Processor permanently rejected capture of order {}. {payload}", order.order_id);
                match self.db.mark_order_failed(&order.order_id).await? {
                    Some(failed) => Ok(CaptureOutcome::Failed(failed)),
                    // A concurrent trigger settled the order first; its capture stands.
                    None => self.reload_settled(order).await,
                }
            },
            Err(e @ GatewayError::Transient(_)) => {
                warn!("🔄️✅️ Transient gateway failure capturing order {}. Order stays retryable. {e}", order.order_id);
                Err(e.into())
            },
        }
    }

    async fn reload_settled(&self, order: Order) -> Result<CaptureOutcome, FulfillmentError> {
        let current = self.db.fetch_order_by_order_id(&order.order_id).await?.unwrap_or(order);
        Ok(CaptureOutcome::AlreadySettled(current))
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
