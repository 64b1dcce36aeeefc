//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database and payment processor calls) must be expressed as futures or asynchronous functions. Async handlers get
//! executed concurrently by worker threads and thus don't block execution.

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use bazaar_payment_engine::{
    order_objects::CaptureOutcome,
    traits::{FulfillmentDatabase, PaymentGateway},
    EntitlementApi,
    OrderFlowApi,
};

use crate::{
    data_objects::{AdjustRequest, AdjustResult, CaptureAck, NewOrderRequest, NewOrderResult},
    errors::ServerError,
    helpers::acting_user,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(create_order => Post "/orders" impl FulfillmentDatabase, PaymentGateway);
/// Route handler for submitting a new checkout.
///
/// Each item is priced at today's tier and the result is frozen into the order. The order is
/// registered with the payment processor before it is persisted, so a failure on either side
/// leaves nothing behind. Returns the buyer-visible order id and the processor's external order
/// id the client completes payment against.
pub async fn create_order<B, G>(
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase,
    G: PaymentGateway,
{
    let NewOrderRequest { user_id, items } = body.into_inner();
    debug!("💻️ POST new order for user {user_id} with {} item(s)", items.len());
    let order = api.create_order(&user_id, &items).await?;
    let result = NewOrderResult {
        order_id: order.order_id.as_str().to_string(),
        external_order_id: order.external_order_id.clone(),
    };
    Ok(HttpResponse::Created().json(result))
}

//----------------------------------------------   Capture  ----------------------------------------------------
route!(capture_order => Post "/orders/{external_order_id}/capture" impl FulfillmentDatabase, PaymentGateway);
/// Route handler for the client-initiated capture trigger.
///
/// Idempotent: repeat calls for a settled order acknowledge without touching the processor or
/// the entitlements again. The processor's webhook funnels into the same coordinator, so it
/// makes no difference which trigger lands first.
pub async fn capture_order<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase,
    G: PaymentGateway,
{
    let external_order_id = path.into_inner();
    debug!("💻️ POST capture for external order [{external_order_id}]");
    let outcome = api.capture_order_by_external_id(&external_order_id).await?;
    let ok = !matches!(outcome, CaptureOutcome::Failed(_));
    Ok(HttpResponse::Ok().json(CaptureAck { ok, status: outcome.status() }))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl FulfillmentDatabase, PaymentGateway);
pub async fn my_orders<B, G>(
    req: HttpRequest,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase,
    G: PaymentGateway,
{
    let user_id = acting_user(&req)?;
    debug!("💻️ GET orders for user {user_id}");
    let orders = api.db().fetch_orders_for_user(&user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_external_id => Get "/orders/{external_order_id}" impl FulfillmentDatabase, PaymentGateway);
/// Order status for the checkout and billing views. Users can only see their own orders.
pub async fn order_by_external_id<B, G>(
    req: HttpRequest,
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentDatabase,
    G: PaymentGateway,
{
    let user_id = acting_user(&req)?;
    let external_order_id = path.into_inner();
    debug!("💻️ GET order [{external_order_id}] for user {user_id}");
    let order = api
        .db()
        .fetch_order_by_external_id(&external_order_id)
        .await?
        .filter(|order| order.user_id == user_id)
        .ok_or_else(|| ServerError::NoRecordFound(format!("No order with external id {external_order_id}")))?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Entitlements  ----------------------------------------------------
route!(my_entitlements => Get "/entitlements" impl FulfillmentDatabase);
pub async fn my_entitlements<B: FulfillmentDatabase>(
    req: HttpRequest,
    api: web::Data<EntitlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = acting_user(&req)?;
    debug!("💻️ GET entitlements for user {user_id}");
    let record = api.balance(&user_id).await?;
    Ok(HttpResponse::Ok().json(record))
}

route!(adjust_entitlement => Post "/entitlements/adjust" impl FulfillmentDatabase);
/// Route handler for consuming or releasing a single entitlement slot.
///
/// The adjustment is one atomic conditional update at the store; a decrement that would take
/// the counter below zero returns 400 and changes nothing.
pub async fn adjust_entitlement<B: FulfillmentDatabase>(
    req: HttpRequest,
    body: web::Json<AdjustRequest>,
    api: web::Data<EntitlementApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = acting_user(&req)?;
    let AdjustRequest { field, delta } = body.into_inner();
    debug!("💻️ POST adjust {field} by {delta} for user {user_id}");
    if delta != 1 && delta != -1 {
        return Err(ServerError::InvalidRequestBody(format!("delta must be 1 or -1. Got {delta}")));
    }
    let new_value = api.adjust(&user_id, field, delta).await?;
    Ok(HttpResponse::Ok().json(AdjustResult { new_value }))
}
