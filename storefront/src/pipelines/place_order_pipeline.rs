// storefront/src/pipelines/place_order_pipeline.rs

use std::sync::Arc;
use storefront_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl, SkipCondition};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::{OrderDraft, PaymentMethod};
use crate::pipelines::contexts::PlaceOrderCtxData;
use crate::services::cart_reducer;

fn gateway_steps_only() -> SkipCondition<PlaceOrderCtxData> {
  Arc::new(|ctx: ContextData<PlaceOrderCtxData>| ctx.read().payment_method != PaymentMethod::Razorpay)
}

/// Gateway orders keep their cart until the payment is reconciled.
fn settled_orders_only() -> SkipCondition<PlaceOrderCtxData> {
  Arc::new(|ctx: ContextData<PlaceOrderCtxData>| ctx.read().payment_method == PaymentMethod::Razorpay)
}

pub fn build_place_order_pipeline() -> Pipeline<PlaceOrderCtxData, AppError> {
  let mut p = Pipeline::<PlaceOrderCtxData, AppError>::new(&[
    ("resolve_line_items", false, None),
    ("price_order", false, None),
    ("persist_order", false, None),
    ("open_gateway_intent", false, Some(gateway_steps_only())),
    ("clear_cart", true, Some(settled_orders_only())),
  ]);

  p.on_root("resolve_line_items", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (catalog, cart) = {
        let guard = ctx_data.read();
        (guard.app_state.catalog.clone(), guard.cart.clone())
      };
      let items = cart_reducer::resolve_line_items(&cart, catalog.as_ref()).await?;
      ctx_data.write().items = items;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("price_order", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let overflow = || AppError::Validation("order total overflows".to_string());
      let subtotal = guard
        .items
        .iter()
        .try_fold(rust_decimal::Decimal::ZERO, |acc, item| {
          item.subtotal().and_then(|line| acc.checked_add(line))
        })
        .ok_or_else(overflow)?;
      let amount = subtotal
        .checked_add(guard.app_state.config.delivery_charge)
        .ok_or_else(overflow)?;
      if let Some(claimed) = guard.claimed_amount {
        if claimed != amount {
          warn!(user_id = %guard.user_id, %claimed, computed = %amount, "Client-claimed amount differs; using computed amount.");
        }
      }
      guard.amount = amount;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("persist_order", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (orders, draft) = {
        let guard = ctx_data.read();
        let draft = OrderDraft {
          user_id: guard.user_id.clone(),
          items: guard.items.clone(),
          amount: guard.amount,
          address: guard.address.clone(),
          payment_method: guard.payment_method,
        };
        (guard.app_state.orders.clone(), draft)
      };
      let order = orders.create(draft).await?;
      info!(order_id = %order.id, amount = %order.amount, method = %order.payment_method, "Order placed.");
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("open_gateway_intent", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (gateway, currency, order) = {
        let guard = ctx_data.read();
        (
          guard.app_state.gateway.clone(),
          guard.app_state.config.currency.clone(),
          guard.order.clone(),
        )
      };
      let order = order.ok_or_else(|| AppError::Internal("no persisted order to open an intent for".to_string()))?;

      let receipt = order.id.to_string();
      let intent = gateway
        .create_intent(order.amount, &currency, &receipt)
        .await
        .map_err(|e| {
          // The order stays stored and unpaid.
          warn!(order_id = %order.id, error = %e, "Could not open gateway intent.");
          AppError::from(e)
        })?;
      info!(order_id = %order.id, intent_id = %intent.id, amount_minor = intent.amount, "Gateway intent opened.");
      ctx_data.write().intent = Some(intent);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("clear_cart", |ctx_data: ContextData<PlaceOrderCtxData>| {
    Box::pin(async move {
      let (carts, user_id) = {
        let guard = ctx_data.read();
        (guard.app_state.carts.clone(), guard.user_id.clone())
      };
      carts.clear_cart(&user_id).await?;
      ctx_data.write().cart_cleared = true;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}

pub fn register_place_order_pipeline(registry: &FlowRegistry<AppError>) {
  registry.register_pipeline(build_place_order_pipeline());
}
