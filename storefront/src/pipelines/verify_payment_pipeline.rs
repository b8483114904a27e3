// storefront/src/pipelines/verify_payment_pipeline.rs

use std::sync::Arc;
use storefront_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::gateway::{self, IntentStatus};
use crate::pipelines::contexts::VerifyPaymentCtxData;
use crate::store::{OrderPatch, PatchOutcome};

pub fn build_verify_payment_pipeline() -> Pipeline<VerifyPaymentCtxData, AppError> {
  let mut p = Pipeline::<VerifyPaymentCtxData, AppError>::new(&[
    ("authenticate_callback", false, None),
    ("fetch_intent", false, None),
    ("load_order", false, None),
    ("confirm_payment", false, None),
    // Once the order records a cleared cart, replays leave the cart alone so
    // items added since survive.
    (
      "clear_cart",
      true,
      Some(Arc::new(|ctx: ContextData<VerifyPaymentCtxData>| {
        ctx.read().order.as_ref().map_or(true, |o| o.cart_cleared)
      })),
    ),
  ]);

  p.on_root("authenticate_callback", |ctx_data: ContextData<VerifyPaymentCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      gateway::verify_callback_signature(
        &guard.app_state.config.gateway.key_secret,
        &guard.intent_id,
        &guard.payment_id,
        &guard.signature,
      )
      .map_err(|e| {
        warn!(intent_id = %guard.intent_id, "Rejected payment callback with a bad signature.");
        AppError::from(e)
      })?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("fetch_intent", |ctx_data: ContextData<VerifyPaymentCtxData>| {
    Box::pin(async move {
      let (gateway, intent_id) = {
        let guard = ctx_data.read();
        (guard.app_state.gateway.clone(), guard.intent_id.clone())
      };
      let intent = gateway.fetch_intent(&intent_id).await?;
      let paid = intent.status == IntentStatus::Paid;
      if !paid {
        info!(%intent_id, status = %intent.status, "Intent not paid; leaving order untouched.");
      }
      ctx_data.write().intent_status = Some(intent);
      Ok::<_, AppError>(if paid {
        PipelineControl::Continue
      } else {
        PipelineControl::Stop
      })
    })
  });

  p.on_root("load_order", |ctx_data: ContextData<VerifyPaymentCtxData>| {
    Box::pin(async move {
      let (orders, user_id, receipt) = {
        let guard = ctx_data.read();
        let receipt = guard.intent_status.as_ref().and_then(|s| s.receipt.clone());
        (guard.app_state.orders.clone(), guard.user_id.clone(), receipt)
      };
      let not_found = || AppError::NotFound("order for this payment".to_string());

      let order_id = receipt
        .as_deref()
        .and_then(|r| Uuid::parse_str(r).ok())
        .ok_or_else(|| {
          warn!(?receipt, "Intent receipt does not name an order.");
          not_found()
        })?;
      let order = orders.find_by_id(order_id).await?;
      if order.user_id != user_id {
        warn!(%order_id, caller = %user_id, "Payment confirmation for another user's order.");
        return Err(not_found());
      }
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("confirm_payment", |ctx_data: ContextData<VerifyPaymentCtxData>| {
    Box::pin(async move {
      let (orders, order_id, payment_id) = {
        let guard = ctx_data.read();
        let order_id = guard
          .order
          .as_ref()
          .map(|o| o.id)
          .ok_or_else(|| AppError::Internal("no order loaded to confirm".to_string()))?;
        (guard.app_state.orders.clone(), order_id, guard.payment_id.clone())
      };

      let outcome = orders
        .update_by_id(order_id, OrderPatch::ConfirmPayment { payment_id: payment_id.clone() })
        .await?;
      let (order, applied) = match outcome {
        PatchOutcome::Applied(order) => {
          info!(%order_id, %payment_id, "Payment confirmed.");
          (order, true)
        }
        PatchOutcome::Unchanged(order) => {
          info!(%order_id, "Order already paid; confirmation is a no-op.");
          (order, false)
        }
        PatchOutcome::Stale(_) => {
          return Err(AppError::Internal("payment confirmation reported a stale status".to_string()));
        }
      };

      let mut guard = ctx_data.write();
      guard.order = Some(order);
      guard.applied = applied;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("clear_cart", |ctx_data: ContextData<VerifyPaymentCtxData>| {
    Box::pin(async move {
      let (orders, carts, user_id, order_id) = {
        let guard = ctx_data.read();
        let order_id = guard
          .order
          .as_ref()
          .map(|o| o.id)
          .ok_or_else(|| AppError::Internal("no order loaded for cart clearing".to_string()))?;
        (
          guard.app_state.orders.clone(),
          guard.app_state.carts.clone(),
          guard.user_id.clone(),
          order_id,
        )
      };

      // Claim first so concurrent confirmations clear at most once.
      let claimed = match orders.update_by_id(order_id, OrderPatch::MarkCartCleared).await? {
        PatchOutcome::Applied(order) => order,
        PatchOutcome::Unchanged(_) | PatchOutcome::Stale(_) => {
          debug!(%order_id, "Cart clear already claimed.");
          return Ok(PipelineControl::Continue);
        }
      };

      if let Err(err) = carts.clear_cart(&user_id).await {
        if let Err(release_err) = orders.update_by_id(order_id, OrderPatch::UnmarkCartCleared).await {
          warn!(%order_id, error = %release_err, "Could not release the cart clear claim.");
        }
        return Err(AppError::from(err));
      }

      let mut guard = ctx_data.write();
      guard.order = Some(claimed);
      guard.cart_cleared = true;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p
}

pub fn register_verify_payment_pipeline(registry: &FlowRegistry<AppError>) {
  registry.register_pipeline(build_verify_payment_pipeline());
}
