use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::json;

use crate::adapter::PlatformAdapter;
use crate::payload::{DeliveryOutcome, DeliveryPayload};
use crate::target::DeliveryTarget;

/// First-success-wins delivery across a set of platform adapters.
///
/// Strategy order per adapter is fixed: raw private message, raw group
/// message (both only when the adapter exposes raw actions and the
/// recipient id is numeric), then the adapter's generic send. The first
/// strategy that returns without error ends the dispatch.
pub struct Dispatcher {
    adapters: Vec<Arc<dyn PlatformAdapter>>,
}

impl Dispatcher {
    pub fn new(adapters: Vec<Arc<dyn PlatformAdapter>>) -> Self {
        Self { adapters }
    }

    /// Deliver `payload` to `target` (`platform:id` or bare id).
    ///
    /// Never returns an error: individual adapter failures are logged and
    /// absorbed, and the aggregate result is reported in the outcome.
    pub async fn dispatch(&self, target: &str, payload: &DeliveryPayload) -> DeliveryOutcome {
        let target = DeliveryTarget::parse(target);
        let mut attempted = Vec::new();

        for adapter in &self.adapters {
            let name = adapter.name().to_string();
            if !target.matches(&name) {
                continue;
            }
            attempted.push(name.clone());

            if self.try_adapter(adapter.as_ref(), &target, payload).await {
                tracing::info!("Delivered to {} via adapter '{}'", target.recipient, name);
                return DeliveryOutcome::success(attempted, name);
            }
        }

        tracing::error!(
            "Could not deliver to '{}'; attempted adapters: [{}]",
            target.recipient,
            attempted.join(", ")
        );
        DeliveryOutcome::failure(attempted)
    }

    /// Run every strategy the adapter supports, in priority order.
    async fn try_adapter(
        &self,
        adapter: &dyn PlatformAdapter,
        target: &DeliveryTarget,
        payload: &DeliveryPayload,
    ) -> bool {
        if let (Some(raw), Some(user_id)) = (adapter.raw_action(), target.numeric_recipient()) {
            let segments = message_segments(payload);

            match raw
                .call_action(
                    "send_private_msg",
                    json!({ "user_id": user_id, "message": segments }),
                )
                .await
            {
                Ok(()) => return true,
                Err(e) => tracing::warn!(
                    "Adapter '{}' private send to {} failed: {}",
                    adapter.name(),
                    user_id,
                    e
                ),
            }

            match raw
                .call_action(
                    "send_group_msg",
                    json!({ "group_id": user_id, "message": segments }),
                )
                .await
            {
                Ok(()) => return true,
                Err(e) => tracing::warn!(
                    "Adapter '{}' group send to {} failed: {}",
                    adapter.name(),
                    user_id,
                    e
                ),
            }
        }

        if let Some(generic) = adapter.generic() {
            match generic.send(&target.recipient, payload).await {
                Ok(()) => return true,
                Err(e) => tracing::warn!(
                    "Adapter '{}' generic send to {} failed: {}",
                    adapter.name(),
                    target.recipient,
                    e
                ),
            }
        }

        false
    }
}

/// Encode a payload as raw-action message segments. Images are embedded as
/// `base64://` file segments since raw actions carry no side channel.
fn message_segments(payload: &DeliveryPayload) -> serde_json::Value {
    match payload {
        DeliveryPayload::Text(text) => json!([
            { "type": "text", "data": { "text": text } }
        ]),
        DeliveryPayload::Image { bytes, .. } => json!([
            { "type": "image", "data": { "file": format!("base64://{}", BASE64.encode(bytes)) } }
        ]),
    }
}
