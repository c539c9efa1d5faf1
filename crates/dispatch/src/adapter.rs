use async_trait::async_trait;

use crate::payload::DeliveryPayload;

/// Low-level platform action invoker (OneBot-style): an action name plus
/// structured JSON parameters. Errors mean "this call did not deliver" and
/// are absorbed by the dispatcher.
#[async_trait]
pub trait RawActionSender: Send + Sync {
    async fn call_action(&self, action: &str, params: serde_json::Value) -> anyhow::Result<()>;
}

/// High-level send: the adapter picks the transport appropriate to the
/// payload kind itself.
#[async_trait]
pub trait GenericSender: Send + Sync {
    async fn send(&self, recipient: &str, payload: &DeliveryPayload) -> anyhow::Result<()>;
}

/// One messaging platform. Adapters declare their capabilities statically;
/// either accessor may return `None` and the dispatcher assumes nothing.
pub trait PlatformAdapter: Send + Sync {
    /// Platform name matched against the target's `platform:` prefix.
    fn name(&self) -> &str;

    fn raw_action(&self) -> Option<&dyn RawActionSender> {
        None
    }

    fn generic(&self) -> Option<&dyn GenericSender> {
        None
    }
}
