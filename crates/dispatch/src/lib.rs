//! Best-effort notification delivery.
//!
//! A [`Dispatcher`] takes a target string (`platform:recipient` or a bare
//! recipient id) and a [`DeliveryPayload`], and tries every matching
//! platform adapter until one send succeeds. Individual adapter failures
//! are absorbed and logged; only the aggregate outcome is reported.
//!
//! # Example
//!
//! ```rust,ignore
//! use dispatch::{DeliveryPayload, Dispatcher};
//!
//! let dispatcher = Dispatcher::new(adapters);
//! let outcome = dispatcher
//!     .dispatch("qq:123456", &DeliveryPayload::text("今日入库日报"))
//!     .await;
//! ```

mod adapter;
mod dispatcher;
mod payload;
mod target;

pub use adapter::{GenericSender, PlatformAdapter, RawActionSender};
pub use dispatcher::Dispatcher;
pub use payload::{DeliveryOutcome, DeliveryPayload, ScopedImageFile};
pub use target::DeliveryTarget;
