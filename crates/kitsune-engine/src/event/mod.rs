//! Event channels used as the cross-component bus.
//!
//! A producer owns an [`EventSource`]; every consumer owns the [`Subscription`]
//! returned by `subscribe()` and drains it on its own turn of the cooperative
//! timeline. Dropping a subscription releases it.

mod source;

pub use source::{EventSource, Subscription};
