//! Spyglass Chaos
//!
//! Fault injection for the Spyglass instrumentation layer. The
//! [`ChaosInjector`] holds a persisted [`ChaosConfig`] and offers an
//! awaitable gate, [`ChaosInjector::apply_fault`], that optionally delays
//! the caller and optionally raises a [`SyntheticFault`].
//!
//! The fault is a dedicated error type, so downstream code distinguishes an
//! injected failure from a real one by variant, never by message content.
//!
//! ```
//! use std::sync::Arc;
//! use spyglass_chaos::ChaosInjector;
//! use spyglass_core::MemoryStorage;
//!
//! # #[tokio::main(flavor = "current_thread")] async fn main() {
//! let injector = ChaosInjector::new(Arc::new(MemoryStorage::new()));
//! assert!(!injector.config().enabled);
//!
//! // Disabled: the gate is a no-op.
//! injector.apply_fault().await.unwrap();
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fault;
pub mod injector;

pub use config::ChaosConfig;
pub use error::{ChaosError, ChaosResult};
pub use fault::SyntheticFault;
pub use injector::{CHAOS_STORAGE_KEY, ChaosInjector};
