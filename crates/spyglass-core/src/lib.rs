//! Spyglass Core
//!
//! Foundation types for the Spyglass instrumentation layer:
//!
//! - [`ObservableStore`]: mutable container with cached snapshots and
//!   synchronous subscriber notification
//! - [`KeyValueStorage`]: durable string key-value storage used to persist
//!   configuration across process restarts
//!
//! # Observable Stores
//!
//! ```
//! use spyglass_core::ObservableStore;
//!
//! let store = ObservableStore::new(Vec::<u32>::new());
//! let id = store.subscribe(|| println!("changed"));
//!
//! store.mutate(|v| v.push(1));
//!
//! let snapshot = store.snapshot();
//! assert_eq!(*snapshot, vec![1]);
//! store.unsubscribe(id);
//! ```
//!
//! # Storage
//!
//! ```
//! use spyglass_core::{KeyValueStorage, MemoryStorage};
//!
//! let storage = MemoryStorage::new();
//! storage.set("key", "value").unwrap();
//! assert_eq!(storage.get("key").as_deref(), Some("value"));
//! ```

pub mod error;
pub mod storage;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{ObservableStore, SubscriptionId};
