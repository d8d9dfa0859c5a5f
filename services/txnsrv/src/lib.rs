//! txnsrv - well command-transaction service
//!
//! Composes outbound device commands into legacy-compatible transaction
//! envelopes and dispatches stored transaction updates to the downstream
//! publishing targets.

pub mod allocator;
pub mod composer;
pub mod config;
pub mod dispatcher;
pub mod documents;
pub mod error;
pub mod lookups;
pub mod publish;
pub mod storage;
pub mod store_manager;
pub mod subscriber;

#[cfg(test)]
pub(crate) mod testing;

pub use allocator::TransactionIdAllocator;
pub use composer::TransactionComposer;
pub use config::Config;
pub use dispatcher::{DispatchOutcome, UpdateEventDispatcher};
pub use error::{Result, TxnSrvError};
pub use publish::{DispatchContext, TransactionPublisher};
pub use store_manager::{DocumentStore, ErrorKind, RetryPolicy, StoreManager};
pub use subscriber::EventSubscriber;

/// Service information
pub const SERVICE_NAME: &str = "txnsrv";
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
