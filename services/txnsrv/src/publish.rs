//! Downstream publishers
//!
//! One publisher per responsibility, assembled at startup and handed to the
//! dispatcher read-only. The microservices and listener publishers are thin
//! Redis pub/sub clients; the legacy-store and comms-wrapper publishers run
//! their payloads through the retrying store pipeline first.

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;
use wellflow_model::{Responsibility, UpdatePayload};

use crate::documents::{CommsCommand, TransactionDocument};
use crate::error::{Result, TxnSrvError};
use crate::store_manager::{DocumentStore, RetryPolicy, StoreManager};

/// Everything a publisher gets to see for one dispatched event
#[derive(Debug, Clone)]
pub struct DispatchContext {
    pub transaction_id: String,
    pub node_id: String,
    pub correlation_id: String,
    /// Decoded envelope
    pub payload: UpdatePayload,
    /// Envelope exactly as it arrived, for pipelines that re-deserialize
    pub raw_payload: String,
}

/// A downstream publishing target
#[async_trait]
pub trait TransactionPublisher: Send + Sync {
    /// Role this publisher fulfills during fan-out
    fn responsibility(&self) -> Responsibility;

    /// Deliver one dispatched event
    async fn publish(&self, ctx: &DispatchContext) -> Result<()>;
}

// ============================================================================
// Pub/sub publishers
// ============================================================================

/// Forwards the full envelope to the microservices bus
pub struct MicroservicesPublisher {
    conn: ConnectionManager,
    channel: String,
}

impl MicroservicesPublisher {
    pub fn new(conn: ConnectionManager, channel: impl Into<String>) -> Self {
        Self {
            conn,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl TransactionPublisher for MicroservicesPublisher {
    fn responsibility(&self) -> Responsibility {
        Responsibility::TransactionDataToMicroservices
    }

    async fn publish(&self, ctx: &DispatchContext) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.publish(&self.channel, &ctx.raw_payload).await?;
        debug!(
            "Forwarded transaction {} to microservices channel {}",
            ctx.transaction_id, self.channel
        );
        Ok(())
    }
}

/// Notifies the transaction listener with the new transaction id
pub struct ListenerPublisher {
    conn: ConnectionManager,
    channel: String,
}

impl ListenerPublisher {
    pub fn new(conn: ConnectionManager, channel: impl Into<String>) -> Self {
        Self {
            conn,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl TransactionPublisher for ListenerPublisher {
    fn responsibility(&self) -> Responsibility {
        Responsibility::TransactionIdToListener
    }

    async fn publish(&self, ctx: &DispatchContext) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.publish(&self.channel, &ctx.transaction_id).await?;
        debug!(
            "Notified listener channel {} of transaction {}",
            self.channel, ctx.transaction_id
        );
        Ok(())
    }
}

// ============================================================================
// Store-pipeline publishers
// ============================================================================

/// Persists the update into the legacy transaction store
pub struct LegacyStorePublisher {
    manager: StoreManager<UpdatePayload, TransactionDocument>,
}

impl LegacyStorePublisher {
    pub fn new(store: Arc<dyn DocumentStore<TransactionDocument>>, policy: RetryPolicy) -> Self {
        Self {
            manager: StoreManager::new(
                "legacy-store",
                TransactionDocument::from_payload,
                store,
                policy,
            ),
        }
    }
}

#[async_trait]
impl TransactionPublisher for LegacyStorePublisher {
    fn responsibility(&self) -> Responsibility {
        Responsibility::UpdateDataToLegacyStore
    }

    async fn publish(&self, ctx: &DispatchContext) -> Result<()> {
        let outcome = self.manager.run(&ctx.raw_payload).await;
        if outcome.success {
            Ok(())
        } else {
            Err(TxnSrvError::persistence(outcome.message))
        }
    }
}

/// Hands the update to the field comms wrapper
pub struct CommsWrapperPublisher {
    manager: StoreManager<UpdatePayload, CommsCommand>,
}

impl CommsWrapperPublisher {
    pub fn new(bridge: Arc<dyn DocumentStore<CommsCommand>>, policy: RetryPolicy) -> Self {
        Self {
            manager: StoreManager::new("comms-wrapper", CommsCommand::from_payload, bridge, policy),
        }
    }
}

#[async_trait]
impl TransactionPublisher for CommsWrapperPublisher {
    fn responsibility(&self) -> Responsibility {
        Responsibility::UpdateDataToCommsWrapper
    }

    async fn publish(&self, ctx: &DispatchContext) -> Result<()> {
        let outcome = self.manager.run(&ctx.raw_payload).await;
        if outcome.success {
            Ok(())
        } else {
            Err(TxnSrvError::persistence(outcome.message))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wellflow_model::ColumnValue;

    struct MemoryStore<D> {
        documents: Mutex<Vec<D>>,
        fail: bool,
    }

    impl<D> MemoryStore<D> {
        fn new(fail: bool) -> Self {
            Self {
                documents: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl<D: Clone + Send + Sync> DocumentStore<D> for MemoryStore<D> {
        async fn persist(&self, document: &D) -> Result<()> {
            if self.fail {
                return Err(TxnSrvError::persistence("store offline"));
            }
            self.documents.lock().unwrap().push(document.clone());
            Ok(())
        }
    }

    fn context() -> DispatchContext {
        let data = vec![
            ColumnValue::new("TransactionID", "42"),
            ColumnValue::new("DateRequest", "2026-08-07 00:00:00"),
            ColumnValue::new("PortID", "32"),
            ColumnValue::new("Task", "GetData"),
            ColumnValue::new("Input", "AAAA"),
            ColumnValue::new("NodeID", "theta sam"),
            ColumnValue::new("Priority", "5"),
            ColumnValue::new("Source", "txnsrv"),
            ColumnValue::new("CorrelationId", "cid-1"),
        ];
        let payload =
            UpdatePayload::new(vec![ColumnValue::new("TransactionID", "42")], data);
        let raw_payload = payload.to_json().expect("serialize");
        DispatchContext {
            transaction_id: "42".to_string(),
            node_id: "theta sam".to_string(),
            correlation_id: "cid-1".to_string(),
            payload,
            raw_payload,
        }
    }

    #[tokio::test]
    async fn test_legacy_store_publisher_persists_the_document() {
        let store = Arc::new(MemoryStore::<TransactionDocument>::new(false));
        let publisher = LegacyStorePublisher::new(store.clone(), RetryPolicy::new(0, 0));
        assert_eq!(
            publisher.responsibility(),
            Responsibility::UpdateDataToLegacyStore
        );

        publisher.publish(&context()).await.expect("publish");
        let documents = store.documents.lock().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].transaction_id, 42);
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_publish_error() {
        let store = Arc::new(MemoryStore::<TransactionDocument>::new(true));
        let publisher = LegacyStorePublisher::new(store, RetryPolicy::new(0, 0));

        let err = publisher.publish(&context()).await.expect_err("must fail");
        assert!(matches!(err, TxnSrvError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_comms_wrapper_projects_the_command() {
        let bridge = Arc::new(MemoryStore::<CommsCommand>::new(false));
        let publisher = CommsWrapperPublisher::new(bridge.clone(), RetryPolicy::new(0, 0));
        assert_eq!(
            publisher.responsibility(),
            Responsibility::UpdateDataToCommsWrapper
        );

        publisher.publish(&context()).await.expect("publish");
        let commands = bridge.documents.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].node_id, "theta sam");
        assert_eq!(commands[0].input, "AAAA");
    }
}
