//! Retrying store pipeline
//!
//! Each downstream store target runs the same deserialize → map → persist
//! pipeline. Failures never escape as errors: every run ends in a
//! [`StoreOutcome`] carrying a message and an error-kind tag.
//!
//! Only outcomes classified [`ErrorKind::LikelyRecoverable`] are retried
//! after a delay. The default classification marks every explicit failure
//! path (deserialize error, empty payload, map error, mapper yielding no
//! document, persist error) as not recoverable, so against the default
//! classifier the loop runs at most once. The retry branch stays wired for
//! classifiers that do report recoverable outcomes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Result, TxnSrvError};

/// Persistence seam for one mapped document type
#[async_trait]
pub trait DocumentStore<D>: Send + Sync {
    /// Persist one document
    async fn persist(&self, document: &D) -> Result<()>;
}

/// Recoverability classification of one pipeline outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No failure
    None,
    /// Worth a delay-then-retry
    LikelyRecoverable,
    /// Retrying cannot help
    NotRecoverable,
}

/// Classifier from a pipeline error to its recoverability
pub type Classifier = fn(&TxnSrvError) -> ErrorKind;

/// Default classification: every explicit failure is final
pub fn default_classification(_err: &TxnSrvError) -> ErrorKind {
    ErrorKind::NotRecoverable
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct StoreOutcome {
    /// Whether the document reached the store
    pub success: bool,
    /// Human-readable failure description, empty on success
    pub message: String,
    /// Recoverability of the final attempt
    pub kind: ErrorKind,
}

impl StoreOutcome {
    fn success() -> Self {
        Self {
            success: true,
            message: String::new(),
            kind: ErrorKind::None,
        }
    }

    fn failure(message: String, kind: ErrorKind) -> Self {
        Self {
            success: false,
            message,
            kind,
        }
    }
}

/// Retry policy for a store pipeline
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    retry_count: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy from raw configuration values; unset callers pass 0,
    /// and negative values clamp to 0 (no retry)
    pub fn new(retry_count: i64, retry_delay_ms: i64) -> Self {
        Self {
            retry_count: retry_count.max(0) as u32,
            retry_delay: Duration::from_millis(retry_delay_ms.max(0) as u64),
        }
    }

    /// Number of retries after the first attempt
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Delay between attempts
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// Generic deserialize → map → persist pipeline for one target store
pub struct StoreManager<P, D> {
    /// Target name used in logs
    name: String,
    mapper: Box<dyn Fn(&P) -> Result<Option<D>> + Send + Sync>,
    store: Arc<dyn DocumentStore<D>>,
    policy: RetryPolicy,
    classifier: Classifier,
}

impl<P, D> StoreManager<P, D>
where
    P: DeserializeOwned + Send + Sync,
    D: Send + Sync,
{
    /// Create a pipeline with the default (non-retrying) classification
    pub fn new(
        name: impl Into<String>,
        mapper: impl Fn(&P) -> Result<Option<D>> + Send + Sync + 'static,
        store: Arc<dyn DocumentStore<D>>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            mapper: Box::new(mapper),
            store,
            policy,
            classifier: default_classification,
        }
    }

    /// Override the outcome classification
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run the pipeline on one serialized payload
    pub async fn run(&self, raw_payload: &str) -> StoreOutcome {
        let mut attempts = 0;
        loop {
            match self.attempt(raw_payload).await {
                Ok(()) => {
                    debug!("Store pipeline '{}' persisted a document", self.name);
                    return StoreOutcome::success();
                }
                Err(err) => {
                    let kind = (self.classifier)(&err);
                    if kind == ErrorKind::LikelyRecoverable && attempts < self.policy.retry_count()
                    {
                        attempts += 1;
                        warn!(
                            "Store pipeline '{}' failed ({}), retry {}/{}",
                            self.name,
                            err,
                            attempts,
                            self.policy.retry_count()
                        );
                        tokio::time::sleep(self.policy.retry_delay()).await;
                        continue;
                    }
                    warn!("Store pipeline '{}' failed: {}", self.name, err);
                    return StoreOutcome::failure(err.to_string(), kind);
                }
            }
        }
    }

    async fn attempt(&self, raw_payload: &str) -> Result<()> {
        if raw_payload.trim().is_empty() {
            return Err(TxnSrvError::deserialization("Payload is empty"));
        }

        let payload: P = serde_json::from_str(raw_payload)
            .map_err(|err| TxnSrvError::deserialization(err.to_string()))?;

        let document = match (self.mapper)(&payload) {
            Ok(Some(document)) => document,
            Ok(None) => {
                return Err(TxnSrvError::mapping("Payload mapped to no document"));
            }
            Err(err) => return Err(TxnSrvError::mapping(err.to_string())),
        };

        self.store
            .persist(&document)
            .await
            .map_err(|err| TxnSrvError::persistence(err.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
