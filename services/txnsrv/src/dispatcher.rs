//! Update-event dispatch
//!
//! Consumes one change event per invocation: validates the event wrapper,
//! decodes the column-value envelope, re-checks the target asset, picks the
//! legacy or modern route, and fans the event out to the registered
//! publishers. Expected failures and anything a collaborator throws are
//! logged with full context and converted to a rejected outcome; nothing
//! escapes to the caller.
//!
//! Fan-out is sequential and best-effort: a publisher failure rejects the
//! event but does not undo the publishers that already fired.

use std::sync::Arc;

use tracing::{debug, error, info};
use wellflow_model::{
    ChangeEvent, Column, UpdatePayload, INSERT_ACTION, TRANSACTIONS_PAYLOAD_TYPE,
};

use crate::error::{Result, TxnSrvError};
use crate::lookups::AssetLookup;
use crate::publish::{DispatchContext, TransactionPublisher};

/// Terminal state of one dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every routed publisher fired
    Success,
    /// The event was dropped; the reason is also logged
    Rejected { reason: String },
}

impl DispatchOutcome {
    /// Whether the event was fully dispatched
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Dispatches decoded transaction updates to the registered publishers
pub struct UpdateEventDispatcher {
    assets: Arc<dyn AssetLookup>,
    publishers: Vec<Arc<dyn TransactionPublisher>>,
}

impl UpdateEventDispatcher {
    /// Create a dispatcher over the startup-assembled publisher list
    pub fn new(
        assets: Arc<dyn AssetLookup>,
        publishers: Vec<Arc<dyn TransactionPublisher>>,
    ) -> Self {
        Self { assets, publishers }
    }

    /// Process one change event
    pub async fn handle_event(&self, event: &ChangeEvent) -> DispatchOutcome {
        match self.try_handle(event).await {
            Ok(ctx) => {
                info!(
                    "Dispatched transaction {} for node {} (correlation id {})",
                    ctx.transaction_id, ctx.node_id, ctx.correlation_id
                );
                DispatchOutcome::Success
            }
            Err(err) => {
                error!("Rejected transaction update: {}", err);
                DispatchOutcome::Rejected {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn try_handle(&self, event: &ChangeEvent) -> Result<DispatchContext> {
        // Wrapper validation, before any decode work
        if event.payload.trim().is_empty() {
            return Err(TxnSrvError::validation(
                "Received an empty transaction payload.",
            ));
        }
        if event.payload_type != TRANSACTIONS_PAYLOAD_TYPE {
            return Err(TxnSrvError::unsupported_action(format!(
                "{} is not supported.",
                event.payload_type
            )));
        }
        if event.action != INSERT_ACTION {
            return Err(TxnSrvError::unsupported_action(format!(
                "Received invalid action {}.",
                event.action
            )));
        }

        let payload = UpdatePayload::from_json(&event.payload)?;
        let ctx = decode_context(&payload, &event.payload)?;

        // The asset is re-validated on every delivery: a command must never
        // reach a well that was disabled after composition.
        let node = self
            .assets
            .get_node(&ctx.node_id, &ctx.correlation_id)
            .await?
            .ok_or_else(|| {
                TxnSrvError::validation(format!("No node master record for node {}.", ctx.node_id))
            })?;
        if !node.enabled {
            return Err(TxnSrvError::DisabledAsset(
                "Cannot perform action on a disabled asset.".to_string(),
            ));
        }

        let is_legacy = self
            .assets
            .is_legacy_well(node.poc_type, &ctx.correlation_id)
            .await?;

        for publisher in &self.publishers {
            let responsibility = publisher.responsibility();
            if is_legacy && !responsibility.applies_to_legacy_well() {
                debug!(
                    "Suppressing {} for legacy well {}",
                    responsibility, ctx.node_id
                );
                continue;
            }
            publisher.publish(&ctx).await.map_err(|err| {
                TxnSrvError::publish(format!(
                    "{} failed for transaction {}: {}",
                    responsibility, ctx.transaction_id, err
                ))
            })?;
        }

        Ok(ctx)
    }
}

/// Extract the dispatch context by column name, never by position
fn decode_context(payload: &UpdatePayload, raw_payload: &str) -> Result<DispatchContext> {
    let transaction_id = payload
        .value_of(Column::TransactionId)
        .ok_or_else(|| TxnSrvError::validation("Transaction id missing from update payload."))?
        .to_string();
    let node_id = payload
        .value_of(Column::NodeId)
        .ok_or_else(|| TxnSrvError::validation("Node id missing from update payload."))?
        .to_string();
    let correlation_id = payload
        .value_of(Column::CorrelationId)
        .unwrap_or_default()
        .to_string();

    Ok(DispatchContext {
        transaction_id,
        node_id,
        correlation_id,
        payload: payload.clone(),
        raw_payload: raw_payload.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================
