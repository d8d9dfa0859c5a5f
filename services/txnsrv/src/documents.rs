//! Documents mapped out of the transaction envelope
//!
//! The store pipelines flatten the column-value envelope into typed
//! documents before persisting or forwarding them. Missing required columns
//! are mapping failures; the optional trailing columns default.

use serde::{Deserialize, Serialize};
use wellflow_model::{Column, UpdatePayload};

use crate::error::{Result, TxnSrvError};

/// Flat transaction record for the legacy store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDocument {
    pub transaction_id: i32,
    pub date_request: String,
    pub port_id: i16,
    pub task: String,
    pub input: String,
    pub node_id: String,
    pub priority: i32,
    pub source: String,
    pub correlation_id: String,
}

impl TransactionDocument {
    /// Map an envelope into the flat record
    ///
    /// Returns `Ok(None)` for a payload with an empty data list (nothing to
    /// store) and a mapping error for missing or malformed required columns.
    pub fn from_payload(payload: &UpdatePayload) -> Result<Option<Self>> {
        if payload.data.is_empty() {
            return Ok(None);
        }

        let transaction_id = required(payload, Column::TransactionId)?
            .parse::<i32>()
            .map_err(|err| {
                TxnSrvError::mapping(format!("TransactionID is not numeric: {}", err))
            })?;
        let port_id = required(payload, Column::PortId)?
            .parse::<i16>()
            .map_err(|err| TxnSrvError::mapping(format!("PortID is not numeric: {}", err)))?;
        let priority = optional(payload, Column::Priority)
            .unwrap_or("0")
            .parse::<i32>()
            .map_err(|err| TxnSrvError::mapping(format!("Priority is not numeric: {}", err)))?;

        Ok(Some(Self {
            transaction_id,
            date_request: required(payload, Column::DateRequest)?.to_string(),
            port_id,
            task: required(payload, Column::Task)?.to_string(),
            input: required(payload, Column::Input)?.to_string(),
            node_id: required(payload, Column::NodeId)?.to_string(),
            priority,
            source: optional(payload, Column::Source).unwrap_or_default().to_string(),
            correlation_id: optional(payload, Column::CorrelationId)
                .unwrap_or_default()
                .to_string(),
        }))
    }
}

/// Command handed to the field comms wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommsCommand {
    pub transaction_id: i32,
    pub node_id: String,
    pub port_id: i16,
    pub task: String,
    /// Base64 instruction buffer, passed through untouched
    pub input: String,
    pub priority: i32,
}

impl CommsCommand {
    /// Map an envelope into the comms command
    pub fn from_payload(payload: &UpdatePayload) -> Result<Option<Self>> {
        let Some(document) = TransactionDocument::from_payload(payload)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            transaction_id: document.transaction_id,
            node_id: document.node_id,
            port_id: document.port_id,
            task: document.task,
            input: document.input,
            priority: document.priority,
        }))
    }
}

fn required(payload: &UpdatePayload, column: Column) -> Result<&str> {
    payload
        .value_of(column)
        .ok_or_else(|| TxnSrvError::mapping(format!("Missing {} column", column)))
}

fn optional(payload: &UpdatePayload, column: Column) -> Option<&str> {
    payload.value_of(column)
}

// ============================================================================
// Tests
// ============================================================================
