//! Transaction payload composition
//!
//! Resolves the target asset, builds the binary instruction buffer, and
//! assembles the column-value envelope for the supported request shapes:
//! register read, register write, and well control with or without an
//! explicit equipment selection.
//!
//! Expected failures (empty asset, unresolved node or port, unsupported
//! action) surface as typed errors, logged with the correlation id; nothing
//! here panics.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use tracing::{info, warn};
use wellflow_model::{
    Column, ColumnValue, DeviceControlType, TransactionAction, TransactionRequest,
    TransactionTask, UpdatePayload,
};
use wellflow_wire::{push_i32, push_string, RegList};

use crate::allocator::TransactionIdAllocator;
use crate::error::{Result, TxnSrvError};
use crate::lookups::{AssetLookup, ParameterCatalog, TransactionLedger};

/// Rendering of the DateRequest column, matching the legacy store
const DATE_REQUEST_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Composes outbound transaction envelopes
pub struct TransactionComposer {
    assets: Arc<dyn AssetLookup>,
    catalog: Arc<dyn ParameterCatalog>,
    allocator: TransactionIdAllocator,
    /// Source tag written into every envelope
    source: String,
}

impl TransactionComposer {
    /// Create a composer over the collaborator seams
    pub fn new(
        assets: Arc<dyn AssetLookup>,
        catalog: Arc<dyn ParameterCatalog>,
        ledger: Arc<dyn TransactionLedger>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            assets,
            catalog,
            allocator: TransactionIdAllocator::new(ledger),
            source: source.into(),
        }
    }

    /// Compose a register read request
    pub async fn create_read_register_payload(
        &self,
        asset_id: &str,
        addresses: &[i32],
        correlation_id: &str,
    ) -> Result<UpdatePayload> {
        self.compose(&TransactionRequest::read(asset_id, addresses, correlation_id))
            .await
    }

    /// Compose a register write request
    pub async fn create_write_register_payload(
        &self,
        asset_id: &str,
        address_values: BTreeMap<i32, f64>,
        correlation_id: &str,
    ) -> Result<UpdatePayload> {
        self.compose(&TransactionRequest::write(
            asset_id,
            address_values,
            correlation_id,
        ))
        .await
    }

    /// Compose a well-control request with the default equipment selection
    pub async fn create_well_control_payload(
        &self,
        asset_id: &str,
        control_type: DeviceControlType,
        correlation_id: &str,
    ) -> Result<UpdatePayload> {
        self.compose(&TransactionRequest::well_control(
            asset_id,
            control_type,
            correlation_id,
        ))
        .await
    }

    /// Compose a well-control request targeting specific equipment
    pub async fn create_well_control_payload_with_equipment(
        &self,
        asset_id: &str,
        control_type: DeviceControlType,
        equipment_selection: i32,
        correlation_id: &str,
    ) -> Result<UpdatePayload> {
        self.compose(
            &TransactionRequest::well_control(asset_id, control_type, correlation_id)
                .with_equipment_selection(equipment_selection),
        )
        .await
    }

    /// Compose the envelope for any transaction request
    pub async fn compose(&self, request: &TransactionRequest) -> Result<UpdatePayload> {
        match self.try_compose(request).await {
            Ok(payload) => Ok(payload),
            Err(err) => {
                warn!(
                    "Failed to compose {} transaction for asset '{}': {} (correlation id {})",
                    request.action, request.asset_id, err, request.correlation_id
                );
                Err(err)
            }
        }
    }

    async fn try_compose(&self, request: &TransactionRequest) -> Result<UpdatePayload> {
        let correlation_id = request.correlation_id.as_str();

        // Common validation gate for every action kind
        if request.asset_id.trim().is_empty() {
            return Err(TxnSrvError::validation("Asset id is empty"));
        }
        let node_id = match self
            .assets
            .resolve_node_id(&request.asset_id, correlation_id)
            .await?
        {
            Some(node_id) if !node_id.is_empty() => node_id,
            _ => {
                return Err(TxnSrvError::validation(format!(
                    "No node id resolved for asset {}",
                    request.asset_id
                )))
            }
        };

        let (task, buffer) = match request.action {
            TransactionAction::ReadRegister => {
                let addresses: Vec<i32> = request.register_values.keys().copied().collect();
                let reg_list = RegList::for_read(&addresses);
                let buffer = encode_register_buffer(
                    &node_id,
                    TransactionAction::ReadRegister,
                    &reg_list,
                    request.event_group_id,
                )?;
                (TransactionTask::GetData, buffer)
            }
            TransactionAction::WriteRegister => {
                let addresses: Vec<i32> = request.register_values.keys().copied().collect();
                let data_types = self
                    .catalog
                    .parameter_data_types(&request.asset_id, &addresses, correlation_id)
                    .await?;
                let reg_list = RegList::for_write(&request.register_values, &data_types);
                let buffer = encode_register_buffer(
                    &node_id,
                    TransactionAction::WriteRegister,
                    &reg_list,
                    request.event_group_id,
                )?;
                (TransactionTask::SetData, buffer)
            }
            TransactionAction::WellControl => {
                let buffer = self.encode_well_control_buffer(request, &node_id).await?;
                (TransactionTask::WellControl, buffer)
            }
            action if action.is_pending_implementation() => {
                return Err(TxnSrvError::NotYetSupported(format!(
                    "{} transactions have no encoding yet",
                    action
                )))
            }
            action => {
                return Err(TxnSrvError::unsupported_action(format!(
                    "Invalid action {}",
                    action
                )))
            }
        };

        // Port resolution failure is a hard failure: no envelope
        let port_id = match self
            .assets
            .resolve_port_id(&request.asset_id, correlation_id)
            .await?
        {
            Some(port_id) => port_id,
            None => {
                return Err(TxnSrvError::validation(format!(
                    "No port resolved for asset {}",
                    request.asset_id
                )))
            }
        };

        let transaction_id = self.allocator.allocate(correlation_id).await?;

        let request_date = Utc::now() + Duration::seconds(request.interval_seconds);
        if request.action == TransactionAction::WellControl && request.interval_seconds > 0 {
            record_scheduled_control(&node_id, request.interval_seconds);
        }

        let payload = assemble_envelope(EnvelopeFields {
            transaction_id,
            request_date: request_date.format(DATE_REQUEST_FORMAT).to_string(),
            port_id,
            task,
            input: general_purpose::STANDARD.encode(&buffer),
            node_id: node_id.clone(),
            priority: request.priority,
            source: self.source.clone(),
            correlation_id: correlation_id.to_string(),
        });

        info!(
            "Composed {} transaction {} for node {} (correlation id {})",
            task, transaction_id, node_id, correlation_id
        );
        Ok(payload)
    }

    async fn encode_well_control_buffer(
        &self,
        request: &TransactionRequest,
        node_id: &str,
    ) -> Result<Vec<u8>> {
        let control_type = request.control_type.ok_or_else(|| {
            TxnSrvError::validation("Well-control request is missing a control type")
        })?;

        // Poc-type resolution failure is soft: encode zero and proceed
        let poc_type = match self
            .assets
            .resolve_poc_type_id(&request.asset_id, &request.correlation_id)
            .await?
        {
            Some(poc_type) => poc_type,
            None => {
                warn!(
                    "No poc type resolved for asset '{}', encoding zero (correlation id {})",
                    request.asset_id, request.correlation_id
                );
                0
            }
        };

        let mut buffer = Vec::new();
        push_string(&mut buffer, node_id);
        push_i32(&mut buffer, control_type.to_code());
        push_i32(&mut buffer, i32::from(poc_type));
        push_i32(&mut buffer, request.equipment_selection);
        Ok(buffer)
    }
}

/// `[node_id][action_code][reg_list][event_group?]`
fn encode_register_buffer(
    node_id: &str,
    action: TransactionAction,
    reg_list: &RegList,
    event_group_id: Option<i32>,
) -> Result<Vec<u8>> {
    let action_code = action.to_code().ok_or_else(|| {
        TxnSrvError::unsupported_action(format!("Invalid action {}", action))
    })?;

    let mut buffer = Vec::new();
    push_string(&mut buffer, node_id);
    push_i32(&mut buffer, action_code);
    reg_list.encode(&mut buffer);
    if let Some(event_group_id) = event_group_id {
        push_i32(&mut buffer, event_group_id);
    }
    Ok(buffer)
}

/// Audit trail for future-dated well-control commands.
/// The scheduler audit feed is not wired up; this stays a no-op until it is.
fn record_scheduled_control(_node_id: &str, _interval_seconds: i64) {}

struct EnvelopeFields {
    transaction_id: i32,
    request_date: String,
    port_id: i16,
    task: TransactionTask,
    input: String,
    node_id: String,
    priority: i32,
    source: String,
    correlation_id: String,
}

/// Assemble Key/Data in the contractual column order
fn assemble_envelope(fields: EnvelopeFields) -> UpdatePayload {
    let transaction_id = fields.transaction_id.to_string();
    let key = vec![ColumnValue::new(
        Column::TransactionId.as_str(),
        transaction_id.clone(),
    )];
    let data = vec![
        ColumnValue::new(Column::TransactionId.as_str(), transaction_id),
        ColumnValue::new(Column::DateRequest.as_str(), fields.request_date),
        ColumnValue::new(Column::PortId.as_str(), fields.port_id.to_string()),
        ColumnValue::new(Column::Task.as_str(), fields.task.as_str()),
        ColumnValue::new(Column::Input.as_str(), fields.input),
        ColumnValue::new(Column::NodeId.as_str(), fields.node_id),
        ColumnValue::new(Column::Priority.as_str(), fields.priority.to_string()),
        ColumnValue::new(Column::Source.as_str(), fields.source),
        ColumnValue::new(Column::CorrelationId.as_str(), fields.correlation_id),
    ];
    UpdatePayload::new(key, data)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDirectory;
    use wellflow_wire::PayloadReader;

    fn composer(directory: Arc<MockDirectory>) -> TransactionComposer {
        TransactionComposer::new(
            directory.clone(),
            directory.clone(),
            directory,
            "txnsrv",
        )
    }

    fn decode_input(payload: &UpdatePayload) -> Vec<u8> {
        let input = payload.value_of(Column::Input).expect("input column");
        general_purpose::STANDARD.decode(input).expect("valid base64")
    }

    #[tokio::test]
    async fn test_read_register_payload() {
        let directory = Arc::new(MockDirectory::well("theta sam", 32, 8));
        let composer = composer(directory);

        let payload = composer
            .create_read_register_payload("asset-1", &[10001, 10003, 10004], "cid-1")
            .await
            .expect("compose read");

        assert_eq!(payload.data[2], ColumnValue::new("PortID", "32"));
        assert_eq!(payload.data[3], ColumnValue::new("Task", "GetData"));
        assert_eq!(payload.value_of(Column::NodeId), Some("theta sam"));
        assert_eq!(payload.value_of(Column::Priority), Some("5"));
        assert_eq!(payload.value_of(Column::Source), Some("txnsrv"));
        assert_eq!(payload.value_of(Column::CorrelationId), Some("cid-1"));
        // Key holds the same transaction id as the data list
        assert_eq!(
            payload.key_transaction_id(),
            payload.value_of(Column::TransactionId)
        );

        let buffer = decode_input(&payload);
        let mut reader = PayloadReader::new(&buffer);
        assert_eq!(reader.read_string().expect("node"), "theta sam");
        assert_eq!(reader.read_i32().expect("action code"), 1);
        assert_eq!(reader.read_i32().expect("count"), 3);
        assert_eq!(reader.read_f32().expect("first address"), 10001.0);
        assert_eq!(reader.read_f32().expect("second address"), 10003.0);
        assert_eq!(reader.read_f32().expect("third address"), 10004.0);
    }

    #[tokio::test]
    async fn test_unresolved_node_is_a_hard_failure() {
        let mut directory = MockDirectory::well("theta sam", 32, 8);
        directory.node_id = Some(String::new());
        let composer = composer(Arc::new(directory));

        let err = composer
            .create_read_register_payload("asset-1", &[10001], "cid-1")
            .await
            .expect_err("empty node id must fail");
        assert!(matches!(err, TxnSrvError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_asset_id_is_a_hard_failure() {
        let composer = composer(Arc::new(MockDirectory::well("theta sam", 32, 8)));
        let err = composer
            .create_read_register_payload("  ", &[10001], "cid-1")
            .await
            .expect_err("empty asset must fail");
        assert!(matches!(err, TxnSrvError::Validation(_)));
    }

    #[tokio::test]
    async fn test_well_control_payload() {
        let directory = Arc::new(MockDirectory::well("theta sam", 32, 8));
        let composer = composer(directory);

        let payload = composer
            .create_well_control_payload("asset-1", DeviceControlType::StartWell, "cid-1")
            .await
            .expect("compose well control");

        assert_eq!(payload.data[3], ColumnValue::new("Task", "WellControl"));

        let buffer = decode_input(&payload);
        let mut reader = PayloadReader::new(&buffer);
        assert_eq!(reader.read_string().expect("node"), "theta sam");
        assert_eq!(reader.read_i32().expect("control code"), 1);
        assert_eq!(reader.read_i32().expect("poc type"), 8);
        assert_eq!(reader.read_i32().expect("equipment"), 7);
        assert_eq!(reader.remaining(), 0);
    }

    #[tokio::test]
    async fn test_poc_type_failure_is_soft() {
        let mut directory = MockDirectory::well("theta sam", 32, 8);
        directory.poc_type = None;
        let composer = composer(Arc::new(directory));

        let payload = composer
            .create_well_control_payload_with_equipment(
                "asset-1",
                DeviceControlType::StopWell,
                3,
                "cid-1",
            )
            .await
            .expect("poc failure must not abort");

        let buffer = decode_input(&payload);
        let mut reader = PayloadReader::new(&buffer);
        reader.read_string().expect("node");
        assert_eq!(reader.read_i32().expect("control code"), 2);
        assert_eq!(reader.read_i32().expect("poc type"), 0);
        assert_eq!(reader.read_i32().expect("equipment"), 3);
    }

    #[tokio::test]
    async fn test_port_failure_is_hard() {
        let mut directory = MockDirectory::well("theta sam", 32, 8);
        directory.port_id = None;
        let composer = composer(Arc::new(directory));

        let err = composer
            .create_well_control_payload("asset-1", DeviceControlType::Scan, "cid-1")
            .await
            .expect_err("missing port must fail");
        assert!(matches!(err, TxnSrvError::Validation(_)));
    }

    #[tokio::test]
    async fn test_write_register_datatype_fallback() {
        let mut directory = MockDirectory::well("theta sam", 32, 8);
        directory.data_types.insert(31001, 2);
        let composer = composer(Arc::new(directory));

        let mut values = BTreeMap::new();
        values.insert(31001, 60.5);
        values.insert(31002, 1.0);
        let payload = composer
            .create_write_register_payload("asset-1", values, "cid-1")
            .await
            .expect("compose write");

        assert_eq!(payload.value_of(Column::Task), Some("SetData"));

        let buffer = decode_input(&payload);
        let mut reader = PayloadReader::new(&buffer);
        reader.read_string().expect("node");
        assert_eq!(reader.read_i32().expect("action code"), 2);
        assert_eq!(reader.read_i32().expect("count"), 2);
        assert_eq!(reader.read_f32().expect("addr"), 31001.0);
        assert_eq!(reader.read_f32().expect("addr"), 31002.0);
        assert_eq!(reader.read_f32().expect("catalog datatype"), 2.0);
        assert_eq!(reader.read_f32().expect("fallback datatype"), 3.0);
        assert_eq!(reader.read_f32().expect("value"), 60.5);
        assert_eq!(reader.read_f32().expect("value"), 1.0);
    }

    #[tokio::test]
    async fn test_event_group_appended_when_present() {
        let composer = composer(Arc::new(MockDirectory::well("theta sam", 32, 8)));

        let request = TransactionRequest::read("asset-1", &[10001], "cid-1").with_event_group(99);
        let payload = composer.compose(&request).await.expect("compose read");

        let buffer = decode_input(&payload);
        let mut reader = PayloadReader::new(&buffer);
        reader.read_string().expect("node");
        reader.read_i32().expect("action code");
        reader.read_i32().expect("count");
        for _ in 0..5 {
            reader.read_f32().expect("cell");
        }
        assert_eq!(reader.read_i32().expect("event group"), 99);
        assert_eq!(reader.remaining(), 0);
    }

    #[tokio::test]
    async fn test_empty_address_set_is_well_defined() {
        let composer = composer(Arc::new(MockDirectory::well("theta sam", 32, 8)));

        let payload = composer
            .create_read_register_payload("asset-1", &[], "cid-1")
            .await
            .expect("empty reads compose");

        let buffer = decode_input(&payload);
        let mut reader = PayloadReader::new(&buffer);
        reader.read_string().expect("node");
        reader.read_i32().expect("action code");
        assert_eq!(reader.read_i32().expect("count"), 0);
        assert_eq!(reader.remaining(), 0);
    }

    #[tokio::test]
    async fn test_pending_actions_are_rejected_as_not_yet_supported() {
        let composer = composer(Arc::new(MockDirectory::well("theta sam", 32, 8)));

        let mut request = TransactionRequest::read("asset-1", &[10001], "cid-1");
        request.action = TransactionAction::CardRetrieval;
        let err = composer.compose(&request).await.expect_err("no encoding");
        assert!(matches!(err, TxnSrvError::NotYetSupported(_)));
    }

    #[tokio::test]
    async fn test_unhandled_actions_are_invalid() {
        let composer = composer(Arc::new(MockDirectory::well("theta sam", 32, 8)));

        let mut request = TransactionRequest::read("asset-1", &[10001], "cid-1");
        request.action = TransactionAction::AlarmAcknowledge;
        let err = composer.compose(&request).await.expect_err("no handling");
        match err {
            TxnSrvError::UnsupportedAction(msg) => {
                assert_eq!(msg, "Invalid action AlarmAcknowledge");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
