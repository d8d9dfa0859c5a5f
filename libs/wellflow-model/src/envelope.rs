//! Column-value transport envelope
//!
//! An [`UpdatePayload`] is produced once by the composer, serialized into
//! the transaction store, and later deserialized once by the dispatcher when
//! it reappears as a change event. The `Data` column order is a contract
//! consumed by legacy readers and must be preserved exactly; readers on our
//! side extract values by column name, never by position.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Payload type tag of transaction change events (case-sensitive)
pub const TRANSACTIONS_PAYLOAD_TYPE: &str = "tblTransactions";

/// Change-event action the dispatcher accepts (case-sensitive)
pub const INSERT_ACTION: &str = "Insert";

// ============================================================================
// Columns
// ============================================================================

/// Envelope column names
///
/// Closed enumeration with explicit wire names; the ordering of
/// [`Column::DATA_ORDER`] is the exact `Data` list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    TransactionId,
    DateRequest,
    PortId,
    Task,
    Input,
    NodeId,
    Priority,
    Source,
    CorrelationId,
}

impl Column {
    /// The contractual order of the `Data` list
    pub const DATA_ORDER: [Column; 9] = [
        Column::TransactionId,
        Column::DateRequest,
        Column::PortId,
        Column::Task,
        Column::Input,
        Column::NodeId,
        Column::Priority,
        Column::Source,
        Column::CorrelationId,
    ];

    /// Wire name as the legacy readers expect it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionId => "TransactionID",
            Self::DateRequest => "DateRequest",
            Self::PortId => "PortID",
            Self::Task => "Task",
            Self::Input => "Input",
            Self::NodeId => "NodeID",
            Self::Priority => "Priority",
            Self::Source => "Source",
            Self::CorrelationId => "CorrelationId",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// One (column, value) pair of the envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnValue {
    /// Column name
    #[serde(rename = "Column")]
    pub column: String,
    /// Value rendered as a string
    #[serde(rename = "Value")]
    pub value: String,
}

impl ColumnValue {
    /// Create a new column-value pair
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// The column-value transport envelope for one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePayload {
    /// Key columns; a single entry holding the transaction id
    #[serde(rename = "Key")]
    pub key: Vec<ColumnValue>,
    /// Data columns in the contractual order
    #[serde(rename = "Data")]
    pub data: Vec<ColumnValue>,
}

impl UpdatePayload {
    /// Create an envelope from already-ordered key and data lists
    pub fn new(key: Vec<ColumnValue>, data: Vec<ColumnValue>) -> Self {
        Self { key, data }
    }

    /// Look up a data column value by name
    pub fn value_of(&self, column: Column) -> Option<&str> {
        let name = column.as_str();
        self.data
            .iter()
            .find(|cv| cv.column == name)
            .map(|cv| cv.value.as_str())
    }

    /// The transaction id from the key list, if present
    pub fn key_transaction_id(&self) -> Option<&str> {
        let name = Column::TransactionId.as_str();
        self.key
            .iter()
            .find(|cv| cv.column == name)
            .map(|cv| cv.value.as_str())
    }

    /// Serialize to the JSON form stored in the transaction feed
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from the JSON form stored in the transaction feed
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Change events
// ============================================================================

/// Change event emitted by the upstream change-capture feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Store action that produced the event ("Insert", "Update", "Delete")
    #[serde(rename = "Action")]
    pub action: String,
    /// Source payload type, e.g. "tblTransactions"
    #[serde(rename = "PayloadType")]
    pub payload_type: String,
    /// Serialized [`UpdatePayload`]
    #[serde(rename = "Payload")]
    pub payload: String,
    /// Opaque metadata from the capture feed
    #[serde(rename = "ResponseMetadata", default)]
    pub response_metadata: String,
}

impl ChangeEvent {
    /// Create an insert event for a serialized transaction payload
    pub fn insert(payload: String) -> Self {
        Self {
            action: INSERT_ACTION.to_string(),
            payload_type: TRANSACTIONS_PAYLOAD_TYPE.to_string(),
            payload,
            response_metadata: String::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> UpdatePayload {
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
        UpdatePayload::new(vec![ColumnValue::new("TransactionID", "42")], data)
    }

    #[test]
    fn test_data_order_contract() {
        let payload = sample_payload();
        let names: Vec<&str> = payload.data.iter().map(|cv| cv.column.as_str()).collect();
        let expected: Vec<&str> = Column::DATA_ORDER.iter().map(Column::as_str).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_value_lookup_by_name() {
        let payload = sample_payload();
        assert_eq!(payload.value_of(Column::NodeId), Some("theta sam"));
        assert_eq!(payload.value_of(Column::PortId), Some("32"));
        assert_eq!(payload.key_transaction_id(), Some("42"));
    }

    #[test]
    fn test_json_field_names() {
        let payload = sample_payload();
        let json = payload.to_json().expect("serialize payload");
        assert!(json.starts_with(r#"{"Key":[{"Column":"TransactionID","Value":"42"}]"#));

        let restored = UpdatePayload::from_json(&json).expect("deserialize payload");
        assert_eq!(restored, payload);
    }

    #[test]
    fn test_change_event_round_trip() {
        let event = ChangeEvent::insert("{}".to_string());
        let json = serde_json::to_string(&event).expect("serialize event");
        assert!(json.contains(r#""PayloadType":"tblTransactions""#));

        let restored: ChangeEvent = serde_json::from_str(&json).expect("deserialize event");
        assert_eq!(restored.action, "Insert");
        assert_eq!(restored.payload_type, TRANSACTIONS_PAYLOAD_TYPE);
    }
}
