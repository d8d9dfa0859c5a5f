//! Redis-backed collaborators
//!
//! Production wiring for the lookup, ledger, and store seams. Asset master
//! data and the parameter catalog live in Redis hashes maintained by the
//! configuration sync; transactions are hashes keyed by id, which doubles
//! as the ledger's liveness check.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::debug;
use wellflow_model::NodeRecord;

use crate::documents::{CommsCommand, TransactionDocument};
use crate::error::{Result, TxnSrvError};
use crate::lookups::{AssetLookup, ParameterCatalog, TransactionLedger};
use crate::store_manager::DocumentStore;

fn asset_key(prefix: &str, asset_id: &str) -> String {
    format!("{}asset:{}", prefix, asset_id)
}

fn node_master_key(prefix: &str, node_id: &str) -> String {
    format!("{}nodemaster:{}", prefix, node_id)
}

fn transaction_key(prefix: &str, transaction_id: i32) -> String {
    format!("{}transaction:{}", prefix, transaction_id)
}

fn data_types_key(prefix: &str, asset_id: &str) -> String {
    format!("{}datatypes:{}", prefix, asset_id)
}

fn legacy_poc_types_key(prefix: &str) -> String {
    format!("{}legacy_poc_types", prefix)
}

fn parse_field<T: std::str::FromStr>(value: &str, field: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| TxnSrvError::lookup(format!("Malformed {} field: '{}'", field, value)))
}

// ============================================================================
// Asset directory
// ============================================================================

/// Asset master data cached in Redis hashes
///
/// `{prefix}asset:{asset_id}` holds `node_id`, `port_id`, `poc_type`;
/// `{prefix}nodemaster:{node_id}` holds `poc_type` and `enabled` ("1"/"0");
/// `{prefix}legacy_poc_types` is the set of poc types on the legacy path.
pub struct RedisAssetDirectory {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisAssetDirectory {
    /// Create a directory over an established connection
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl AssetLookup for RedisAssetDirectory {
    async fn resolve_node_id(
        &self,
        asset_id: &str,
        _correlation_id: &str,
    ) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let node_id: Option<String> = conn
            .hget(asset_key(&self.prefix, asset_id), "node_id")
            .await?;
        Ok(node_id)
    }

    async fn resolve_port_id(&self, asset_id: &str, _correlation_id: &str) -> Result<Option<i16>> {
        let mut conn = self.conn.clone();
        let port_id: Option<String> = conn
            .hget(asset_key(&self.prefix, asset_id), "port_id")
            .await?;
        port_id
            .map(|value| parse_field(&value, "port_id"))
            .transpose()
    }

    async fn resolve_poc_type_id(
        &self,
        asset_id: &str,
        _correlation_id: &str,
    ) -> Result<Option<i16>> {
        let mut conn = self.conn.clone();
        let poc_type: Option<String> = conn
            .hget(asset_key(&self.prefix, asset_id), "poc_type")
            .await?;
        poc_type
            .map(|value| parse_field(&value, "poc_type"))
            .transpose()
    }

    async fn get_node(&self, node_id: &str, _correlation_id: &str) -> Result<Option<NodeRecord>> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(node_master_key(&self.prefix, node_id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let poc_type = fields
            .get("poc_type")
            .map(|value| parse_field(value, "poc_type"))
            .transpose()?
            .unwrap_or(0);
        let enabled = fields.get("enabled").map(String::as_str) == Some("1");

        Ok(Some(NodeRecord {
            node_id: node_id.to_string(),
            poc_type,
            enabled,
        }))
    }

    async fn is_legacy_well(&self, poc_type: i16, _correlation_id: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let member: bool = conn
            .sismember(legacy_poc_types_key(&self.prefix), i32::from(poc_type))
            .await?;
        Ok(member)
    }
}

#[async_trait]
impl ParameterCatalog for RedisAssetDirectory {
    async fn parameter_data_types(
        &self,
        asset_id: &str,
        addresses: &[i32],
        _correlation_id: &str,
    ) -> Result<HashMap<i32, i16>> {
        if addresses.is_empty() {
            return Ok(HashMap::new());
        }

        let mut conn = self.conn.clone();
        let fields: Vec<String> = addresses.iter().map(ToString::to_string).collect();
        let values: Vec<Option<String>> = conn
            .hget(data_types_key(&self.prefix, asset_id), fields)
            .await?;

        let mut data_types = HashMap::new();
        for (&address, value) in addresses.iter().zip(values) {
            if let Some(value) = value {
                data_types.insert(address, parse_field(&value, "data_type")?);
            }
        }
        Ok(data_types)
    }
}

// ============================================================================
// Transaction store
// ============================================================================

/// Transactions as Redis hashes keyed by id
///
/// A persisted transaction makes its id live for the ledger check. Nothing
/// here makes check-then-allocate atomic; concurrent allocators can still
/// race (see the allocator module).
pub struct RedisTransactionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisTransactionStore {
    /// Create a store over an established connection
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl TransactionLedger for RedisTransactionStore {
    async fn transaction_id_exists(
        &self,
        transaction_id: i32,
        _correlation_id: &str,
    ) -> Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn
            .exists(transaction_key(&self.prefix, transaction_id))
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl DocumentStore<TransactionDocument> for RedisTransactionStore {
    async fn persist(&self, document: &TransactionDocument) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = transaction_key(&self.prefix, document.transaction_id);
        let fields = [
            ("date_request", document.date_request.clone()),
            ("port_id", document.port_id.to_string()),
            ("task", document.task.clone()),
            ("input", document.input.clone()),
            ("node_id", document.node_id.clone()),
            ("priority", document.priority.to_string()),
            ("source", document.source.clone()),
            ("correlation_id", document.correlation_id.clone()),
        ];
        conn.hset_multiple::<_, _, _, ()>(&key, &fields).await?;
        debug!("Persisted transaction {}", document.transaction_id);
        Ok(())
    }
}

// ============================================================================
// Comms bridge
// ============================================================================

/// Hands mapped comms commands to the field comms wrapper channel
pub struct RedisCommsBridge {
    conn: ConnectionManager,
    channel: String,
}

impl RedisCommsBridge {
    /// Create a bridge publishing on a channel
    pub fn new(conn: ConnectionManager, channel: impl Into<String>) -> Self {
        Self {
            conn,
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl DocumentStore<CommsCommand> for RedisCommsBridge {
    async fn persist(&self, command: &CommsCommand) -> Result<()> {
        let mut conn = self.conn.clone();
        let message = serde_json::to_string(command)
            .map_err(|err| TxnSrvError::persistence(err.to_string()))?;
        let _: i64 = conn.publish(&self.channel, message).await?;
        debug!(
            "Handed transaction {} to comms channel {}",
            command.transaction_id, self.channel
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(asset_key("txnsrv:", "well-7"), "txnsrv:asset:well-7");
        assert_eq!(
            node_master_key("txnsrv:", "theta sam"),
            "txnsrv:nodemaster:theta sam"
        );
        assert_eq!(transaction_key("txnsrv:", 42), "txnsrv:transaction:42");
        assert_eq!(data_types_key("txnsrv:", "well-7"), "txnsrv:datatypes:well-7");
        assert_eq!(legacy_poc_types_key("txnsrv:"), "txnsrv:legacy_poc_types");
    }

    #[test]
    fn test_parse_field_errors_are_typed() {
        let err = parse_field::<i16>("not a number", "port_id").expect_err("must fail");
        assert!(matches!(err, TxnSrvError::Lookup(_)));
        let parsed: i16 = parse_field("32", "port_id").expect("parses");
        assert_eq!(parsed, 32);
    }
}
