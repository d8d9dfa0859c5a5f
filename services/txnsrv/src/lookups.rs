//! Collaborator interfaces
//!
//! Narrow async seams onto the asset master data, the transaction ledger,
//! and the parameter catalog. Production wiring backs these with the Redis
//! implementations in [`crate::storage`]; tests supply in-memory doubles.

use std::collections::HashMap;

use async_trait::async_trait;
use wellflow_model::NodeRecord;

use crate::error::Result;

/// Asset master-data lookups
#[async_trait]
pub trait AssetLookup: Send + Sync {
    /// Resolve the field-communication node id for an asset
    async fn resolve_node_id(&self, asset_id: &str, correlation_id: &str)
        -> Result<Option<String>>;

    /// Resolve the physical port the node communicates on
    async fn resolve_port_id(&self, asset_id: &str, correlation_id: &str) -> Result<Option<i16>>;

    /// Resolve the poc-type code of the attached remote controller
    async fn resolve_poc_type_id(
        &self,
        asset_id: &str,
        correlation_id: &str,
    ) -> Result<Option<i16>>;

    /// Fetch the node-master record for a node id
    async fn get_node(&self, node_id: &str, correlation_id: &str) -> Result<Option<NodeRecord>>;

    /// Whether a poc type routes through the legacy single-store path
    async fn is_legacy_well(&self, poc_type: i16, correlation_id: &str) -> Result<bool>;
}

/// Live-transaction ledger
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// Whether a transaction id is currently live in the store
    async fn transaction_id_exists(&self, transaction_id: i32, correlation_id: &str)
        -> Result<bool>;
}

/// Register parameter catalog
#[async_trait]
pub trait ParameterCatalog: Send + Sync {
    /// Batch datatype lookup for a set of register addresses
    ///
    /// Addresses absent from the returned map have no catalog entry; the
    /// register-list builder applies the write default for them.
    async fn parameter_data_types(
        &self,
        asset_id: &str,
        addresses: &[i32],
        correlation_id: &str,
    ) -> Result<HashMap<i32, i16>>;
}
