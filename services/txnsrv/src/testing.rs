//! In-memory collaborator doubles for unit tests

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use wellflow_model::NodeRecord;

use crate::error::Result;
use crate::lookups::{AssetLookup, ParameterCatalog, TransactionLedger};

/// Scriptable in-memory stand-in for the asset directory, parameter
/// catalog, and transaction ledger
#[derive(Debug, Default)]
pub struct MockDirectory {
    pub node_id: Option<String>,
    pub port_id: Option<i16>,
    pub poc_type: Option<i16>,
    pub node: Option<NodeRecord>,
    pub data_types: HashMap<i32, i16>,
    pub live_ids: HashSet<i32>,
    pub legacy_poc_types: HashSet<i16>,
}

impl MockDirectory {
    /// A healthy, enabled well
    pub fn well(node_id: &str, port_id: i16, poc_type: i16) -> Self {
        Self {
            node_id: Some(node_id.to_string()),
            port_id: Some(port_id),
            poc_type: Some(poc_type),
            node: Some(NodeRecord {
                node_id: node_id.to_string(),
                poc_type,
                enabled: true,
            }),
            ..Self::default()
        }
    }

    /// Mark the node disabled
    pub fn disabled(mut self) -> Self {
        if let Some(node) = self.node.as_mut() {
            node.enabled = false;
        }
        self
    }

    /// Mark a poc type as routing through the legacy path
    pub fn with_legacy_poc_type(mut self, poc_type: i16) -> Self {
        self.legacy_poc_types.insert(poc_type);
        self
    }
}

#[async_trait]
impl AssetLookup for MockDirectory {
    async fn resolve_node_id(
        &self,
        _asset_id: &str,
        _correlation_id: &str,
    ) -> Result<Option<String>> {
        Ok(self.node_id.clone())
    }

    async fn resolve_port_id(&self, _asset_id: &str, _correlation_id: &str) -> Result<Option<i16>> {
        Ok(self.port_id)
    }

    async fn resolve_poc_type_id(
        &self,
        _asset_id: &str,
        _correlation_id: &str,
    ) -> Result<Option<i16>> {
        Ok(self.poc_type)
    }

    async fn get_node(&self, node_id: &str, _correlation_id: &str) -> Result<Option<NodeRecord>> {
        Ok(self
            .node
            .clone()
            .filter(|record| record.node_id == node_id))
    }

    async fn is_legacy_well(&self, poc_type: i16, _correlation_id: &str) -> Result<bool> {
        Ok(self.legacy_poc_types.contains(&poc_type))
    }
}

#[async_trait]
impl TransactionLedger for MockDirectory {
    async fn transaction_id_exists(
        &self,
        transaction_id: i32,
        _correlation_id: &str,
    ) -> Result<bool> {
        Ok(self.live_ids.contains(&transaction_id))
    }
}

#[async_trait]
impl ParameterCatalog for MockDirectory {
    async fn parameter_data_types(
        &self,
        _asset_id: &str,
        addresses: &[i32],
        _correlation_id: &str,
    ) -> Result<HashMap<i32, i16>> {
        Ok(addresses
            .iter()
            .filter_map(|address| {
                self.data_types
                    .get(address)
                    .map(|&data_type| (*address, data_type))
            })
            .collect())
    }
}
