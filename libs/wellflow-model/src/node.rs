//! Node-master records and publisher responsibilities

use std::fmt;

use serde::{Deserialize, Serialize};

/// Node-master record for a well
///
/// The field-communication identity of an asset. Commands are only
/// deliverable while the node is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Field-communication node id
    pub node_id: String,
    /// Numeric code of the attached remote controller
    pub poc_type: i16,
    /// Whether the asset accepts commands
    pub enabled: bool,
}

/// Role a registered downstream publisher fulfills during fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Responsibility {
    /// Forward the full transaction envelope to the microservices bus
    TransactionDataToMicroservices,
    /// Notify the transaction listener with the new transaction id
    TransactionIdToListener,
    /// Persist the update into the legacy transaction store
    UpdateDataToLegacyStore,
    /// Hand the update to the field comms wrapper
    UpdateDataToCommsWrapper,
}

impl Responsibility {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionDataToMicroservices => "TransactionDataToMicroservices",
            Self::TransactionIdToListener => "TransactionIdToListener",
            Self::UpdateDataToLegacyStore => "UpdateDataToLegacyStore",
            Self::UpdateDataToCommsWrapper => "UpdateDataToCommsWrapper",
        }
    }

    /// Whether this responsibility fires for a legacy well
    ///
    /// Legacy wells keep the older single-store update path: the listener
    /// and the legacy store fire, the microservices forward is suppressed.
    pub fn applies_to_legacy_well(&self) -> bool {
        matches!(
            self,
            Self::TransactionIdToListener | Self::UpdateDataToLegacyStore
        )
    }
}

impl fmt::Display for Responsibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
