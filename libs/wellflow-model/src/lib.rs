//! WellFlow domain model
//!
//! Shared types for the well command-transaction pipeline:
//! - **Control types**: device-control actions with their fixed wire codes
//! - **Envelope**: the column-value transport envelope (`UpdatePayload`)
//!   and the change-event wrapper consumed by the dispatcher
//! - **Node records**: the asset identity resolved before any command
//! - **Transaction requests**: the per-call description of an outbound
//!   command

pub mod control;
pub mod envelope;
pub mod node;
pub mod transaction;

pub use control::{DeviceControlType, TransactionAction, TransactionTask};
pub use envelope::{
    ChangeEvent, Column, ColumnValue, UpdatePayload, INSERT_ACTION, TRANSACTIONS_PAYLOAD_TYPE,
};
pub use node::{NodeRecord, Responsibility};
pub use transaction::{TransactionRequest, DEFAULT_EQUIPMENT_SELECTION, DEFAULT_PRIORITY};
