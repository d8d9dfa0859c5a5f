//! Outbound transaction requests

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::control::{DeviceControlType, TransactionAction};

/// Default equipment-selection sent with well-control commands
pub const DEFAULT_EQUIPMENT_SELECTION: i32 = 7;

/// Default transaction priority
pub const DEFAULT_PRIORITY: i32 = 5;

/// Description of one outbound device command, built per call
///
/// Register addresses and values live in an ordered map, so duplicate
/// addresses collapse (last value wins) and iteration ascends by address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Kind of command
    pub action: TransactionAction,
    /// Asset the command targets
    pub asset_id: String,
    /// Register address to value mapping for register actions
    pub register_values: BTreeMap<i32, f64>,
    /// Well-control action for [`TransactionAction::WellControl`]
    pub control_type: Option<DeviceControlType>,
    /// Equipment selection for well-control commands
    pub equipment_selection: i32,
    /// Seconds into the future the command should be dispatched (0 = now)
    pub interval_seconds: i64,
    /// Transaction priority
    pub priority: i32,
    /// Event group appended to register buffers when present
    pub event_group_id: Option<i32>,
    /// Correlation id carried through logs and the envelope
    pub correlation_id: String,
}

impl TransactionRequest {
    /// Register read request for a set of addresses
    pub fn read(
        asset_id: impl Into<String>,
        addresses: &[i32],
        correlation_id: impl Into<String>,
    ) -> Self {
        // Values are placeholders on a read; only the addresses matter.
        let register_values = addresses.iter().map(|&addr| (addr, 0.0)).collect();
        Self {
            action: TransactionAction::ReadRegister,
            asset_id: asset_id.into(),
            register_values,
            control_type: None,
            equipment_selection: DEFAULT_EQUIPMENT_SELECTION,
            interval_seconds: 0,
            priority: DEFAULT_PRIORITY,
            event_group_id: None,
            correlation_id: correlation_id.into(),
        }
    }

    /// Register write request for an address to value mapping
    pub fn write(
        asset_id: impl Into<String>,
        register_values: BTreeMap<i32, f64>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            action: TransactionAction::WriteRegister,
            asset_id: asset_id.into(),
            register_values,
            control_type: None,
            equipment_selection: DEFAULT_EQUIPMENT_SELECTION,
            interval_seconds: 0,
            priority: DEFAULT_PRIORITY,
            event_group_id: None,
            correlation_id: correlation_id.into(),
        }
    }

    /// Well-control request
    pub fn well_control(
        asset_id: impl Into<String>,
        control_type: DeviceControlType,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            action: TransactionAction::WellControl,
            asset_id: asset_id.into(),
            register_values: BTreeMap::new(),
            control_type: Some(control_type),
            equipment_selection: DEFAULT_EQUIPMENT_SELECTION,
            interval_seconds: 0,
            priority: DEFAULT_PRIORITY,
            event_group_id: None,
            correlation_id: correlation_id.into(),
        }
    }

    /// Override the equipment selection
    pub fn with_equipment_selection(mut self, equipment_selection: i32) -> Self {
        self.equipment_selection = equipment_selection;
        self
    }

    /// Schedule the command for future dispatch
    pub fn with_interval_seconds(mut self, interval_seconds: i64) -> Self {
        self.interval_seconds = interval_seconds;
        self
    }

    /// Override the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Attach an event group
    pub fn with_event_group(mut self, event_group_id: i32) -> Self {
        self.event_group_id = Some(event_group_id);
        self
    }
}
