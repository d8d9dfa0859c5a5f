//! Command actions and device-control types
//!
//! The numeric codes and task names in this module are a wire contract
//! shared with the field-communication consumer and the legacy transaction
//! readers. They are closed enumerations with explicit, tested conversions;
//! nothing here relies on name reflection.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Transaction actions
// ============================================================================

/// Kind of outbound command a transaction carries
///
/// Only register reads, register writes, and well-control actions have an
/// implemented encoding. Card retrieval, history retrieval, and port logging
/// are recognized extension points without an encoding yet; the composer
/// rejects them with a dedicated not-yet-supported result instead of a
/// panicking branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionAction {
    /// Read one or more controller registers
    ReadRegister,
    /// Write one or more controller registers
    WriteRegister,
    /// Execute a well-control action (start, stop, idle, scan, ...)
    WellControl,
    /// Retrieve a dynamometer card (no encoding yet)
    CardRetrieval,
    /// Retrieve controller history (no encoding yet)
    HistoryRetrieval,
    /// Start controller port logging (no encoding yet)
    PortLogging,
    /// Acknowledge an alarm on the controller
    AlarmAcknowledge,
    /// Poll controller diagnostics
    DiagnosticPoll,
}

impl TransactionAction {
    /// Numeric code embedded in the binary buffer for register actions
    ///
    /// Only read and write requests carry an action code on the wire; the
    /// well-control slot carries the control-type code instead.
    pub fn to_code(self) -> Option<i32> {
        match self {
            Self::ReadRegister => Some(1),
            Self::WriteRegister => Some(2),
            _ => None,
        }
    }

    /// Whether the composer has an encoding for this action
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            Self::ReadRegister | Self::WriteRegister | Self::WellControl
        )
    }

    /// Whether this action is a recognized extension point without an
    /// implemented encoding
    pub fn is_pending_implementation(self) -> bool {
        matches!(
            self,
            Self::CardRetrieval | Self::HistoryRetrieval | Self::PortLogging
        )
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadRegister => "ReadRegister",
            Self::WriteRegister => "WriteRegister",
            Self::WellControl => "WellControl",
            Self::CardRetrieval => "CardRetrieval",
            Self::HistoryRetrieval => "HistoryRetrieval",
            Self::PortLogging => "PortLogging",
            Self::AlarmAcknowledge => "AlarmAcknowledge",
            Self::DiagnosticPoll => "DiagnosticPoll",
        }
    }
}

impl fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Transaction tasks
// ============================================================================

/// Task label written into the envelope's Task column
///
/// Case-sensitive strings consumed by the legacy transaction readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionTask {
    /// Register read request
    GetData,
    /// Register write request
    SetData,
    /// Well-control request
    WellControl,
}

impl TransactionTask {
    /// Wire name as the legacy readers expect it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetData => "GetData",
            Self::SetData => "SetData",
            Self::WellControl => "WellControl",
        }
    }

    /// Parse from the wire name (case-sensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GetData" => Some(Self::GetData),
            "SetData" => Some(Self::SetData),
            "WellControl" => Some(Self::WellControl),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Device control types
// ============================================================================

/// Well-control action understood by the remote controller
///
/// Each variant is bound to a fixed numeric code embedded in the binary
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceControlType {
    StartWell,
    StopWell,
    IdleWell,
    ClearAlarms,
    ConstantRunMode,
    PocMode,
    PercentTimerMode,
    Scan,
    SetClock,
}

impl DeviceControlType {
    /// Numeric code embedded in the binary buffer
    pub fn to_code(self) -> i32 {
        match self {
            Self::StartWell => 1,
            Self::StopWell => 2,
            Self::IdleWell => 3,
            Self::ClearAlarms => 4,
            Self::ConstantRunMode => 5,
            Self::PocMode => 6,
            Self::PercentTimerMode => 7,
            Self::Scan => 8,
            Self::SetClock => 9,
        }
    }

    /// Parse from a numeric code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::StartWell),
            2 => Some(Self::StopWell),
            3 => Some(Self::IdleWell),
            4 => Some(Self::ClearAlarms),
            5 => Some(Self::ConstantRunMode),
            6 => Some(Self::PocMode),
            7 => Some(Self::PercentTimerMode),
            8 => Some(Self::Scan),
            9 => Some(Self::SetClock),
            _ => None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartWell => "StartWell",
            Self::StopWell => "StopWell",
            Self::IdleWell => "IdleWell",
            Self::ClearAlarms => "ClearAlarms",
            Self::ConstantRunMode => "ConstantRunMode",
            Self::PocMode => "PocMode",
            Self::PercentTimerMode => "PercentTimerMode",
            Self::Scan => "Scan",
            Self::SetClock => "SetClock",
        }
    }
}

impl fmt::Display for DeviceControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
