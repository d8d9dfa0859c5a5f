//! Five-column register list
//!
//! Register read/write requests carry five parallel columns (address,
//! datatype, value, db-value, bit-info), one row per distinct address,
//! ascending by address. The db-value and bit-info columns are always zero;
//! they exist only to keep the legacy column count.

use std::collections::{BTreeMap, HashMap};

use crate::encoder::{push_f32, push_i32};

/// Datatype code used when a write address is missing from the catalog:
/// float, Modicon representation
pub const DEFAULT_WRITE_DATA_TYPE: i16 = 3;

/// Datatype code for read requests, where the value is a placeholder
pub const READ_DATA_TYPE: i16 = 0;

/// Number of parallel columns on the wire
const COLUMN_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
struct RegRow {
    address: i32,
    data_type: i16,
    value: f64,
}

/// Register list for one read or write request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegList {
    rows: Vec<RegRow>,
}

impl RegList {
    /// Build the list for a read request
    ///
    /// Duplicate addresses collapse; datatypes are zero and values are
    /// placeholders, neither is meaningful on a read.
    pub fn for_read(addresses: &[i32]) -> Self {
        let mut unique: Vec<i32> = addresses.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let rows = unique
            .into_iter()
            .map(|address| RegRow {
                address,
                data_type: READ_DATA_TYPE,
                value: 0.0,
            })
            .collect();
        Self { rows }
    }

    /// Build the list for a write request
    ///
    /// `data_types` holds the catalog lookup result; an address absent from
    /// it falls back to [`DEFAULT_WRITE_DATA_TYPE`]. The value map already
    /// ascends by address and carries no duplicates.
    pub fn for_write(values: &BTreeMap<i32, f64>, data_types: &HashMap<i32, i16>) -> Self {
        let rows = values
            .iter()
            .map(|(&address, &value)| RegRow {
                address,
                data_type: data_types
                    .get(&address)
                    .copied()
                    .unwrap_or(DEFAULT_WRITE_DATA_TYPE),
                value,
            })
            .collect();
        Self { rows }
    }

    /// Number of addresses in the list
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Materialize the five parallel columns in wire order
    pub fn columns(&self) -> [Vec<f64>; COLUMN_COUNT] {
        [
            self.rows.iter().map(|r| f64::from(r.address)).collect(),
            self.rows.iter().map(|r| f64::from(r.data_type)).collect(),
            self.rows.iter().map(|r| r.value).collect(),
            vec![0.0; self.rows.len()], // db-value
            vec![0.0; self.rows.len()], // bit-info
        ]
    }

    /// Append the wire encoding: 4-byte LE address count, then each column
    /// in order, every cell as a 4-byte LE float
    pub fn encode(&self, buf: &mut Vec<u8>) {
        push_i32(buf, self.rows.len() as i32);
        for column in self.columns() {
            for cell in column {
                push_f32(buf, cell as f32);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
