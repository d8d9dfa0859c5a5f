//! Legacy binary command protocol
//!
//! Byte-level writers and readers for the instruction buffer embedded in
//! every outbound transaction, plus the five-column register list carried by
//! register read/write requests.
//!
//! The exact byte layout is a compatibility contract with the
//! field-communication consumer and must be reproduced bit-for-bit for a
//! given logical input: strings are a 2-byte little-endian UTF-16 code-unit
//! count followed by UTF-16LE text, integers are 4-byte little-endian, and
//! every register-list cell (including integral addresses and datatype
//! codes) rides the wire as a 4-byte IEEE-754 little-endian float.

pub mod encoder;
pub mod error;
pub mod reglist;

pub use encoder::{push_f32, push_i32, push_string, PayloadReader};
pub use error::{Result, WireError};
pub use reglist::{RegList, DEFAULT_WRITE_DATA_TYPE, READ_DATA_TYPE};
