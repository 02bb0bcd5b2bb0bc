//! Operation kinds and query text
//!
//! The query text is a compatibility surface: the target service parses it
//! verbatim, so the exact spelling and spacing below must not change.

use crate::error::ConfigError;
use std::fmt::{self, Write};
use std::str::FromStr;

/// Bit operation issued by every iteration of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Set,
    Clear,
}

impl Operation {
    /// Name of the query call
    pub fn call_name(self) -> &'static str {
        match self {
            Operation::Set => "SetBit",
            Operation::Clear => "ClearBit",
        }
    }

    /// Append the query for one (row, column) pair to `buf`
    ///
    /// # Example
    ///
    /// ```
    /// use zipfbench::driver::query::Operation;
    ///
    /// let mut buf = String::new();
    /// Operation::Set.write_query(&mut buf, "f", 42, 7);
    /// assert_eq!(buf, "SetBit(frame='f', rowID=42, columnID=7)");
    /// ```
    pub fn write_query(self, buf: &mut String, frame: &str, row_id: u64, column_id: u64) {
        // writing into a String cannot fail
        let _ = write!(
            buf,
            "{}(frame='{}', rowID={}, columnID={})",
            self.call_name(),
            frame,
            row_id,
            column_id
        );
    }

    pub fn query(self, frame: &str, row_id: u64, column_id: u64) -> String {
        let mut buf = String::new();
        self.write_query(&mut buf, frame, row_id, column_id);
        buf
    }
}

impl FromStr for Operation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(Operation::Set),
            "clear" => Ok(Operation::Clear),
            other => Err(ConfigError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Set => write!(f, "set"),
            Operation::Clear => write!(f, "clear"),
        }
    }
}
