//! DNS record classes.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS record class.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoPrimitive,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordClass {
    /// Internet - RFC 1035
    IN = 1,

    /// Chaos - RFC 1035
    CH = 3,

    /// Hesiod - RFC 1035
    HS = 4,

    /// Any class - RFC 1035
    ANY = 255,
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::IN => "IN",
            Self::CH => "CH",
            Self::HS => "HS",
            Self::ANY => "ANY",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_values() {
        assert_eq!(u16::from(RecordClass::IN), 1);
        assert_eq!(RecordClass::try_from(255u16).unwrap(), RecordClass::ANY);
    }
}
