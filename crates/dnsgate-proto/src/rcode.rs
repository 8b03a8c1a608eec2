//! DNS response codes (RCODEs).
//!
//! The 4-bit RCODE field in the DNS header indicates the status of a
//! response. Defined in RFC 1035 Section 4.1.1.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// DNS response code.
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
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum ResponseCode {
    /// No error condition - RFC 1035
    NoError = 0,

    /// Format error - the server was unable to interpret the query.
    FormErr = 1,

    /// Server failure.
    ServFail = 2,

    /// Name error - the domain name referenced in the query does not exist.
    NXDomain = 3,

    /// Not implemented - the requested kind of query is unsupported.
    NotImp = 4,

    /// Query refused for policy reasons.
    Refused = 5,
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NXDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
        };
        f.write_str(s)
    }
}
