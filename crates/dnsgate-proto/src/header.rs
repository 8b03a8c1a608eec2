//! DNS message header.
//!
//! The DNS header is a fixed 12-byte structure at the start of every DNS
//! message. It contains control information and counts of the sections that
//! follow.

use crate::error::{Error, Result};
use crate::rcode::ResponseCode;
use crate::wire::WireReader;
use crate::DNS_HEADER_SIZE;
use bitflags::bitflags;
use std::fmt;

/// Mask of the 4-bit RCODE field inside the flags word.
pub const RCODE_MASK: u16 = 0x000F;

bitflags! {
    /// DNS header flags.
    ///
    /// Named bits of the second 16-bit word of the header. The opcode and
    /// RCODE nibbles live in the same word and are masked out here.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HeaderFlags: u16 {
        /// Query/Response flag: 0 = query, 1 = response
        const QR = 0x8000;

        /// Authoritative Answer: server is authoritative for the domain
        const AA = 0x0400;

        /// Truncation: message was truncated
        const TC = 0x0200;

        /// Recursion Desired: client wants recursive resolution
        const RD = 0x0100;

        /// Recursion Available: server supports recursion
        const RA = 0x0080;

        /// Reserved for future use (must be zero)
        const Z = 0x0040;

        /// Authentic Data: response data is authenticated (DNSSEC)
        const AD = 0x0020;

        /// Checking Disabled: disable DNSSEC validation
        const CD = 0x0010;
    }
}

/// DNS message header, decoded to host byte order.
///
/// # Wire Format
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    QDCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ANCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    NSCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    ARCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Message identifier for matching requests to responses.
    pub id: u16,

    /// The raw flags word, including opcode and RCODE nibbles.
    pub flags: u16,

    /// Number of questions.
    pub qd_count: u16,

    /// Number of answer records.
    pub an_count: u16,

    /// Number of authority records.
    pub ns_count: u16,

    /// Number of additional records. Carried through unchanged; OPT
    /// records in the additional section are not interpreted here.
    pub ar_count: u16,
}

impl Header {
    /// Parses a header from the first 12 bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < DNS_HEADER_SIZE {
            return Err(Error::packet_too_short(DNS_HEADER_SIZE, data.len()));
        }

        let mut reader = WireReader::new(data);
        Ok(Self {
            id: reader.read_u16()?,
            flags: reader.read_u16()?,
            qd_count: reader.read_u16()?,
            an_count: reader.read_u16()?,
            ns_count: reader.read_u16()?,
            ar_count: reader.read_u16()?,
        })
    }

    /// Returns true if this is a query (QR bit clear).
    #[inline]
    pub fn is_query(&self) -> bool {
        self.flags & HeaderFlags::QR.bits() == 0
    }

    /// Returns true if this is a response (QR bit set).
    #[inline]
    pub fn is_response(&self) -> bool {
        !self.is_query()
    }

    /// Returns the 4-bit opcode.
    #[inline]
    pub fn opcode(&self) -> u8 {
        ((self.flags >> 11) & 0x0F) as u8
    }

    /// Returns the raw 4-bit response code.
    #[inline]
    pub fn rcode(&self) -> u8 {
        (self.flags & RCODE_MASK) as u8
    }

    /// Returns true if the given named flag is set.
    #[inline]
    pub fn has_flag(&self, flag: HeaderFlags) -> bool {
        self.flags & flag.bits() != 0
    }

    /// Returns true if recursion was requested.
    #[inline]
    pub fn recursion_desired(&self) -> bool {
        self.has_flag(HeaderFlags::RD)
    }
}

/// Computes the flags word for a synthesized response.
///
/// Starts from the query's flags (preserving opcode and RD), sets QR and RA,
/// optionally sets AA, clears the RCODE nibble and installs `rcode`.
#[inline]
pub fn response_flags(query_flags: u16, rcode: ResponseCode, authoritative: bool) -> u16 {
    let mut flags = query_flags | HeaderFlags::QR.bits() | HeaderFlags::RA.bits();
    if authoritative {
        flags |= HeaderFlags::AA.bits();
    }
    (flags & !RCODE_MASK) | u16::from(u8::from(rcode))
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID:{:04X} {} op:{} rcode:{} QD:{} AN:{} NS:{} AR:{}",
            self.id,
            if self.is_query() { "query" } else { "response" },
            self.opcode(),
            self.rcode(),
            self.qd_count,
            self.an_count,
            self.ns_count,
            self.ar_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY_HEADER: [u8; 12] = [
        0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_header_parse() {
        let header = Header::parse(&QUERY_HEADER).unwrap();

        assert_eq!(header.id, 0x1234);
        assert!(header.is_query());
        assert!(header.recursion_desired());
        assert_eq!(header.opcode(), 0);
        assert_eq!(header.qd_count, 1);
        assert_eq!(header.an_count, 0);
    }

    #[test]
    fn test_header_parse_too_short() {
        let result = Header::parse(&[0; 10]);
        assert!(matches!(result, Err(Error::PacketTooShort { .. })));
    }

    #[test]
    fn test_response_detection() {
        let mut data = QUERY_HEADER;
        data[2] = 0x81; // QR=1
        let header = Header::parse(&data).unwrap();

        assert!(header.is_response());
        assert!(!header.is_query());
    }

    #[test]
    fn test_response_flags() {
        let flags = response_flags(0x0100, ResponseCode::NXDomain, false);

        assert_eq!(flags & HeaderFlags::QR.bits(), HeaderFlags::QR.bits());
        assert_eq!(flags & HeaderFlags::RA.bits(), HeaderFlags::RA.bits());
        assert_eq!(flags & HeaderFlags::RD.bits(), HeaderFlags::RD.bits());
        assert_eq!(flags & HeaderFlags::AA.bits(), 0);
        assert_eq!(flags & RCODE_MASK, 3);
    }

    #[test]
    fn test_response_flags_clears_stale_rcode() {
        // Query arrives with a nonzero rcode nibble; it must not leak through.
        let flags = response_flags(0x0105, ResponseCode::NoError, true);

        assert_eq!(flags & RCODE_MASK, 0);
        assert_eq!(flags & HeaderFlags::AA.bits(), HeaderFlags::AA.bits());
    }
}
