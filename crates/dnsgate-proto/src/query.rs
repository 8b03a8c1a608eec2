//! Zero-copy DNS query parsing.
//!
//! A [`QueryView`] is a borrowed view over the caller's packet buffer: it
//! records offsets and decoded header fields but owns no wire bytes. The
//! view stays valid only while the backing buffer lives unchanged.

use crate::error::{Error, Result};
use crate::header::Header;
use crate::name::NameScanner;
use crate::rtype::RecordType;
use crate::wire::WireReader;
use crate::{class::RecordClass, DNS_HEADER_SIZE, MIN_QUERY_SIZE};

/// Descriptor of the first question in a query.
///
/// All offsets are absolute within the packet. The invariant
/// `name_offset + wire_len + 4 <= packet_len` holds for every successfully
/// parsed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSlice {
    /// Offset of the QNAME within the packet.
    pub name_offset: usize,
    /// Length of the QNAME in its original encoding.
    pub wire_len: usize,
    /// Query type, as sent.
    pub qtype: u16,
    /// Query class, as sent.
    pub qclass: u16,
}

impl QuestionSlice {
    /// Returns the query type, if it is one the filter layer names.
    #[inline]
    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::try_from(self.qtype).ok()
    }

    /// Returns the query class, if known.
    #[inline]
    pub fn record_class(&self) -> Option<RecordClass> {
        RecordClass::try_from(self.qclass).ok()
    }

    /// Returns true if this is an A or AAAA question.
    #[inline]
    pub fn is_address_query(&self) -> bool {
        self.record_type().is_some_and(|t| t.is_address())
    }
}

/// A parsed DNS query, borrowing the packet it was parsed from.
#[derive(Debug, Clone, Copy)]
pub struct QueryView<'a> {
    packet: &'a [u8],

    /// The decoded 12-byte header.
    pub header: Header,

    /// The first (and only parsed) question.
    pub question: QuestionSlice,

    /// Offset just past the question section.
    pub question_end: usize,

    /// Total bytes consumed by header plus first question.
    pub total_consumed: usize,
}

impl<'a> QueryView<'a> {
    /// Parses the first question of a DNS query datagram.
    ///
    /// Only the header and the first question are examined; answer and
    /// authority sections, if any, are left untouched. Fails with
    /// [`Error::InvalidHeader`] when the question count is zero and with
    /// the usual wire errors on malformed names.
    pub fn parse(packet: &'a [u8]) -> Result<Self> {
        if packet.len() < MIN_QUERY_SIZE {
            return Err(Error::packet_too_short(MIN_QUERY_SIZE, packet.len()));
        }

        let header = Header::parse(packet)?;
        if header.qd_count == 0 {
            return Err(Error::InvalidHeader);
        }

        let bounds = NameScanner::new(packet).scan(DNS_HEADER_SIZE)?;

        if bounds.end + 4 > packet.len() {
            return Err(Error::truncated(bounds.end + 4));
        }

        let mut reader = WireReader::new(packet);
        reader.set_position(bounds.end);
        let qtype = reader.read_u16()?;
        let qclass = reader.read_u16()?;

        let question_end = bounds.end + 4;
        Ok(Self {
            packet,
            header,
            question: QuestionSlice {
                name_offset: DNS_HEADER_SIZE,
                wire_len: bounds.wire_len,
                qtype,
                qclass,
            },
            question_end,
            total_consumed: question_end,
        })
    }

    /// Returns the backing packet buffer.
    #[inline]
    pub const fn packet(&self) -> &'a [u8] {
        self.packet
    }

    /// Returns the message ID.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Returns the raw flags word in host order.
    #[inline]
    pub fn flags(&self) -> u16 {
        self.header.flags
    }

    /// Returns true if the datagram is a query (QR bit clear).
    #[inline]
    pub fn is_query(&self) -> bool {
        self.header.is_query()
    }

    /// Returns a name scanner over the backing packet.
    #[inline]
    pub const fn scanner(&self) -> NameScanner<'a> {
        NameScanner::new(self.packet)
    }

    /// Decodes the question name into `out` as lowercase dotted ASCII.
    pub fn decode_domain_into(&self, out: &mut [u8]) -> Result<usize> {
        self.scanner().decode_into(self.question.name_offset, out)
    }

    /// Decodes the question name into an owned string.
    pub fn domain(&self) -> Result<String> {
        self.scanner().decode_string(self.question.name_offset)
    }

    /// Case-insensitive comparison of the question name against `domain`.
    pub fn domain_equals(&self, domain: &str) -> bool {
        self.scanner().equals(self.question.name_offset, domain)
    }

    /// Tests whether the question name ends with `suffix` on a label
    /// boundary.
    pub fn domain_ends_with(&self, suffix: &str) -> bool {
        self.scanner().ends_with(self.question.name_offset, suffix)
    }
}
