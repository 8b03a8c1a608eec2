//! DNS response synthesis.
//!
//! Every builder copies the original query verbatim (header + question,
//! `total_consumed` bytes), patches the flags and section counts in place,
//! and appends at most one answer record. Because the question bytes are
//! reproduced bit-for-bit, answer records refer back to the QNAME with a
//! compression pointer to offset 12.
//!
//! The output buffer must not alias the input packet. On
//! [`Error::BufferTooSmall`] nothing is written.

use crate::error::{Error, Result};
use crate::header::response_flags;
use crate::query::QueryView;
use crate::rcode::ResponseCode;
use crate::rtype::RecordType;
use crate::{class::RecordClass, DNS_HEADER_SIZE};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Wire size of a synthesized A answer record.
///
/// Name pointer (2) + type (2) + class (2) + TTL (4) + RDLENGTH (2) + IPv4 (4).
pub const A_ANSWER_SIZE: usize = 16;

/// Wire size of a synthesized AAAA answer record.
///
/// Name pointer (2) + type (2) + class (2) + TTL (4) + RDLENGTH (2) + IPv6 (16).
pub const AAAA_ANSWER_SIZE: usize = 28;

/// Copies the question section and patches header flags and counts.
fn copy_and_patch(
    query: &QueryView<'_>,
    out: &mut [u8],
    rcode: ResponseCode,
    authoritative: bool,
    an_count: u16,
) {
    let n = query.total_consumed;
    out[..n].copy_from_slice(&query.packet()[..n]);

    let flags = response_flags(query.flags(), rcode, authoritative);
    out[2..4].copy_from_slice(&flags.to_be_bytes());
    out[6..8].copy_from_slice(&an_count.to_be_bytes());
    out[8..10].copy_from_slice(&[0, 0]);
    out[10..12].copy_from_slice(&[0, 0]);
}

#[inline]
fn put_u16(out: &mut [u8], pos: usize, value: u16) {
    out[pos..pos + 2].copy_from_slice(&value.to_be_bytes());
}

#[inline]
fn put_u32(out: &mut [u8], pos: usize, value: u32) {
    out[pos..pos + 4].copy_from_slice(&value.to_be_bytes());
}

/// Writes the common prefix of an answer record and returns the offset of
/// its RDLENGTH field's successor (where RDATA starts).
fn put_answer_prefix(
    out: &mut [u8],
    mut pos: usize,
    rtype: RecordType,
    ttl: u32,
    rdlength: u16,
) -> usize {
    // Compression pointer to the QNAME at offset 12.
    out[pos] = 0xC0;
    out[pos + 1] = DNS_HEADER_SIZE as u8;
    pos += 2;

    put_u16(out, pos, u16::from(rtype));
    pos += 2;
    put_u16(out, pos, u16::from(RecordClass::IN));
    pos += 2;
    put_u32(out, pos, ttl);
    pos += 4;
    put_u16(out, pos, rdlength);
    pos + 2
}

/// Builds an NXDOMAIN response: the query echoed back with RCODE 3 and no
/// answer records.
pub fn build_nxdomain(query: &QueryView<'_>, out: &mut [u8]) -> Result<usize> {
    let needed = query.total_consumed;
    if out.len() < needed {
        return Err(Error::buffer_too_small(needed, out.len()));
    }

    copy_and_patch(query, out, ResponseCode::NXDomain, false, 0);
    Ok(needed)
}

/// Builds a REFUSED response: the query echoed back with RCODE 5 and no
/// answer records.
pub fn build_refused(query: &QueryView<'_>, out: &mut [u8]) -> Result<usize> {
    let needed = query.total_consumed;
    if out.len() < needed {
        return Err(Error::buffer_too_small(needed, out.len()));
    }

    copy_and_patch(query, out, ResponseCode::Refused, false, 0);
    Ok(needed)
}

/// Builds an authoritative A response carrying `addr` with the given TTL.
pub fn build_a(query: &QueryView<'_>, addr: Ipv4Addr, ttl: u32, out: &mut [u8]) -> Result<usize> {
    let needed = query.total_consumed + A_ANSWER_SIZE;
    if out.len() < needed {
        return Err(Error::buffer_too_small(needed, out.len()));
    }

    copy_and_patch(query, out, ResponseCode::NoError, true, 1);

    let pos = put_answer_prefix(out, query.total_consumed, RecordType::A, ttl, 4);
    out[pos..pos + 4].copy_from_slice(&addr.octets());

    Ok(needed)
}

/// Builds an authoritative AAAA response carrying `addr` with the given TTL.
pub fn build_aaaa(
    query: &QueryView<'_>,
    addr: Ipv6Addr,
    ttl: u32,
    out: &mut [u8],
) -> Result<usize> {
    let needed = query.total_consumed + AAAA_ANSWER_SIZE;
    if out.len() < needed {
        return Err(Error::buffer_too_small(needed, out.len()));
    }

    copy_and_patch(query, out, ResponseCode::NoError, true, 1);

    let pos = put_answer_prefix(out, query.total_consumed, RecordType::AAAA, ttl, 16);
    out[pos..pos + 16].copy_from_slice(&addr.octets());

    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderFlags;
    use crate::wire::WireReader;

    const SIMPLE_QUERY: [u8; 33] = [
        0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x77, 0x77,
        0x77, 0x07, 0x65, 0x78, 0x61, 0x6D, 0x70, 0x6C, 0x65, 0x03, 0x63, 0x6F, 0x6D, 0x00, 0x00,
        0x01, 0x00, 0x01,
    ];

    fn parsed() -> QueryView<'static> {
        QueryView::parse(&SIMPLE_QUERY).unwrap()
    }

    #[test]
    fn test_build_nxdomain() {
        let mut out = [0u8; 512];
        let len = build_nxdomain(&parsed(), &mut out).unwrap();

        assert_eq!(len, 33);
        // QR set
        assert_eq!(out[2] & 0x80, 0x80);
        // RCODE = 3
        assert_eq!(out[3] & 0x0F, 3);
        // an_count = 0
        assert_eq!(&out[6..8], &[0, 0]);
        // Question bytes unchanged
        assert_eq!(&out[12..33], &SIMPLE_QUERY[12..33]);
    }

    #[test]
    fn test_build_refused() {
        let mut out = [0u8; 512];
        let len = build_refused(&parsed(), &mut out).unwrap();

        assert_eq!(len, 33);
        assert_eq!(out[3] & 0x0F, 5);
        assert_eq!(&out[6..8], &[0, 0]);
    }

    #[test]
    fn test_build_a_wire_layout() {
        let mut out = [0u8; 512];
        let len = build_a(
            &parsed(),
            Ipv4Addr::new(192, 168, 1, 100),
            300,
            &mut out,
        )
        .unwrap();

        assert_eq!(len, 33 + A_ANSWER_SIZE);
        // AA set alongside QR/RA
        assert_eq!(out[2] & 0x84, 0x84);
        assert_eq!(out[3] & 0x0F, 0);
        // an_count = 1, ns/ar = 0
        assert_eq!(&out[6..8], &[0, 1]);
        assert_eq!(&out[8..12], &[0, 0, 0, 0]);

        let expected_answer: [u8; 16] = [
            0xC0, 0x0C, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0x2C, 0x00, 0x04, 0xC0, 0xA8,
            0x01, 0x64,
        ];
        assert_eq!(&out[33..49], &expected_answer);
    }

    #[test]
    fn test_build_aaaa_wire_layout() {
        let mut out = [0u8; 512];
        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let len = build_aaaa(&parsed(), addr, 60, &mut out).unwrap();

        assert_eq!(len, 33 + AAAA_ANSWER_SIZE);

        let mut reader = WireReader::new(&out[..len]);
        reader.set_position(33);
        assert_eq!(reader.read_u16().unwrap(), 0xC00C);
        assert_eq!(reader.read_u16().unwrap(), u16::from(RecordType::AAAA));
        assert_eq!(reader.read_u16().unwrap(), 1);
        assert_eq!(reader.read_u32().unwrap(), 60);
        assert_eq!(reader.read_u16().unwrap(), 16);
        assert_eq!(reader.read_bytes(16).unwrap(), &addr.octets());
    }

    #[test]
    fn test_build_preserves_id_and_rd() {
        let mut out = [0u8; 512];
        build_a(&parsed(), Ipv4Addr::LOCALHOST, 60, &mut out).unwrap();

        assert_eq!(&out[0..2], &SIMPLE_QUERY[0..2]);
        assert_eq!(
            u16::from_be_bytes([out[2], out[3]]) & HeaderFlags::RD.bits(),
            HeaderFlags::RD.bits()
        );
    }

    #[test]
    fn test_buffer_too_small_writes_nothing() {
        let mut out = [0u8; 32];
        let err = build_nxdomain(&parsed(), &mut out).unwrap_err();

        assert!(matches!(err, Error::BufferTooSmall { .. }));
        assert!(out.iter().all(|&b| b == 0));

        let mut out = [0u8; 40];
        assert!(build_a(&parsed(), Ipv4Addr::LOCALHOST, 60, &mut out).is_err());
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_round_trip_a_response() {
        let mut out = [0u8; 512];
        let len = build_a(&parsed(), Ipv4Addr::new(10, 0, 0, 1), 120, &mut out).unwrap();

        let reparsed = QueryView::parse(&out[..len]).unwrap();
        assert_eq!(reparsed.id(), 0x1234);
        assert!(!reparsed.is_query());
        assert_eq!(reparsed.question.qtype, 1);
        assert_eq!(reparsed.question.qclass, 1);
        assert_eq!(reparsed.domain().unwrap(), "www.example.com");
        assert_eq!(reparsed.header.an_count, 1);
    }
}
