//! # dnsgate
//!
//! In-process DNS query engine for a packet-filter hot path. Three pieces
//! work per packet: the wire codec parses the query without copying,
//! the filter engine classifies the domain against exact and wildcard
//! rules, and the response builders synthesize NXDOMAIN / REFUSED / A /
//! AAAA answers into a caller-provided buffer.
//!
//! The [`Gateway`] is the process-facing handle: it owns the filter
//! engine, the pipeline counters, and the initialized flag, and exposes
//! the parse/build/process entry points with flat status codes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use dnsgate::{Disposition, Gateway, Rule};
//!
//! let gate = Gateway::new();
//! gate.init();
//! gate.engine().add_rule(Rule::block(1).with_tag("ads"), "*.ads.example.com");
//!
//! let mut out = [0u8; 512];
//! match gate.process(&packet, &mut out)? {
//!     Disposition::Respond(len) => transmit(&out[..len]),
//!     Disposition::Pass => forward_upstream(&packet),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod stats;

pub use stats::StatsSnapshot;

pub use dnsgate_filter::{
    Action, DomainTrie, EngineStats, FilterEngine, FilterResult, Rule, RuleEntry, RuleSet,
};
pub use dnsgate_proto::{
    response, Error as WireError, QueryView, RecordType, MAX_DOMAIN_LENGTH,
};

use dnsgate_proto::DNS_HEADER_SIZE;
use num_enum::IntoPrimitive;
use stats::GatewayStats;
use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Flat status codes reported at the gateway boundary.
///
/// Success is the `Ok` branch of each entry point's `Result` (code 0 at a
/// flat boundary); the variants here carry the stable negative codes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
#[repr(i32)]
pub enum Status {
    /// Invalid argument (undersized packet, zero-length buffer).
    #[error("invalid parameter")]
    InvalidParam = -1,

    /// The packet did not parse as a DNS query.
    #[error("parse failed")]
    ParseFailed = -2,

    /// The output buffer cannot hold the response.
    #[error("buffer too small")]
    BufferTooSmall = -3,

    /// The gateway has not been initialized.
    #[error("not initialized")]
    NotInitialized = -4,

    /// The datagram is a DNS response, not a query.
    #[error("not a DNS query")]
    NotDnsQuery = -5,
}

/// Decoded question fields filled in by [`Gateway::parse`].
///
/// The domain is stored lowercased in a fixed buffer so the struct can be
/// reused across packets without allocating.
#[derive(Debug, Clone, Copy)]
pub struct QueryInfo {
    /// Message ID.
    pub id: u16,
    /// Raw header flags in host order.
    pub flags: u16,
    /// Query type.
    pub qtype: u16,
    /// Query class.
    pub qclass: u16,
    /// Offset of the QNAME within the packet.
    pub name_offset: usize,
    /// Offset just past the question section.
    pub question_end: usize,

    domain: [u8; MAX_DOMAIN_LENGTH + 1],
    domain_len: usize,
}

impl QueryInfo {
    /// Creates an empty, reusable output struct.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the decoded domain as raw lowercase bytes.
    #[inline]
    pub fn domain_bytes(&self) -> &[u8] {
        &self.domain[..self.domain_len]
    }

    /// Returns the decoded domain.
    #[inline]
    pub fn domain(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.domain_bytes())
    }

    /// Returns the decoded domain length in bytes.
    #[inline]
    pub fn domain_len(&self) -> usize {
        self.domain_len
    }
}

impl Default for QueryInfo {
    fn default() -> Self {
        Self {
            id: 0,
            flags: 0,
            qtype: 0,
            qclass: 0,
            name_offset: 0,
            question_end: 0,
            domain: [0; MAX_DOMAIN_LENGTH + 1],
            domain_len: 0,
        }
    }
}

/// What to do with a processed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Forward the original query unchanged.
    Pass,

    /// Transmit the first `len` bytes of the output buffer instead.
    Respond(usize),
}

/// Process-facing handle over the parser, builders, and filter engine.
///
/// All entry points are synchronous and complete in work proportional to
/// the packet size or label count; the only blocking is the brief trie
/// lock acquisition inside the engine.
#[derive(Debug, Default)]
pub struct Gateway {
    initialized: AtomicBool,
    engine: FilterEngine,
    stats: GatewayStats,
}

impl Gateway {
    /// Creates a gateway in the uninitialized state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the gateway ready. Entry points fail with
    /// [`Status::NotInitialized`] until this is called.
    pub fn init(&self) {
        self.initialized.store(true, Ordering::Release);
        debug!("gateway initialized");
    }

    /// Marks the gateway stopped.
    pub fn cleanup(&self) {
        self.initialized.store(false, Ordering::Release);
        debug!("gateway cleaned up");
    }

    /// Returns true between [`init`](Self::init) and
    /// [`cleanup`](Self::cleanup).
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Returns the filter engine for rule management.
    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    /// Parses a query datagram into `out`.
    ///
    /// `out` is left untouched unless the whole parse, including the
    /// domain decode, succeeds. Responses (QR=1) yield
    /// [`Status::NotDnsQuery`]; malformed packets are counted in
    /// `parse_errors` and yield [`Status::ParseFailed`].
    pub fn parse(&self, packet: &[u8], out: &mut QueryInfo) -> Result<(), Status> {
        if !self.is_initialized() {
            return Err(Status::NotInitialized);
        }
        if packet.len() < DNS_HEADER_SIZE {
            return Err(Status::InvalidParam);
        }

        let started = Instant::now();
        self.stats.packets_received.fetch_add(1, Ordering::Relaxed);

        let view = match QueryView::parse(packet) {
            Ok(view) => view,
            Err(err) => {
                self.stats.parse_errors.fetch_add(1, Ordering::Relaxed);
                debug!(%err, "dropping malformed packet");
                return Err(Status::ParseFailed);
            }
        };

        if !view.is_query() {
            return Err(Status::NotDnsQuery);
        }

        let mut domain = [0u8; MAX_DOMAIN_LENGTH + 1];
        let domain_len = match view.decode_domain_into(&mut domain) {
            Ok(len) => len,
            Err(err) => {
                self.stats.parse_errors.fetch_add(1, Ordering::Relaxed);
                debug!(%err, "dropping packet with undecodable name");
                return Err(Status::ParseFailed);
            }
        };

        out.id = view.id();
        out.flags = view.flags();
        out.qtype = view.question.qtype;
        out.qclass = view.question.qclass;
        out.name_offset = view.question.name_offset;
        out.question_end = view.question_end;
        out.domain = domain;
        out.domain_len = domain_len;

        self.stats.packets_parsed.fetch_add(1, Ordering::Relaxed);
        self.stats.add_latency(started.elapsed());
        Ok(())
    }

    /// Builds an NXDOMAIN response for `packet` into `out`.
    pub fn build_nxdomain(&self, packet: &[u8], out: &mut [u8]) -> Result<usize, Status> {
        self.build_with(packet, out, |view, out| response::build_nxdomain(view, out))
    }

    /// Builds a REFUSED response for `packet` into `out`.
    pub fn build_refused(&self, packet: &[u8], out: &mut [u8]) -> Result<usize, Status> {
        self.build_with(packet, out, |view, out| response::build_refused(view, out))
    }

    /// Builds an A response for `packet` into `out`.
    pub fn build_a(
        &self,
        packet: &[u8],
        addr: Ipv4Addr,
        ttl: u32,
        out: &mut [u8],
    ) -> Result<usize, Status> {
        self.build_with(packet, out, |view, out| {
            response::build_a(view, addr, ttl, out)
        })
    }

    /// Builds an AAAA response for `packet` into `out`.
    pub fn build_aaaa(
        &self,
        packet: &[u8],
        addr: Ipv6Addr,
        ttl: u32,
        out: &mut [u8],
    ) -> Result<usize, Status> {
        self.build_with(packet, out, |view, out| {
            response::build_aaaa(view, addr, ttl, out)
        })
    }

    fn build_with(
        &self,
        packet: &[u8],
        out: &mut [u8],
        build: impl FnOnce(&QueryView<'_>, &mut [u8]) -> dnsgate_proto::Result<usize>,
    ) -> Result<usize, Status> {
        if !self.is_initialized() {
            return Err(Status::NotInitialized);
        }

        let started = Instant::now();
        let view = QueryView::parse(packet).map_err(|err| {
            debug!(%err, "cannot build response for unparseable packet");
            Status::ParseFailed
        })?;

        let len = build(&view, out).map_err(|err| match err {
            WireError::BufferTooSmall { .. } => Status::BufferTooSmall,
            _ => Status::ParseFailed,
        })?;

        self.stats.response_built.fetch_add(1, Ordering::Relaxed);
        self.stats.add_latency(started.elapsed());
        Ok(len)
    }

    /// Runs the full per-packet pipeline: parse, classify, synthesize.
    ///
    /// On a `Block` match the response is NXDOMAIN; on a `Redirect` match
    /// an A answer carries the rule's address (AAAA questions get
    /// NXDOMAIN, since redirect targets are IPv4). `Allow` and `Log`
    /// matches pass the query through.
    pub fn process(&self, packet: &[u8], out: &mut [u8]) -> Result<Disposition, Status> {
        if !self.is_initialized() {
            return Err(Status::NotInitialized);
        }
        if packet.len() < DNS_HEADER_SIZE {
            return Err(Status::InvalidParam);
        }

        let started = Instant::now();
        self.stats.packets_received.fetch_add(1, Ordering::Relaxed);

        let view = match QueryView::parse(packet) {
            Ok(view) => view,
            Err(err) => {
                self.stats.parse_errors.fetch_add(1, Ordering::Relaxed);
                debug!(%err, "dropping malformed packet");
                return Err(Status::ParseFailed);
            }
        };
        if !view.is_query() {
            return Err(Status::NotDnsQuery);
        }

        let mut domain_buf = [0u8; MAX_DOMAIN_LENGTH + 1];
        let domain_len = match view.decode_domain_into(&mut domain_buf) {
            Ok(len) => len,
            Err(err) => {
                self.stats.parse_errors.fetch_add(1, Ordering::Relaxed);
                debug!(%err, "dropping packet with undecodable name");
                return Err(Status::ParseFailed);
            }
        };
        self.stats.packets_parsed.fetch_add(1, Ordering::Relaxed);

        let domain = String::from_utf8_lossy(&domain_buf[..domain_len]);
        let result = self.engine.check(&domain, view.question.qtype);

        let disposition = match result.action {
            Action::Allow => Disposition::Pass,
            Action::Log => {
                let tag = result.rule.as_ref().map_or("", |r| r.tag.as_str());
                debug!(%domain, qtype = view.question.qtype, tag, "logged query");
                Disposition::Pass
            }
            Action::Block => {
                let len = self.respond(&view, out, |view, out| {
                    response::build_nxdomain(view, out)
                })?;
                Disposition::Respond(len)
            }
            Action::Redirect => {
                let rule = result.rule.as_ref();
                let redirect_ip = rule.and_then(|r| r.redirect_ip);
                match redirect_ip {
                    Some(addr) if view.question.record_type() != Some(RecordType::AAAA) => {
                        let ttl = rule.map_or(0, |r| r.ttl);
                        let len = self.respond(&view, out, |view, out| {
                            response::build_a(view, addr, ttl, out)
                        })?;
                        Disposition::Respond(len)
                    }
                    Some(_) => {
                        // AAAA question, IPv4-only target: deny the v6 path.
                        let len = self.respond(&view, out, |view, out| {
                            response::build_nxdomain(view, out)
                        })?;
                        Disposition::Respond(len)
                    }
                    None => {
                        warn!(%domain, "redirect rule has no target address");
                        Disposition::Pass
                    }
                }
            }
        };

        trace!(%domain, action = %result.action, ?disposition, "processed packet");
        self.stats.add_latency(started.elapsed());
        Ok(disposition)
    }

    fn respond(
        &self,
        view: &QueryView<'_>,
        out: &mut [u8],
        build: impl FnOnce(&QueryView<'_>, &mut [u8]) -> dnsgate_proto::Result<usize>,
    ) -> Result<usize, Status> {
        let len = build(view, out).map_err(|err| match err {
            WireError::BufferTooSmall { .. } => Status::BufferTooSmall,
            _ => Status::ParseFailed,
        })?;
        self.stats.response_built.fetch_add(1, Ordering::Relaxed);
        Ok(len)
    }

    /// Returns a snapshot of all counters.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::collect(&self.stats, self.engine.stats())
    }

    /// Zeroes the gateway and engine counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
        self.engine.reset_stats();
    }
}
