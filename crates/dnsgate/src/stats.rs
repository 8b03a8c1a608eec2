//! Gateway statistics.

use dnsgate_filter::EngineStats;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Internal counters owned by the gateway.
///
/// The filter counters (allowed/blocked/redirected) live in the engine;
/// these cover the wire-codec side of the pipeline.
#[derive(Debug, Default)]
pub(crate) struct GatewayStats {
    /// Packets handed to `parse` or `process`.
    pub packets_received: AtomicU64,

    /// Packets that parsed and decoded successfully.
    pub packets_parsed: AtomicU64,

    /// Malformed packets dropped.
    pub parse_errors: AtomicU64,

    /// Synthesized responses written.
    pub response_built: AtomicU64,

    /// Accumulated processing time in nanoseconds.
    pub total_latency_ns: AtomicU64,
}

impl GatewayStats {
    /// Adds an elapsed duration to the latency accumulator.
    pub fn add_latency(&self, elapsed: Duration) {
        self.total_latency_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.packets_received.store(0, Ordering::Relaxed);
        self.packets_parsed.store(0, Ordering::Relaxed);
        self.parse_errors.store(0, Ordering::Relaxed);
        self.response_built.store(0, Ordering::Relaxed);
        self.total_latency_ns.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time view of all gateway and engine counters.
///
/// The snapshot is assembled from relaxed loads and is not atomic across
/// fields; the numbers are diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Packets handed to the gateway.
    pub packets_received: u64,

    /// Packets parsed and decoded successfully.
    pub packets_parsed: u64,

    /// Queries allowed through (no match, explicit allow, or log).
    pub packets_allowed: u64,

    /// Queries answered with NXDOMAIN by a block rule.
    pub packets_blocked: u64,

    /// Queries answered by a redirect rule.
    pub packets_redirected: u64,

    /// Malformed packets dropped.
    pub parse_errors: u64,

    /// Synthesized responses written.
    pub response_built: u64,

    /// Accumulated processing time in nanoseconds.
    pub total_latency_ns: u64,
}

impl StatsSnapshot {
    pub(crate) fn collect(gateway: &GatewayStats, engine: EngineStats) -> Self {
        Self {
            packets_received: gateway.packets_received.load(Ordering::Relaxed),
            packets_parsed: gateway.packets_parsed.load(Ordering::Relaxed),
            // Log matches pass through, so they count as allowed here; the
            // engine's own stats keep them separate.
            packets_allowed: engine.allowed + engine.logged,
            packets_blocked: engine.blocked,
            packets_redirected: engine.redirected,
            parse_errors: gateway.parse_errors.load(Ordering::Relaxed),
            response_built: gateway.response_built.load(Ordering::Relaxed),
            total_latency_ns: gateway.total_latency_ns.load(Ordering::Relaxed),
        }
    }
}
