//! The filter engine: rule storage, trie, and counters.

use crate::config::RuleSet;
use crate::rule::{Action, Rule};
use crate::trie::DomainTrie;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Result of checking a domain against the engine.
#[derive(Debug, Clone)]
pub struct FilterResult {
    /// The action to take.
    pub action: Action,

    /// The matched rule, if any.
    pub rule: Option<Arc<Rule>>,
}

impl FilterResult {
    fn allow() -> Self {
        Self {
            action: Action::Allow,
            rule: None,
        }
    }

    /// Returns true if the query should not receive its real answer.
    pub fn is_blocked(&self) -> bool {
        self.action.is_blocking()
    }

    /// Returns true if the query passes through.
    pub fn is_allowed(&self) -> bool {
        self.action.is_allowing()
    }
}

/// Snapshot of the engine counters.
///
/// Counters are read individually with relaxed ordering; the snapshot is
/// not atomic across fields. These are diagnostics, not invariants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    /// Total `check` calls.
    pub total_checks: u64,
    /// Queries allowed (no match, or an explicit allow/log rule).
    pub allowed: u64,
    /// Queries matched by a block rule.
    pub blocked: u64,
    /// Queries matched by a redirect rule.
    pub redirected: u64,
    /// Queries matched by a log rule.
    pub logged: u64,
}

#[derive(Debug, Default)]
struct EngineCounters {
    total_checks: AtomicU64,
    allowed: AtomicU64,
    blocked: AtomicU64,
    redirected: AtomicU64,
    logged: AtomicU64,
}

/// Turns a parsed question into a filtering decision.
///
/// The engine owns the canonical rule values in an append-only arena; trie
/// nodes reference them through stable shared pointers. Removing a rule
/// detaches it from the trie but keeps the value alive until the engine is
/// dropped, which is acceptable for the expected rule-churn volumes.
#[derive(Debug, Default)]
pub struct FilterEngine {
    trie: DomainTrie,
    rules: Mutex<Vec<Arc<Rule>>>,
    counters: EngineCounters,
}

impl FilterEngine {
    /// Creates an engine with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for `domain` (with an optional `*.` wildcard marker).
    ///
    /// The rule is appended to the arena under a briefly-held lock, then
    /// linked into the trie. A domain that normalizes to nothing leaves
    /// the trie untouched.
    pub fn add_rule(&self, rule: Rule, domain: &str) {
        let rule = Arc::new(rule);
        self.rules.lock().push(Arc::clone(&rule));

        debug!(domain, rule_id = rule.id, action = %rule.action, "adding filter rule");
        self.trie.insert(domain, rule);
    }

    /// Removes the rule registered for `domain`.
    ///
    /// The canonical value stays in the arena; only the trie reference is
    /// cleared.
    pub fn remove_rule(&self, domain: &str) -> bool {
        let removed = self.trie.remove(domain);
        if removed {
            debug!(domain, "removed filter rule");
        }
        removed
    }

    /// Replaces all rules from a deserialized rule set.
    ///
    /// Returns the number of rules installed. Disabled entries are
    /// skipped; each entry fans out to every domain it lists.
    pub fn load_rule_set(&self, set: &RuleSet) -> usize {
        let mut arena = Vec::new();
        let mut pairs = Vec::new();

        for entry in set.rules.iter().filter(|e| e.enabled) {
            let rule = Arc::new(entry.to_rule());
            arena.push(Arc::clone(&rule));
            for domain in &entry.domains {
                pairs.push((domain.as_str(), Arc::clone(&rule)));
            }
        }

        let count = arena.len();
        *self.rules.lock() = arena;
        self.trie.update(pairs);

        debug!(rules = count, domains = self.trie.len(), "loaded rule set");
        count
    }

    /// Checks a domain against the rules.
    ///
    /// `qtype` does not influence matching; it is carried for logging and
    /// for the caller's answer-shape decision.
    pub fn check(&self, domain: &str, qtype: u16) -> FilterResult {
        self.counters.total_checks.fetch_add(1, Ordering::Relaxed);

        let Some(rule) = self.trie.lookup(domain) else {
            self.counters.allowed.fetch_add(1, Ordering::Relaxed);
            return FilterResult::allow();
        };

        trace!(domain, qtype, rule_id = rule.id, action = %rule.action, "filter match");

        let counter = match rule.action {
            Action::Block => &self.counters.blocked,
            Action::Redirect => &self.counters.redirected,
            Action::Log => &self.counters.logged,
            Action::Allow => &self.counters.allowed,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        FilterResult {
            action: rule.action,
            rule: Some(rule),
        }
    }

    /// Returns direct access to the trie.
    pub fn trie(&self) -> &DomainTrie {
        &self.trie
    }

    /// Returns the number of rules reachable through the trie.
    pub fn rule_count(&self) -> usize {
        self.trie.len()
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            total_checks: self.counters.total_checks.load(Ordering::Relaxed),
            allowed: self.counters.allowed.load(Ordering::Relaxed),
            blocked: self.counters.blocked.load(Ordering::Relaxed),
            redirected: self.counters.redirected.load(Ordering::Relaxed),
            logged: self.counters.logged.load(Ordering::Relaxed),
        }
    }

    /// Zeroes all counters.
    pub fn reset_stats(&self) {
        self.counters.total_checks.store(0, Ordering::Relaxed);
        self.counters.allowed.store(0, Ordering::Relaxed);
        self.counters.blocked.store(0, Ordering::Relaxed);
        self.counters.redirected.store(0, Ordering::Relaxed);
        self.counters.logged.store(0, Ordering::Relaxed);
    }
}
