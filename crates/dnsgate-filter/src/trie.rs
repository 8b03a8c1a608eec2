//! Reversed-label domain trie.
//!
//! Domains are stored by their label path in reverse order
//! (`www.example.com` lives under `com` → `example` → `www`), so wildcard
//! rules naturally cover whole subtrees. Each node can carry two rules: an
//! exact rule that matches only a name ending at that node, and a wildcard
//! rule that covers the node and every descendant.
//!
//! One reader-writer lock guards the whole structure: lookups and size
//! queries run concurrently under the shared mode, mutation serializes
//! under the exclusive mode.

use crate::rule::Rule;
use compact_str::CompactString;
use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::Arc;

/// Label-split scratch space; names deeper than this spill to the heap.
type Labels = SmallVec<[CompactString; 8]>;

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<CompactString, TrieNode>,
    exact: Option<Arc<Rule>>,
    wildcard: Option<Arc<Rule>>,
}

#[derive(Debug, Default)]
struct TrieInner {
    root: TrieNode,
    len: usize,
}

/// A thread-safe trie mapping domain names to rules.
///
/// Rules are held as stable shared references into engine-owned storage;
/// removing a rule clears the node's reference without touching the
/// canonical value.
#[derive(Debug, Default)]
pub struct DomainTrie {
    inner: RwLock<TrieInner>,
}

/// Lowercases and splits a domain into labels, dropping empty ones.
fn split_labels(domain: &str) -> Labels {
    domain
        .split('.')
        .filter(|label| !label.is_empty())
        .map(|label| label.chars().map(|c| c.to_ascii_lowercase()).collect())
        .collect()
}

/// Strips a leading `*.`, reporting whether the domain was a wildcard.
fn strip_wildcard(domain: &str) -> (bool, &str) {
    match domain.strip_prefix("*.") {
        Some(rest) => (true, rest),
        None => (false, domain),
    }
}

impl DomainTrie {
    /// Creates an empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule for `domain`.
    ///
    /// A leading `*.` marks the rule as a wildcard covering the remaining
    /// domain and all of its descendants. A domain that normalizes to no
    /// labels is silently ignored.
    pub fn insert(&self, domain: &str, rule: Arc<Rule>) {
        let (is_wildcard, rest) = strip_wildcard(domain.trim());
        let labels = split_labels(rest);
        if labels.is_empty() {
            return;
        }

        let mut inner = self.inner.write();
        Self::insert_into(&mut inner, &labels, is_wildcard, rule);
    }

    /// Inserts under an already-held exclusive lock.
    fn insert_into(inner: &mut TrieInner, labels: &Labels, is_wildcard: bool, rule: Arc<Rule>) {
        let TrieInner { root, len } = inner;

        let mut node = root;
        for label in labels.iter().rev() {
            node = node.children.entry(label.clone()).or_default();
        }

        let slot = if is_wildcard {
            &mut node.wildcard
        } else {
            &mut node.exact
        };
        if slot.replace(rule).is_none() {
            *len += 1;
        }
    }

    /// Looks up the rule governing `domain`.
    ///
    /// Walks the reversed label path, remembering the most recent wildcard
    /// rule passed on the way down. Precedence on a full match: the exact
    /// rule, else the final node's wildcard, else the nearest ancestor
    /// wildcard. A partial match falls back to the nearest wildcard seen.
    pub fn lookup(&self, domain: &str) -> Option<Arc<Rule>> {
        let labels = split_labels(domain.trim());
        if labels.is_empty() {
            return None;
        }

        let inner = self.inner.read();
        let mut node = &inner.root;
        let mut nearest_wildcard: Option<&Arc<Rule>> = None;

        for label in labels.iter().rev() {
            if let Some(rule) = &node.wildcard {
                nearest_wildcard = Some(rule);
            }

            match node.children.get(label.as_str()) {
                Some(child) => node = child,
                None => return nearest_wildcard.cloned(),
            }
        }

        node.exact
            .clone()
            .or_else(|| node.wildcard.clone())
            .or_else(|| nearest_wildcard.cloned())
    }

    /// Removes the rule for `domain`, honoring the `*.` wildcard marker.
    ///
    /// Returns true if a rule reference was cleared. Intermediate nodes are
    /// left in place.
    pub fn remove(&self, domain: &str) -> bool {
        let (is_wildcard, rest) = strip_wildcard(domain.trim());
        let labels = split_labels(rest);
        if labels.is_empty() {
            return false;
        }

        let mut inner = self.inner.write();
        let TrieInner { root, len } = &mut *inner;

        let mut node = root;
        for label in labels.iter().rev() {
            match node.children.get_mut(label.as_str()) {
                Some(child) => node = child,
                None => return false,
            }
        }

        let slot = if is_wildcard {
            &mut node.wildcard
        } else {
            &mut node.exact
        };
        if slot.take().is_some() {
            *len -= 1;
            true
        } else {
            false
        }
    }

    /// Removes every rule.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        *inner = TrieInner::default();
    }

    /// Returns the number of stored rules.
    pub fn len(&self) -> usize {
        self.inner.read().len
    }

    /// Returns true if no rules are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the whole rule set in one exclusive critical section.
    ///
    /// Equivalent to `clear` followed by inserting every pair, but readers
    /// never observe the intermediate empty state.
    pub fn update<S, I>(&self, entries: I)
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (S, Arc<Rule>)>,
    {
        let mut inner = self.inner.write();
        *inner = TrieInner::default();

        for (domain, rule) in entries {
            let (is_wildcard, rest) = strip_wildcard(domain.as_ref().trim());
            let labels = split_labels(rest);
            if labels.is_empty() {
                continue;
            }
            Self::insert_into(&mut inner, &labels, is_wildcard, rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Action, Rule};

    fn rule(id: u32, action: Action) -> Arc<Rule> {
        Arc::new(Rule::new(id, action))
    }

    #[test]
    fn test_exact_match() {
        let trie = DomainTrie::new();
        trie.insert("ads.example.com", rule(1, Action::Block));

        assert_eq!(trie.lookup("ads.example.com").unwrap().id, 1);
        assert!(trie.lookup("example.com").is_none());
        assert!(trie.lookup("sub.ads.example.com").is_none());
        assert!(trie.lookup("other.com").is_none());
    }

    #[test]
    fn test_wildcard_covers_parent_and_descendants() {
        let trie = DomainTrie::new();
        trie.insert("*.example.com", rule(1, Action::Log));

        assert_eq!(trie.lookup("example.com").unwrap().id, 1);
        assert_eq!(trie.lookup("a.example.com").unwrap().id, 1);
        assert_eq!(trie.lookup("a.b.example.com").unwrap().id, 1);
        assert!(trie.lookup("example.org").is_none());
    }

    #[test]
    fn test_wildcard_precedence() {
        let trie = DomainTrie::new();
        trie.insert("*.example.com", rule(1, Action::Log));
        trie.insert("blocked.example.com", rule(2, Action::Block));

        assert_eq!(trie.lookup("blocked.example.com").unwrap().action, Action::Block);
        assert_eq!(trie.lookup("other.example.com").unwrap().action, Action::Log);
        assert_eq!(trie.lookup("example.com").unwrap().action, Action::Log);
        assert!(trie.lookup("other.com").is_none());
    }

    #[test]
    fn test_deeper_wildcard_wins() {
        let trie = DomainTrie::new();
        trie.insert("*.example.com", rule(1, Action::Log));
        trie.insert("*.cdn.example.com", rule(2, Action::Block));

        assert_eq!(trie.lookup("a.cdn.example.com").unwrap().id, 2);
        assert_eq!(trie.lookup("cdn.example.com").unwrap().id, 2);
        assert_eq!(trie.lookup("www.example.com").unwrap().id, 1);
    }

    #[test]
    fn test_exact_beats_wildcard_on_same_path() {
        let trie = DomainTrie::new();
        trie.insert("*.example.com", rule(1, Action::Log));
        trie.insert("www.example.com", rule(2, Action::Block));

        assert_eq!(trie.lookup("www.example.com").unwrap().id, 2);
    }

    #[test]
    fn test_no_ancestor_wildcard_leak() {
        let trie = DomainTrie::new();
        trie.insert("*.a.com", rule(1, Action::Block));

        assert!(trie.lookup("b.com").is_none());
        assert!(trie.lookup("com").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let trie = DomainTrie::new();
        trie.insert("Example.COM", rule(1, Action::Block));

        assert_eq!(trie.lookup("example.com").unwrap().id, 1);
        assert_eq!(trie.lookup("EXAMPLE.COM").unwrap().id, 1);
        assert_eq!(trie.lookup("ExAmPlE.cOm").unwrap().id, 1);
    }

    #[test]
    fn test_empty_domain_is_noop() {
        let trie = DomainTrie::new();
        trie.insert("", rule(1, Action::Block));
        trie.insert("...", rule(2, Action::Block));
        trie.insert("*.", rule(3, Action::Block));

        assert_eq!(trie.len(), 0);
        assert!(trie.lookup("").is_none());
        assert!(!trie.remove(""));
    }

    #[test]
    fn test_remove() {
        let trie = DomainTrie::new();
        trie.insert("ads.example.com", rule(1, Action::Block));
        trie.insert("*.example.com", rule(2, Action::Log));
        assert_eq!(trie.len(), 2);

        assert!(trie.remove("ads.example.com"));
        assert!(!trie.remove("ads.example.com"));
        assert!(trie.lookup("ads.example.com").is_some(), "wildcard still covers it");

        assert!(trie.remove("*.example.com"));
        assert!(trie.lookup("ads.example.com").is_none());
        assert_eq!(trie.len(), 0);
    }

    #[test]
    fn test_remove_distinguishes_wildcard_slot() {
        let trie = DomainTrie::new();
        trie.insert("example.com", rule(1, Action::Block));

        assert!(!trie.remove("*.example.com"));
        assert!(trie.remove("example.com"));
    }

    #[test]
    fn test_replace_keeps_len() {
        let trie = DomainTrie::new();
        trie.insert("example.com", rule(1, Action::Block));
        trie.insert("example.com", rule(2, Action::Log));

        assert_eq!(trie.len(), 1);
        assert_eq!(trie.lookup("example.com").unwrap().id, 2);
    }

    #[test]
    fn test_clear() {
        let trie = DomainTrie::new();
        trie.insert("a.com", rule(1, Action::Block));
        trie.insert("b.com", rule(2, Action::Block));

        trie.clear();
        assert!(trie.is_empty());
        assert!(trie.lookup("a.com").is_none());
    }

    #[test]
    fn test_update_swaps_rule_set() {
        let trie = DomainTrie::new();
        trie.insert("old.com", rule(1, Action::Block));

        trie.update(vec![
            ("new.com", rule(2, Action::Block)),
            ("*.wild.com", rule(3, Action::Log)),
            ("", rule(4, Action::Block)),
        ]);

        assert!(trie.lookup("old.com").is_none());
        assert_eq!(trie.lookup("new.com").unwrap().id, 2);
        assert_eq!(trie.lookup("sub.wild.com").unwrap().id, 3);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn test_trailing_dot_normalization() {
        let trie = DomainTrie::new();
        trie.insert("example.com.", rule(1, Action::Block));

        assert_eq!(trie.lookup("example.com").unwrap().id, 1);
        assert_eq!(trie.lookup("example.com.").unwrap().id, 1);
    }

    #[test]
    fn test_concurrent_readers() {
        use std::thread;

        let trie = Arc::new(DomainTrie::new());
        trie.insert("*.example.com", rule(1, Action::Block));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let trie = Arc::clone(&trie);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        assert!(trie.lookup("deep.sub.example.com").is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
