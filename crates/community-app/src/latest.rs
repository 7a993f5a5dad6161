use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use crate::lock;

/// Latest-wins guard for overlapping refreshes of the same endpoint.
///
/// Each refresh takes a ticket before it sends. When its response lands, it
/// is applied only if no newer ticket was issued for the same key in the
/// meantime. Older responses that resolve late are dropped.
#[derive(Debug)]
pub struct LatestOnly<K = ()> {
    issued: Mutex<HashMap<K, u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    key: K,
    seq: u64,
}

impl<K: Eq + Hash + Clone> Default for LatestOnly<K> {
    fn default() -> Self {
        Self { issued: Mutex::new(HashMap::new()) }
    }
}

impl<K: Eq + Hash + Clone> LatestOnly<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, key: K) -> Ticket<K> {
        let mut issued = lock(&self.issued);
        let seq = issued.entry(key.clone()).or_insert(0);
        *seq += 1;
        Ticket { key, seq: *seq }
    }

    pub fn is_latest(&self, ticket: &Ticket<K>) -> bool {
        lock(&self.issued).get(&ticket.key) == Some(&ticket.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let gate = LatestOnly::new();
        let first = gate.issue(());
        let second = gate.issue(());

        assert!(!gate.is_latest(&first));
        assert!(gate.is_latest(&second));
    }

    #[test]
    fn keys_are_independent() {
        let gate = LatestOnly::new();
        let a = gate.issue(1);
        let b = gate.issue(2);

        assert!(gate.is_latest(&a));
        assert!(gate.is_latest(&b));
    }
}
