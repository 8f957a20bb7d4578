//! Sync protocol between the authoritative registry and mirrors
//!
//! Messages carry whole encoded records; there are no partial updates.

use crate::core::types::{CompanionId, OwnerId};
use crate::tag::Compound;
use serde::{Deserialize, Serialize};

/// Opaque handle for one mirror connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub u32);

/// Which records a subscriber may observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriberScope {
    All,
    Owner(OwnerId),
}

impl SubscriberScope {
    pub fn covers(&self, owner: Option<OwnerId>) -> bool {
        match self {
            SubscriberScope::All => true,
            SubscriberScope::Owner(scope) => owner == Some(*scope),
        }
    }
}

/// A registry change as seen by a mirror
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncMessage {
    /// Replace (or insert) one record wholesale
    Upsert { tree: Compound },
    /// Drop one record
    Remove { id: CompanionId },
    /// Replace the mirror's whole contents
    Snapshot { trees: Vec<Compound> },
}

impl SyncMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncMessage::Upsert { .. } => "upsert",
            SyncMessage::Remove { .. } => "remove",
            SyncMessage::Snapshot { .. } => "snapshot",
        }
    }
}

/// A message addressed to one connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub connection: ConnectionId,
    pub message: SyncMessage,
}

/// Fixed-cadence flush gate for an actor's dirty state.
///
/// `poll` is called once per tick; it returns true at most once every
/// `interval` ticks and only when there is something to flush.
#[derive(Debug, Clone, Copy)]
pub struct SyncTicker {
    interval: u32,
    counter: u32,
}

impl SyncTicker {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            counter: 0,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn poll(&mut self, dirty: bool) -> bool {
        self.counter += 1;
        if self.counter < self.interval {
            return false;
        }
        self.counter = 0;
        dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_fires_every_interval() {
        let mut ticker = SyncTicker::new(10);
        let fired: Vec<u32> = (1..=30).filter(|_| ticker.poll(true)).collect();
        assert_eq!(fired.len(), 3);
    }

    #[test]
    fn test_ticker_skips_clean_flush() {
        let mut ticker = SyncTicker::new(2);
        assert!(!ticker.poll(false));
        assert!(!ticker.poll(false));
        assert!(!ticker.poll(true));
        assert!(ticker.poll(true));
    }

    #[test]
    fn test_zero_interval_clamped() {
        let mut ticker = SyncTicker::new(0);
        assert_eq!(ticker.interval(), 1);
        assert!(ticker.poll(true));
    }

    #[test]
    fn test_scope_covers() {
        let owner = OwnerId::new();
        assert!(SubscriberScope::All.covers(None));
        assert!(SubscriberScope::Owner(owner).covers(Some(owner)));
        assert!(!SubscriberScope::Owner(owner).covers(Some(OwnerId::new())));
        assert!(!SubscriberScope::Owner(owner).covers(None));
    }
}
