//! RTP/RTCP port pair bookkeeping.
//!
//! The allocator does not open sockets. It hands out (rtp, rtcp) candidates
//! from a profile's range that no other media point holds, remembers which
//! owner holds them and takes them back on release.

use crate::config::PortRange;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Shared registry of reserved port pairs, keyed by interface
#[derive(Debug, Default)]
pub struct PortAllocator {
    inner: Mutex<Reservations>,
}

#[derive(Debug, Default)]
struct Reservations {
    by_interface: HashMap<String, HashSet<u16>>,
    by_owner: HashMap<String, Vec<(String, u16)>>,
}

impl PortAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `pair` on `interface` for `owner`. Returns `false` when the pair
    /// is outside `range` or already held.
    pub fn reserve(&self, owner: &str, interface: &str, range: &PortRange, pair: (u16, u16)) -> bool {
        if !range.contains(pair) {
            return false;
        }
        let mut inner = self.inner.lock();
        let used = inner.by_interface.entry(interface.to_string()).or_default();
        if !used.insert(pair.0) {
            return false;
        }
        inner
            .by_owner
            .entry(owner.to_string())
            .or_default()
            .push((interface.to_string(), pair.0));
        trace!("Reserved {}/{} on {} for {}", pair.0, pair.1, interface, owner);
        true
    }

    /// Reserve the first free pair of `range`, starting at a random offset.
    pub fn reserve_any(&self, owner: &str, interface: &str, range: &PortRange) -> Option<(u16, u16)> {
        range.iter().find(|pair| self.reserve(owner, interface, range, *pair))
    }

    /// Give back a single pair, e.g. after the transport failed to bind it
    pub fn release_pair(&self, owner: &str, interface: &str, pair: (u16, u16)) {
        let mut inner = self.inner.lock();
        if let Some(used) = inner.by_interface.get_mut(interface) {
            used.remove(&pair.0);
        }
        if let Some(held) = inner.by_owner.get_mut(owner) {
            held.retain(|(iface, rtp)| !(iface == interface && *rtp == pair.0));
            if held.is_empty() {
                inner.by_owner.remove(owner);
            }
        }
    }

    /// Release every pair `owner` holds; returns how many were released.
    pub fn release(&self, owner: &str) -> usize {
        let mut inner = self.inner.lock();
        let Some(held) = inner.by_owner.remove(owner) else {
            return 0;
        };
        for (interface, rtp) in &held {
            if let Some(used) = inner.by_interface.get_mut(interface) {
                used.remove(rtp);
            }
        }
        debug!("Released {} port pair(s) of {}", held.len(), owner);
        held.len()
    }

    pub fn is_reserved(&self, interface: &str, rtp_port: u16) -> bool {
        self.inner
            .lock()
            .by_interface
            .get(interface)
            .is_some_and(|used| used.contains(&rtp_port))
    }

    /// Number of pairs currently held across all interfaces
    pub fn reserved_count(&self) -> usize {
        self.inner.lock().by_interface.values().map(HashSet::len).sum()
    }
}
