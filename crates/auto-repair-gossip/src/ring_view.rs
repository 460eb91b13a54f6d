use std::collections::HashSet;

use auto_repair_sdk::HostId;

use crate::contact_info::NodeAddress;

/// A point-in-time view of the cluster's live membership.
///
/// Implementations talk to whatever gossip/membership service the
/// deployment uses; the coordinator only ever sees a `snapshot()`.
pub trait RingView: Send + Sync {
    fn snapshot(&self) -> Vec<NodeAddress>;
}

/// Filters a ring snapshot down to the `HostId`s eligible to participate in
/// a given repair type's turn arbitration:
///
/// 1. excludes datacenters listed in `ignore_dcs`
/// 2. excludes hosts not alive in gossip
pub fn ring_hosts(view: &dyn RingView, ignore_dcs: &HashSet<String>) -> Vec<HostId> {
    view.snapshot()
        .into_iter()
        .filter(|node| node.alive_in_gossip)
        .filter(|node| !ignore_dcs.contains(&node.datacenter))
        .map(|node| node.host_id)
        .collect()
}

/// An in-memory ring view for tests and single-process harnesses.
#[derive(Default)]
pub struct StaticRingView {
    nodes: parking_lot::RwLock<Vec<NodeAddress>>,
}

impl StaticRingView {
    pub fn new(nodes: Vec<NodeAddress>) -> Self {
        Self {
            nodes: parking_lot::RwLock::new(nodes),
        }
    }

    pub fn set_alive(&self, host_id: HostId, alive: bool) {
        let mut nodes = self.nodes.write();
        if let Some(node) = nodes.iter_mut().find(|n| n.host_id == host_id) {
            node.alive_in_gossip = alive;
        }
    }

    pub fn remove(&self, host_id: HostId) {
        self.nodes.write().retain(|n| n.host_id != host_id);
    }

    pub fn push(&self, node: NodeAddress) {
        self.nodes.write().push(node);
    }
}

impl RingView for StaticRingView {
    fn snapshot(&self) -> Vec<NodeAddress> {
        self.nodes.read().clone()
    }
}
