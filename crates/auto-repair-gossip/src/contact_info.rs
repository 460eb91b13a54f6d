use std::net::SocketAddr;

use auto_repair_sdk::HostId;
use serde::{Deserialize, Serialize};

/// A ring member as seen through gossip.
///
/// Mirrors `solana_gossip::contact_info::ContactInfo` in role: the only
/// thing the rest of the coordinator is allowed to know about a peer
/// beyond its `HostId`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    pub host_id: HostId,
    pub broadcast_address: SocketAddr,
    pub datacenter: String,
    pub alive_in_gossip: bool,
}

impl NodeAddress {
    pub fn new(host_id: HostId, broadcast_address: SocketAddr, datacenter: impl Into<String>) -> Self {
        Self {
            host_id,
            broadcast_address,
            datacenter: datacenter.into(),
            alive_in_gossip: true,
        }
    }
}
