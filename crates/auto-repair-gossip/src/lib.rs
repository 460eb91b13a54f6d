//! Ring membership and replication topology: the view of the cluster the
//! turn arbitrator and assignment splitter consult but never mutate.
//!
//! Plays the role `solana-gossip` plays relative to `solana-core`: the
//! cluster-view crate a decision-making crate depends on downward.

pub mod contact_info;
pub mod ring_view;
pub mod topology;

pub use contact_info::NodeAddress;
pub use ring_view::{ring_hosts, RingView, StaticRingView};
pub use topology::{keyspace_eligible_for_repair, ReplicationStrategy, ReplicationTopology, StaticTopology};
