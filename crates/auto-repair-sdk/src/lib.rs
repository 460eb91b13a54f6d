//! Identifiers and time primitives shared by every auto-repair crate.
//!
//! Plays the role `solana-sdk` plays for `solana-core`/`solana-gossip`: a
//! small, dependency-light crate the rest of the workspace builds on, with
//! no knowledge of persistence, gossip, or repair itself.

pub mod clock;
pub mod host_id;
pub mod repair_type;
pub mod token;

pub use clock::{Clock, EpochMillis, FakeClock, SystemClock};
pub use host_id::HostId;
pub use repair_type::RepairType;
pub use token::{Token, TokenRange};
