// ── Domain model ──
//
// Typed view of an adapter snapshot. Nothing here knows about endpoints
// or wire encodings; see `convert` for how raw fields become these types.

pub mod catalog;
pub mod document;
pub mod identity;
pub mod link;
pub mod status;

pub use catalog::KnownModel;
pub use document::StatusDocument;
pub use identity::{InvalidMacAddress, MacAddress, NodeId};
pub use link::{FrequencyBand, LinkStatus, MocaVersion};
pub use status::{
    AdapterStatus, Counters, FieldSource, PacketCounters, Peer, PhyRate, StatusField,
};
