//! Status model and polling facade for goCoax MoCA adapters.
//!
//! Sits between `gocoax-api` (raw fetch and wire decoding) and consumers
//! such as the `gocoax` CLI:
//!
//! - **[`AdapterClient`]**: owns the HTTP session for one adapter.
//!   [`poll()`](AdapterClient::poll) runs the credential probe, fetches the
//!   remaining endpoints concurrently under one deadline, and assembles a
//!   [`StatusReport`]. [`get_status()`] is the one-shot form.
//!
//! - **Normalization** ([`convert`]): raw words and text become typed
//!   values; anything unusable is dropped with a [`NormalizationWarning`].
//!
//! - **Assembly** ([`snapshot`]): merges endpoint results under a static
//!   field ownership table and removes the adapter itself from its own
//!   peer list.
//!
//! - **Domain model** ([`model`]): [`AdapterStatus`] with every field
//!   optional, plus [`MacAddress`], [`NodeId`] and the MoCA enums.

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{AdapterClient, CREDENTIAL_PROBE, get_status};
pub use config::{AdapterConfig, TlsVerification};
pub use convert::{NormalizationWarning, normalize, tenths_to_mbps};
pub use error::{ClientError, EndpointError, EndpointFailure};
pub use snapshot::{SnapshotBuilder, StatusReport};

pub use model::{
    AdapterStatus, Counters, FieldSource, FrequencyBand, KnownModel, LinkStatus, MacAddress,
    MocaVersion, NodeId, PacketCounters, Peer, PhyRate, StatusDocument, StatusField,
};

// Transport types callers need to supply their own `Fetch`.
pub use gocoax_api::{Endpoint, Fetch, TransportError};
