// ── Adapter status domain types ──

use std::collections::BTreeMap;
use std::net::IpAddr;

use gocoax_api::Endpoint;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

use super::catalog::{self, KnownModel};
use super::identity::{MacAddress, NodeId};
use super::link::{FrequencyBand, LinkStatus, MocaVersion};

/// Frame counters for one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub ok: u64,
    pub bad: u64,
    pub dropped: u64,
}

/// Ethernet-side frame counters. A direction is absent when any of its
/// three counters couldn't be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PacketCounters {
    pub tx: Option<Counters>,
    pub rx: Option<Counters>,
}

/// PHY rate between the local adapter and one peer, in Mbps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhyRate {
    pub tx_mbps: f64,
    pub rx_mbps: f64,
}

/// Another adapter on the same coax network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Peer {
    pub mac: MacAddress,
    pub moca_version: Option<MocaVersion>,
}

/// Snapshot of one adapter's state.
///
/// Every field is optional: a field is `None` when the endpoint that owns
/// it failed or returned something unusable. Values are only built by the
/// polling facade and are never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[allow(clippy::struct_field_names)]
pub struct AdapterStatus {
    pub(crate) mac: Option<MacAddress>,
    pub(crate) ip: Option<IpAddr>,
    pub(crate) moca_version: Option<MocaVersion>,
    pub(crate) link_status: Option<LinkStatus>,
    pub(crate) node_id: Option<NodeId>,
    pub(crate) network_controller_node: Option<NodeId>,
    pub(crate) is_network_controller: Option<bool>,
    pub(crate) encryption_enabled: Option<bool>,
    pub(crate) peer_count: Option<usize>,
    pub(crate) network: Option<BTreeMap<NodeId, Peer>>,
    pub(crate) packet_counters: Option<PacketCounters>,
    pub(crate) phy_rates: Option<BTreeMap<NodeId, PhyRate>>,
    pub(crate) lowest_operating_frequency_mhz: Option<f64>,
    pub(crate) frequency_band: Option<FrequencyBand>,
    pub(crate) firmware_version: Option<String>,
    pub(crate) model_name: Option<String>,
    pub(crate) channel_count: Option<u32>,
}

impl AdapterStatus {
    pub fn mac(&self) -> Option<MacAddress> {
        self.mac
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub fn moca_version(&self) -> Option<MocaVersion> {
        self.moca_version
    }

    pub fn link_status(&self) -> Option<LinkStatus> {
        self.link_status
    }

    pub fn node_id(&self) -> Option<NodeId> {
        self.node_id
    }

    pub fn network_controller_node(&self) -> Option<NodeId> {
        self.network_controller_node
    }

    pub fn is_network_controller(&self) -> Option<bool> {
        self.is_network_controller
    }

    pub fn encryption_enabled(&self) -> Option<bool> {
        self.encryption_enabled
    }

    /// Number of other adapters on the network, excluding this one.
    pub fn peer_count(&self) -> Option<usize> {
        self.peer_count
    }

    /// Peers keyed by node id, excluding this adapter.
    pub fn network(&self) -> Option<&BTreeMap<NodeId, Peer>> {
        self.network.as_ref()
    }

    pub fn packet_counters(&self) -> Option<PacketCounters> {
        self.packet_counters
    }

    /// PHY rates to each peer, keyed by the peer's node id.
    pub fn phy_rates(&self) -> Option<&BTreeMap<NodeId, PhyRate>> {
        self.phy_rates.as_ref()
    }

    pub fn lowest_operating_frequency_mhz(&self) -> Option<f64> {
        self.lowest_operating_frequency_mhz
    }

    pub fn frequency_band(&self) -> Option<FrequencyBand> {
        self.frequency_band
    }

    pub fn firmware_version(&self) -> Option<&str> {
        self.firmware_version.as_deref()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn channel_count(&self) -> Option<u32> {
        self.channel_count
    }

    /// Catalogue entry for the reported model, if it's one we know.
    pub fn known_model(&self) -> Option<&'static KnownModel> {
        self.model_name.as_deref().and_then(catalog::lookup)
    }

    /// Whether the field currently holds a value.
    pub fn has(&self, field: StatusField) -> bool {
        match field {
            StatusField::Mac => self.mac.is_some(),
            StatusField::Ip => self.ip.is_some(),
            StatusField::MocaVersion => self.moca_version.is_some(),
            StatusField::LinkStatus => self.link_status.is_some(),
            StatusField::NodeId => self.node_id.is_some(),
            StatusField::NetworkControllerNode => self.network_controller_node.is_some(),
            StatusField::IsNetworkController => self.is_network_controller.is_some(),
            StatusField::EncryptionEnabled => self.encryption_enabled.is_some(),
            StatusField::PeerCount => self.peer_count.is_some(),
            StatusField::Network => self.network.is_some(),
            StatusField::PacketCounters => self.packet_counters.is_some(),
            StatusField::PhyRates => self.phy_rates.is_some(),
            StatusField::LowestOperatingFrequency => {
                self.lowest_operating_frequency_mhz.is_some()
            }
            StatusField::FrequencyBand => self.frequency_band.is_some(),
            StatusField::FirmwareVersion => self.firmware_version.is_some(),
            StatusField::ModelName => self.model_name.is_some(),
            StatusField::ChannelCount => self.channel_count.is_some(),
        }
    }

    /// True when at least one field read from the adapter itself is present.
    pub fn has_adapter_data(&self) -> bool {
        StatusField::iter()
            .filter(|f| f.owner() != FieldSource::Configuration)
            .any(|f| self.has(f))
    }
}

/// Where a status field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Read from one adapter endpoint.
    Endpoint(Endpoint),
    /// Taken from the connection settings, not the adapter.
    Configuration,
}

/// Names every [`AdapterStatus`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusField {
    Mac,
    Ip,
    MocaVersion,
    LinkStatus,
    NodeId,
    NetworkControllerNode,
    IsNetworkController,
    EncryptionEnabled,
    PeerCount,
    Network,
    PacketCounters,
    PhyRates,
    LowestOperatingFrequency,
    FrequencyBand,
    FirmwareVersion,
    ModelName,
    ChannelCount,
}

impl StatusField {
    /// The single source allowed to populate this field.
    pub fn owner(self) -> FieldSource {
        let endpoint = match self {
            Self::Ip => return FieldSource::Configuration,
            Self::Mac => Endpoint::Mac,
            Self::MocaVersion
            | Self::LinkStatus
            | Self::NodeId
            | Self::NetworkControllerNode
            | Self::IsNetworkController => Endpoint::LocalInfo,
            Self::EncryptionEnabled => Endpoint::Privacy,
            Self::PeerCount | Self::Network => Endpoint::NodeInfo,
            Self::PacketCounters => Endpoint::FrameInfo,
            Self::PhyRates => Endpoint::PhyRates,
            Self::LowestOperatingFrequency | Self::FrequencyBand => Endpoint::Config,
            Self::FirmwareVersion | Self::ModelName | Self::ChannelCount => Endpoint::StatusPage,
        };
        FieldSource::Endpoint(endpoint)
    }

    /// Fields populated from `endpoint`.
    pub fn owned_by(endpoint: Endpoint) -> impl Iterator<Item = StatusField> {
        Self::iter().filter(move |f| f.owner() == FieldSource::Endpoint(endpoint))
    }
}
