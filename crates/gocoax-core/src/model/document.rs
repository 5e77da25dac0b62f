// ── Flat status document ──
//
// The JSON shape external consumers (dashboards, home automation bridges)
// read. Keys are fixed; absent values serialize as `null`.

use std::collections::BTreeMap;

use serde::Serialize;

use super::identity::NodeId;
use super::status::{AdapterStatus, Counters};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusDocument {
    pub mac: Option<String>,
    pub ip: Option<String>,
    pub moca_ver: Option<String>,
    pub link_status: Option<String>,
    pub node_id: Option<NodeId>,
    pub network_controller: Option<bool>,
    pub firmware: Option<String>,
    pub model: Option<String>,
    pub packets: DocumentPackets,
    pub network: BTreeMap<NodeId, DocumentPeer>,
    pub link_phy_rates: BTreeMap<NodeId, DocumentRate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentPackets {
    pub tx: Option<Counters>,
    pub rx: Option<Counters>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentPeer {
    pub mac: String,
    pub moca_ver: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DocumentRate {
    pub tx: f64,
    pub rx: f64,
}

impl From<&AdapterStatus> for StatusDocument {
    fn from(status: &AdapterStatus) -> Self {
        let packets = status
            .packet_counters()
            .map(|p| DocumentPackets { tx: p.tx, rx: p.rx })
            .unwrap_or_default();

        let network = status
            .network()
            .into_iter()
            .flatten()
            .map(|(id, peer)| {
                let entry = DocumentPeer {
                    mac: peer.mac.to_string(),
                    moca_ver: peer.moca_version.map(|v| v.to_string()),
                };
                (*id, entry)
            })
            .collect();

        let link_phy_rates = status
            .phy_rates()
            .into_iter()
            .flatten()
            .map(|(id, rate)| {
                let entry = DocumentRate {
                    tx: rate.tx_mbps,
                    rx: rate.rx_mbps,
                };
                (*id, entry)
            })
            .collect();

        Self {
            mac: status.mac().map(|m| m.to_string()),
            ip: status.ip().map(|ip| ip.to_string()),
            moca_ver: status.moca_version().map(|v| v.to_string()),
            link_status: status.link_status().map(|l| l.to_string()),
            node_id: status.node_id(),
            network_controller: status.is_network_controller(),
            firmware: status.firmware_version().map(str::to_owned),
            model: status.model_name().map(str::to_owned),
            packets,
            network,
            link_phy_rates,
        }
    }
}
