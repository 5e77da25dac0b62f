// ── Snapshot assembly ──
//
// Merges per-endpoint normalized fields into one `AdapterStatus`. Every
// field has exactly one owning endpoint (`StatusField::owner`); values an
// endpoint produces for fields it doesn't own are discarded, so merge
// order never changes the result.

use std::collections::BTreeSet;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use gocoax_api::{DecodedPayload, Endpoint};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::convert::{NormalizationWarning, normalize};
use crate::error::EndpointError;
use crate::model::{AdapterStatus, FieldSource, NodeId, StatusDocument, StatusField};

/// Placeholder written over redacted values.
pub const REDACTED: &str = "**REDACTED**";

/// Keys whose values are replaced in redacted output.
const REDACTED_KEYS: &[&str] = &["mac"];

/// Result of one poll: the snapshot plus everything that went wrong on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub status: AdapterStatus,
    /// Endpoints that contributed nothing, in endpoint order.
    pub errors: Vec<EndpointError>,
    /// Values that were dropped or look inconsistent.
    pub warnings: Vec<NormalizationWarning>,
    pub captured_at: DateTime<Utc>,
}

impl StatusReport {
    /// True when at least one endpoint failed.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Flat wire view of the snapshot.
    pub fn document(&self) -> StatusDocument {
        StatusDocument::from(&self.status)
    }

    /// The report as JSON with MAC addresses blanked, for sharing diagnostics.
    pub fn redacted(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        redact(&mut value);
        value
    }
}

/// Replace every value under a redacted key, at any depth.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if REDACTED_KEYS.contains(&key.as_str()) && !inner.is_null() {
                    *inner = Value::String(REDACTED.to_owned());
                } else {
                    redact(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Accumulates endpoint results into a snapshot.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    status: AdapterStatus,
    errors: Vec<EndpointError>,
    warnings: Vec<NormalizationWarning>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the adapter address from the connection settings.
    pub fn configured_ip(&mut self, host: &str, ip: Option<IpAddr>) {
        if ip.is_none() {
            self.warnings.push(NormalizationWarning::new(
                None,
                StatusField::Ip,
                format!("host {host:?} is not an IP address"),
            ));
        }
        self.status.ip = ip;
    }

    pub fn record_error(&mut self, error: EndpointError) {
        warn!(endpoint = %error.endpoint, kind = error.failure.kind(), "{}", error.failure);
        self.errors.push(error);
    }

    /// Normalize a payload and keep the fields its endpoint owns.
    pub fn merge(&mut self, payload: &DecodedPayload) {
        let endpoint = payload.endpoint;
        let mut normalized = normalize(payload);

        if let Some(version) = payload.fallback_version() {
            if let Some(field) = StatusField::owned_by(endpoint).next() {
                self.warnings.push(NormalizationWarning::new(
                    Some(endpoint),
                    field,
                    format!("layout version {version} not recognized, read stable slots only"),
                ));
            }
        }
        for warning in &normalized.warnings {
            warn!(%endpoint, field = %warning.field, "{}", warning.message);
        }
        self.warnings.append(&mut normalized.warnings);

        let mut moved = 0usize;
        for field in StatusField::owned_by(endpoint) {
            if take_field(&mut self.status, &mut normalized.fields, field) {
                moved += 1;
            }
        }
        debug!(%endpoint, fields = moved, "merged endpoint");
    }

    /// Apply cross-endpoint rules and hand back the finished parts.
    pub fn finish(mut self) -> (AdapterStatus, Vec<EndpointError>, Vec<NormalizationWarning>) {
        self.exclude_local_node();
        self.check_rate_coverage();
        self.errors.sort_by_key(|e| e.endpoint);
        (self.status, self.errors, self.warnings)
    }

    /// Drop the adapter itself from the peer list and rate table.
    fn exclude_local_node(&mut self) {
        let status = &mut self.status;
        let local_mac = status.mac;

        let mut local: BTreeSet<NodeId> = status.node_id.into_iter().collect();
        if let (Some(mac), Some(network)) = (local_mac, &status.network) {
            local.extend(
                network
                    .iter()
                    .filter(|(_, peer)| peer.mac == mac)
                    .map(|(id, _)| *id),
            );
        }

        if local.is_empty() {
            let has_topology = status.network.as_ref().is_some_and(|n| !n.is_empty())
                || status.phy_rates.as_ref().is_some_and(|r| !r.is_empty());
            if has_topology {
                self.warnings.push(NormalizationWarning::new(
                    Some(Endpoint::NodeInfo),
                    StatusField::Network,
                    "local node unknown, peer list may include this adapter",
                ));
            }
        }

        if let Some(network) = status.network.as_mut() {
            network.retain(|id, _| !local.contains(id));
            status.peer_count = Some(network.len());
        }
        if let Some(rates) = status.phy_rates.as_mut() {
            rates.retain(|id, _| !local.contains(id));
        }
    }

    /// Every peer should have a rate entry; flag it when they disagree.
    fn check_rate_coverage(&mut self) {
        let (Some(peers), Some(rates)) = (&self.status.network, &self.status.phy_rates) else {
            return;
        };
        if peers.len() == rates.len() {
            return;
        }

        let missing: Vec<String> = peers
            .keys()
            .filter(|id| !rates.contains_key(*id))
            .map(ToString::to_string)
            .collect();
        let extra: Vec<String> = rates
            .keys()
            .filter(|id| !peers.contains_key(*id))
            .map(ToString::to_string)
            .collect();

        self.warnings.push(NormalizationWarning::new(
            Some(Endpoint::PhyRates),
            StatusField::PhyRates,
            format!(
                "{} peer(s) but {} rate entries (no rate for [{}], no peer for [{}])",
                peers.len(),
                rates.len(),
                missing.join(", "),
                extra.join(", "),
            ),
        ));
    }
}

/// Move one field from `src` into `dst`. Returns whether a value moved.
fn take_field(dst: &mut AdapterStatus, src: &mut AdapterStatus, field: StatusField) -> bool {
    fn mv<T>(dst: &mut Option<T>, src: &mut Option<T>) -> bool {
        if src.is_some() {
            *dst = src.take();
            true
        } else {
            false
        }
    }

    debug_assert!(matches!(field.owner(), FieldSource::Endpoint(_)));
    match field {
        StatusField::Mac => mv(&mut dst.mac, &mut src.mac),
        StatusField::Ip => mv(&mut dst.ip, &mut src.ip),
        StatusField::MocaVersion => mv(&mut dst.moca_version, &mut src.moca_version),
        StatusField::LinkStatus => mv(&mut dst.link_status, &mut src.link_status),
        StatusField::NodeId => mv(&mut dst.node_id, &mut src.node_id),
        StatusField::NetworkControllerNode => mv(
            &mut dst.network_controller_node,
            &mut src.network_controller_node,
        ),
        StatusField::IsNetworkController => {
            mv(&mut dst.is_network_controller, &mut src.is_network_controller)
        }
        StatusField::EncryptionEnabled => {
            mv(&mut dst.encryption_enabled, &mut src.encryption_enabled)
        }
        StatusField::PeerCount => mv(&mut dst.peer_count, &mut src.peer_count),
        StatusField::Network => mv(&mut dst.network, &mut src.network),
        StatusField::PacketCounters => mv(&mut dst.packet_counters, &mut src.packet_counters),
        StatusField::PhyRates => mv(&mut dst.phy_rates, &mut src.phy_rates),
        StatusField::LowestOperatingFrequency => mv(
            &mut dst.lowest_operating_frequency_mhz,
            &mut src.lowest_operating_frequency_mhz,
        ),
        StatusField::FrequencyBand => mv(&mut dst.frequency_band, &mut src.frequency_band),
        StatusField::FirmwareVersion => mv(&mut dst.firmware_version, &mut src.firmware_version),
        StatusField::ModelName => mv(&mut dst.model_name, &mut src.model_name),
        StatusField::ChannelCount => mv(&mut dst.channel_count, &mut src.channel_count),
    }
}
