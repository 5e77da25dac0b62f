// ── Field normalization ──
//
// Turns one endpoint's decoded raw fields into typed status values: MACs,
// enum codes, 64-bit counters, tenths-of-Mbps rates. A value that fails
// validation leaves its field empty and records a warning; it never fails
// the endpoint. Each endpoint writes only the fields it owns.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use gocoax_api::{DecodedPayload, Endpoint, FieldTag, RawValue};
use serde::Serialize;
use tracing::debug;

use crate::model::{
    AdapterStatus, Counters, FrequencyBand, LinkStatus, MacAddress, MocaVersion, NodeId,
    PacketCounters, Peer, PhyRate, StatusField,
};

/// Lowest operating frequencies an adapter can plausibly report, in MHz.
const LOF_RANGE_MHZ: std::ops::RangeInclusive<u32> = 1000..=1700;

/// Bonded channel counts a MoCA 2.x adapter can plausibly report.
const CHANNEL_RANGE: std::ops::RangeInclusive<u32> = 1..=16;

/// A value that was present but unusable, or expected but missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationWarning {
    /// Endpoint the value came from; `None` for connection settings.
    pub endpoint: Option<Endpoint>,
    pub field: StatusField,
    pub message: String,
}

impl NormalizationWarning {
    pub fn new(endpoint: Option<Endpoint>, field: StatusField, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.endpoint {
            Some(endpoint) => write!(f, "{endpoint}/{}: {}", self.field, self.message),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Typed fields from one endpoint, plus anything that had to be dropped.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub(crate) fields: AdapterStatus,
    pub(crate) warnings: Vec<NormalizationWarning>,
}

impl Normalized {
    pub fn fields(&self) -> &AdapterStatus {
        &self.fields
    }

    pub fn warnings(&self) -> &[NormalizationWarning] {
        &self.warnings
    }
}

/// Normalize one decoded payload.
pub fn normalize(payload: &DecodedPayload) -> Normalized {
    let mut n = Normalizer {
        payload,
        out: Normalized::default(),
    };

    match payload.endpoint {
        Endpoint::Mac => n.mac(),
        Endpoint::LocalInfo => n.local_info(),
        Endpoint::FrameInfo => n.frame_info(),
        Endpoint::NodeInfo => n.node_info(),
        Endpoint::PhyRates => n.phy_rates(),
        Endpoint::Privacy => n.privacy(),
        Endpoint::Config => n.config(),
        Endpoint::StatusPage => n.status_page(),
    }

    let opaque = payload.opaque_count();
    if opaque > 0 {
        debug!(endpoint = %payload.endpoint, opaque, "ignoring unrecognized fields");
    }
    n.out
}

/// Convert a rate reported in tenths of Mbps.
pub fn tenths_to_mbps(tenths: u32) -> f64 {
    f64::from(tenths) / 10.0
}

struct Normalizer<'a> {
    payload: &'a DecodedPayload,
    out: Normalized,
}

impl<'a> Normalizer<'a> {
    fn warn(&mut self, field: StatusField, message: impl Into<String>) {
        self.out.warnings.push(NormalizationWarning::new(
            Some(self.payload.endpoint),
            field,
            message,
        ));
    }

    fn missing(&mut self, tag: FieldTag, field: StatusField) {
        let message = if let Some(version) = self.payload.fallback_version() {
            format!("{tag:?} is not readable in unrecognized layout version {version}")
        } else if self.payload.truncated {
            format!("{tag:?} missing, payload truncated")
        } else {
            format!("{tag:?} missing from payload")
        };
        self.warn(field, message);
    }

    // ── Raw accessors ───────────────────────────────────────────────

    fn words(&mut self, record: usize, tag: FieldTag, field: StatusField) -> Option<&'a [u32]> {
        let payload = self.payload;
        match payload.get_in(record, tag) {
            Some(RawValue::Words(words)) => Some(words.as_slice()),
            Some(RawValue::Text(text)) => {
                self.warn(field, format!("{tag:?} is not a hex word: {text:?}"));
                None
            }
            None => {
                self.missing(tag, field);
                None
            }
        }
    }

    fn word(&mut self, record: usize, tag: FieldTag, field: StatusField) -> Option<u32> {
        match self.words(record, tag, field)? {
            [value] => Some(*value),
            other => {
                self.warn(field, format!("{tag:?} expected one word, got {}", other.len()));
                None
            }
        }
    }

    /// 64-bit value split across two words, high word first.
    fn wide(&mut self, tag: FieldTag, field: StatusField) -> Option<u64> {
        match self.words(0, tag, field)? {
            [hi, lo] => Some((u64::from(*hi) << 32) | u64::from(*lo)),
            other => {
                self.warn(field, format!("{tag:?} expected two words, got {}", other.len()));
                None
            }
        }
    }

    fn mac_at(&mut self, record: usize, tag: FieldTag, field: StatusField) -> Option<MacAddress> {
        match self.words(record, tag, field)? {
            [hi, lo] => Some(MacAddress::from_words(*hi, *lo)),
            other => {
                self.warn(field, format!("{tag:?} expected two words, got {}", other.len()));
                None
            }
        }
    }

    fn node_id(&mut self, record: usize, tag: FieldTag, field: StatusField) -> Option<NodeId> {
        let raw = self.word(record, tag, field)?;
        self.checked_node(raw, field)
    }

    fn checked_node(&mut self, raw: u32, field: StatusField) -> Option<NodeId> {
        let id = NodeId::new(raw);
        if id.is_none() {
            self.warn(field, format!("node id {raw} outside 0-{}", NodeId::MAX));
        }
        id
    }

    fn text(&mut self, tag: FieldTag, field: StatusField) -> Option<&'a str> {
        let payload = self.payload;
        match payload.get(tag) {
            Some(RawValue::Text(text)) if !text.trim().is_empty() => Some(text.trim()),
            Some(_) => {
                self.warn(field, format!("{tag:?} is empty"));
                None
            }
            None => {
                self.warn(field, format!("{tag:?} not found on status page"));
                None
            }
        }
    }

    // ── Endpoints ───────────────────────────────────────────────────

    fn mac(&mut self) {
        let field = StatusField::Mac;
        let Some(mac) = self.mac_at(0, FieldTag::MacAddress, field) else {
            return;
        };
        if mac.is_unset() {
            self.warn(field, "adapter reported an all-zero MAC");
            return;
        }
        self.out.fields.mac = Some(mac);
    }

    fn local_info(&mut self) {
        let node = self.node_id(0, FieldTag::NodeId, StatusField::NodeId);
        let controller = self.node_id(
            0,
            FieldTag::NetworkControllerNodeId,
            StatusField::NetworkControllerNode,
        );
        let link = self.word(0, FieldTag::LinkStatus, StatusField::LinkStatus);
        let version = self.word(0, FieldTag::MocaVersion, StatusField::MocaVersion);

        let fields = &mut self.out.fields;
        fields.node_id = node;
        fields.network_controller_node = controller;
        fields.is_network_controller = node.zip(controller).map(|(n, c)| n == c);
        fields.link_status = link.map(LinkStatus::from_code);
        fields.moca_version = version.map(MocaVersion::from_code);
    }

    fn frame_info(&mut self) {
        let tx = self.counters([FieldTag::TxOk, FieldTag::TxBad, FieldTag::TxDropped]);
        let rx = self.counters([FieldTag::RxOk, FieldTag::RxBad, FieldTag::RxDropped]);
        if tx.is_some() || rx.is_some() {
            self.out.fields.packet_counters = Some(PacketCounters { tx, rx });
        }
    }

    fn counters(&mut self, [ok, bad, dropped]: [FieldTag; 3]) -> Option<Counters> {
        let field = StatusField::PacketCounters;
        let ok = self.wide(ok, field);
        let bad = self.wide(bad, field);
        let dropped = self.wide(dropped, field);
        Some(Counters {
            ok: ok?,
            bad: bad?,
            dropped: dropped?,
        })
    }

    fn node_info(&mut self) {
        let field = StatusField::Network;
        let mut network = BTreeMap::new();

        for record in self.payload.record_indices() {
            let Some(raw) = self.word(record, FieldTag::PeerNodeId, field) else {
                continue;
            };
            let Some(mac) = self.mac_at(record, FieldTag::PeerMacAddress, field) else {
                continue;
            };
            // Unused table slot.
            if raw == 0 || mac.is_unset() {
                continue;
            }
            let Some(node) = self.checked_node(raw, field) else {
                continue;
            };
            let moca_version = self
                .word(record, FieldTag::PeerMocaVersion, field)
                .map(MocaVersion::from_code);

            match network.entry(node) {
                Entry::Vacant(slot) => {
                    slot.insert(Peer { mac, moca_version });
                }
                Entry::Occupied(_) => {
                    self.warn(field, format!("node {node} listed twice, keeping first entry"));
                }
            }
        }

        self.out.fields.network = Some(network);
    }

    fn phy_rates(&mut self) {
        let field = StatusField::PhyRates;
        let mut rates = BTreeMap::new();

        for record in self.payload.record_indices() {
            let node = self.word(record, FieldTag::RateNodeId, field);
            let tx = self.word(record, FieldTag::TxPhyRate, field);
            let rx = self.word(record, FieldTag::RxPhyRate, field);
            let (Some(node), Some(tx), Some(rx)) = (node, tx, rx) else {
                continue;
            };
            // Unused report slot.
            if node == 0 {
                continue;
            }
            let Some(node) = self.checked_node(node, field) else {
                continue;
            };

            let rate = PhyRate {
                tx_mbps: tenths_to_mbps(tx),
                rx_mbps: tenths_to_mbps(rx),
            };
            if rates.insert(node, rate).is_some() {
                self.warn(field, format!("node {node} reported twice, keeping last rate"));
            }
        }

        self.out.fields.phy_rates = Some(rates);
    }

    fn privacy(&mut self) {
        let field = StatusField::EncryptionEnabled;
        let enabled = match self.word(0, FieldTag::PrivacyEnabled, field) {
            Some(0) => Some(false),
            Some(1) => Some(true),
            Some(other) => {
                self.warn(field, format!("privacy flag {other} is neither 0 nor 1"));
                None
            }
            None => None,
        };
        self.out.fields.encryption_enabled = enabled;
    }

    fn config(&mut self) {
        let field = StatusField::LowestOperatingFrequency;
        let Some(mhz) = self.word(0, FieldTag::LowestOperatingFrequency, field) else {
            return;
        };
        if !LOF_RANGE_MHZ.contains(&mhz) {
            self.warn(
                field,
                format!(
                    "lowest operating frequency {mhz} MHz outside {}-{} MHz",
                    LOF_RANGE_MHZ.start(),
                    LOF_RANGE_MHZ.end()
                ),
            );
            return;
        }
        self.out.fields.lowest_operating_frequency_mhz = Some(f64::from(mhz));
        self.out.fields.frequency_band = Some(FrequencyBand::from_lof_mhz(mhz));
    }

    fn status_page(&mut self) {
        let firmware = self.text(FieldTag::FirmwareVersion, StatusField::FirmwareVersion);
        let model = self.text(FieldTag::ModelName, StatusField::ModelName);
        let channels = self.text(FieldTag::ChannelCount, StatusField::ChannelCount);

        self.out.fields.firmware_version = firmware.map(str::to_owned);
        self.out.fields.model_name = model.map(str::to_ascii_uppercase);

        if let Some(raw) = channels {
            match raw.parse::<u32>() {
                Ok(n) if CHANNEL_RANGE.contains(&n) => self.out.fields.channel_count = Some(n),
                _ => self.warn(
                    StatusField::ChannelCount,
                    format!("channel count {raw:?} is not a number between 1 and 16"),
                ),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use gocoax_api::{LayoutMatch, RawField, Tag};

    use super::*;

    fn field(record: usize, tag: FieldTag, value: RawValue) -> RawField {
        RawField {
            record,
            tag: Tag::Known(tag),
            value,
        }
    }

    fn words(values: &[u32]) -> RawValue {
        RawValue::Words(values.to_vec())
    }

    fn payload(endpoint: Endpoint, fields: Vec<RawField>) -> DecodedPayload {
        DecodedPayload {
            endpoint,
            layout: LayoutMatch::Exact { version: 1 },
            fields,
            truncated: false,
        }
    }

    #[test]
    fn tenths_convert_exactly() {
        assert_eq!(tenths_to_mbps(25_000), 2500.0);
        assert_eq!(tenths_to_mbps(24_015), 2401.5);
        assert_eq!(tenths_to_mbps(0), 0.0);
    }

    #[test]
    fn mac_endpoint() {
        let out = normalize(&payload(
            Endpoint::Mac,
            vec![field(0, FieldTag::MacAddress, words(&[0xa481_7a49, 0xe3dd_0000]))],
        ));
        assert_eq!(out.fields.mac.unwrap().to_string(), "a4:81:7a:49:e3:dd");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn all_zero_mac_is_dropped_with_warning() {
        let out = normalize(&payload(
            Endpoint::Mac,
            vec![field(0, FieldTag::MacAddress, words(&[0, 0]))],
        ));
        assert_eq!(out.fields.mac, None);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].field, StatusField::Mac);
    }

    #[test]
    fn local_info_derives_controller_flag() {
        let out = normalize(&payload(
            Endpoint::LocalInfo,
            vec![
                field(0, FieldTag::NodeId, words(&[2])),
                field(0, FieldTag::NetworkControllerNodeId, words(&[0])),
                field(0, FieldTag::LinkStatus, words(&[1])),
                field(0, FieldTag::MocaVersion, words(&[0x30])),
            ],
        ));
        let f = &out.fields;
        assert_eq!(f.node_id, NodeId::new(2));
        assert_eq!(f.is_network_controller, Some(false));
        assert_eq!(f.link_status, Some(LinkStatus::Up));
        assert_eq!(f.moca_version, Some(MocaVersion::Unknown(0x30)));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn garbled_word_only_costs_its_field() {
        let out = normalize(&payload(
            Endpoint::LocalInfo,
            vec![
                field(0, FieldTag::NodeId, RawValue::Text("0xzz".into())),
                field(0, FieldTag::NetworkControllerNodeId, words(&[0])),
                field(0, FieldTag::LinkStatus, words(&[0])),
                field(0, FieldTag::MocaVersion, words(&[0x25])),
            ],
        ));
        assert_eq!(out.fields.node_id, None);
        assert_eq!(out.fields.is_network_controller, None);
        assert_eq!(out.fields.link_status, Some(LinkStatus::Down));
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].field, StatusField::NodeId);
    }

    #[test]
    fn counters_combine_high_and_low_words() {
        let mut fields = vec![field(0, FieldTag::TxOk, words(&[1, 5]))];
        for tag in [FieldTag::TxBad, FieldTag::TxDropped, FieldTag::RxOk, FieldTag::RxBad] {
            fields.push(field(0, tag, words(&[0, 0])));
        }
        // rx dropped missing entirely
        let out = normalize(&payload(Endpoint::FrameInfo, fields));
        let counters = out.fields.packet_counters.unwrap();

        assert_eq!(counters.tx.unwrap().ok, (1 << 32) + 5);
        assert_eq!(counters.rx, None);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn node_table_skips_empty_slots_and_duplicates() {
        let out = normalize(&payload(
            Endpoint::NodeInfo,
            vec![
                field(0, FieldTag::PeerNodeId, words(&[1])),
                field(0, FieldTag::PeerMacAddress, words(&[0x0011_2233, 0x4455_0000])),
                field(0, FieldTag::PeerMocaVersion, words(&[0x25])),
                field(1, FieldTag::PeerNodeId, words(&[0])),
                field(1, FieldTag::PeerMacAddress, words(&[0, 0])),
                field(1, FieldTag::PeerMocaVersion, words(&[0])),
                field(2, FieldTag::PeerNodeId, words(&[1])),
                field(2, FieldTag::PeerMacAddress, words(&[0x0011_2233, 0x4466_0000])),
                field(2, FieldTag::PeerMocaVersion, words(&[0x20])),
            ],
        ));
        let network = out.fields.network.unwrap();

        assert_eq!(network.len(), 1);
        let peer = network[&NodeId::new(1).unwrap()];
        assert_eq!(peer.mac.to_string(), "00:11:22:33:44:55");
        assert_eq!(peer.moca_version, Some(MocaVersion::V2_5));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn node_zero_is_an_empty_slot() {
        let out = normalize(&payload(
            Endpoint::NodeInfo,
            vec![
                field(0, FieldTag::PeerNodeId, words(&[0])),
                field(0, FieldTag::PeerMacAddress, words(&[0x0011_2233, 0x4455_0000])),
                field(0, FieldTag::PeerMocaVersion, words(&[0x25])),
                field(1, FieldTag::PeerNodeId, words(&[4])),
                field(1, FieldTag::PeerMacAddress, words(&[0x0011_2233, 0x4466_0000])),
                field(1, FieldTag::PeerMocaVersion, words(&[0x25])),
            ],
        ));
        let network = out.fields.network.unwrap();
        assert_eq!(network.keys().copied().collect::<Vec<_>>(), vec![NodeId::new(4).unwrap()]);
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);

        let out = normalize(&payload(
            Endpoint::PhyRates,
            vec![
                field(0, FieldTag::RateNodeId, words(&[0])),
                field(0, FieldTag::TxPhyRate, words(&[25_000])),
                field(0, FieldTag::RxPhyRate, words(&[25_000])),
            ],
        ));
        assert!(out.fields.phy_rates.unwrap().is_empty());
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    }

    #[test]
    fn phy_rates_in_mbps() {
        let out = normalize(&payload(
            Endpoint::PhyRates,
            vec![
                field(0, FieldTag::RateNodeId, words(&[3])),
                field(0, FieldTag::TxPhyRate, words(&[25_000])),
                field(0, FieldTag::RxPhyRate, words(&[24_015])),
                field(1, FieldTag::RateNodeId, words(&[0])),
                field(1, FieldTag::TxPhyRate, words(&[0])),
                field(1, FieldTag::RxPhyRate, words(&[0])),
            ],
        ));
        let rates = out.fields.phy_rates.unwrap();
        let rate = rates[&NodeId::new(3).unwrap()];

        assert_eq!(rates.len(), 1);
        assert_eq!(rate.tx_mbps, 2500.0);
        assert_eq!(rate.rx_mbps, 2401.5);
    }

    #[test]
    fn lof_out_of_range_is_rejected() {
        let out = normalize(&payload(
            Endpoint::Config,
            vec![field(0, FieldTag::LowestOperatingFrequency, words(&[9999]))],
        ));
        assert_eq!(out.fields.lowest_operating_frequency_mhz, None);
        assert_eq!(out.fields.frequency_band, None);
        assert_eq!(out.warnings[0].field, StatusField::LowestOperatingFrequency);

        let out = normalize(&payload(
            Endpoint::Config,
            vec![field(0, FieldTag::LowestOperatingFrequency, words(&[1150]))],
        ));
        assert_eq!(out.fields.lowest_operating_frequency_mhz, Some(1150.0));
        assert_eq!(out.fields.frequency_band, Some(FrequencyBand::ExtendedD));
    }

    #[test]
    fn lof_range_starts_at_1000_mhz() {
        let below = normalize(&payload(
            Endpoint::Config,
            vec![field(0, FieldTag::LowestOperatingFrequency, words(&[999]))],
        ));
        assert_eq!(below.fields.lowest_operating_frequency_mhz, None);
        assert_eq!(below.fields.frequency_band, None);
        assert_eq!(below.warnings.len(), 1);
        assert!(below.warnings[0].message.contains("1000-1700"), "{}", below.warnings[0]);

        let edge = normalize(&payload(
            Endpoint::Config,
            vec![field(0, FieldTag::LowestOperatingFrequency, words(&[1000]))],
        ));
        assert_eq!(edge.fields.lowest_operating_frequency_mhz, Some(1000.0));
        assert_eq!(edge.fields.frequency_band, Some(FrequencyBand::DLow));
        assert!(edge.warnings.is_empty());
    }

    #[test]
    fn privacy_flag_must_be_boolean() {
        let out = normalize(&payload(
            Endpoint::Privacy,
            vec![field(0, FieldTag::PrivacyEnabled, words(&[2]))],
        ));
        assert_eq!(out.fields.encryption_enabled, None);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn status_page_text() {
        let out = normalize(&payload(
            Endpoint::StatusPage,
            vec![
                field(0, FieldTag::FirmwareVersion, RawValue::Text("2.0.11".into())),
                field(0, FieldTag::ModelName, RawValue::Text("ma2500d".into())),
                field(0, FieldTag::ChannelCount, RawValue::Text("40".into())),
            ],
        ));
        assert_eq!(out.fields.firmware_version.as_deref(), Some("2.0.11"));
        assert_eq!(out.fields.model_name.as_deref(), Some("MA2500D"));
        assert_eq!(out.fields.channel_count, None);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn missing_fields_mention_truncation() {
        let mut p = payload(Endpoint::Privacy, vec![]);
        p.truncated = true;
        let out = normalize(&p);
        assert!(out.warnings[0].message.contains("truncated"), "{}", out.warnings[0]);
    }

    #[test]
    fn endpoint_writes_only_its_own_fields() {
        let out = normalize(&payload(
            Endpoint::Privacy,
            vec![field(0, FieldTag::PrivacyEnabled, words(&[1]))],
        ));
        let owned: Vec<_> = StatusField::owned_by(Endpoint::Privacy).collect();
        for f in <StatusField as strum::IntoEnumIterator>::iter() {
            if !owned.contains(&f) {
                assert!(!out.fields.has(f), "privacy wrote {f}");
            }
        }
    }
}
