// Per-firmware payload layouts
//
// The only place that knows which word of which endpoint means what.
// Offsets were captured from MA2500D/WF-803M firmware; a newly observed
// firmware layout is one more `LAYOUTS` entry, never a decoder change.

use crate::endpoint::Endpoint;

/// Version assumed when a payload carries no `ver` marker.
pub const BASELINE_VERSION: u16 = 1;

/// A recognized field slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    // ── Identity ────────────────────────────────────────────────────
    /// Two words: bytes 1-4 in the first, bytes 5-6 in the top half of the second.
    MacAddress,

    // ── Local node ──────────────────────────────────────────────────
    NodeId,
    NetworkControllerNodeId,
    LinkStatus,
    MocaVersion,

    // ── Frame counters (two words each, high then low) ──────────────
    TxOk,
    TxBad,
    TxDropped,
    RxOk,
    RxBad,
    RxDropped,

    // ── Node table records ──────────────────────────────────────────
    PeerNodeId,
    PeerMacAddress,
    PeerMocaVersion,

    // ── Rate report records (tenths of Mbps) ────────────────────────
    RateNodeId,
    TxPhyRate,
    RxPhyRate,

    // ── Settings ────────────────────────────────────────────────────
    PrivacyEnabled,
    LowestOperatingFrequency,

    // ── Status page text ────────────────────────────────────────────
    FirmwareVersion,
    ModelName,
    ChannelCount,
}

/// Where a field lives inside a word record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub offset: usize,
    pub width: usize,
    pub tag: FieldTag,
}

const fn slot(offset: usize, width: usize, tag: FieldTag) -> Slot {
    Slot { offset, width, tag }
}

/// Overall shape of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One record of fixed slots.
    Singleton { slots: &'static [Slot] },
    /// Back-to-back records of `stride` words each.
    Records {
        stride: usize,
        slots: &'static [Slot],
    },
    /// Labelled values in an HTML page.
    Markup,
}

/// A versioned layout for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub endpoint: Endpoint,
    pub version: u16,
    pub shape: Shape,
}

impl Layout {
    pub fn slots(&self) -> &'static [Slot] {
        match self.shape {
            Shape::Singleton { slots } | Shape::Records { slots, .. } => slots,
            Shape::Markup => &[],
        }
    }
}

const MAC_V1: &[Slot] = &[slot(0, 2, FieldTag::MacAddress)];

const LOCAL_INFO_V1: &[Slot] = &[
    slot(3, 1, FieldTag::NodeId),
    slot(4, 1, FieldTag::NetworkControllerNodeId),
    slot(5, 1, FieldTag::LinkStatus),
    slot(11, 1, FieldTag::MocaVersion),
];

const FRAME_INFO_V1: &[Slot] = &[
    slot(12, 2, FieldTag::TxOk),
    slot(30, 2, FieldTag::TxBad),
    slot(48, 2, FieldTag::TxDropped),
    slot(66, 2, FieldTag::RxOk),
    slot(84, 2, FieldTag::RxBad),
    slot(102, 2, FieldTag::RxDropped),
];

const NODE_INFO_V1: &[Slot] = &[
    slot(0, 1, FieldTag::PeerNodeId),
    slot(1, 2, FieldTag::PeerMacAddress),
    slot(3, 1, FieldTag::PeerMocaVersion),
];

const PHY_RATES_V1: &[Slot] = &[
    slot(0, 1, FieldTag::RateNodeId),
    slot(1, 1, FieldTag::TxPhyRate),
    slot(2, 1, FieldTag::RxPhyRate),
];

const PRIVACY_V1: &[Slot] = &[slot(0, 1, FieldTag::PrivacyEnabled)];

const CONFIG_V1: &[Slot] = &[slot(0, 1, FieldTag::LowestOperatingFrequency)];

/// Every known `(endpoint, version)` layout.
pub static LAYOUTS: &[Layout] = &[
    Layout {
        endpoint: Endpoint::Mac,
        version: 1,
        shape: Shape::Singleton { slots: MAC_V1 },
    },
    Layout {
        endpoint: Endpoint::LocalInfo,
        version: 1,
        shape: Shape::Singleton {
            slots: LOCAL_INFO_V1,
        },
    },
    Layout {
        endpoint: Endpoint::FrameInfo,
        version: 1,
        shape: Shape::Singleton {
            slots: FRAME_INFO_V1,
        },
    },
    Layout {
        endpoint: Endpoint::NodeInfo,
        version: 1,
        shape: Shape::Records {
            stride: 16,
            slots: NODE_INFO_V1,
        },
    },
    Layout {
        endpoint: Endpoint::PhyRates,
        version: 1,
        shape: Shape::Records {
            stride: 4,
            slots: PHY_RATES_V1,
        },
    },
    Layout {
        endpoint: Endpoint::Privacy,
        version: 1,
        shape: Shape::Singleton { slots: PRIVACY_V1 },
    },
    Layout {
        endpoint: Endpoint::Config,
        version: 1,
        shape: Shape::Singleton { slots: CONFIG_V1 },
    },
    Layout {
        endpoint: Endpoint::StatusPage,
        version: 1,
        shape: Shape::Markup,
    },
];

/// Exact layout for `(endpoint, version)`, if one has been captured.
pub fn lookup(endpoint: Endpoint, version: u16) -> Option<&'static Layout> {
    LAYOUTS
        .iter()
        .find(|l| l.endpoint == endpoint && l.version == version)
}

/// Slots that sit at the same place in every known layout of `endpoint`.
///
/// This is what the generic scan may trust when a payload announces a
/// version nobody has captured yet. The record stride must also agree,
/// otherwise record-shaped endpoints get no stable slots.
pub fn stable_slots(endpoint: Endpoint) -> (Shape, Vec<Slot>) {
    let known: Vec<&Layout> = LAYOUTS.iter().filter(|l| l.endpoint == endpoint).collect();
    stable_slots_of(&known)
}

pub(crate) fn stable_slots_of(known: &[&Layout]) -> (Shape, Vec<Slot>) {
    let Some(first) = known.first() else {
        return (Shape::Singleton { slots: &[] }, Vec::new());
    };

    let same_shape = known.iter().all(|l| match (l.shape, first.shape) {
        (Shape::Singleton { .. }, Shape::Singleton { .. }) | (Shape::Markup, Shape::Markup) => true,
        (Shape::Records { stride: a, .. }, Shape::Records { stride: b, .. }) => a == b,
        _ => false,
    });
    if !same_shape {
        return (first.shape, Vec::new());
    }

    let stable = first
        .slots()
        .iter()
        .filter(|s| known.iter().all(|l| l.slots().contains(s)))
        .copied()
        .collect();
    (first.shape, stable)
}
