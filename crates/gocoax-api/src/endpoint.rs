// Adapter management endpoints
//
// Every status value the adapter exposes lives behind one of a handful of
// fixed paths. The `/ms/...` paths answer with a JSON envelope of hex-encoded
// 32-bit words; the HTML pages are scraped for labelled values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an endpoint encodes its response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `{"data": ["0x...", ...]}` envelope of 32-bit words.
    HexWords,
    /// HTML page with labelled values.
    Markup,
}

/// A fixed management endpoint on the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Adapter MAC address. Cheapest authenticated read, used as the
    /// credential probe at the start of every poll.
    Mac,
    /// Local node info: node id, NC node id, link state, MoCA version.
    LocalInfo,
    /// Ethernet frame counters.
    FrameInfo,
    /// Node table for every node on the coax mesh.
    NodeInfo,
    /// Full-mesh PHY rate report.
    PhyRates,
    /// MoCA privacy (link encryption) settings.
    Privacy,
    /// RF configuration: lowest operating frequency.
    Config,
    /// Landing page: firmware, model, channel count.
    StatusPage,
}

impl Endpoint {
    /// Every endpoint polled for a full snapshot, credential probe first.
    pub const ALL: [Endpoint; 8] = [
        Self::Mac,
        Self::LocalInfo,
        Self::FrameInfo,
        Self::NodeInfo,
        Self::PhyRates,
        Self::Privacy,
        Self::Config,
        Self::StatusPage,
    ];

    /// Request path relative to the adapter base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Mac => "/ms/1/0x103/GET",
            Self::LocalInfo => "/ms/0/0x15",
            Self::FrameInfo => "/ms/0/0x14",
            Self::NodeInfo => "/ms/0/0x19",
            Self::PhyRates => "/ms/0/0x1D",
            Self::Privacy => "/ms/0/0x17",
            Self::Config => "/ms/0/0x1A",
            Self::StatusPage => "/index.html",
        }
    }

    pub fn encoding(self) -> Encoding {
        match self {
            Self::StatusPage => Encoding::Markup,
            _ => Encoding::HexWords,
        }
    }

    /// Short stable name, used in logs and serialized error lists.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mac => "mac",
            Self::LocalInfo => "local_info",
            Self::FrameInfo => "frame_info",
            Self::NodeInfo => "node_info",
            Self::PhyRates => "phy_rates",
            Self::Privacy => "privacy",
            Self::Config => "config",
            Self::StatusPage => "status_page",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_probe_is_polled_first() {
        assert_eq!(Endpoint::ALL[0], Endpoint::Mac);
    }

    #[test]
    fn paths_are_unique() {
        let mut paths: Vec<_> = Endpoint::ALL.iter().map(|e| e.path()).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), Endpoint::ALL.len());
    }

    #[test]
    fn only_status_page_is_markup() {
        for endpoint in Endpoint::ALL {
            let expected = if endpoint == Endpoint::StatusPage {
                Encoding::Markup
            } else {
                Encoding::HexWords
            };
            assert_eq!(endpoint.encoding(), expected, "{endpoint}");
        }
    }
}
