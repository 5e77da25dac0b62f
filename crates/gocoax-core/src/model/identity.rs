// ── Core identity types ──
//
// MacAddress and NodeId identify every adapter on the coax mesh. Both are
// validated on construction so the rest of the model can trust them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// ── MacAddress ──────────────────────────────────────────────────────

/// Rejected MAC address text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid MAC address: {input:?}")]
pub struct InvalidMacAddress {
    pub input: String,
}

/// 48-bit MAC address. Displays as lowercase colon-separated (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn from_octets(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Rebuild a MAC from the adapter's two-word encoding: octets 1-4 in
    /// `hi`, octets 5-6 in the upper half of `lo`.
    pub fn from_words(hi: u32, lo: u32) -> Self {
        let [a, b, c, d] = hi.to_be_bytes();
        let [e, f, _, _] = lo.to_be_bytes();
        Self([a, b, c, d, e, f])
    }

    pub const fn octets(self) -> [u8; 6] {
        self.0
    }

    /// All-zero address, which the adapter reports for empty table slots.
    pub fn is_unset(self) -> bool {
        self.0 == [0; 6]
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = InvalidMacAddress;

    /// Accepts colon-separated, dash-separated, or bare hex, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMacAddress {
            input: s.to_owned(),
        };

        let trimmed = s.trim();
        let groups: Vec<&str> = if trimmed.contains([':', '-']) {
            trimmed.split([':', '-']).collect()
        } else if trimmed.len() == 12 {
            (0..6)
                .filter_map(|i| trimmed.get(i * 2..i * 2 + 2))
                .collect()
        } else {
            return Err(invalid());
        };

        if groups.len() != 6 {
            return Err(invalid());
        }

        let mut octets = [0u8; 6];
        for (octet, group) in octets.iter_mut().zip(&groups) {
            if group.len() != 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(group, 16).map_err(|_| invalid())?;
        }
        Ok(Self(octets))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ── NodeId ──────────────────────────────────────────────────────────

/// Position of an adapter within its MoCA network (0-15).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u8);

impl NodeId {
    /// Highest node id a MoCA 2.x network assigns.
    pub const MAX: u8 = 15;

    /// Validate a raw node id word.
    pub fn new(raw: u32) -> Option<Self> {
        u8::try_from(raw)
            .ok()
            .filter(|id| *id <= Self::MAX)
            .map(Self)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mac_from_words() {
        let mac = MacAddress::from_words(0xa481_7a49, 0xe3dd_0000);
        assert_eq!(mac.to_string(), "a4:81:7a:49:e3:dd");
    }

    #[test]
    fn mac_low_half_of_second_word_is_ignored() {
        let a = MacAddress::from_words(0x0011_2233, 0x4455_0000);
        let b = MacAddress::from_words(0x0011_2233, 0x4455_ffff);
        assert_eq!(a, b);
    }

    #[test]
    fn mac_parses_common_formats() {
        let expected = MacAddress::from_octets([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        for raw in ["aa:bb:cc:dd:ee:ff", "AA-BB-CC-DD-EE-FF", "aabbccddeeff"] {
            assert_eq!(raw.parse::<MacAddress>().unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn mac_rejects_bad_input() {
        for raw in ["", "aa:bb:cc", "aa:bb:cc:dd:ee:gg", "aabbccddeef", "a:bb:cc:dd:ee:ff0"] {
            assert!(raw.parse::<MacAddress>().is_err(), "{raw}");
        }
    }

    #[test]
    fn mac_serializes_as_canonical_string() {
        let mac = MacAddress::from_octets([0, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e]);
        assert_eq!(
            serde_json::to_string(&mac).unwrap(),
            "\"00:1a:2b:3c:4d:5e\""
        );
        let back: MacAddress = serde_json::from_str("\"00-1A-2B-3C-4D-5E\"").unwrap();
        assert_eq!(back, mac);
    }

    #[test]
    fn unset_mac() {
        assert!(MacAddress::from_words(0, 0).is_unset());
        assert!(!MacAddress::from_words(0, 0x0100_0000).is_unset());
    }

    #[test]
    fn node_id_range() {
        assert_eq!(NodeId::new(0).map(NodeId::get), Some(0));
        assert_eq!(NodeId::new(15).map(NodeId::get), Some(15));
        assert_eq!(NodeId::new(16), None);
        assert_eq!(NodeId::new(0x1_0000), None);
    }
}
