// ── MoCA link vocabulary ──
//
// Enumerations for values the adapter reports as raw codes. Unrecognized
// codes are preserved in an `Unknown` variant rather than rejected, since
// newer firmware adds codes faster than this table learns them.

use std::fmt;

use serde::{Serialize, Serializer};

/// MoCA specification revision a node runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MocaVersion {
    V2_0,
    V2_5,
    Unknown(u32),
}

impl MocaVersion {
    /// Map the adapter's version code (`0x20`, `0x25`).
    pub fn from_code(code: u32) -> Self {
        match code {
            0x20 => Self::V2_0,
            0x25 => Self::V2_5,
            other => Self::Unknown(other),
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for MocaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2_0 => f.write_str("2.0"),
            Self::V2_5 => f.write_str("2.5"),
            Self::Unknown(code) => write!(f, "unknown (0x{code:02x})"),
        }
    }
}

impl Serialize for MocaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Coax link state of the local adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    Up,
    Down,
    Unknown(u32),
}

impl LinkStatus {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::Up,
            0 => Self::Down,
            other => Self::Unknown(other),
        }
    }

    pub fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
            Self::Unknown(code) => write!(f, "unknown ({code})"),
        }
    }
}

impl Serialize for LinkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// MoCA frequency band, derived from the lowest operating frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyBand {
    DLow,
    ExtendedD,
    DMid,
    DHigh,
    /// Below every D-band edge; carries the LOF in MHz.
    Unknown(u32),
}

impl FrequencyBand {
    /// Classify a lowest operating frequency in MHz.
    pub fn from_lof_mhz(mhz: u32) -> Self {
        match mhz {
            1400.. => Self::DHigh,
            1225.. => Self::DMid,
            1125.. => Self::ExtendedD,
            1000.. => Self::DLow,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for FrequencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DLow => f.write_str("D-Low"),
            Self::ExtendedD => f.write_str("Extended-D"),
            Self::DMid => f.write_str("D-Mid"),
            Self::DHigh => f.write_str("D-High"),
            Self::Unknown(mhz) => write!(f, "unknown ({mhz} MHz)"),
        }
    }
}

impl Serialize for FrequencyBand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn moca_version_codes() {
        assert_eq!(MocaVersion::from_code(0x20), MocaVersion::V2_0);
        assert_eq!(MocaVersion::from_code(0x25), MocaVersion::V2_5);
        assert_eq!(MocaVersion::from_code(0x30), MocaVersion::Unknown(0x30));
        assert_eq!(MocaVersion::Unknown(0x30).to_string(), "unknown (0x30)");
    }

    #[test]
    fn link_status_codes() {
        assert!(LinkStatus::from_code(1).is_up());
        assert_eq!(LinkStatus::from_code(0), LinkStatus::Down);
        assert_eq!(LinkStatus::from_code(7), LinkStatus::Unknown(7));
    }

    #[test]
    fn band_edges() {
        assert_eq!(FrequencyBand::from_lof_mhz(1675), FrequencyBand::DHigh);
        assert_eq!(FrequencyBand::from_lof_mhz(1400), FrequencyBand::DHigh);
        assert_eq!(FrequencyBand::from_lof_mhz(1399), FrequencyBand::DMid);
        assert_eq!(FrequencyBand::from_lof_mhz(1225), FrequencyBand::DMid);
        assert_eq!(FrequencyBand::from_lof_mhz(1150), FrequencyBand::ExtendedD);
        assert_eq!(FrequencyBand::from_lof_mhz(1000), FrequencyBand::DLow);
        assert_eq!(FrequencyBand::from_lof_mhz(850), FrequencyBand::Unknown(850));
    }

    #[test]
    fn serialized_forms() {
        assert_eq!(serde_json::to_string(&MocaVersion::V2_5).unwrap(), "\"2.5\"");
        assert_eq!(serde_json::to_string(&LinkStatus::Up).unwrap(), "\"up\"");
        assert_eq!(
            serde_json::to_string(&FrequencyBand::ExtendedD).unwrap(),
            "\"Extended-D\""
        );
    }
}
