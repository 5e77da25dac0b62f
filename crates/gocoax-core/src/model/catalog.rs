// ── Known adapter models ──

use serde::Serialize;

use super::link::MocaVersion;

/// Static facts about an adapter model the status page can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownModel {
    pub name: &'static str,
    pub manufacturer: &'static str,
    pub moca_version: MocaVersion,
    /// Ethernet port speed as printed on the box.
    pub ethernet: &'static str,
}

const GOCOAX: &str = "goCoax";
const FRONTIER: &str = "Frontier";

pub static KNOWN_MODELS: &[KnownModel] = &[
    KnownModel {
        name: "MA2500D",
        manufacturer: GOCOAX,
        moca_version: MocaVersion::V2_5,
        ethernet: "2.5 GbE",
    },
    KnownModel {
        name: "MA2500C",
        manufacturer: GOCOAX,
        moca_version: MocaVersion::V2_5,
        ethernet: "2.5 GbE",
    },
    KnownModel {
        name: "WF-803M",
        manufacturer: GOCOAX,
        moca_version: MocaVersion::V2_5,
        ethernet: "1.0 GbE",
    },
    KnownModel {
        name: "FCA252",
        manufacturer: FRONTIER,
        moca_version: MocaVersion::V2_5,
        ethernet: "1.0 GbE",
    },
    KnownModel {
        name: "WF-803T",
        manufacturer: FRONTIER,
        moca_version: MocaVersion::V2_5,
        ethernet: "1.0 GbE",
    },
    KnownModel {
        name: "FCA251",
        manufacturer: FRONTIER,
        moca_version: MocaVersion::V2_5,
        ethernet: "1.0 GbE",
    },
];

/// Case-insensitive lookup by model name.
pub fn lookup(model: &str) -> Option<&'static KnownModel> {
    let model = model.trim();
    KNOWN_MODELS
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let model = lookup("ma2500d").map(|m| m.manufacturer);
        assert_eq!(model, Some("goCoax"));
        assert_eq!(lookup(" FCA251 ").map(|m| m.manufacturer), Some("Frontier"));
        assert!(lookup("MA1100").is_none());
    }
}
