// Raw response decoding
//
// Turns one endpoint's body into an ordered list of `(record, tag, value)`
// fields. Nothing here assigns meaning or units: values stay as raw words
// or text for the normalizer. Layout knowledge lives in `layout`.

pub mod layout;

mod html;
mod words;

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::endpoint::{Encoding, Endpoint};
use crate::error::DecodeError;

pub use layout::{FieldTag, Layout, Shape, Slot};

/// Identifies a field slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A slot the layout table names.
    Known(FieldTag),
    /// A word the layout doesn't describe, by offset within its record.
    /// Carried through untouched so newer firmware can add fields.
    Opaque(usize),
}

/// Untyped field content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// One or more 32-bit words, most significant first.
    Words(Vec<u32>),
    /// Text as it appeared on the wire, including hex words that failed to parse.
    Text(String),
}

/// One decoded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// Record index; always 0 for single-record endpoints.
    pub record: usize,
    pub tag: Tag,
    pub value: RawValue,
}

/// Which layout produced a payload's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMatch {
    /// The announced version has a table entry.
    Exact { version: u16 },
    /// The announced version is unknown; only slots stable across every
    /// known version were extracted.
    Generic { requested: u16 },
}

/// Result of decoding one endpoint body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub endpoint: Endpoint,
    pub layout: LayoutMatch,
    pub fields: Vec<RawField>,
    /// The body ended before every slot of the layout was filled.
    pub truncated: bool,
}

impl DecodedPayload {
    /// First value for `tag` in record 0.
    pub fn get(&self, tag: FieldTag) -> Option<&RawValue> {
        self.get_in(0, tag)
    }

    /// Value for `tag` in a specific record.
    pub fn get_in(&self, record: usize, tag: FieldTag) -> Option<&RawValue> {
        self.fields
            .iter()
            .find(|f| f.record == record && f.tag == Tag::Known(tag))
            .map(|f| &f.value)
    }

    /// Records that carry at least one known field, in wire order.
    pub fn record_indices(&self) -> BTreeSet<usize> {
        self.fields
            .iter()
            .filter(|f| matches!(f.tag, Tag::Known(_)))
            .map(|f| f.record)
            .collect()
    }

    /// Number of fields the layout table didn't recognize.
    pub fn opaque_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| matches!(f.tag, Tag::Opaque(_)))
            .count()
    }

    /// The unknown version this payload announced, if the generic scan ran.
    pub fn fallback_version(&self) -> Option<u16> {
        match self.layout {
            LayoutMatch::Generic { requested } => Some(requested),
            LayoutMatch::Exact { .. } => None,
        }
    }
}

/// Decode a body, falling back to the stable-slot scan when the payload
/// announces a layout version with no table entry.
pub fn decode(endpoint: Endpoint, body: &[u8]) -> Result<DecodedPayload, DecodeError> {
    match decode_exact(endpoint, body) {
        Err(DecodeError::UnsupportedLayoutVersion { version }) => {
            warn!(%endpoint, version, "unknown layout version, using stable-slot scan");
            generic_scan(endpoint, body, version)
        }
        other => other,
    }
}

/// Decode a body strictly against the layout table.
pub fn decode_exact(endpoint: Endpoint, body: &[u8]) -> Result<DecodedPayload, DecodeError> {
    match endpoint.encoding() {
        Encoding::HexWords => {
            let envelope = words::parse_envelope(body)?;
            let layout = layout::lookup(endpoint, envelope.version).ok_or(
                DecodeError::UnsupportedLayoutVersion {
                    version: envelope.version,
                },
            )?;
            let (fields, truncated) = words::extract(&envelope.words, layout.shape);
            debug!(
                %endpoint,
                version = envelope.version,
                words = envelope.words.len(),
                fields = fields.len(),
                truncated,
                "decoded word payload"
            );
            Ok(DecodedPayload {
                endpoint,
                layout: LayoutMatch::Exact {
                    version: envelope.version,
                },
                fields,
                truncated,
            })
        }
        Encoding::Markup => {
            let fields = html::scan(body)?;
            debug!(%endpoint, fields = fields.len(), "decoded markup payload");
            Ok(DecodedPayload {
                endpoint,
                layout: LayoutMatch::Exact {
                    version: layout::BASELINE_VERSION,
                },
                fields,
                truncated: false,
            })
        }
    }
}

fn generic_scan(
    endpoint: Endpoint,
    body: &[u8],
    requested: u16,
) -> Result<DecodedPayload, DecodeError> {
    let envelope = words::parse_envelope(body)?;
    let (shape, stable) = layout::stable_slots(endpoint);
    let (fields, truncated) = words::extract_slots(&envelope.words, shape, &stable);
    Ok(DecodedPayload {
        endpoint,
        layout: LayoutMatch::Generic { requested },
        fields,
        truncated,
    })
}
