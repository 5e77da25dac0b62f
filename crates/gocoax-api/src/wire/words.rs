// Hex-word envelope decoding
//
// `/ms/...` endpoints answer with `{"data": ["0x000683cf", ...]}`, one
// 32-bit word per element. Some firmware pads the body with NULs or the
// array with empty strings; an optional `ver` key marks the layout version.

use serde_json::Value;

use super::layout::{BASELINE_VERSION, Shape, Slot};
use super::{RawField, RawValue, Tag};
use crate::error::DecodeError;

/// One element of the `data` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Word {
    Value(u32),
    /// Element that isn't a 32-bit hex word, kept verbatim.
    Garbled(String),
}

impl Word {
    fn parse(element: &Value) -> Self {
        match element {
            Value::String(s) => parse_hex(s).map_or_else(|| Self::Garbled(s.clone()), Self::Value),
            Value::Number(n) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map_or_else(|| Self::Garbled(n.to_string()), Self::Value),
            other => Self::Garbled(other.to_string()),
        }
    }

    fn is_zero(&self) -> bool {
        matches!(self, Self::Value(0))
    }

    fn render(&self) -> String {
        match self {
            Self::Value(v) => format!("0x{v:08x}"),
            Self::Garbled(s) => s.clone(),
        }
    }
}

fn parse_hex(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

#[derive(Debug)]
pub(crate) struct Envelope {
    pub version: u16,
    pub words: Vec<Word>,
}

/// Strip transport padding: leading BOM/whitespace, trailing NULs/whitespace.
pub(crate) fn trim_padding(body: &[u8]) -> &[u8] {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let end = body
        .iter()
        .rposition(|b| *b != 0 && !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    body.get(start..end.max(start)).unwrap_or_default()
}

pub(crate) fn parse_envelope(body: &[u8]) -> Result<Envelope, DecodeError> {
    let body = trim_padding(body);
    if body.is_empty() {
        return Err(DecodeError::TruncatedPayload);
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| DecodeError::MalformedHeader {
        reason: format!("not a JSON envelope: {e}"),
    })?;
    let Value::Object(map) = value else {
        return Err(DecodeError::MalformedHeader {
            reason: "envelope is not a JSON object".into(),
        });
    };

    let version = match map.get("ver") {
        None => BASELINE_VERSION,
        Some(v) => v
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| DecodeError::MalformedHeader {
                reason: format!("invalid version marker {v}"),
            })?,
    };

    let Some(Value::Array(elements)) = map.get("data") else {
        return Err(DecodeError::MalformedHeader {
            reason: "missing `data` array".into(),
        });
    };

    let mut words: Vec<Word> = elements.iter().map(Word::parse).collect();
    while matches!(words.last(), Some(Word::Garbled(s)) if s.trim().is_empty()) {
        words.pop();
    }
    if words.is_empty() {
        return Err(DecodeError::TruncatedPayload);
    }

    Ok(Envelope { version, words })
}

/// Extract fields using every slot of a layout shape.
pub(crate) fn extract(words: &[Word], shape: Shape) -> (Vec<RawField>, bool) {
    match shape {
        Shape::Singleton { slots } | Shape::Records { slots, .. } => {
            extract_slots(words, shape, slots)
        }
        Shape::Markup => (Vec::new(), false),
    }
}

/// Extract fields using an explicit slot subset.
pub(crate) fn extract_slots(words: &[Word], shape: Shape, slots: &[Slot]) -> (Vec<RawField>, bool) {
    match shape {
        Shape::Records { stride, .. } if stride > 0 => extract_records(words, stride, slots),
        _ => extract_record(words, 0, slots),
    }
}

fn extract_records(words: &[Word], stride: usize, slots: &[Slot]) -> (Vec<RawField>, bool) {
    let mut fields = Vec::new();
    let mut truncated = false;

    for (record, chunk) in words.chunks(stride).enumerate() {
        if chunk.len() < stride {
            // Zero fill after the last full record is padding, not a short record.
            if chunk.iter().all(Word::is_zero) {
                break;
            }
            truncated = true;
        }
        let (mut record_fields, _) = extract_record(chunk, record, slots);
        fields.append(&mut record_fields);
    }

    (fields, truncated)
}

fn extract_record(words: &[Word], record: usize, slots: &[Slot]) -> (Vec<RawField>, bool) {
    let mut fields = Vec::new();
    let mut i = 0;

    while i < words.len() {
        if let Some(slot) = slots.iter().find(|s| s.offset == i) {
            if let Some(span) = words.get(i..i + slot.width) {
                fields.push(RawField {
                    record,
                    tag: Tag::Known(slot.tag),
                    value: slot_value(span),
                });
            }
            i += slot.width;
            continue;
        }
        if let Some(word) = words.get(i) {
            fields.push(RawField {
                record,
                tag: Tag::Opaque(i),
                value: slot_value(std::slice::from_ref(word)),
            });
        }
        i += 1;
    }

    let truncated = slots.iter().any(|s| s.offset + s.width > words.len());
    (fields, truncated)
}

fn slot_value(span: &[Word]) -> RawValue {
    let values: Option<Vec<u32>> = span
        .iter()
        .map(|w| match w {
            Word::Value(v) => Some(*v),
            Word::Garbled(_) => None,
        })
        .collect();
    values.map_or_else(
        || RawValue::Text(span.iter().map(Word::render).collect::<Vec<_>>().join(" ")),
        RawValue::Words,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::wire::layout::FieldTag;

    #[test]
    fn parses_hex_with_and_without_prefix() {
        assert_eq!(parse_hex("0x000683cf"), Some(426_959));
        assert_eq!(parse_hex("0014c6cd"), Some(1_361_613));
        assert_eq!(parse_hex("0x"), None);
        assert_eq!(parse_hex("invalid"), None);
        assert_eq!(parse_hex("0x1ffffffff"), None);
    }

    #[test]
    fn strips_nul_padding_and_empty_trailing_elements() {
        let body = b"{\"data\":[\"0x1\",\"0x2\",\"\",\"\"]}\0\0\0\n";
        let envelope = parse_envelope(body).unwrap();
        assert_eq!(envelope.version, 1);
        assert_eq!(envelope.words, vec![Word::Value(1), Word::Value(2)]);
    }

    #[test]
    fn numeric_elements_are_accepted() {
        let envelope = parse_envelope(br#"{"data":[7, 4294967296]}"#).unwrap();
        assert_eq!(
            envelope.words,
            vec![Word::Value(7), Word::Garbled("4294967296".into())]
        );
    }

    #[test]
    fn envelope_errors() {
        assert_eq!(
            parse_envelope(b"\0\0 ").unwrap_err(),
            DecodeError::TruncatedPayload
        );
        assert_eq!(
            parse_envelope(br#"{"data":[]}"#).unwrap_err(),
            DecodeError::TruncatedPayload
        );
        assert!(matches!(
            parse_envelope(b"<html>").unwrap_err(),
            DecodeError::MalformedHeader { .. }
        ));
        assert!(matches!(
            parse_envelope(br#"{"result":[]}"#).unwrap_err(),
            DecodeError::MalformedHeader { .. }
        ));
        assert!(matches!(
            parse_envelope(br#"{"ver":"two","data":["0x1"]}"#).unwrap_err(),
            DecodeError::MalformedHeader { .. }
        ));
    }

    #[test]
    fn garbled_word_becomes_text_for_its_slot_only() {
        let slots = [
            Slot {
                offset: 0,
                width: 2,
                tag: FieldTag::TxOk,
            },
            Slot {
                offset: 2,
                width: 1,
                tag: FieldTag::NodeId,
            },
        ];
        let words = vec![Word::Value(0), Word::Garbled("0xzz".into()), Word::Value(5)];
        let (fields, truncated) = extract_record(&words, 0, &slots);

        assert!(!truncated);
        assert_eq!(fields[0].value, RawValue::Text("0x00000000 0xzz".into()));
        assert_eq!(fields[1].value, RawValue::Words(vec![5]));
    }

    #[test]
    fn zero_tail_after_records_is_padding() {
        let slots = [Slot {
            offset: 0,
            width: 1,
            tag: FieldTag::RateNodeId,
        }];
        let mut words: Vec<Word> = (1..=4).map(Word::Value).collect();
        words.extend([Word::Value(0), Word::Value(0)]);

        let (fields, truncated) = extract_records(&words, 4, &slots);
        assert!(!truncated);
        assert_eq!(fields.len(), 4);

        words.push(Word::Value(9));
        let (fields, truncated) = extract_records(&words[..7], 4, &slots);
        assert!(truncated);
        assert_eq!(fields.iter().filter(|f| f.record == 1).count(), 3);
    }
}
