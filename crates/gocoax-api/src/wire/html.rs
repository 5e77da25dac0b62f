// Status page scanning
//
// The landing page renders firmware, model and channel count as label/value
// pairs spread across table cells. Markup is flattened to text first so the
// patterns don't care how a given firmware nests its cells.

use std::sync::LazyLock;

use regex::Regex;

use super::layout::FieldTag;
use super::words::trim_padding;
use super::{RawField, RawValue, Tag};
use crate::error::DecodeError;

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("markup tag pattern"));

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)\s*>").expect("script pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

static FIRMWARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)firmware(?:\s+version)?\s*[:\s]\s*v?([0-9]+(?:\.[0-9]+)+)")
        .expect("firmware pattern")
});

static MODEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)model(?:\s+name)?\s*[:\s]\s*(MA\d+\w*|WF-\d+\w*|FCA\d+)")
        .expect("model pattern")
});

static CHANNELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*channels?\b").expect("channel pattern"));

/// Flatten an HTML page into whitespace-normalized text.
fn flatten(html: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(html, " ");
    let text = MARKUP_TAG.replace_all(&without_scripts, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#58;", ":");
    WHITESPACE.replace_all(&text, " ").trim().to_owned()
}

pub(crate) fn scan(body: &[u8]) -> Result<Vec<RawField>, DecodeError> {
    let body = trim_padding(body);
    if body.is_empty() {
        return Err(DecodeError::TruncatedPayload);
    }

    let html = String::from_utf8_lossy(body);
    if !html.contains('<') {
        return Err(DecodeError::MalformedHeader {
            reason: "status page contains no markup".into(),
        });
    }

    let text = flatten(&html);
    let patterns: [(&Regex, FieldTag); 3] = [
        (&FIRMWARE, FieldTag::FirmwareVersion),
        (&MODEL, FieldTag::ModelName),
        (&CHANNELS, FieldTag::ChannelCount),
    ];

    Ok(patterns
        .into_iter()
        .filter_map(|(pattern, tag)| {
            let value = pattern.captures(&text)?.get(1)?.as_str().to_owned();
            Some(RawField {
                record: 0,
                tag: Tag::Known(tag),
                value: RawValue::Text(value),
            })
        })
        .collect())
}
