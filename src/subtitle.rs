use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// SRT timestamp: two-digit hours/minutes/seconds, comma, three-digit millis.
/// ASCII digits only; `\d` would also match other scripts' digits.
static SRT_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{2}:[0-9]{2}:[0-9]{2}),([0-9]{3})").expect("valid timestamp pattern")
});

const VTT_HEADER: &str = "WEBVTT\n\n";

/// One timed subtitle record as exchanged with the model.
///
/// Times are kept as `HH:MM:SS,mmm` strings and are never parsed; whatever
/// the model returns is written out verbatim. Missing fields read as empty
/// strings; callers decide how strictly to validate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubtitleEntry {
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            text: text.into(),
        }
    }
}

/// Serialize entries as SRT text, numbering blocks from 1 in input order.
pub fn format_srt(entries: &[SubtitleEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                entry.start_time,
                entry.end_time,
                entry.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert SRT text to WebVTT. Empty input yields empty output.
pub fn srt_to_vtt(srt: &str) -> String {
    if srt.is_empty() {
        return String::new();
    }

    let body = SRT_TIMESTAMP.replace_all(srt, "$1.$2");
    format!("{}{}", VTT_HEADER, body)
}
