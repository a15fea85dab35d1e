//! Chat Character Statistics
//!
//! Optional per-record extraction of prompt/response character counts from
//! chat activity. Composed into the analysis pass as a capability (the
//! analyzer carries an `Option<CharStatsCollector>` and feeds it eligible
//! records) rather than as a behavioral subclass of the aggregator.
//!
//! Eligible records are version-4 chat records (type 4), or coding records
//! whose language is literally `"chat"`. The payload is the record's last
//! column, `"<promptChars>,<responseChars>"`; malformed payloads count as
//! `(0, 0)` rather than failing the analysis, since the ingestion validator
//! already rejected genuinely broken uploads.
//!
//! The counters are file-scoped: every structurally valid chat line of the
//! scanned files contributes, including lines the record filter rejects or
//! the analysis window excludes. Filtering and clipping only shape the
//! duration aggregates.

use crate::models::{ActivityType, CharStats};

const CHAT_LANGUAGE: &str = "chat";

#[derive(Debug, Default)]
pub struct CharStatsCollector {
    stats: CharStats,
}

impl CharStatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one data line that passed column validation.
    pub fn observe(&mut self, kind: ActivityType, language: &str, payload: Option<&str>) {
        let is_chat = kind == ActivityType::Chat
            || (kind == ActivityType::Coding && language == CHAT_LANGUAGE);
        if !is_chat {
            return;
        }
        let (prompt, response) = parse_payload(payload.unwrap_or(""));
        self.stats.prompt += prompt;
        self.stats.response += response;
    }

    pub fn into_stats(self) -> CharStats {
        self.stats
    }
}

/// Parse `"<digits>,<digits>"`. Anything else is `(0, 0)`.
fn parse_payload(payload: &str) -> (i64, i64) {
    let Some((prompt, response)) = payload.split_once(',') else {
        return (0, 0);
    };
    if !is_digits(prompt) || !is_digits(response) {
        return (0, 0);
    }
    // Still fallible: absurdly long digit runs overflow.
    match (prompt.parse::<i64>(), response.parse::<i64>()) {
        (Ok(p), Ok(r)) => (p, r),
        _ => (0, 0),
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
