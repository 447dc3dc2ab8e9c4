//! # Order String Parser
//!
//! Best-effort decoders for the finalized-order feed. The backend writes a
//! semi-structured line like `"✅ Client 27: [{'item': 'Soft Drink',
//! 'quantity': 2}]"`; parsing is lenient and every failure mode collapses to
//! an empty result rather than an error, since the feed is written by an
//! external recognizer we do not control.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use ordr_common::menu::{self, MenuItem};

/// One decoded `(item, quantity)` pair, resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub item: &'static MenuItem,
    pub quantity: u32,
}

#[derive(Deserialize)]
struct RawLine {
    item: String,
    quantity: i64,
}

/// Decodes the bracketed list out of a finalized order string.
///
/// Locates the first `[` and the last `]`, normalizes single quotes to double
/// quotes to coerce the slice into valid JSON, and decodes it as a list of
/// `{item, quantity}` records. Records that match no catalog entry or carry a
/// non-positive quantity are dropped silently; any structural failure yields
/// an empty result.
pub fn parse_order_string(raw: &str) -> Vec<ParsedLine> {
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else {
        warn!("no bracketed list found in order string");
        return Vec::new();
    };
    if end < start {
        warn!("mismatched brackets in order string");
        return Vec::new();
    }

    let cleaned = raw[start..=end].replace('\'', "\"");

    let rows: Vec<RawLine> = match serde_json::from_str(&cleaned) {
        Ok(rows) => rows,
        Err(e) => {
            warn!("failed to decode order string: {e}");
            return Vec::new();
        }
    };

    rows.iter().filter_map(resolve_line).collect()
}

/// Fallback decoder for comma-separated free text such as
/// `"Burger x2, Fries x1"` or `"2x Burger"`. Alternative to
/// [`parse_order_string`], never combined with it.
pub fn parse_simple_order_string(raw: &str) -> Vec<ParsedLine> {
    static PART: OnceLock<Regex> = OnceLock::new();
    let re = PART.get_or_init(|| {
        Regex::new(r"(?i)^(?:(\d+)\s*x\s*)?([a-zA-Z\s]+?)(?:\s*x?\s*(\d+))?$")
            .expect("simple order pattern is valid")
    });

    let mut lines = Vec::new();

    for part in raw.split(',').map(str::trim) {
        let Some(caps) = re.captures(part) else {
            debug!("unparseable order fragment: {part}");
            continue;
        };

        let quantity: u32 = caps
            .get(1)
            .or_else(|| caps.get(3))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(1);

        let Some(item) = menu::find_fuzzy(&caps[2]) else {
            debug!("no catalog match for fragment: {part}");
            continue;
        };

        if quantity > 0 {
            lines.push(ParsedLine { item, quantity });
        }
    }

    lines
}

/// Extracts the client label from a finalized order string, e.g.
/// `"✅ Client 27: [...]"` yields `"Client 27"`.
pub fn client_label(raw: &str) -> Option<String> {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    let re =
        LABEL.get_or_init(|| Regex::new(r"Client\s+(\d+)").expect("client pattern is valid"));

    re.captures(raw).map(|caps| format!("Client {}", &caps[1]))
}

fn resolve_line(raw: &RawLine) -> Option<ParsedLine> {
    let quantity = u32::try_from(raw.quantity).ok().filter(|q| *q > 0)?;

    match menu::find_fuzzy(&raw.item) {
        Some(item) => Some(ParsedLine { item, quantity }),
        None => {
            warn!("could not match order item: {}", raw.item);
            None
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
