//! Raw engine result normalization.
//!
//! The engine's result shape is not stable across versions. Older sidecars
//! return `[points, [text, score]]` pairs, others `[points, text, score]`
//! triples or bare `[points, text]` pairs, and newer ones dict-shaped
//! detections. This module reconciles all of them into a `RecognizedPage`
//! without ever failing: a detection that cannot be understood is dropped,
//! a structurally-unexpected top level yields an empty page.

use serde_json::Value;

use super::types::{RawEngineResult, RecognizedLine, RecognizedPage};

/// Normalize a raw engine result.
///
/// Total over any JSON input. Detection order is preserved, repeated text is
/// kept, and no malformed detection can fail the call.
pub fn normalize_result(raw: &RawEngineResult) -> RecognizedPage {
    let Some(pages) = raw.as_array() else {
        return RecognizedPage::default();
    };

    let mut lines = Vec::new();
    for page in pages {
        let Some(detections) = page.as_array() else {
            continue;
        };
        for detection in detections {
            if let Some(line) = normalize_detection(detection) {
                lines.push(line);
            }
        }
    }

    RecognizedPage { lines }
}

/// Extract one line from a detection, trying each known shape in order.
fn normalize_detection(detection: &Value) -> Option<RecognizedLine> {
    let (bbox, text, confidence) = match detection {
        // Keyed form: named fields for polygon, text, and score.
        Value::Object(fields) => {
            let bbox = ["points", "bbox", "box"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(parse_polygon))?;
            let text = fields.get("text").map(coerce_text).unwrap_or_default();
            let confidence = fields
                .get("score")
                .or_else(|| fields.get("confidence"))
                .map(coerce_float)
                .unwrap_or(0.0);
            (bbox, text, confidence)
        }
        Value::Array(items) => {
            let bbox = parse_polygon(items.first()?)?;
            match items.as_slice() {
                // [points, [text, score]]
                [_, Value::Array(pair)] if pair.len() >= 2 => {
                    (bbox, coerce_text(&pair[0]), coerce_float(&pair[1]))
                }
                // [points, text, score]
                [_, text, score, ..] => (bbox, coerce_text(text), coerce_float(score)),
                // [points, text] with no score at all
                [_, text] => (bbox, coerce_text(text), 0.0),
                _ => return None,
            }
        }
        _ => return None,
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return None;
    }

    Some(RecognizedLine {
        text,
        confidence,
        bbox,
    })
}

/// Total numeric coercion: JSON numbers pass through, numeric strings parse,
/// anything else is 0.0.
pub fn coerce_float(value: &Value) -> f64 {
    as_float(value).unwrap_or(0.0)
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce any JSON value into text the way a dynamically-typed engine front
/// end would: strings pass through, everything else is stringified.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A polygon is a non-empty sequence of 2-D points. Anything that does not
/// parse as one disqualifies the whole detection.
fn parse_polygon(value: &Value) -> Option<Vec<[f64; 2]>> {
    let points = value.as_array()?;
    if points.is_empty() {
        return None;
    }
    points
        .iter()
        .map(|point| {
            let coords = point.as_array()?;
            match coords.as_slice() {
                [x, y, ..] => Some([as_float(x)?, as_float(y)?]),
                _ => None,
            }
        })
        .collect()
}
